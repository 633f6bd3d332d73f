///! Per-resource loading state held by a view binder
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::module::loader::ResourceResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoaderStatus {
    Idle,
    Loading,
    /// Live or fallback data available
    Loaded,
    /// Load failed and nothing could stand in
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoaderState<T> {
    pub status: LoaderStatus,
    /// Last resolved result; kept while a refresh is loading
    pub result: Option<ResourceResult<T>>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl<T> Default for LoaderState<T> {
    fn default() -> Self {
        Self {
            status: LoaderStatus::Idle,
            result: None,
            last_updated: None,
        }
    }
}

impl<T> LoaderState<T> {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn value(&self) -> Option<&T> {
        self.result.as_ref().and_then(ResourceResult::value)
    }

    pub(super) fn begin(&mut self) {
        self.status = LoaderStatus::Loading;
    }

    /// Store a resolved result. `last_updated` only moves forward: if the
    /// clock did not advance since the previous update it is bumped by 1 µs.
    pub(super) fn resolve(&mut self, result: ResourceResult<T>, now: DateTime<Utc>) {
        self.status = if result.is_failure() {
            LoaderStatus::Error
        } else {
            LoaderStatus::Loaded
        };
        self.result = Some(result);
        self.last_updated = Some(match self.last_updated {
            Some(previous) if now <= previous => previous + Duration::microseconds(1),
            _ => now,
        });
    }
}

/// Ordered view of a binder's states, one entry per current request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot<T> {
    pub states: Vec<(String, LoaderState<T>)>,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self { states: Vec::new() }
    }
}

impl<T> Snapshot<T> {
    pub fn get(&self, key: &str) -> Option<&LoaderState<T>> {
        self.states.iter().find(|(k, _)| k == key).map(|(_, s)| s)
    }

    /// Renderable values in request order
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.states.iter().filter_map(|(_, s)| s.value())
    }

    pub fn first_value(&self) -> Option<&T> {
        self.values().next()
    }

    pub fn is_loading(&self) -> bool {
        self.states.iter().any(|(_, s)| s.status == LoaderStatus::Loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::loader::ErrorKind;
    use chrono::TimeZone;

    #[test]
    fn test_resolve_sets_status() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let mut state = LoaderState::<u32>::idle();
        assert_eq!(state.status, LoaderStatus::Idle);
        assert!(state.last_updated.is_none());

        state.begin();
        assert_eq!(state.status, LoaderStatus::Loading);
        assert!(state.last_updated.is_none());

        state.resolve(ResourceResult::fallback(1, ErrorKind::Timeout), now);
        assert_eq!(state.status, LoaderStatus::Loaded);
        assert_eq!(state.value(), Some(&1));

        state.resolve(ResourceResult::failure(ErrorKind::Timeout), now + Duration::seconds(1));
        assert_eq!(state.status, LoaderStatus::Error);
        assert_eq!(state.value(), None);
        assert_eq!(state.last_updated, Some(now + Duration::seconds(1)));
    }

    #[test]
    fn test_last_updated_strictly_increases() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let mut state = LoaderState::<u32>::idle();
        state.resolve(ResourceResult::success(1), now);
        state.resolve(ResourceResult::success(1), now);
        assert_eq!(state.last_updated, Some(now + Duration::microseconds(1)));
        // A clock going backwards does not move it back either
        state.resolve(ResourceResult::success(1), now - Duration::seconds(5));
        assert_eq!(state.last_updated, Some(now + Duration::microseconds(2)));
    }
}
