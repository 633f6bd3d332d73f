///! Derived view models
///!
///! Each view is a pure function from a binder snapshot plus the current
///! filter/sort selection to what a screen section displays.

pub mod alerts;
pub mod epic;
pub mod events;
pub mod launches;
pub mod today;
pub mod tracker;
pub mod weather;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

use crate::module::binder::{Snapshot, ViewModel};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn apply(&self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// For views without filters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoSelection {}

/// `None` and "All" (any case) both mean "no filter"
pub(crate) fn matches_filter(filter: Option<&str>, value: &str) -> bool {
    match filter.map(str::trim) {
        None | Some("") => true,
        Some(f) if f.eq_ignore_ascii_case("all") => true,
        Some(f) => f.eq_ignore_ascii_case(value.trim()),
    }
}

/// Sorted, de-duplicated filter choices
pub(crate) fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut values: Vec<String> = values.filter(|v| !v.is_empty()).map(str::to_string).collect();
    values.sort();
    values.dedup();
    values
}

/// A single object resource shown as-is
pub struct ItemView<T>(PhantomData<fn() -> T>);

impl<T> ViewModel for ItemView<T>
where
    T: DeserializeOwned + Serialize + Clone + Send + Sync + 'static,
{
    type Data = T;
    type Selection = NoSelection;
    type Output = Option<T>;

    fn derive(snapshot: &Snapshot<T>, _: &NoSelection) -> Option<T> {
        snapshot.first_value().cloned()
    }
}

/// List resources concatenated in request order
pub struct ListView<T>(PhantomData<fn() -> T>);

impl<T> ViewModel for ListView<T>
where
    T: DeserializeOwned + Serialize + Clone + Send + Sync + 'static,
{
    type Data = Vec<T>;
    type Selection = NoSelection;
    type Output = Vec<T>;

    fn derive(snapshot: &Snapshot<Vec<T>>, _: &NoSelection) -> Vec<T> {
        snapshot.values().flatten().cloned().collect()
    }
}

/// Snapshot with one successfully loaded resource
#[cfg(test)]
pub(crate) fn loaded_snapshot<T>(key: &str, value: T) -> Snapshot<T> {
    use crate::module::binder::{LoaderState, LoaderStatus};
    use crate::module::loader::ResourceResult;

    let mut state = LoaderState::idle();
    state.status = LoaderStatus::Loaded;
    state.result = Some(ResourceResult::success(value));
    Snapshot {
        states: vec![(key.to_string(), state)],
    }
}
