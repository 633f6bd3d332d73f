///! Sections computed in-process: satellite passes and the astronomical calendar
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info};

use crate::module::binder::{RenderError, Section, selection_from_query};
use crate::module::sim::astronomy::upcoming_events;
use crate::module::sim::passes::{SatellitePass, generate_passes};
use crate::module::sim::{Clock, RandomSource};
use crate::module::views::NoSelection;
use crate::module::views::events::{CalendarSelection, filter_calendar};

fn rendered<S: Serialize, O: Serialize>(
    name: &str,
    active: bool,
    selection: &S,
    view: &O,
) -> Result<Value, RenderError> {
    Ok(json!({
        "name": name,
        "active": active,
        "states": {},
        "selection": serde_json::to_value(selection)?,
        "view": serde_json::to_value(view)?,
    }))
}

/// Generated pass predictions, redrawn on every refresh
pub struct PassesSection {
    name: String,
    clock: Arc<dyn Clock>,
    random: Arc<dyn RandomSource>,
    active: AtomicBool,
    passes: RwLock<Vec<SatellitePass>>,
}

impl PassesSection {
    pub fn new(name: impl Into<String>, clock: Arc<dyn Clock>, random: Arc<dyn RandomSource>) -> Self {
        Self {
            name: name.into(),
            clock,
            random,
            active: AtomicBool::new(false),
            passes: RwLock::new(Vec::new()),
        }
    }

    pub fn passes(&self) -> Vec<SatellitePass> {
        self.passes.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn regenerate(&self) {
        let passes = generate_passes(self.clock.as_ref(), self.random.as_ref());
        debug!("Generated {} satellite passes", passes.len());
        *self.passes.write().unwrap_or_else(PoisonError::into_inner) = passes;
    }
}

#[async_trait]
impl Section for PassesSection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn activate(&self) {
        if self.active.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("View '{}' activated", self.name);
        self.regenerate();
    }

    async fn refresh(&self) -> bool {
        if !self.is_active() {
            return false;
        }
        self.regenerate();
        true
    }

    fn deactivate(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            info!("View '{}' deactivated", self.name);
        }
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn render(&self, _query: &HashMap<String, String>) -> Result<Value, RenderError> {
        rendered(&self.name, self.is_active(), &NoSelection {}, &self.passes())
    }
}

/// Lunar phases and meteor showers relative to the clock at render time
pub struct CalendarSection {
    name: String,
    clock: Arc<dyn Clock>,
    active: AtomicBool,
    selection: RwLock<CalendarSelection>,
}

impl CalendarSection {
    pub fn new(name: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            name: name.into(),
            clock,
            active: AtomicBool::new(false),
            selection: RwLock::new(CalendarSelection::default()),
        }
    }

    pub fn set_selection(&self, selection: CalendarSelection) {
        *self.selection.write().unwrap_or_else(PoisonError::into_inner) = selection;
    }
}

#[async_trait]
impl Section for CalendarSection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn activate(&self) {
        if !self.active.swap(true, Ordering::SeqCst) {
            info!("View '{}' activated", self.name);
        }
    }

    async fn refresh(&self) -> bool {
        self.is_active()
    }

    fn deactivate(&self) {
        if self.active.swap(false, Ordering::SeqCst) {
            info!("View '{}' deactivated", self.name);
        }
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn render(&self, query: &HashMap<String, String>) -> Result<Value, RenderError> {
        let selection = if query.is_empty() {
            self.selection.read().unwrap_or_else(PoisonError::into_inner).clone()
        } else {
            selection_from_query::<CalendarSelection>(query)?
        };
        let events = filter_calendar(&upcoming_events(self.clock.now()), &selection);
        rendered(&self.name, self.is_active(), &selection, &events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::sim::{ManualClock, SequenceRandom};
    use chrono::{TimeZone, Utc};

    fn clock() -> Arc<dyn Clock> {
        Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap()))
    }

    #[tokio::test]
    async fn test_passes_generated_on_activation() {
        let section = PassesSection::new("passes", clock(), Arc::new(SequenceRandom::new(vec![0.1, 0.5, 0.9])));
        assert!(!section.refresh().await);
        assert!(section.passes().is_empty());

        section.activate().await;
        assert_eq!(section.passes().len(), 10);

        let rendered = section.render(&HashMap::new()).unwrap();
        assert_eq!(rendered["name"], "passes");
        assert_eq!(rendered["active"], true);
        assert_eq!(rendered["view"].as_array().unwrap().len(), 10);

        section.deactivate();
        assert!(!section.is_active());
    }

    #[tokio::test]
    async fn test_calendar_query_overrides_selection() {
        let section = CalendarSection::new("calendar", clock());
        section.activate().await;

        let all = section.render(&HashMap::new()).unwrap();
        let query = HashMap::from([("kind".to_string(), "Meteor Shower".to_string())]);
        let meteors = section.render(&query).unwrap();

        let count = |v: &Value| v["view"].as_array().unwrap().len();
        assert!(count(&meteors) > 0);
        assert!(count(&meteors) <= count(&all));
        assert!(
            meteors["view"]
                .as_array()
                .unwrap()
                .iter()
                .all(|e| e["kind"] == "Meteor Shower")
        );
        assert_eq!(meteors["selection"]["kind"], "Meteor Shower");
    }
}
