///! Natural events (EONET) and the astronomical calendar
use chrono::Datelike;
use cosmodeck_common::{EonetEvent, EonetFeed};
use serde::{Deserialize, Serialize};

use super::{distinct, matches_filter};
use crate::module::binder::{Snapshot, ViewModel};
use crate::module::sim::astronomy::{AstronomicalEvent, EventKind};

const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NaturalEventSelection {
    /// EONET category title, e.g. "Wildfires"
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NaturalEventCard {
    pub id: String,
    pub title: String,
    pub category: String,
    /// Most recent geometry sample
    pub date: Option<String>,
    pub open: bool,
    pub link: Option<String>,
    pub coordinates: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NaturalEventBoard {
    pub events: Vec<NaturalEventCard>,
    pub categories: Vec<String>,
}

fn category_of(event: &EonetEvent) -> &str {
    event.categories.first().map(|c| c.title.as_str()).unwrap_or(UNCATEGORIZED)
}

fn event_card(event: &EonetEvent) -> NaturalEventCard {
    let latest = event.geometry.iter().max_by(|a, b| a.date.cmp(&b.date));
    NaturalEventCard {
        id: event.id.clone(),
        title: event.title.clone(),
        category: category_of(event).to_string(),
        date: event.latest_date().map(str::to_string),
        open: event.closed.is_none(),
        link: event.link.clone(),
        coordinates: latest.map(|g| g.coordinates.clone()),
    }
}

pub struct NaturalEventsView;

impl ViewModel for NaturalEventsView {
    type Data = EonetFeed;
    type Selection = NaturalEventSelection;
    type Output = NaturalEventBoard;

    fn derive(snapshot: &Snapshot<EonetFeed>, selection: &NaturalEventSelection) -> NaturalEventBoard {
        let all: Vec<&EonetEvent> = snapshot.values().flat_map(|feed| feed.events.iter()).collect();
        let categories = distinct(all.iter().flat_map(|e| e.categories.iter().map(|c| c.title.as_str())));

        let events = all
            .into_iter()
            .filter(|e| match selection.category.as_deref() {
                // Any of the event's categories may match
                Some(_) if !e.categories.is_empty() => e
                    .categories
                    .iter()
                    .any(|c| matches_filter(selection.category.as_deref(), &c.title)),
                filter => matches_filter(filter, UNCATEGORIZED),
            })
            .map(event_card)
            .collect();

        NaturalEventBoard { events, categories }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarSelection {
    /// English month name or number, e.g. "August" or "8"
    #[serde(default)]
    pub month: Option<String>,
    /// "Lunar Phase" or "Meteor Shower"
    #[serde(default)]
    pub kind: Option<String>,
}

const MONTHS: [&str; 12] = [
    "january", "february", "march", "april", "may", "june", "july", "august", "september", "october",
    "november", "december",
];

fn parse_month(raw: &str) -> Option<u32> {
    let raw = raw.trim().to_ascii_lowercase();
    if let Ok(n) = raw.parse::<u32>() {
        return (1..=12).contains(&n).then_some(n);
    }
    MONTHS
        .iter()
        .position(|m| *m == raw || (raw.len() >= 3 && m.starts_with(&raw)))
        .map(|i| i as u32 + 1)
}

/// Calendar events narrowed by month and kind. An unrecognised month or
/// kind matches nothing; "All" and empty match everything.
pub fn filter_calendar(events: &[AstronomicalEvent], selection: &CalendarSelection) -> Vec<AstronomicalEvent> {
    let month = match selection.month.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(m) if m.eq_ignore_ascii_case("all") => None,
        Some(m) => Some(parse_month(m)),
    };
    let kind = match selection.kind.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(k) if k.eq_ignore_ascii_case("all") => None,
        Some(k) => Some(EventKind::from_label(k)),
    };

    events
        .iter()
        .filter(|e| month.is_none_or(|m| m == Some(e.date.month())))
        .filter(|e| kind.is_none_or(|k| k == Some(e.kind)))
        .cloned()
        .collect()
}
