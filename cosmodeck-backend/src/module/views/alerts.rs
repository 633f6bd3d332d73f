///! NOAA space-weather alert cards
///!
///! Alert messages are free text; type, severity and title come from
///! keyword matching.
use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use cosmodeck_common::NoaaAlert;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::module::binder::{Snapshot, ViewModel};

const MAX_ALERTS: usize = 6;
const MAX_DESCRIPTION: usize = 300;
const EMPTY_MESSAGE: &str = "Space weather monitoring active";
const SOURCE: &str = "NOAA SWPC";

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "Low Risk",
            Severity::Medium => "Medium Risk",
            Severity::High => "High Risk",
        }
    }
}

pub fn alert_type(message: &str) -> &'static str {
    let m = message.to_lowercase();
    if m.contains("flare") {
        "Solar Flare"
    } else if m.contains("geomagnetic") || m.contains("storm") {
        "Geomagnetic Storm"
    } else if m.contains("aurora") {
        "Aurora Activity"
    } else if m.contains("radiation") || m.contains("proton") {
        "Radiation Storm"
    } else {
        "Space Weather Alert"
    }
}

pub fn severity(message: &str) -> Severity {
    let m = message.to_lowercase();
    if ["severe", "major", "extreme"].iter().any(|w| m.contains(w)) {
        Severity::High
    } else if m.contains("moderate") || m.contains("strong") {
        Severity::Medium
    } else {
        Severity::Low
    }
}

pub fn alert_title(message: &str) -> &'static str {
    let m = message.to_lowercase();
    if m.contains("solar flare") {
        "Solar Flare Alert"
    } else if m.contains("geomagnetic") {
        "Geomagnetic Storm Alert"
    } else if m.contains("aurora") {
        "Aurora Activity Alert"
    } else if m.contains("radiation") {
        "Solar Radiation Storm"
    } else {
        "Space Weather Alert"
    }
}

/// Whitespace collapsed to single spaces, cut at 300 characters with "..."
pub fn clean_description(message: &str) -> String {
    let collapsed = WHITESPACE.replace_all(message.trim(), " ");
    if collapsed.chars().count() <= MAX_DESCRIPTION {
        return collapsed.into_owned();
    }
    let mut cut: String = collapsed.chars().take(MAX_DESCRIPTION).collect();
    cut.push_str("...");
    cut
}

/// SWPC timestamps look like "2024-05-10 12:00:00.000"
fn parse_issued(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|n| n.and_utc())
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|d| d.with_timezone(&Utc)))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertCard {
    pub id: String,
    pub kind: String,
    pub severity: Severity,
    pub severity_label: String,
    pub title: String,
    pub description: String,
    pub issued_at: Option<DateTime<Utc>>,
    /// One day after issue
    pub valid_until: Option<DateTime<Utc>>,
    pub source: String,
}

pub fn alert_card(index: usize, alert: &NoaaAlert) -> AlertCard {
    let message = if alert.message.trim().is_empty() {
        EMPTY_MESSAGE
    } else {
        alert.message.as_str()
    };
    let severity = severity(message);
    let issued_at = parse_issued(&alert.issue_datetime);

    AlertCard {
        id: format!("noaa-{}", index),
        kind: alert_type(message).to_string(),
        severity,
        severity_label: severity.label().to_string(),
        title: alert_title(message).to_string(),
        description: clean_description(message),
        issued_at,
        valid_until: issued_at.map(|t| t + Duration::hours(24)),
        source: SOURCE.to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertSelection {
    /// Minimum severity to show
    #[serde(default)]
    pub severity: Option<Severity>,
}

pub struct AlertsView;

impl ViewModel for AlertsView {
    type Data = Vec<NoaaAlert>;
    type Selection = AlertSelection;
    type Output = Vec<AlertCard>;

    fn derive(snapshot: &Snapshot<Vec<NoaaAlert>>, selection: &AlertSelection) -> Vec<AlertCard> {
        snapshot
            .values()
            .flatten()
            .take(MAX_ALERTS)
            .enumerate()
            .map(|(i, alert)| alert_card(i, alert))
            .filter(|card| selection.severity.is_none_or(|min| card.severity >= min))
            .collect()
    }
}
