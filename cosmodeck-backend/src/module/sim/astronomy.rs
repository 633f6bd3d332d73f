///! Astronomical event calendar
///!
///! Simplified on purpose: lunar phases step 7.4 days from an approximate
///! new moon on 6 January, meteor showers use fixed peak dates.
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::Serialize;

const PHASE_NAMES: [&str; 4] = ["New Moon", "First Quarter", "Full Moon", "Last Quarter"];
const PHASE_STEPS: u32 = 16;
const PHASE_STEP_SECONDS: i64 = 639_360; // 7.4 days
const MAX_EVENTS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventKind {
    #[serde(rename = "Lunar Phase")]
    LunarPhase,
    #[serde(rename = "Meteor Shower")]
    MeteorShower,
}

impl EventKind {
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::LunarPhase => "Lunar Phase",
            EventKind::MeteorShower => "Meteor Shower",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "lunar phase" | "lunar" => Some(EventKind::LunarPhase),
            "meteor shower" | "meteor" => Some(EventKind::MeteorShower),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AstronomicalEvent {
    pub id: String,
    pub name: String,
    pub kind: EventKind,
    pub date: DateTime<Utc>,
    pub description: String,
    pub visibility: String,
    pub duration: String,
}

struct MeteorShower {
    name: &'static str,
    month: u32,
    day: u32,
    next_year: bool,
    rate: &'static str,
}

const METEOR_SHOWERS: &[MeteorShower] = &[
    MeteorShower { name: "Perseids", month: 8, day: 12, next_year: false, rate: "60-100" },
    MeteorShower { name: "Geminids", month: 12, day: 14, next_year: false, rate: "50-120" },
    MeteorShower { name: "Leonids", month: 11, day: 18, next_year: false, rate: "10-15" },
    MeteorShower { name: "Quadrantids", month: 1, day: 3, next_year: true, rate: "25-40" },
    MeteorShower { name: "Lyrids", month: 4, day: 22, next_year: false, rate: "10-20" },
    MeteorShower { name: "Eta Aquariids", month: 5, day: 5, next_year: false, rate: "10-30" },
];

/// Lunar phases after `now`, at most until the end of next year
pub fn lunar_phases(now: DateTime<Utc>) -> Vec<AstronomicalEvent> {
    let year = now.year();
    let Some(base) = Utc.with_ymd_and_hms(year, 1, 6, 0, 0, 0).single() else {
        return Vec::new();
    };

    (0..PHASE_STEPS)
        .filter_map(|i| {
            let date = base + Duration::seconds(PHASE_STEP_SECONDS * i as i64);
            if date <= now || date.year() > year + 1 {
                return None;
            }
            let name = PHASE_NAMES[(i % 4) as usize];
            Some(AstronomicalEvent {
                id: format!("moon-{}", i),
                name: name.to_string(),
                kind: EventKind::LunarPhase,
                date,
                description: format!("{} - Moon phase visibility event.", name),
                visibility: "Global (night side)".to_string(),
                duration: "1 day".to_string(),
            })
        })
        .collect()
}

/// Meteor shower peaks after `now`
pub fn meteor_showers(now: DateTime<Utc>) -> Vec<AstronomicalEvent> {
    let year = now.year();
    METEOR_SHOWERS
        .iter()
        .filter_map(|shower| {
            let peak_year = if shower.next_year { year + 1 } else { year };
            let peak = Utc.with_ymd_and_hms(peak_year, shower.month, shower.day, 0, 0, 0).single()?;
            if peak <= now {
                return None;
            }
            Some(AstronomicalEvent {
                id: format!("meteor-{}", shower.name),
                name: format!("{} Meteor Shower Peak", shower.name),
                kind: EventKind::MeteorShower,
                date: peak,
                description: format!(
                    "Peak activity of the {} meteor shower. Best viewing after midnight with {} meteors per hour.",
                    shower.name, shower.rate
                ),
                visibility: "Global".to_string(),
                duration: "2-3 days".to_string(),
            })
        })
        .collect()
}

/// Upcoming events of every kind, soonest first
pub fn upcoming_events(now: DateTime<Utc>) -> Vec<AstronomicalEvent> {
    let mut events = lunar_phases(now);
    events.extend(meteor_showers(now));
    events.sort_by_key(|e| e.date);
    events.truncate(MAX_EVENTS);
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_lunar_phases_start_of_year() {
        let phases = lunar_phases(at(2024, 1, 1));
        assert_eq!(phases.len(), 16);
        assert_eq!(phases[0].name, "New Moon");
        assert_eq!(phases[0].date, at(2024, 1, 6));
        assert_eq!(phases[2].name, "Full Moon");
        assert_eq!(phases[4].name, "New Moon");
    }

    #[test]
    fn test_lunar_phases_skip_past_dates() {
        let phases = lunar_phases(at(2024, 3, 1));
        assert!(phases.iter().all(|p| p.date > at(2024, 3, 1)));
        assert!(phases.len() < 16);
    }

    #[test]
    fn test_meteor_showers_late_in_year() {
        let showers = meteor_showers(at(2024, 12, 1));
        let names: Vec<_> = showers.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Geminids Meteor Shower Peak", "Quadrantids Meteor Shower Peak"]);
        assert_eq!(showers[1].date, at(2025, 1, 3));
    }

    #[test]
    fn test_upcoming_sorted_and_capped() {
        let events = upcoming_events(at(2024, 1, 1));
        assert_eq!(events.len(), 12);
        assert!(events.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(EventKind::from_label("Meteor Shower"), Some(EventKind::MeteorShower));
        assert_eq!(EventKind::from_label("eclipse"), None);
        assert_eq!(EventKind::LunarPhase.label(), "Lunar Phase");
    }
}
