///! Generated satellite pass predictions
///!
///! Used as substitute data when no pass-prediction source is reachable.
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::clock::Clock;
use super::random::RandomSource;

const PASS_COUNT: usize = 10;
const DIRECTIONS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

struct CatalogEntry {
    name: &'static str,
    agency: &'static str,
    kind: &'static str,
    magnitude: f64,
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry { name: "ISS (ZARYA)", agency: "NASA/Roscosmos", kind: "Space Station", magnitude: -3.2 },
    CatalogEntry { name: "Hubble Space Telescope", agency: "NASA", kind: "Science", magnitude: 2.0 },
    CatalogEntry { name: "Starlink-1007", agency: "SpaceX", kind: "Communications", magnitude: 4.5 },
    CatalogEntry { name: "NOAA-18", agency: "NOAA", kind: "Weather", magnitude: 3.8 },
    CatalogEntry { name: "Terra", agency: "NASA", kind: "Earth Observation", magnitude: 2.5 },
    CatalogEntry { name: "Aqua", agency: "NASA", kind: "Earth Observation", magnitude: 2.3 },
    CatalogEntry { name: "Sentinel-2A", agency: "ESA", kind: "Earth Observation", magnitude: 4.1 },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatellitePass {
    pub name: String,
    pub agency: String,
    pub kind: String,
    pub magnitude: f64,
    pub start_time: DateTime<Utc>,
    /// Minutes
    pub duration: u32,
    /// Degrees above the horizon
    pub max_elevation: u32,
    pub direction: String,
}

/// Ten plausible passes 2 to 50 hours ahead, soonest first
pub fn generate_passes(clock: &dyn Clock, random: &dyn RandomSource) -> Vec<SatellitePass> {
    let now = clock.now();

    let mut passes: Vec<SatellitePass> = (0..PASS_COUNT)
        .map(|_| {
            let sat = &CATALOG[random.index(CATALOG.len())];
            let hours_ahead = random.range_f64(2.0, 50.0);
            SatellitePass {
                name: sat.name.to_string(),
                agency: sat.agency.to_string(),
                kind: sat.kind.to_string(),
                magnitude: sat.magnitude,
                start_time: now + Duration::seconds((hours_ahead * 3600.0) as i64),
                duration: random.range_f64(2.0, 10.0) as u32,
                max_elevation: random.range_f64(20.0, 80.0) as u32,
                direction: DIRECTIONS[random.index(DIRECTIONS.len())].to_string(),
            }
        })
        .collect();

    passes.sort_by_key(|p| p.start_time);
    passes
}
