///! Geomagnetic activity and solar wind from the SWPC product tables
use cosmodeck_common::{KpReading, ProductTable, SolarWindReading};
use serde::Serialize;

use super::NoSelection;
use crate::module::binder::{Snapshot, ViewModel};
use crate::module::sources::keys;

const KP_HISTORY: usize = 8;
const WIND_HISTORY: usize = 24;

/// NOAA G-scale for a Kp value, `None` below storm level
pub fn storm_scale(kp: f64) -> Option<&'static str> {
    match kp.floor() as i64 {
        k if k >= 9 => Some("G5"),
        8 => Some("G4"),
        7 => Some("G3"),
        6 => Some("G2"),
        5 => Some("G1"),
        _ => None,
    }
}

pub fn activity(kp: f64) -> &'static str {
    if kp >= 5.0 {
        "Storm"
    } else if kp >= 4.0 {
        "Active"
    } else {
        "Quiet"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpSummary {
    pub kp: f64,
    pub time_tag: String,
    pub activity: String,
    pub storm_scale: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpaceWeatherBoard {
    pub kp: Option<KpSummary>,
    /// Oldest first
    pub kp_history: Vec<KpReading>,
    pub solar_wind: Option<SolarWindReading>,
    pub wind_history: Vec<SolarWindReading>,
}

fn tail<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    items[items.len().saturating_sub(n)..].to_vec()
}

/// Reads the Kp index and solar wind tables by resource key
pub struct SpaceWeatherView;

impl ViewModel for SpaceWeatherView {
    type Data = ProductTable;
    type Selection = NoSelection;
    type Output = SpaceWeatherBoard;

    fn derive(snapshot: &Snapshot<ProductTable>, _: &NoSelection) -> SpaceWeatherBoard {
        let table = |key: &str| snapshot.get(key).and_then(|s| s.value());

        let kp = table(keys::NOAA_KP_INDEX).map(ProductTable::kp_readings).unwrap_or_default();
        // Samples without a speed are gaps in the feed
        let wind: Vec<SolarWindReading> = table(keys::NOAA_SOLAR_WIND)
            .map(ProductTable::solar_wind)
            .unwrap_or_default()
            .into_iter()
            .filter(|r| r.speed.is_some())
            .collect();

        SpaceWeatherBoard {
            kp: kp.last().map(|r| KpSummary {
                kp: r.kp,
                time_tag: r.time_tag.clone(),
                activity: activity(r.kp).to_string(),
                storm_scale: storm_scale(r.kp).map(str::to_string),
            }),
            kp_history: tail(&kp, KP_HISTORY),
            solar_wind: wind.last().cloned(),
            wind_history: tail(&wind, WIND_HISTORY),
        }
    }
}
