///! SpaceX v4 REST API schemas
///!
///! Only the fields the dashboard reads are declared; everything else the
///! API sends is ignored. Fields the API is known to null out are optional.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LaunchPatch {
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LaunchLinks {
    #[serde(default)]
    pub patch: LaunchPatch,
    #[serde(default)]
    pub webcast: Option<String>,
    #[serde(default)]
    pub wikipedia: Option<String>,
    #[serde(default)]
    pub article: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Launch {
    pub id: String,
    pub name: String,
    pub date_utc: String,
    pub date_unix: i64,
    #[serde(default)]
    pub flight_number: u32,
    /// `None` for upcoming launches
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub upcoming: bool,
    #[serde(default)]
    pub details: Option<String>,
    /// Rocket id
    #[serde(default)]
    pub rocket: Option<String>,
    /// Launchpad id
    #[serde(default)]
    pub launchpad: Option<String>,
    #[serde(default)]
    pub payloads: Vec<String>,
    #[serde(default)]
    pub links: LaunchLinks,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Measure {
    #[serde(default)]
    pub meters: Option<f64>,
    #[serde(default)]
    pub feet: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rocket {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub stages: u32,
    #[serde(default)]
    pub cost_per_launch: u64,
    #[serde(default)]
    pub success_rate_pct: u32,
    #[serde(default)]
    pub first_flight: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub height: Measure,
    #[serde(default)]
    pub diameter: Measure,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Headquarters {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub name: String,
    #[serde(default)]
    pub founder: String,
    #[serde(default)]
    pub founded: u32,
    #[serde(default)]
    pub employees: u32,
    #[serde(default)]
    pub vehicles: u32,
    #[serde(default)]
    pub launch_sites: u32,
    #[serde(default)]
    pub test_sites: u32,
    #[serde(default)]
    pub ceo: String,
    #[serde(default)]
    pub valuation: u64,
    #[serde(default)]
    pub headquarters: Headquarters,
    #[serde(default)]
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub reused: bool,
    #[serde(default)]
    pub customers: Vec<String>,
    #[serde(default)]
    pub nationalities: Vec<String>,
    #[serde(default)]
    pub manufacturers: Vec<String>,
    #[serde(default)]
    pub mass_kg: Option<f64>,
    #[serde(default)]
    pub orbit: Option<String>,
    /// Launch id
    #[serde(default)]
    pub launch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Launchpad {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub locality: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub launch_attempts: u32,
    #[serde(default)]
    pub launch_successes: u32,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub details: Option<String>,
}

impl Launchpad {
    /// Share of successful launches, `None` before the first attempt
    pub fn success_ratio(&self) -> Option<f64> {
        if self.launch_attempts == 0 {
            None
        } else {
            Some(self.launch_successes as f64 / self.launch_attempts as f64)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub agency: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub wikipedia: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub launches: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StarlinkSatellite {
    pub id: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub launch: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub height_km: Option<f64>,
    #[serde(default)]
    pub velocity_kms: Option<f64>,
    /// Raw Space-Track record, kept opaque
    #[serde(rename = "spaceTrack", default)]
    pub space_track: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoryLinks {
    #[serde(default)]
    pub article: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub id: String,
    pub title: String,
    pub event_date_utc: String,
    #[serde(default)]
    pub event_date_unix: i64,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub links: HistoryLinks,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landpad {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub locality: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub landing_attempts: u32,
    #[serde(default)]
    pub landing_successes: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Capsule {
    pub id: String,
    pub serial: String,
    #[serde(default)]
    pub status: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub reuse_count: u32,
    #[serde(default)]
    pub water_landings: u32,
    #[serde(default)]
    pub land_landings: u32,
    #[serde(default)]
    pub last_update: Option<String>,
    #[serde(default)]
    pub launches: Vec<String>,
}
