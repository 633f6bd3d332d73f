///! Open Notify ISS position and people-in-space schemas
use serde::{Deserialize, Serialize};

/// Coordinates as sent by the API (decimal strings)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssPosition {
    pub latitude: String,
    pub longitude: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssNow {
    pub message: String,
    /// Unix seconds
    pub timestamp: i64,
    pub iss_position: IssPosition,
}

impl IssNow {
    /// Parsed (latitude, longitude) in degrees, `None` if the strings are not numbers
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let lat = self.iss_position.latitude.trim().parse::<f64>().ok()?;
        let lon = self.iss_position.longitude.trim().parse::<f64>().ok()?;
        Some((lat, lon))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Astronaut {
    pub name: String,
    pub craft: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Astronauts {
    pub message: String,
    pub number: u32,
    pub people: Vec<Astronaut>,
}

impl Astronauts {
    /// People aboard one craft, e.g. "ISS"
    pub fn aboard(&self, craft: &str) -> Vec<Astronaut> {
        self.people
            .iter()
            .filter(|p| p.craft.eq_ignore_ascii_case(craft))
            .cloned()
            .collect()
    }
}
