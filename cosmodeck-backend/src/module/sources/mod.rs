///! Upstream source catalogue
///!
///! Builds the `ResourceRequest` of every endpoint the dashboard reads, with
///! stable resource keys and the configured timeout/retry budget.
///! - `nasa`: APOD, EPIC, EONET, Mars rover photos
///! - `spacex`: SpaceX v4 REST resources
///! - `feeds`: Open Notify, NOAA SWPC, Launch Library 2

pub mod feeds;
pub mod nasa;
pub mod spacex;

use std::time::Duration;

use crate::module::loader::{DEFAULT_RETRIES, DEFAULT_TIMEOUT_MS, ResourceRequest};

pub use spacex::SpacexResource;

pub const NASA_KEY_ENV: &str = "NASA_API_KEY";
pub const DEMO_KEY: &str = "DEMO_KEY";

/// Stable resource keys
pub mod keys {
    pub const APOD: &str = "apod";
    pub const EPIC_LATEST: &str = "epic-latest";
    pub const EPIC_DATES: &str = "epic-dates";
    pub const EPIC_DATE_PREFIX: &str = "epic-date:";
    pub const EONET_EVENTS: &str = "eonet-events";
    pub const MARS_LATEST_PHOTOS: &str = "mars-latest-photos";
    pub const ISS_POSITION: &str = "iss-position";
    pub const ASTRONAUTS: &str = "astronauts";
    pub const NOAA_ALERTS: &str = "noaa-alerts";
    pub const NOAA_KP_INDEX: &str = "noaa-kp-index";
    pub const NOAA_SOLAR_WIND: &str = "noaa-solar-wind";
    pub const LAUNCHES_UPCOMING_LL2: &str = "launches-upcoming-ll2";
}

/// NASA API key: environment first, then the configured key, then `DEMO_KEY`.
/// Blank values count as unset.
pub fn resolve_nasa_key(configured: Option<&str>) -> String {
    let from_env = std::env::var(NASA_KEY_ENV).ok();
    pick_nasa_key(from_env.as_deref(), configured)
}

fn pick_nasa_key(from_env: Option<&str>, configured: Option<&str>) -> String {
    from_env
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .or_else(|| configured.map(str::trim).filter(|k| !k.is_empty()))
        .unwrap_or(DEMO_KEY)
        .to_string()
}

/// Request factory for every upstream endpoint
#[derive(Debug, Clone)]
pub struct Sources {
    nasa_api_key: String,
    timeout: Duration,
    retries: u32,
}

impl Sources {
    pub fn new(nasa_api_key: impl Into<String>) -> Self {
        Self {
            nasa_api_key: nasa_api_key.into(),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            retries: DEFAULT_RETRIES,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn nasa_api_key(&self) -> &str {
        &self.nasa_api_key
    }

    fn request(&self, key: impl Into<String>, url: impl Into<String>) -> ResourceRequest {
        ResourceRequest::new(key, url)
            .with_timeout(self.timeout)
            .with_retries(self.retries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nasa_key_precedence() {
        assert_eq!(pick_nasa_key(Some("env-key"), Some("cfg-key")), "env-key");
        assert_eq!(pick_nasa_key(None, Some("cfg-key")), "cfg-key");
        assert_eq!(pick_nasa_key(Some("  "), Some("cfg-key")), "cfg-key");
        assert_eq!(pick_nasa_key(None, Some("")), DEMO_KEY);
        assert_eq!(pick_nasa_key(None, None), DEMO_KEY);
    }

    #[test]
    fn test_requests_carry_budget() {
        let sources = Sources::new("k")
            .with_timeout(Duration::from_millis(1500))
            .with_retries(0);
        let req = sources.iss_position();
        assert_eq!(req.key, keys::ISS_POSITION);
        assert_eq!(req.timeout, Duration::from_millis(1500));
        assert_eq!(req.attempts(), 1);
    }
}
