use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

pub const CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: String,

    /// Overridden by the NASA_API_KEY environment variable
    #[serde(default)]
    pub nasa_api_key: Option<String>,

    /// Serve fallback data only, without touching the network
    #[serde(default)]
    pub offline: bool,

    /// JSON object of resource key -> substitute value, merged over the
    /// built-in fallbacks
    #[serde(default)]
    pub fallback_overrides: Option<PathBuf>,

    /// Screens activated at startup; others load on first request
    #[serde(default = "default_active_screens")]
    pub active_screens: Vec<String>,

    #[serde(default)]
    pub loader: LoaderConfig,

    #[serde(default)]
    pub polling: PollingConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_active_screens() -> Vec<String> {
    ["today", "tracker", "launches", "events", "space-weather", "spacex", "epic"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            nasa_api_key: None,
            offline: false,
            fallback_overrides: None,
            active_screens: default_active_screens(),
            loader: LoaderConfig::default(),
            polling: PollingConfig::default(),
        }
    }
}

impl BackendConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: BackendConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Extra attempts after the first
    #[serde(default = "default_retries")]
    pub retries: u32,

    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,
}

fn default_timeout_ms() -> u64 {
    8000
}

fn default_retries() -> u32 {
    1
}

fn default_backoff_ms() -> u64 {
    300
}

fn default_jitter_ms() -> u64 {
    100
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            retries: default_retries(),
            backoff_ms: default_backoff_ms(),
            jitter_ms: default_jitter_ms(),
        }
    }
}

impl LoaderConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }

    pub fn jitter(&self) -> Duration {
        Duration::from_millis(self.jitter_ms)
    }
}

/// Re-poll intervals per screen section. Zero disables polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_iss_seconds")]
    pub iss_seconds: u64,

    #[serde(default = "default_space_weather_minutes")]
    pub space_weather_minutes: u64,

    #[serde(default = "default_launches_minutes")]
    pub launches_minutes: u64,

    /// APOD, EPIC, EONET and Mars photos
    #[serde(default = "default_hourly")]
    pub nasa_minutes: u64,

    #[serde(default = "default_hourly")]
    pub spacex_minutes: u64,

    #[serde(default = "default_hourly")]
    pub crew_minutes: u64,
}

fn default_iss_seconds() -> u64 {
    30
}

fn default_space_weather_minutes() -> u64 {
    10
}

fn default_launches_minutes() -> u64 {
    15
}

fn default_hourly() -> u64 {
    60
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            iss_seconds: default_iss_seconds(),
            space_weather_minutes: default_space_weather_minutes(),
            launches_minutes: default_launches_minutes(),
            nasa_minutes: default_hourly(),
            spacex_minutes: default_hourly(),
            crew_minutes: default_hourly(),
        }
    }
}

fn seconds(n: u64) -> Option<Duration> {
    (n > 0).then(|| Duration::from_secs(n))
}

impl PollingConfig {
    pub fn iss(&self) -> Option<Duration> {
        seconds(self.iss_seconds)
    }

    pub fn space_weather(&self) -> Option<Duration> {
        seconds(self.space_weather_minutes * 60)
    }

    pub fn launches(&self) -> Option<Duration> {
        seconds(self.launches_minutes * 60)
    }

    pub fn nasa(&self) -> Option<Duration> {
        seconds(self.nasa_minutes * 60)
    }

    pub fn spacex(&self) -> Option<Duration> {
        seconds(self.spacex_minutes * 60)
    }

    pub fn crew(&self) -> Option<Duration> {
        seconds(self.crew_minutes * 60)
    }
}

pub static CONFIG: OnceLock<BackendConfig> = OnceLock::new();

/// Load `config.toml` into `CONFIG`. A missing file means all defaults.
pub fn read_config() -> anyhow::Result<&'static BackendConfig> {
    let config = if std::path::Path::new(CONFIG_PATH).exists() {
        BackendConfig::from_file(CONFIG_PATH).map_err(|e| {
            tracing::error!("Failed to parse config file {}: {}", CONFIG_PATH, e);
            e
        })?
    } else {
        BackendConfig::default()
    };

    Ok(CONFIG.get_or_init(|| config))
}
