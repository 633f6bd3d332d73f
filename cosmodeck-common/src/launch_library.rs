///! Launch Library 2 (thespacedevs) upcoming-launch schema
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LlStatus {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub abbrev: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LlProvider {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LlRocketConfiguration {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub full_name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LlRocket {
    #[serde(default)]
    pub configuration: LlRocketConfiguration,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LlMission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LlLocation {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LlPad {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub location: LlLocation,
}

/// One upcoming launch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlLaunch {
    pub id: String,
    pub name: String,
    /// "No earlier than" timestamp, RFC 3339
    pub net: String,
    #[serde(default)]
    pub status: Option<LlStatus>,
    #[serde(default)]
    pub launch_service_provider: Option<LlProvider>,
    #[serde(default)]
    pub rocket: Option<LlRocket>,
    #[serde(default)]
    pub mission: Option<LlMission>,
    #[serde(default)]
    pub pad: Option<LlPad>,
    #[serde(default)]
    pub image: Option<String>,
}

impl LlLaunch {
    pub fn provider_name(&self) -> &str {
        self.launch_service_provider
            .as_ref()
            .map(|p| p.name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("Unknown Provider")
    }

    pub fn status_name(&self) -> &str {
        self.status
            .as_ref()
            .map(|s| s.name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("TBD")
    }

    pub fn rocket_name(&self) -> &str {
        self.rocket
            .as_ref()
            .map(|r| r.configuration.full_name.as_str())
            .filter(|n| !n.is_empty())
            .unwrap_or("Unknown Rocket")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchLibraryPage {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub results: Vec<LlLaunch>,
}
