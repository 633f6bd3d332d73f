///! SpaceX v4 REST resources
use serde::{Deserialize, Serialize};

use super::Sources;
use crate::module::loader::ResourceRequest;

const SPACEX_API: &str = "https://api.spacexdata.com/v4";
pub const DEFAULT_LAUNCH_LIMIT: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpacexResource {
    Launches,
    Rockets,
    Company,
    Payloads,
    Launchpads,
    Crew,
    Starlink,
    History,
    Landpads,
    Capsules,
    LaunchesUpcoming,
    LaunchesPast,
}

impl SpacexResource {
    pub const ALL: [SpacexResource; 12] = [
        SpacexResource::Launches,
        SpacexResource::Rockets,
        SpacexResource::Company,
        SpacexResource::Payloads,
        SpacexResource::Launchpads,
        SpacexResource::Crew,
        SpacexResource::Starlink,
        SpacexResource::History,
        SpacexResource::Landpads,
        SpacexResource::Capsules,
        SpacexResource::LaunchesUpcoming,
        SpacexResource::LaunchesPast,
    ];

    /// Path below `/v4`
    pub fn path(&self) -> &'static str {
        match self {
            SpacexResource::Launches => "launches",
            SpacexResource::Rockets => "rockets",
            SpacexResource::Company => "company",
            SpacexResource::Payloads => "payloads",
            SpacexResource::Launchpads => "launchpads",
            SpacexResource::Crew => "crew",
            SpacexResource::Starlink => "starlink",
            SpacexResource::History => "history",
            SpacexResource::Landpads => "landpads",
            SpacexResource::Capsules => "capsules",
            SpacexResource::LaunchesUpcoming => "launches/upcoming",
            SpacexResource::LaunchesPast => "launches/past",
        }
    }

    /// Resource key, e.g. "spacex-launches-upcoming"
    pub fn key(&self) -> String {
        format!("spacex-{}", self.path().replace('/', "-"))
    }
}

impl Sources {
    pub fn spacex(&self, resource: SpacexResource) -> ResourceRequest {
        if resource == SpacexResource::Launches {
            return self.spacex_launches(DEFAULT_LAUNCH_LIMIT);
        }
        self.request(resource.key(), format!("{}/{}", SPACEX_API, resource.path()))
    }

    /// Most recent launches first
    pub fn spacex_launches(&self, limit: u32) -> ResourceRequest {
        self.request(
            SpacexResource::Launches.key(),
            format!("{}/launches?limit={}&sort=date_unix&order=desc", SPACEX_API, limit),
        )
    }
}
