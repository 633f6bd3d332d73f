///! Open Notify, NOAA SWPC and Launch Library 2 endpoints
use cosmodeck_common::{Astronaut, Astronauts};

use super::{Sources, keys};
use crate::module::loader::ResourceRequest;

const OPEN_NOTIFY: &str = "https://api.open-notify.org";
const SWPC_PRODUCTS: &str = "https://services.swpc.noaa.gov/products";
const LAUNCH_LIBRARY: &str = "https://ll.thespacedevs.com/2.2.0";
pub const LL2_DEFAULT_LIMIT: u32 = 10;

impl Sources {
    pub fn iss_position(&self) -> ResourceRequest {
        self.request(keys::ISS_POSITION, format!("{}/iss-now.json", OPEN_NOTIFY))
            .with_header("Accept", "application/json")
    }

    pub fn astronauts(&self) -> ResourceRequest {
        self.request(keys::ASTRONAUTS, format!("{}/astros.json", OPEN_NOTIFY))
            .with_header("Accept", "application/json")
    }

    pub fn noaa_alerts(&self) -> ResourceRequest {
        self.request(keys::NOAA_ALERTS, format!("{}/alerts.json", SWPC_PRODUCTS))
    }

    pub fn noaa_kp_index(&self) -> ResourceRequest {
        self.request(
            keys::NOAA_KP_INDEX,
            format!("{}/noaa-planetary-k-index.json", SWPC_PRODUCTS),
        )
    }

    /// Seven day plasma product (density, speed, temperature)
    pub fn noaa_solar_wind(&self) -> ResourceRequest {
        self.request(
            keys::NOAA_SOLAR_WIND,
            format!("{}/solar-wind/plasma-7-day.json", SWPC_PRODUCTS),
        )
    }

    pub fn launches_upcoming_ll2(&self, limit: u32) -> ResourceRequest {
        self.request(
            keys::LAUNCHES_UPCOMING_LL2,
            format!("{}/launch/upcoming/?limit={}", LAUNCH_LIBRARY, limit),
        )
    }
}

/// Crew currently aboard the ISS
pub fn iss_crew(astronauts: &Astronauts) -> Vec<Astronaut> {
    astronauts.aboard("ISS")
}
