///! Response schemas shared by the cosmodeck services.
///!
///! Every upstream endpoint the dashboard talks to gets an explicit serde
///! schema here, so a shape mismatch surfaces as a decode error at the
///! fetch boundary instead of a missing field deep inside a view.

pub mod launch_library;
pub mod nasa;
pub mod noaa;
pub mod open_notify;
pub mod spacex;

pub use launch_library::{LaunchLibraryPage, LlLaunch};
pub use nasa::{Apod, EonetEvent, EonetFeed, EpicDate, EpicImage, MarsLatestPhotos, MarsPhoto};
pub use noaa::{KpReading, NoaaAlert, ProductTable, SolarWindReading};
pub use open_notify::{Astronaut, Astronauts, IssNow, IssPosition};
pub use spacex::{
    Capsule, Company, CrewMember, HistoryEvent, Landpad, Launch, Launchpad, Payload, Rocket,
    StarlinkSatellite,
};
