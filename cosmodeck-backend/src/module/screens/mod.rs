///! Screen registry
///!
///! A screen is a named group of sections. Each section is either a
///! `ViewBinder` over upstream resources or a locally computed view.
///! - today: picture of the day, Mars photos, satellite passes, sky calendar
///! - tracker: ISS position and people in space
///! - launches: upcoming launches from every provider
///! - events: open natural events
///! - space-weather: NOAA alerts, Kp index and solar wind
///! - spacex: SpaceX catalogue (also feeds the launch game)
///! - epic: EPIC Earth imagery with date selection

pub mod game;
pub mod local;

use chrono::NaiveDate;
use cosmodeck_common::{
    Capsule, Company, CrewMember, HistoryEvent, Landpad, Launchpad, Payload, Rocket,
    StarlinkSatellite,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::PollingConfig;
use crate::module::binder::{Section, ViewBinder, ViewModel};
use crate::module::loader::{Loader, ResourceRequest};
use crate::module::sim::{Clock, RandomSource};
use crate::module::sources::nasa::EONET_DEFAULT_LIMIT;
use crate::module::sources::feeds::LL2_DEFAULT_LIMIT;
use crate::module::sources::{SpacexResource, Sources};
use crate::module::views::alerts::AlertsView;
use crate::module::views::epic::{EpicDatesView, EpicGalleryView};
use crate::module::views::events::NaturalEventsView;
use crate::module::views::launches::{SpacexLaunchesView, UpcomingLaunchesView};
use crate::module::views::today::{ApodView, MarsPhotoView};
use crate::module::views::tracker::{CrewView, IssView};
use crate::module::views::weather::SpaceWeatherView;
use crate::module::views::{ItemView, ListView};

use game::GameDesk;
use local::{CalendarSection, PassesSection};

/// Everything a screen needs to build its sections
#[derive(Clone)]
pub struct ScreenContext {
    pub loader: Arc<Loader>,
    pub sources: Sources,
    pub clock: Arc<dyn Clock>,
    pub random: Arc<dyn RandomSource>,
    pub polling: PollingConfig,
}

impl ScreenContext {
    fn binder<V: ViewModel>(
        &self,
        name: &str,
        requests: Vec<ResourceRequest>,
        poll: Option<Duration>,
    ) -> ViewBinder<V> {
        let mut builder = ViewBinder::<V>::builder(name, self.loader.clone())
            .requests(requests)
            .clock(self.clock.clone());
        if let Some(interval) = poll {
            builder = builder.poll_every(interval);
        }
        builder.build()
    }
}

pub struct Screen {
    pub name: &'static str,
    pub title: &'static str,
    sections: Vec<Arc<dyn Section>>,
}

impl Screen {
    fn new(name: &'static str, title: &'static str) -> Self {
        Self {
            name,
            title,
            sections: Vec::new(),
        }
    }

    fn with(mut self, section: Arc<dyn Section>) -> Self {
        self.sections.push(section);
        self
    }

    pub fn sections(&self) -> &[Arc<dyn Section>] {
        &self.sections
    }

    pub fn section(&self, name: &str) -> Option<&Arc<dyn Section>> {
        self.sections.iter().find(|s| s.name() == name)
    }
}

pub struct Screens {
    screens: Vec<Screen>,
    sources: Sources,
    epic_gallery: ViewBinder<EpicGalleryView>,
    game: GameDesk,
}

impl Screens {
    pub fn build(ctx: &ScreenContext) -> Self {
        let sources = &ctx.sources;
        let polling = &ctx.polling;

        let today = Screen::new("today", "Today in Space")
            .with(Arc::new(ctx.binder::<ApodView>("apod", vec![sources.apod()], polling.nasa())))
            .with(Arc::new(ctx.binder::<MarsPhotoView>(
                "mars",
                vec![sources.mars_latest_photos()],
                polling.nasa(),
            )))
            .with(Arc::new(PassesSection::new("passes", ctx.clock.clone(), ctx.random.clone())))
            .with(Arc::new(CalendarSection::new("calendar", ctx.clock.clone())));

        let tracker = Screen::new("tracker", "ISS Tracker")
            .with(Arc::new(ctx.binder::<IssView>("iss", vec![sources.iss_position()], polling.iss())))
            .with(Arc::new(ctx.binder::<CrewView>("crew", vec![sources.astronauts()], polling.crew())));

        let launches = Screen::new("launches", "Upcoming Launches").with(Arc::new(
            ctx.binder::<UpcomingLaunchesView>(
                "upcoming",
                vec![sources.launches_upcoming_ll2(LL2_DEFAULT_LIMIT)],
                polling.launches(),
            ),
        ));

        let events = Screen::new("events", "Natural Events").with(Arc::new(ctx.binder::<NaturalEventsView>(
            "natural-events",
            vec![sources.eonet_events(EONET_DEFAULT_LIMIT)],
            polling.nasa(),
        )));

        let space_weather = Screen::new("space-weather", "Space Weather")
            .with(Arc::new(ctx.binder::<AlertsView>(
                "alerts",
                vec![sources.noaa_alerts()],
                polling.space_weather(),
            )))
            .with(Arc::new(ctx.binder::<SpaceWeatherView>(
                "conditions",
                vec![sources.noaa_kp_index(), sources.noaa_solar_wind()],
                polling.space_weather(),
            )));

        let spacex = |resource: SpacexResource| vec![sources.spacex(resource)];
        let spacex_launches =
            ctx.binder::<SpacexLaunchesView>("launches", spacex(SpacexResource::Launches), polling.spacex());
        let rockets = ctx.binder::<ListView<Rocket>>("rockets", spacex(SpacexResource::Rockets), polling.spacex());
        let launchpads =
            ctx.binder::<ListView<Launchpad>>("launchpads", spacex(SpacexResource::Launchpads), polling.spacex());
        let capsules = ctx.binder::<ListView<Capsule>>("capsules", spacex(SpacexResource::Capsules), polling.spacex());
        let spacex_screen = Screen::new("spacex", "SpaceX")
            .with(Arc::new(spacex_launches.clone()))
            .with(Arc::new(ctx.binder::<SpacexLaunchesView>(
                "launches-upcoming",
                spacex(SpacexResource::LaunchesUpcoming),
                polling.launches(),
            )))
            .with(Arc::new(ctx.binder::<SpacexLaunchesView>(
                "launches-past",
                spacex(SpacexResource::LaunchesPast),
                polling.spacex(),
            )))
            .with(Arc::new(rockets.clone()))
            .with(Arc::new(launchpads.clone()))
            .with(Arc::new(capsules.clone()))
            .with(Arc::new(ctx.binder::<ItemView<Company>>(
                "company",
                spacex(SpacexResource::Company),
                polling.spacex(),
            )))
            .with(Arc::new(ctx.binder::<ListView<CrewMember>>(
                "crew",
                spacex(SpacexResource::Crew),
                polling.spacex(),
            )))
            .with(Arc::new(ctx.binder::<ListView<Payload>>(
                "payloads",
                spacex(SpacexResource::Payloads),
                polling.spacex(),
            )))
            .with(Arc::new(ctx.binder::<ListView<Landpad>>(
                "landpads",
                spacex(SpacexResource::Landpads),
                polling.spacex(),
            )))
            .with(Arc::new(ctx.binder::<ListView<HistoryEvent>>(
                "history",
                spacex(SpacexResource::History),
                polling.spacex(),
            )))
            .with(Arc::new(ctx.binder::<ListView<StarlinkSatellite>>(
                "starlink",
                spacex(SpacexResource::Starlink),
                polling.spacex(),
            )));
        let game = GameDesk::new(ctx.random.clone(), spacex_launches, rockets, launchpads, capsules);

        // Starts on the latest set; `show_epic_date` retargets it
        let epic_gallery = ctx.binder::<EpicGalleryView>("gallery", vec![sources.epic_latest()], polling.nasa());
        let epic = Screen::new("epic", "EPIC Earth Imagery")
            .with(Arc::new(epic_gallery.clone()))
            .with(Arc::new(ctx.binder::<EpicDatesView>("dates", vec![sources.epic_dates()], polling.nasa())));

        Self {
            screens: vec![today, tracker, launches, events, space_weather, spacex_screen, epic],
            sources: ctx.sources.clone(),
            epic_gallery,
            game,
        }
    }

    pub fn all(&self) -> &[Screen] {
        &self.screens
    }

    pub fn get(&self, name: &str) -> Option<&Screen> {
        self.screens.iter().find(|s| s.name == name)
    }

    pub fn sections(&self) -> impl Iterator<Item = &Arc<dyn Section>> {
        self.screens.iter().flat_map(|s| s.sections.iter())
    }

    pub fn game(&self) -> &GameDesk {
        &self.game
    }

    /// Point the EPIC gallery at one day, or back at the latest set
    pub async fn show_epic_date(&self, date: Option<NaiveDate>) {
        let request = match date {
            Some(day) => self.sources.epic_by_date(day),
            None => self.sources.epic_latest(),
        };
        info!("EPIC gallery now showing {}", request.key);
        self.epic_gallery.set_requests(vec![request]).await;
    }

    pub fn epic_gallery(&self) -> &ViewBinder<EpicGalleryView> {
        &self.epic_gallery
    }
}
