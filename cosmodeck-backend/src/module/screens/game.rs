///! Launch mini-game desk
///!
///! Picks are SpaceX ids resolved against what the SpaceX screen has loaded.
use cosmodeck_common::{Capsule, Launch, Launchpad, Rocket};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tracing::info;

use crate::module::binder::ViewBinder;
use crate::module::sim::RandomSource;
use crate::module::sim::launch_game::LaunchGame;
use crate::module::views::ListView;
use crate::module::views::launches::SpacexLaunchesView;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("unknown {kind} '{id}'")]
    UnknownId { kind: &'static str, id: String },
    #[error("select a mission, rocket and launchpad before launching")]
    NotReady,
}

/// Ids to select; absent fields keep the current choice
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GamePicks {
    #[serde(default)]
    pub mission: Option<String>,
    #[serde(default)]
    pub rocket: Option<String>,
    #[serde(default)]
    pub launchpad: Option<String>,
    #[serde(default)]
    pub capsule: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameStatus {
    #[serde(flatten)]
    pub game: LaunchGame,
    pub success_probability: f64,
    pub ready: bool,
}

impl From<&LaunchGame> for GameStatus {
    fn from(game: &LaunchGame) -> Self {
        Self {
            game: game.clone(),
            success_probability: game.success_probability(),
            ready: game.ready(),
        }
    }
}

pub struct GameDesk {
    game: Mutex<LaunchGame>,
    random: Arc<dyn RandomSource>,
    launches: ViewBinder<SpacexLaunchesView>,
    rockets: ViewBinder<ListView<Rocket>>,
    launchpads: ViewBinder<ListView<Launchpad>>,
    capsules: ViewBinder<ListView<Capsule>>,
}

fn find<T>(items: Vec<T>, kind: &'static str, id: &str, id_of: impl Fn(&T) -> &str) -> Result<T, GameError> {
    items.into_iter().find(|item| id_of(item) == id).ok_or_else(|| GameError::UnknownId {
        kind,
        id: id.to_string(),
    })
}

impl GameDesk {
    pub fn new(
        random: Arc<dyn RandomSource>,
        launches: ViewBinder<SpacexLaunchesView>,
        rockets: ViewBinder<ListView<Rocket>>,
        launchpads: ViewBinder<ListView<Launchpad>>,
        capsules: ViewBinder<ListView<Capsule>>,
    ) -> Self {
        Self {
            game: Mutex::new(LaunchGame::new()),
            random,
            launches,
            rockets,
            launchpads,
            capsules,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LaunchGame> {
        self.game.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn status(&self) -> GameStatus {
        GameStatus::from(&*self.lock())
    }

    /// All ids are resolved before anything changes
    pub fn select(&self, picks: &GamePicks) -> Result<GameStatus, GameError> {
        let mission: Option<Launch> = picks
            .mission
            .as_deref()
            .map(|id| find(self.launches.view(), "mission", id, |l| l.id.as_str()))
            .transpose()?;
        let rocket = picks
            .rocket
            .as_deref()
            .map(|id| find(self.rockets.view(), "rocket", id, |r| r.id.as_str()))
            .transpose()?;
        let launchpad = picks
            .launchpad
            .as_deref()
            .map(|id| find(self.launchpads.view(), "launchpad", id, |p| p.id.as_str()))
            .transpose()?;
        let capsule = picks
            .capsule
            .as_deref()
            .map(|id| find(self.capsules.view(), "capsule", id, |c| c.id.as_str()))
            .transpose()?;

        let mut game = self.lock();
        if let Some(mission) = mission {
            game.select_mission(mission);
        }
        if let Some(rocket) = rocket {
            game.select_rocket(rocket);
        }
        if let Some(launchpad) = launchpad {
            game.select_launchpad(launchpad);
        }
        if let Some(capsule) = capsule {
            game.select_capsule(capsule);
        }
        Ok(GameStatus::from(&*game))
    }

    pub fn adjust_fuel(&self, amount: i32) -> GameStatus {
        let mut game = self.lock();
        game.adjust_fuel(amount);
        GameStatus::from(&*game)
    }

    pub fn launch(&self) -> Result<GameStatus, GameError> {
        let mut game = self.lock();
        let outcome = game.launch(self.random.as_ref()).ok_or(GameError::NotReady)?;
        info!("Launch game: {:?}, total score {}", outcome, game.score);
        Ok(GameStatus::from(&*game))
    }

    pub fn reset(&self) -> GameStatus {
        let mut game = self.lock();
        game.reset();
        GameStatus::from(&*game)
    }
}
