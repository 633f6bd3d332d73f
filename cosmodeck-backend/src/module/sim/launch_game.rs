///! Launch mini-game
///!
///! Pick a mission, rocket, launchpad and optionally a capsule, tune the
///! fuel, launch. Odds and scoring are entertainment heuristics.
use cosmodeck_common::{Capsule, Launch, Launchpad, Rocket};
use serde::Serialize;

use super::random::RandomSource;

/// Odds when rocket or launchpad is missing
pub const BASE_SUCCESS_PROBABILITY: f64 = 0.3;
const ROCKET_WEIGHT: f64 = 0.4;
const LAUNCHPAD_WEIGHT: f64 = 0.3;
const FUEL_WEIGHT: f64 = 0.3;
const FULL_TANK: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchOutcome {
    Success,
    Failure,
}

#[derive(Debug, Clone, Serialize)]
pub struct LaunchGame {
    pub mission: Option<Launch>,
    pub rocket: Option<Rocket>,
    pub capsule: Option<Capsule>,
    pub launchpad: Option<Launchpad>,
    /// Percent, always within 0..=100
    pub fuel_level: u32,
    pub last_outcome: Option<LaunchOutcome>,
    pub score: u64,
    pub launch_count: u32,
    /// Sum of `cost_per_launch` of successful launches
    pub total_value: u64,
}

impl Default for LaunchGame {
    fn default() -> Self {
        Self {
            mission: None,
            rocket: None,
            capsule: None,
            launchpad: None,
            fuel_level: FULL_TANK,
            last_outcome: None,
            score: 0,
            launch_count: 0,
            total_value: 0,
        }
    }
}

impl LaunchGame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_mission(&mut self, mission: Launch) {
        self.mission = Some(mission);
        self.last_outcome = None;
    }

    pub fn select_rocket(&mut self, rocket: Rocket) {
        self.rocket = Some(rocket);
        self.last_outcome = None;
    }

    pub fn select_capsule(&mut self, capsule: Capsule) {
        self.capsule = Some(capsule);
        self.last_outcome = None;
    }

    pub fn select_launchpad(&mut self, launchpad: Launchpad) {
        self.launchpad = Some(launchpad);
        self.last_outcome = None;
    }

    pub fn adjust_fuel(&mut self, amount: i32) {
        let level = self.fuel_level as i64 + amount as i64;
        self.fuel_level = level.clamp(0, FULL_TANK as i64) as u32;
    }

    pub fn ready(&self) -> bool {
        self.mission.is_some() && self.rocket.is_some() && self.launchpad.is_some()
    }

    pub fn success_probability(&self) -> f64 {
        let (Some(rocket), Some(pad)) = (&self.rocket, &self.launchpad) else {
            return BASE_SUCCESS_PROBABILITY;
        };

        let rocket_rate = rocket.success_rate_pct as f64 / 100.0;
        let pad_rate = pad.success_ratio().unwrap_or(0.0);
        let fuel = self.fuel_level as f64 / FULL_TANK as f64;

        rocket_rate * ROCKET_WEIGHT + pad_rate * LAUNCHPAD_WEIGHT + fuel * FUEL_WEIGHT
    }

    pub fn score_for(&self, outcome: LaunchOutcome) -> u64 {
        let Some(rocket) = &self.rocket else {
            return 0;
        };

        let fuel_bonus = (self.fuel_level as u64 * 50) / FULL_TANK as u64;
        match outcome {
            LaunchOutcome::Success => {
                let reuse_bonus = self.capsule.as_ref().map(|c| c.reuse_count as u64 * 10).unwrap_or(0);
                100 + fuel_bonus + rocket.success_rate_pct as u64 + reuse_bonus
            }
            LaunchOutcome::Failure => 10 + fuel_bonus,
        }
    }

    /// Roll the dice. `None` when mission, rocket or launchpad is missing.
    pub fn launch(&mut self, random: &dyn RandomSource) -> Option<LaunchOutcome> {
        if !self.ready() {
            return None;
        }

        let outcome = if random.next_f64() < self.success_probability() {
            LaunchOutcome::Success
        } else {
            LaunchOutcome::Failure
        };

        self.score += self.score_for(outcome);
        self.launch_count += 1;
        if outcome == LaunchOutcome::Success {
            self.total_value += self.rocket.as_ref().map(|r| r.cost_per_launch).unwrap_or(0);
        }
        self.last_outcome = Some(outcome);

        tracing::debug!(
            "Launch #{} {:?}, score {}",
            self.launch_count,
            outcome,
            self.score
        );
        Some(outcome)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
