//! Match state
//!
//! Everything one duel needs lives in `GameState`: both fighters, both AI
//! brains, live effects, the seeded RNG, and the end-of-match bookkeeping.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ai::AiController;
use super::effects::Effect;
use super::events::{Events, GameEvent, SoundEffect};
use super::fighter::{Fighter, FighterKind};
use crate::tuning::{Tuning, TuningError};

/// Current phase of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Simulation advancing
    Fighting,
    /// Frozen until pause is pressed again
    Paused,
    /// Result decided; waiting for restart or next level
    MatchOver,
}

/// How a finished match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "camelCase")]
pub enum MatchOutcome {
    /// The player went down
    OpponentWins,
    /// The player survived and the opponent did not
    LevelComplete { level: u32 },
}

/// What the post-match screen offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NextAction {
    /// Back to level 1
    Restart,
    AdvanceLevel,
}

impl MatchOutcome {
    pub fn message(&self, opponent_name: &str) -> String {
        match self {
            MatchOutcome::OpponentWins => format!("{opponent_name} Wins!"),
            MatchOutcome::LevelComplete { level } => format!("Level {level} Complete!"),
        }
    }

    pub fn next_action(&self) -> NextAction {
        match self {
            MatchOutcome::OpponentWins => NextAction::Restart,
            MatchOutcome::LevelComplete { .. } => NextAction::AdvanceLevel,
        }
    }
}

/// Held state of the edge-triggered buttons on the previous tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buttons {
    pub jump: bool,
    pub burst: bool,
    pub whip: bool,
    pub pause: bool,
}

impl Buttons {
    /// Buttons held now that were not held before
    pub fn pressed_since(&self, prev: &Buttons) -> Buttons {
        Buttons {
            jump: self.jump && !prev.jump,
            burst: self.burst && !prev.burst,
            whip: self.whip && !prev.whip,
            pause: self.pause && !prev.pause,
        }
    }
}

/// Complete match state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Seed the RNG started from
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    /// 1-based difficulty level
    pub level: u32,
    /// Ticks simulated since the last reset
    pub time_ticks: u64,
    pub phase: GamePhase,
    /// Human side (or autopilot)
    pub player: Fighter,
    /// AI side
    pub enemy: Fighter,
    /// Drives `enemy`
    pub ai: AiController,
    /// Drives `player` when autopilot is on
    pub autopilot: AiController,
    /// Live visual effects
    pub effects: Vec<Effect>,
    /// Events produced since the last drain
    #[serde(skip)]
    pub events: Events,
    /// Ticks left before a decided match ends
    pub end_countdown: Option<u32>,
    pub outcome: Option<MatchOutcome>,
    /// Footstep loop currently playing
    pub running_loop: bool,
    pub prev_buttons: Buttons,
    pub aim_was_active: bool,
    /// Last aim vector seen while the aim input was held
    pub last_aim: Vec2,
}

impl GameState {
    /// Fresh level 1 match. Tuning that fails `Tuning::validate` is refused.
    pub fn new(seed: u64, tuning: Tuning) -> Result<Self, TuningError> {
        tuning.validate()?;
        let player = Fighter::new(FighterKind::Son, &tuning);
        let enemy = Fighter::new(FighterKind::Father, &tuning);
        let ai = AiController::new(1, &tuning);
        let autopilot = AiController::new(1, &tuning);
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            level: 1,
            time_ticks: 0,
            phase: GamePhase::Fighting,
            player,
            enemy,
            ai,
            autopilot,
            effects: Vec::new(),
            events: Events::new(),
            end_countdown: None,
            outcome: None,
            running_loop: false,
            prev_buttons: Buttons::default(),
            aim_was_active: false,
            last_aim: Vec2::ZERO,
        };
        state.setup_level();
        Ok(state)
    }

    /// Start over. `next_level` bumps the level, otherwise back to level 1.
    /// Fighters and AI are rebuilt from scratch; nothing carries over.
    pub fn reset(&mut self, next_level: bool) {
        self.level = if next_level { self.level + 1 } else { 1 };
        if next_level {
            log::info!("Advancing to level {}", self.level);
        }
        self.setup_level();
    }

    pub fn restart(&mut self) {
        self.reset(false);
    }

    pub fn advance_level(&mut self) {
        self.reset(true);
    }

    /// Follow the post-match offer (restart after a loss, next level after a win)
    pub fn continue_after_match(&mut self) -> Option<NextAction> {
        let action = self.outcome?.next_action();
        self.reset(action == NextAction::AdvanceLevel);
        Some(action)
    }

    fn setup_level(&mut self) {
        let tuning = &self.tuning;
        self.player = Fighter::new(FighterKind::Son, tuning);
        self.player.damage_multiplier = tuning.player_power(self.level);
        self.enemy = Fighter::new(FighterKind::Father, tuning);
        self.enemy.damage_multiplier = tuning.enemy_power(self.level);
        self.ai = AiController::new(self.level, tuning);
        self.autopilot = AiController::new(1, tuning);

        self.effects.clear();
        self.time_ticks = 0;
        self.phase = GamePhase::Fighting;
        self.end_countdown = None;
        self.outcome = None;
        self.aim_was_active = false;
        self.last_aim = Vec2::ZERO;
        if self.running_loop {
            self.running_loop = false;
            self.events.push(GameEvent::sound(SoundEffect::RunningLoopOff));
        }

        log::info!(
            "Level {} start: {} power {:.2}, {} power {:.2}",
            self.level,
            self.player.name,
            self.player.damage_multiplier,
            self.enemy.name,
            self.enemy.damage_multiplier
        );
    }

    /// Either fighter is down
    pub fn is_decided(&self) -> bool {
        self.player.hp <= 0.0 || self.enemy.hp <= 0.0
    }

    /// Take every event produced since the last drain
    pub fn drain_events(&mut self) -> Events {
        std::mem::take(&mut self.events)
    }

    /// Post-match message for the UI
    pub fn outcome_message(&self) -> Option<String> {
        self.outcome.map(|o| o.message(&self.enemy.name))
    }
}
