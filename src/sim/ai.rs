//! Scripted opponent
//!
//! A small behavior-state machine that reads the world and drives one fighter
//! through the same guarded intents a human uses. A fresh state is rolled
//! whenever the state timer runs out; dodging an incoming ring overrides it.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::distance;
use super::events::Events;
use super::fighter::{Fighter, MeleeKind};
use super::ring::RingState;
use crate::tuning::Tuning;

/// AI behavior states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AiState {
    /// Stand still, occasional pot shot
    Idle,
    /// Close in, throw, and melee at point-blank range
    Chase,
    /// Back off, bouncing off walls
    Retreat,
    /// Drift in depth while holding a distance band
    Orbit,
    /// Out of ammo: walk toward own returning rings
    Retrieve,
    /// Side-stepping an incoming ring
    Dodge,
}

/// Drives one fighter against one opponent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiController {
    pub state: AiState,
    /// Ticks until a new state is rolled (may go negative before re-roll)
    pub state_timer: i32,
    /// Sticky movement intent; `y` is the orbit/dodge drift direction
    pub move_dir: Vec2,
    /// Ticks until the next dodge reaction is allowed
    pub reaction_delay: u32,
    pub level: u32,
    /// Level-scaled reaction delay base
    pub reaction_base: u32,
}

impl AiController {
    pub fn new(level: u32, tuning: &Tuning) -> Self {
        Self {
            state: AiState::Idle,
            state_timer: 0,
            move_dir: Vec2::ZERO,
            reaction_delay: 0,
            level,
            reaction_base: tuning.ai_reaction_base(level),
        }
    }

    fn set_state(&mut self, state: AiState, ticks: u32) {
        if self.state != state {
            log::debug!("AI {:?} -> {:?} for {} ticks", self.state, state, ticks);
        }
        self.state = state;
        self.state_timer = ticks as i32;
    }

    /// Roll the next behavior. With no ring in orbit the answer is always
    /// `Retrieve`, whatever the distance.
    pub fn pick_new_state(&mut self, dist: f32, has_ammo: bool, tuning: &Tuning, rng: &mut impl Rng) {
        let ai = &tuning.ai;
        let roll: f32 = rng.random();

        if !has_ammo {
            self.set_state(AiState::Retrieve, ai.retrieve_ticks);
        } else if dist < ai.close_range {
            if roll < ai.retreat_chance {
                let ticks = rng.random_range(ai.retreat_ticks.clone());
                self.set_state(AiState::Retreat, ticks);
            } else {
                self.set_state(AiState::Chase, ai.close_chase_ticks);
            }
        } else if roll < ai.orbit_chance {
            self.move_dir.y = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
            let ticks = rng.random_range(ai.orbit_ticks.clone());
            self.set_state(AiState::Orbit, ticks);
        } else if roll < ai.orbit_chance + ai.chase_chance {
            let ticks = rng.random_range(ai.chase_ticks.clone());
            self.set_state(AiState::Chase, ticks);
        } else {
            let ticks = rng.random_range(ai.idle_ticks.clone());
            self.set_state(AiState::Idle, ticks);
        }

        // Only dodge keeps this; every other state overrides dx
        self.move_dir.x = rng.random_range(-1.0..=1.0);
    }

    /// One decision tick for `fighter` against `opponent`
    pub fn update(
        &mut self,
        fighter: &mut Fighter,
        opponent: &mut Fighter,
        tuning: &Tuning,
        rng: &mut impl Rng,
        events: &mut Events,
    ) {
        if fighter.is_dead() {
            return;
        }
        let ai = &tuning.ai;

        let dist = distance(fighter.pos, opponent.pos);
        let y_diff = fighter.pos.y - opponent.pos.y;
        let has_ammo = fighter.rings_ready() > 0;

        self.state_timer -= 1;
        if self.state_timer <= 0 {
            self.pick_new_state(dist, has_ammo, tuning, rng);
        }

        self.react_to_incoming(fighter, opponent, tuning, rng, events);

        let toward = if fighter.pos.x < opponent.pos.x { 1.0 } else { -1.0 };
        let mut dx = self.move_dir.x;
        let mut dy = self.move_dir.y;

        match self.state {
            AiState::Idle => {
                dx = 0.0;
                dy = 0.0;
                if has_ammo && dist < ai.idle_throw_range && rng.random::<f32>() < ai.idle_throw_chance {
                    fighter.throw_ring(Some(&*opponent), None, tuning, rng, events);
                }
            }
            AiState::Chase => {
                dx = toward;
                dy = depth_step(y_diff, ai.chase_depth_deadzone);

                let aggro = 1.0 + self.level as f32 * ai.chase_aggro_per_level;
                if dist < ai.chase_throw_range
                    && has_ammo
                    && rng.random::<f32>() < ai.chase_throw_chance * aggro
                {
                    fighter.throw_ring(Some(&*opponent), None, tuning, rng, events);
                }
                if dist < ai.melee_range && y_diff.abs() < ai.melee_depth {
                    let kind = if rng.random_bool(0.5) {
                        MeleeKind::Punch
                    } else {
                        MeleeKind::Kick
                    };
                    fighter.melee_attack(kind, opponent, tuning, events);
                }
            }
            AiState::Retreat => {
                dx = -toward;
                dy = depth_step(y_diff, ai.retreat_depth_deadzone);

                let at_left = fighter.pos.x < ai.wall_margin && dx < 0.0;
                let at_right = fighter.pos.x > tuning.arena_width - ai.wall_margin && dx > 0.0;
                if at_left || at_right {
                    fighter.jump(tuning, events);
                    dx = -dx;
                }

                if has_ammo && rng.random::<f32>() < ai.retreat_throw_chance {
                    fighter.throw_ring(Some(&*opponent), None, tuning, rng, events);
                }
            }
            AiState::Orbit => {
                dx = if dist < ai.orbit_min_distance {
                    -toward
                } else if dist > ai.orbit_max_distance {
                    toward
                } else {
                    0.0
                };
                dy = self.move_dir.y;

                if has_ammo && rng.random::<f32>() < ai.orbit_throw_chance {
                    fighter.throw_ring(Some(&*opponent), None, tuning, rng, events);
                }
            }
            AiState::Retrieve => {
                let nearest = fighter
                    .rings
                    .iter()
                    .filter(|r| r.state == RingState::Returning)
                    .min_by(|a, b| {
                        distance(a.pos, fighter.pos)
                            .partial_cmp(&distance(b.pos, fighter.pos))
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .map(|r| r.pos);

                match nearest {
                    Some(ring) => {
                        dx = if ring.x < fighter.pos.x { -1.0 } else { 1.0 };
                        dy = if ring.y < fighter.pos.y { -1.0 } else { 1.0 };
                    }
                    None => self.set_state(AiState::Retreat, self.state_timer.max(0) as u32),
                }
            }
            AiState::Dodge => {}
        }

        fighter.move_by(dx, dy, tuning);
    }

    /// Jump or side-step an opponent ring in flight nearby
    fn react_to_incoming(
        &mut self,
        fighter: &mut Fighter,
        opponent: &Fighter,
        tuning: &Tuning,
        rng: &mut impl Rng,
        events: &mut Events,
    ) {
        let ai = &tuning.ai;
        let incoming = opponent
            .rings
            .iter()
            .find(|r| r.state == RingState::Thrown && distance(r.pos, fighter.pos) < ai.dodge_detect_range)
            .map(|r| r.pos);

        if let Some(ring) = incoming {
            if self.reaction_delay == 0 {
                if rng.random::<f32>() < ai.jump_dodge_chance {
                    fighter.jump(tuning, events);
                } else if rng.random::<f32>() < ai.sidestep_chance {
                    let away = crate::sign_or_zero(fighter.pos.y - ring.y);
                    self.move_dir.y = if away != 0.0 {
                        away
                    } else if rng.random_bool(0.5) {
                        1.0
                    } else {
                        -1.0
                    };
                    self.set_state(AiState::Dodge, ai.dodge_ticks);
                }
                self.reaction_delay = self.reaction_base + ai.reaction_flat;
            }
        }
        self.reaction_delay = self.reaction_delay.saturating_sub(1);
    }
}

/// Step toward depth alignment, idle inside the dead zone
fn depth_step(y_diff: f32, deadzone: f32) -> f32 {
    if y_diff < -deadzone {
        1.0
    } else if y_diff > deadzone {
        -1.0
    } else {
        0.0
    }
}
