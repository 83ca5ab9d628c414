//! Fixed timestep match tick
//!
//! One call advances the whole duel by one tick: player intents, both
//! fighters, the AI, effects, and the end-of-match countdown. Orbit and whip
//! phase read `wall_ms`; every other timer counts ticks.

use glam::Vec2;

use super::effects;
use super::events::{GameEvent, SoundEffect};
use super::state::{Buttons, GamePhase, GameState, MatchOutcome};

/// Aim-and-release analog input
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AimInput {
    /// Stick currently held
    pub active: bool,
    /// Current stick vector (components in [-1, 1])
    pub vector: Vec2,
}

/// Input for a single tick. Buttons are reported as held; presses are
/// detected against the previous tick.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Keyboard axis (each component -1, 0 or 1)
    pub move_keys: Vec2,
    /// Analog movement stick; overrides the keys outside its dead zone
    pub move_stick: Vec2,
    pub jump: bool,
    pub burst: bool,
    pub whip: bool,
    pub aim: AimInput,
    /// Pause toggle
    pub pause: bool,
    /// Demo mode - a second AI drives the player
    pub autopilot: bool,
}

impl TickInput {
    fn buttons(&self) -> Buttons {
        Buttons {
            jump: self.jump,
            burst: self.burst,
            whip: self.whip,
            pause: self.pause,
        }
    }

    /// Movement intent after the stick-over-keys rule
    pub fn movement(&self, deadzone: f32) -> Vec2 {
        if self.move_stick.x.abs() > deadzone || self.move_stick.y.abs() > deadzone {
            self.move_stick.clamp(Vec2::splat(-1.0), Vec2::ONE)
        } else {
            self.move_keys.clamp(Vec2::splat(-1.0), Vec2::ONE)
        }
    }
}

/// Advance the match by one tick
pub fn tick(state: &mut GameState, input: &TickInput, wall_ms: f64) {
    let held = input.buttons();
    let pressed = held.pressed_since(&state.prev_buttons);
    state.prev_buttons = held;

    if pressed.pause {
        match state.phase {
            GamePhase::Fighting => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Fighting,
            GamePhase::MatchOver => {}
        }
    }

    if state.phase != GamePhase::Fighting {
        return;
    }

    state.time_ticks += 1;
    let first_event = state.events.len();

    if input.autopilot {
        state.aim_was_active = false;
        state.autopilot.update(
            &mut state.player,
            &mut state.enemy,
            &state.tuning,
            &mut state.rng,
            &mut state.events,
        );
    } else {
        apply_player_input(state, input, &pressed, wall_ms);
    }

    state
        .player
        .update(&mut state.enemy, &state.tuning, wall_ms, &mut state.events);
    state
        .enemy
        .update(&mut state.player, &state.tuning, wall_ms, &mut state.events);
    state.ai.update(
        &mut state.enemy,
        &mut state.player,
        &state.tuning,
        &mut state.rng,
        &mut state.events,
    );

    // Expand this tick's effect requests, then age everything
    for event in &state.events[first_event..] {
        if let GameEvent::Effect { kind, pos, color } = *event {
            effects::spawn(&mut state.effects, kind, pos, color, &state.tuning, &mut state.rng);
        }
    }
    effects::update_all(&mut state.effects, &state.tuning);

    if state.is_decided() {
        let countdown = state
            .end_countdown
            .get_or_insert(state.tuning.match_end_delay_ticks);
        *countdown = countdown.saturating_sub(1);
        if *countdown == 0 {
            end_match(state);
            return;
        }
    }

    update_running_loop(state);
}

/// Human intents for the player fighter
fn apply_player_input(state: &mut GameState, input: &TickInput, pressed: &Buttons, wall_ms: f64) {
    let tuning = &state.tuning;
    let player = &mut state.player;
    let enemy = &state.enemy;
    let events = &mut state.events;

    let movement = input.movement(tuning.move_stick_deadzone);
    player.move_by(movement.x, movement.y, tuning);

    if pressed.jump {
        player.jump(tuning, events);
    }
    if pressed.burst {
        player.burst_attack(enemy, tuning, &mut state.rng, events);
    }
    if pressed.whip {
        // Any held stick steers the whip, however lightly it is pushed
        let aim = (input.aim.active && input.aim.vector != Vec2::ZERO).then_some(input.aim.vector);
        player.whip_attack(enemy, aim, tuning, wall_ms, events);
    }

    // Aim-and-release: throw on the tick the stick is let go
    if input.aim.active {
        state.aim_was_active = true;
        state.last_aim = input.aim.vector;
    } else if state.aim_was_active {
        if state.last_aim.length() > tuning.aim_release_threshold {
            player.throw_ring(None, Some(state.last_aim), tuning, &mut state.rng, events);
        }
        state.aim_was_active = false;
    }
}

fn end_match(state: &mut GameState) {
    let outcome = if state.player.hp <= 0.0 {
        MatchOutcome::OpponentWins
    } else {
        MatchOutcome::LevelComplete { level: state.level }
    };
    state.phase = GamePhase::MatchOver;
    state.outcome = Some(outcome);
    state.end_countdown = None;

    if state.running_loop {
        state.running_loop = false;
        state.events.push(GameEvent::sound(SoundEffect::RunningLoopOff));
    }
    state.events.push(GameEvent::MatchOver { outcome });
    log::info!(
        "Match over after {} ticks: {}",
        state.time_ticks,
        outcome.message(&state.enemy.name)
    );
}

/// Footstep loop on/off, emitted only on change
fn update_running_loop(state: &mut GameState) {
    let p = &state.player;
    let running = !p.is_dead() && p.grounded && (p.vel.x.abs() > 0.1 || p.vel.y.abs() > 0.1);
    if running != state.running_loop {
        state.running_loop = running;
        let sound = if running {
            SoundEffect::RunningLoopOn
        } else {
            SoundEffect::RunningLoopOff
        };
        state.events.push(GameEvent::sound(sound));
    }
}
