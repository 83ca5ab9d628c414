//! Outbound simulation events
//!
//! The simulation never draws or plays anything. It emits fire-and-forget
//! events that the renderer, audio, and UI layers consume after each tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::MatchOutcome;

/// Semantic visual effect requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectKind {
    /// Regular ring or melee connect
    Hit,
    /// Burst ring connect
    BurstHit,
    /// Burst or whip activation
    Shockwave,
    /// Rings slammed into the ground on take-off
    JumpLaunch,
    /// Small white flash on any damage
    Spark,
}

/// Sound effect triggers (no parameters)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SoundEffect {
    /// A single ring leaves orbit
    Throw,
    Jump,
    /// Non-lethal damage taken
    Hit,
    /// Five-ring burst volley
    Burst,
    WhipActivate,
    Death,
    /// Footstep loop starts (player grounded and moving)
    RunningLoopOn,
    RunningLoopOff,
}

/// Everything the simulation tells the outside world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    Effect { kind: EffectKind, pos: Vec3, color: u32 },
    Sound { sound: SoundEffect },
    MatchOver { outcome: MatchOutcome },
}

impl GameEvent {
    pub fn effect(kind: EffectKind, pos: Vec3, color: u32) -> Self {
        GameEvent::Effect { kind, pos, color }
    }

    pub fn sound(sound: SoundEffect) -> Self {
        GameEvent::Sound { sound }
    }
}

/// Event buffer threaded through entity updates
pub type Events = Vec<GameEvent>;

/// Count sound events of one kind (handy for assertions and HUD counters)
pub fn count_sounds(events: &[GameEvent], sound: SoundEffect) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, GameEvent::Sound { sound: s } if *s == sound))
        .count()
}

/// Count effect events of one kind
pub fn count_effects(events: &[GameEvent], kind: EffectKind) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, GameEvent::Effect { kind: k, .. } if *k == kind))
        .count()
}
