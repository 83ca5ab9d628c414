//! Ring Duel - a 2.5D arena fighter built around orbiting throwing rings
//!
//! Core modules:
//! - `sim`: Simulation (fighters, rings, AI, per-tick coordinator, effect events)
//! - `tuning`: Data-driven game balance

pub mod sim;
pub mod tuning;

pub use tuning::{AiTuning, FighterProfile, Tuning, TuningError};

use glam::Vec2;

/// Structural constants (not tunable: changing them changes the game's shape)
pub mod consts {
    /// Nominal tick rate the tick-based timers are balanced for
    pub const SIM_HZ: u32 = 60;
    /// Wall-clock milliseconds per nominal tick
    pub const TICK_MS: f64 = 1000.0 / SIM_HZ as f64;

    /// Every fighter owns exactly this many rings
    pub const RINGS_PER_FIGHTER: usize = 5;
    /// Ring motion-trail length
    pub const TRAIL_LENGTH: usize = 5;
    /// Alpha of a freshly recorded trail point
    pub const TRAIL_START_ALPHA: f32 = 0.5;
    /// Alpha lost by each trail point per tick
    pub const TRAIL_ALPHA_DECAY: f32 = 0.1;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Angle of a plan-view direction, `atan2(y, x)`
#[inline]
pub fn heading(dir: Vec2) -> f32 {
    dir.y.atan2(dir.x)
}

/// -1, 0 or 1 following the sign of `v` (0.0 maps to 0)
#[inline]
pub fn sign_or_zero(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Parse a `#rrggbb` color literal into a packed `0xRRGGBB`
pub fn parse_hex_color(s: &str) -> Option<u32> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}
