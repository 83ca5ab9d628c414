//! Game balance parameters
//!
//! Every gameplay constant lives here so a match can be re-tuned from a JSON
//! file without recompiling. `Tuning::default()` reproduces the shipped feel.

use std::ops::RangeInclusive;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Packed `0xRRGGBB` colors serialized as `"#rrggbb"`
pub(crate) mod hex_color {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(color: &u32, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&format!("#{:06x}", color & 0xff_ffff))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        let raw = String::deserialize(d)?;
        crate::parse_hex_color(&raw)
            .ok_or_else(|| D::Error::custom(format!("expected #rrggbb color, got {raw:?}")))
    }
}

/// Per-character body and spawn data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FighterProfile {
    pub name: String,
    /// Hitbox width (x extent)
    pub width: f32,
    /// Hitbox height (z extent)
    pub height: f32,
    pub spawn_x: f32,
    pub spawn_y: f32,
    #[serde(with = "hex_color")]
    pub color: u32,
    #[serde(with = "hex_color")]
    pub ring_color: u32,
}

impl FighterProfile {
    pub fn son() -> Self {
        Self {
            name: "Son".to_string(),
            width: 55.0,
            height: 125.0,
            spawn_x: 100.0,
            spawn_y: 400.0,
            color: 0xff4400,
            ring_color: 0xffd700,
        }
    }

    pub fn father() -> Self {
        Self {
            name: "Father".to_string(),
            width: 70.0,
            height: 160.0,
            spawn_x: 800.0,
            spawn_y: 400.0,
            color: 0x00ff00,
            ring_color: 0x2196f3,
        }
    }
}

/// Scripted opponent behavior knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTuning {
    // === State selection ===
    /// Below this distance the AI is "in close quarters"
    pub close_range: f32,
    pub retreat_chance: f32,
    pub retreat_ticks: RangeInclusive<u32>,
    pub close_chase_ticks: u32,
    pub orbit_chance: f32,
    pub orbit_ticks: RangeInclusive<u32>,
    /// Chance of chase at mid range (rolled after orbit)
    pub chase_chance: f32,
    pub chase_ticks: RangeInclusive<u32>,
    pub idle_ticks: RangeInclusive<u32>,
    pub retrieve_ticks: u32,

    // === Dodging ===
    pub dodge_detect_range: f32,
    pub jump_dodge_chance: f32,
    pub sidestep_chance: f32,
    pub dodge_ticks: u32,
    /// Reaction delay at level 0 (decreases with level, floored at 0)
    pub reaction_base: u32,
    pub reaction_per_level: u32,
    /// Added to the level-scaled base every time the AI reacts
    pub reaction_flat: u32,

    // === Per-state actions ===
    pub idle_throw_chance: f32,
    pub idle_throw_range: f32,
    pub chase_throw_chance: f32,
    /// Chase throw chance is multiplied by `1 + level * chase_aggro_per_level`
    pub chase_aggro_per_level: f32,
    pub chase_throw_range: f32,
    pub chase_depth_deadzone: f32,
    pub melee_range: f32,
    pub melee_depth: f32,
    pub retreat_depth_deadzone: f32,
    pub retreat_throw_chance: f32,
    /// Distance from a side wall that triggers the escape jump
    pub wall_margin: f32,
    pub orbit_min_distance: f32,
    pub orbit_max_distance: f32,
    pub orbit_throw_chance: f32,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            close_range: 100.0,
            retreat_chance: 0.6,
            retreat_ticks: 20..=40,
            close_chase_ticks: 15,
            orbit_chance: 0.4,
            orbit_ticks: 50..=100,
            chase_chance: 0.2,
            chase_ticks: 30..=60,
            idle_ticks: 30..=70,
            retrieve_ticks: 40,

            dodge_detect_range: 150.0,
            jump_dodge_chance: 0.15,
            sidestep_chance: 0.2,
            dodge_ticks: 10,
            reaction_base: 15,
            reaction_per_level: 2,
            reaction_flat: 15,

            idle_throw_chance: 0.005,
            idle_throw_range: 500.0,
            chase_throw_chance: 0.02,
            chase_aggro_per_level: 0.2,
            chase_throw_range: 300.0,
            chase_depth_deadzone: 10.0,
            melee_range: 60.0,
            melee_depth: 30.0,
            retreat_depth_deadzone: 20.0,
            retreat_throw_chance: 0.02,
            wall_margin: 50.0,
            orbit_min_distance: 200.0,
            orbit_max_distance: 400.0,
            orbit_throw_chance: 0.01,
        }
    }
}

/// All tunable match parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Arena ===
    pub arena_width: f32,
    pub floor_top: f32,
    pub floor_bottom: f32,
    /// Loose y-band that counts as "same depth" for hits
    pub depth_tolerance: f32,

    // === Fighter movement ===
    pub gravity: f32,
    pub friction: f32,
    /// Input-to-velocity scale for `move`
    pub move_accel: f32,
    pub max_speed_x: f32,
    pub max_speed_y: f32,
    /// Grounded velocities below this snap to zero
    pub velocity_snap: f32,
    pub jump_force: f32,
    pub death_friction: f32,
    pub death_rotation_step: f32,
    pub death_knockback: f32,
    pub death_pop: f32,
    pub max_hp: f32,

    // === Rings ===
    pub ring_size: f32,
    pub ring_orbit_radius: f32,
    /// Orbit ellipse depth radius as a fraction of the orbit radius
    pub ring_orbit_depth_ratio: f32,
    pub ring_orbit_height: f32,
    /// Wall-clock milliseconds per radian of orbit
    pub ring_orbit_ms_per_radian: f64,
    pub ring_speed: f32,
    pub ring_return_speed: f32,
    pub ring_return_boost_speed: f32,
    pub ring_catch_distance: f32,
    pub ring_bounds_margin: f32,
    pub ring_bounds_wait_ticks: u32,
    pub burst_angle_jitter: f32,
    pub burst_velocity_jitter: f32,
    pub jump_boost_rings: usize,
    pub jump_boost_ticks: u32,

    // === Whip ===
    pub whip_duration_ms: f64,
    pub whip_spacing: f32,
    pub whip_base_reach: f32,
    pub whip_height: f32,
    /// Extension fraction above which whip rings deal damage
    pub whip_hit_extension: f32,
    pub whip_push: f32,

    // === Damage ===
    pub ring_damage: f32,
    pub burst_damage: f32,
    pub melee_damage: f32,
    pub kick_bonus_damage: f32,
    pub whip_damage: f32,

    // === Melee ===
    pub punch_range: f32,
    pub kick_range: f32,
    /// How far the melee box reaches back into the attacker
    pub melee_overlap: f32,
    pub melee_knockback: f32,
    /// Height above the target's feet where the melee hit flash appears
    pub melee_flash_height: f32,
    /// Depth offset of the spark a hurt fighter throws off
    pub hurt_spark_depth: f32,

    // === Cooldowns & state timers (ticks) ===
    pub melee_state_ticks: u32,
    pub melee_cooldown_ticks: u32,
    pub throw_cooldown_ticks: u32,
    pub burst_cooldown_ticks: u32,
    pub burst_state_ticks: u32,
    pub whip_lock_ticks: u32,
    pub special_cooldown_ticks: u32,
    pub whip_state_ticks: u32,

    // === Coordinator ===
    pub match_end_delay_ticks: u32,
    pub move_stick_deadzone: f32,
    pub aim_release_threshold: f32,
    pub max_effects: usize,

    // === Difficulty curve ===
    pub player_power_base: f32,
    pub player_power_step: f32,
    pub player_power_min: f32,
    pub enemy_power_base: f32,
    pub enemy_power_step: f32,

    pub son: FighterProfile,
    pub father: FighterProfile,
    pub ai: AiTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            arena_width: 1000.0,
            floor_top: 300.0,
            floor_bottom: 580.0,
            depth_tolerance: 70.0,

            gravity: 0.6,
            friction: 0.85,
            move_accel: 1.5,
            max_speed_x: 2.5,
            max_speed_y: 2.0,
            velocity_snap: 0.1,
            jump_force: 11.0,
            death_friction: 0.9,
            death_rotation_step: 0.1,
            death_knockback: 5.0,
            death_pop: 10.0,
            max_hp: 500.0,

            ring_size: 16.0,
            ring_orbit_radius: 60.0,
            ring_orbit_depth_ratio: 0.3,
            ring_orbit_height: 50.0,
            ring_orbit_ms_per_radian: 500.0,
            ring_speed: 12.0,
            ring_return_speed: 4.0,
            ring_return_boost_speed: 9.0,
            ring_catch_distance: 30.0,
            ring_bounds_margin: 100.0,
            ring_bounds_wait_ticks: 20,
            burst_angle_jitter: 0.5,
            burst_velocity_jitter: 2.0,
            jump_boost_rings: 2,
            jump_boost_ticks: 20,

            whip_duration_ms: 1400.0,
            whip_spacing: 40.0,
            whip_base_reach: 40.0,
            whip_height: 40.0,
            whip_hit_extension: 0.5,
            whip_push: 5.0,

            ring_damage: 6.0,
            burst_damage: 12.0,
            melee_damage: 5.0,
            kick_bonus_damage: 2.0,
            whip_damage: 2.0,

            punch_range: 60.0,
            kick_range: 70.0,
            melee_overlap: 30.0,
            melee_knockback: 8.0,
            melee_flash_height: 50.0,
            hurt_spark_depth: 20.0,

            melee_state_ticks: 20,
            melee_cooldown_ticks: 30,
            throw_cooldown_ticks: 20,
            burst_cooldown_ticks: 900,
            burst_state_ticks: 35,
            whip_lock_ticks: 100,
            special_cooldown_ticks: 540,
            whip_state_ticks: 84,

            match_end_delay_ticks: 120,
            move_stick_deadzone: 0.1,
            aim_release_threshold: 0.3,
            max_effects: 512,

            player_power_base: 1.0,
            player_power_step: 0.1,
            player_power_min: 0.5,
            enemy_power_base: 1.4,
            enemy_power_step: 0.15,

            son: FighterProfile::son(),
            father: FighterProfile::father(),
            ai: AiTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document (missing fields use defaults)
    pub fn from_json_str(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load a tuning file from disk
    pub fn load(path: &Path) -> Result<Self, TuningError> {
        let contents = std::fs::read_to_string(path)?;
        let tuning = Self::from_json_str(&contents)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    pub fn to_json_pretty(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        fn invalid(msg: impl Into<String>) -> Result<(), TuningError> {
            Err(TuningError::Invalid(msg.into()))
        }

        if self.arena_width <= 0.0 {
            return invalid("arena_width must be positive");
        }
        if self.floor_top >= self.floor_bottom {
            return invalid("floor_top must be above floor_bottom");
        }
        if self.max_hp <= 0.0 {
            return invalid("max_hp must be positive");
        }
        if self.ring_orbit_ms_per_radian <= 0.0 || self.whip_duration_ms <= 0.0 {
            return invalid("wall-clock periods must be positive");
        }
        if self.ring_speed <= 0.0 || self.ring_return_speed <= 0.0 {
            return invalid("ring speeds must be positive");
        }
        if self.jump_boost_rings > crate::consts::RINGS_PER_FIGHTER {
            return invalid("jump_boost_rings exceeds rings per fighter");
        }
        for profile in [&self.son, &self.father] {
            if profile.width <= 0.0 || profile.height <= 0.0 {
                return invalid(format!("{} must have a positive hitbox", profile.name));
            }
        }

        let ai = &self.ai;
        let chances = [
            ("retreat_chance", ai.retreat_chance),
            ("orbit_chance", ai.orbit_chance),
            ("chase_chance", ai.chase_chance),
            ("jump_dodge_chance", ai.jump_dodge_chance),
            ("sidestep_chance", ai.sidestep_chance),
            ("idle_throw_chance", ai.idle_throw_chance),
            ("chase_throw_chance", ai.chase_throw_chance),
            ("retreat_throw_chance", ai.retreat_throw_chance),
            ("orbit_throw_chance", ai.orbit_throw_chance),
        ];
        for (name, p) in chances {
            if !(0.0..=1.0).contains(&p) {
                return invalid(format!("ai.{name} must be within [0, 1]"));
            }
        }
        if ai.orbit_chance + ai.chase_chance > 1.0 {
            return invalid("ai.orbit_chance + ai.chase_chance must not exceed 1");
        }
        let ranges = [
            ("retreat_ticks", &ai.retreat_ticks),
            ("orbit_ticks", &ai.orbit_ticks),
            ("chase_ticks", &ai.chase_ticks),
            ("idle_ticks", &ai.idle_ticks),
        ];
        for (name, range) in ranges {
            if range.is_empty() {
                return invalid(format!("ai.{name} is an empty range"));
            }
        }
        if ai.orbit_min_distance > ai.orbit_max_distance {
            return invalid("ai.orbit_min_distance exceeds ai.orbit_max_distance");
        }

        Ok(())
    }

    /// Damage multiplier of the player at a given level (falls with level)
    pub fn player_power(&self, level: u32) -> f32 {
        let steps = level.saturating_sub(1) as f32;
        (self.player_power_base - steps * self.player_power_step).max(self.player_power_min)
    }

    /// Damage multiplier of the AI opponent at a given level (rises with level)
    pub fn enemy_power(&self, level: u32) -> f32 {
        let steps = level.saturating_sub(1) as f32;
        self.enemy_power_base + steps * self.enemy_power_step
    }

    /// AI reaction delay base at a given level
    pub fn ai_reaction_base(&self, level: u32) -> u32 {
        self.ai
            .reaction_base
            .saturating_sub(level.saturating_mul(self.ai.reaction_per_level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_difficulty_curve() {
        let t = Tuning::default();
        assert!((t.player_power(1) - 1.0).abs() < 1e-6);
        assert!((t.enemy_power(1) - 1.4).abs() < 1e-6);
        assert!((t.player_power(2) - 0.9).abs() < 1e-6);
        assert!((t.enemy_power(2) - 1.55).abs() < 1e-6);
        // Player power bottoms out
        assert!((t.player_power(20) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_reaction_base_floors_at_zero() {
        let t = Tuning::default();
        assert_eq!(t.ai_reaction_base(1), 13);
        assert_eq!(t.ai_reaction_base(7), 1);
        assert_eq!(t.ai_reaction_base(8), 0);
        assert_eq!(t.ai_reaction_base(50), 0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let t = Tuning::from_json_str(r#"{ "gravity": 0.8, "ai": { "close_range": 120.0 } }"#)
            .unwrap();
        assert!((t.gravity - 0.8).abs() < 1e-6);
        assert!((t.ai.close_range - 120.0).abs() < 1e-6);
        assert!((t.friction - 0.85).abs() < 1e-6);
        assert_eq!(t.burst_cooldown_ticks, 900);
        assert_eq!(t.son.name, "Son");
    }

    #[test]
    fn test_json_round_trip_keeps_colors() {
        let json = Tuning::default().to_json_pretty().unwrap();
        assert!(json.contains("\"#ffd700\""));
        let back = Tuning::from_json_str(&json).unwrap();
        assert_eq!(back.father.ring_color, 0x2196f3);
    }

    #[test]
    fn test_invalid_floor_rejected() {
        let err = Tuning::from_json_str(r#"{ "floor_top": 600.0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid(_)));
    }

    #[test]
    fn test_bad_color_rejected() {
        let json = r##"{ "son": { "name": "Son", "width": 55.0, "height": 125.0,
            "spawn_x": 100.0, "spawn_y": 400.0, "color": "red", "ring_color": "#ffd700" } }"##;
        assert!(matches!(
            Tuning::from_json_str(json),
            Err(TuningError::Parse(_))
        ));
    }

    #[test]
    fn test_probability_out_of_range_rejected() {
        let err = Tuning::from_json_str(r#"{ "ai": { "retreat_chance": 1.5 } }"#).unwrap_err();
        assert!(err.to_string().contains("retreat_chance"));
    }
}
