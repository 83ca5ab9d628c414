//! Read-only views for renderers and UI

use glam::Vec3;
use serde::Serialize;

use super::effects::Effect;
use super::fighter::{Fighter, FighterState};
use super::ring::{Ring, TrailPoint};
use super::state::{GamePhase, GameState, MatchOutcome, NextAction};
use crate::tuning::{Tuning, hex_color};

#[derive(Debug, Clone, Serialize)]
pub struct RingView<'a> {
    pub state: &'static str,
    pub pos: Vec3,
    pub burst: bool,
    pub trail: &'a [TrailPoint],
}

impl<'a> From<&'a Ring> for RingView<'a> {
    fn from(ring: &'a Ring) -> Self {
        Self {
            state: ring.state.name(),
            pos: ring.pos,
            burst: ring.burst,
            trail: &ring.trail,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FighterView<'a> {
    pub name: &'a str,
    pub pos: Vec3,
    pub w: f32,
    pub h: f32,
    pub facing: f32,
    pub state: FighterState,
    pub hp: f32,
    /// Fall-over angle (0 upright, pi/2 flat)
    pub rotation: f32,
    #[serde(serialize_with = "hex_color::serialize")]
    pub color: u32,
    pub rings: Vec<RingView<'a>>,
}

impl<'a> From<&'a Fighter> for FighterView<'a> {
    fn from(f: &'a Fighter) -> Self {
        Self {
            name: &f.name,
            pos: f.pos,
            w: f.w,
            h: f.h,
            facing: f.facing,
            state: f.state,
            hp: f.hp,
            rotation: f.rotation,
            color: f.color,
            rings: f.rings.iter().map(RingView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectView {
    pub kind: &'static str,
    pub pos: Vec3,
    #[serde(serialize_with = "hex_color::serialize")]
    pub color: u32,
    /// Normalized remaining life (1 fresh, 0 gone)
    pub life: f32,
}

impl From<&Effect> for EffectView {
    fn from(e: &Effect) -> Self {
        Self {
            kind: e.kind_name(),
            pos: e.pos,
            color: e.color,
            life: e.life.clamp(0.0, 1.0),
        }
    }
}

/// Values the HUD shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hud {
    pub level: u32,
    /// hp / max_hp
    pub player_hp: f32,
    pub enemy_hp: f32,
    /// Rings in orbit (0-5)
    pub player_rings: usize,
    pub enemy_rings: usize,
    /// 0 just used, 1 ready
    pub burst_fill: f32,
    pub whip_fill: f32,
    /// Burst and whip need the full kit
    pub specials_armed: bool,
    pub outcome: Option<MatchOutcome>,
    pub message: Option<String>,
    pub next_action: Option<NextAction>,
}

fn fill(cooldown: u32, full: u32) -> f32 {
    if full == 0 {
        return 1.0;
    }
    (1.0 - cooldown as f32 / full as f32).clamp(0.0, 1.0)
}

impl Hud {
    pub fn from_state(state: &GameState) -> Self {
        let tuning: &Tuning = &state.tuning;
        let player = &state.player;
        Self {
            level: state.level,
            player_hp: (player.hp / tuning.max_hp).clamp(0.0, 1.0),
            enemy_hp: (state.enemy.hp / tuning.max_hp).clamp(0.0, 1.0),
            player_rings: player.rings_ready(),
            enemy_rings: state.enemy.rings_ready(),
            burst_fill: fill(player.burst_cooldown, tuning.burst_cooldown_ticks),
            whip_fill: fill(player.special_cooldown, tuning.special_cooldown_ticks),
            specials_armed: player.all_rings_ready(),
            outcome: state.outcome,
            message: state.outcome_message(),
            next_action: state.outcome.map(|o| o.next_action()),
        }
    }
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub tick: u64,
    pub phase: GamePhase,
    pub player: FighterView<'a>,
    pub enemy: FighterView<'a>,
    pub effects: Vec<EffectView>,
    pub hud: Hud,
}

impl<'a> Snapshot<'a> {
    pub fn capture(state: &'a GameState) -> Self {
        Self {
            tick: state.time_ticks,
            phase: state.phase,
            player: FighterView::from(&state.player),
            enemy: FighterView::from(&state.enemy),
            effects: state.effects.iter().map(EffectView::from).collect(),
            hud: Hud::from_state(state),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_hud() {
        let state = GameState::new(1, Tuning::default()).unwrap();
        let hud = Hud::from_state(&state);
        assert_eq!(hud.player_hp, 1.0);
        assert_eq!(hud.enemy_rings, 5);
        assert_eq!(hud.burst_fill, 1.0);
        assert!(hud.specials_armed);
        assert!(hud.outcome.is_none());
    }

    #[test]
    fn test_hud_after_burst() {
        let mut state = GameState::new(1, Tuning::default()).unwrap();
        state.player.hp = 250.0;
        state.player.burst_cooldown = 450;
        state.player.rings[0].state = crate::sim::ring::RingState::Returning;
        let hud = Hud::from_state(&state);
        assert_eq!(hud.player_hp, 0.5);
        assert_eq!(hud.burst_fill, 0.5);
        assert_eq!(hud.player_rings, 4);
        assert!(!hud.specials_armed);
    }

    #[test]
    fn test_hud_outcome() {
        let mut state = GameState::new(1, Tuning::default()).unwrap();
        state.outcome = Some(MatchOutcome::LevelComplete { level: 1 });
        let hud = Hud::from_state(&state);
        assert_eq!(hud.message.as_deref(), Some("Level 1 Complete!"));
        assert_eq!(hud.next_action, Some(NextAction::AdvanceLevel));
    }

    #[test]
    fn test_snapshot_json() {
        let state = GameState::new(1, Tuning::default()).unwrap();
        let json = serde_json::to_string(&Snapshot::capture(&state)).unwrap();
        assert!(json.contains("\"name\":\"Son\""));
        // Both fighters share the tuning file's color format
        assert!(json.contains("\"color\":\"#ff4400\""));
        assert!(json.contains("\"color\":\"#00ff00\""));
        assert!(json.contains("\"state\":\"orbit\""));
    }
}
