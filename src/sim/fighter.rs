//! Fighters: physics integration, the action state machine, and ring ownership
//!
//! Actions are guarded intents. A failed precondition never panics or errors;
//! it returns `ActionOutcome::Rejected` with the reason and leaves the fighter
//! untouched.

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{Volume, boxes_overlap};
use super::events::{EffectKind, Events, GameEvent, SoundEffect};
use super::ring::{Ring, RingAnchor};
use crate::consts::*;
use crate::tuning::{FighterProfile, Tuning};

/// Which character a fighter is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FighterKind {
    /// Player-controlled
    Son,
    /// AI-controlled opponent
    Father,
}

impl FighterKind {
    pub fn profile<'a>(&self, tuning: &'a Tuning) -> &'a FighterProfile {
        match self {
            FighterKind::Son => &tuning.son,
            FighterKind::Father => &tuning.father,
        }
    }

    pub fn is_ai(&self) -> bool {
        matches!(self, FighterKind::Father)
    }
}

/// Action/animation state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FighterState {
    Idle,
    Run,
    Jump,
    Punch,
    Kick,
    Stun,
    Burst,
    Special,
    DragonWhip,
    /// Terminal
    Dead,
}

impl FighterState {
    /// States that revert to `Idle` when the state timer runs out
    pub fn is_timed(&self) -> bool {
        matches!(
            self,
            FighterState::Punch
                | FighterState::Kick
                | FighterState::Stun
                | FighterState::Burst
                | FighterState::Special
                | FighterState::DragonWhip
        )
    }
}

/// Melee attack flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeleeKind {
    Punch,
    Kick,
}

/// Why an action did not happen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Dead,
    Stunned,
    OnCooldown,
    Airborne,
    /// No ring in orbit for a single throw
    NoRingAvailable,
    /// Whole-kit attacks need all five rings in orbit
    RingsNotReady,
}

/// Result of a guarded action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Applied,
    Rejected(Rejection),
}

impl ActionOutcome {
    #[inline]
    pub fn is_applied(&self) -> bool {
        matches!(self, ActionOutcome::Applied)
    }
}

/// Result of `take_damage`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Already dead, nothing happened
    Ignored,
    Hurt,
    /// This hit was lethal
    Killed,
}

/// A combatant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fighter {
    pub kind: FighterKind,
    pub name: String,
    pub is_ai: bool,
    /// +1 facing right, -1 facing left
    pub facing: f32,
    /// x = left edge, y = depth, z = feet height
    pub pos: Vec3,
    pub vel: Vec3,
    pub w: f32,
    pub h: f32,
    pub hp: f32,
    /// Scales all damage this fighter deals
    pub damage_multiplier: f32,
    pub state: FighterState,
    pub state_timer: u32,
    pub attack_cooldown: u32,
    pub burst_cooldown: u32,
    pub special_cooldown: u32,
    pub grounded: bool,
    /// Fall-over angle once dead
    pub rotation: f32,
    pub color: u32,
    pub rings: [Ring; RINGS_PER_FIGHTER],
}

impl Fighter {
    /// A fresh fighter at its profile's spawn point
    pub fn new(kind: FighterKind, tuning: &Tuning) -> Self {
        let profile = kind.profile(tuning);
        let is_ai = kind.is_ai();
        let ring_color = profile.ring_color;
        Self {
            kind,
            name: profile.name.clone(),
            is_ai,
            facing: if is_ai { -1.0 } else { 1.0 },
            pos: Vec3::new(profile.spawn_x, profile.spawn_y, 0.0),
            vel: Vec3::ZERO,
            w: profile.width,
            h: profile.height,
            hp: tuning.max_hp,
            damage_multiplier: 1.0,
            state: FighterState::Idle,
            state_timer: 0,
            attack_cooldown: 0,
            burst_cooldown: 0,
            special_cooldown: 0,
            grounded: true,
            rotation: 0.0,
            color: profile.color,
            rings: std::array::from_fn(|i| Ring::new(i, ring_color)),
        }
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.pos.x + self.w / 2.0
    }

    /// Plan-view center (x center, depth)
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.center_x(), self.pos.y)
    }

    /// Aim point for thrown rings: center at orbit height
    pub fn aim_point(&self, tuning: &Tuning) -> Vec3 {
        Vec3::new(
            self.center_x(),
            self.pos.y,
            self.pos.z + tuning.ring_orbit_height,
        )
    }

    pub fn volume(&self) -> Volume {
        Volume::new(self.pos.x, self.pos.y, self.pos.z, self.w, self.h)
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.state == FighterState::Dead
    }

    /// Rings currently in orbit ("ammo")
    pub fn rings_ready(&self) -> usize {
        self.rings.iter().filter(|r| r.is_orbiting()).count()
    }

    pub fn all_rings_ready(&self) -> bool {
        self.rings_ready() == RINGS_PER_FIGHTER
    }

    fn ring_anchor(&self) -> RingAnchor {
        RingAnchor {
            center: self.center(),
            z: self.pos.z,
            vel_x: self.vel.x,
            damage_multiplier: self.damage_multiplier,
        }
    }

    /// Common gate for action-initiating methods
    fn can_act(&self) -> Result<(), Rejection> {
        match self.state {
            FighterState::Dead => Err(Rejection::Dead),
            FighterState::Stun => Err(Rejection::Stunned),
            _ => Ok(()),
        }
    }

    /// Advance one tick of physics, cooldowns, rings, and state timer
    pub fn update(&mut self, target: &mut Fighter, tuning: &Tuning, wall_ms: f64, events: &mut Events) {
        // Vertical first
        if !self.grounded {
            self.vel.z -= tuning.gravity;
            self.pos.z += self.vel.z;
            if self.pos.z <= 0.0 {
                self.pos.z = 0.0;
                self.vel.z = 0.0;
                self.grounded = true;
                if !self.is_dead() {
                    self.state = FighterState::Idle;
                }
            }
        }

        if self.is_dead() {
            // Slide to a stop and fall over; nothing else runs
            self.pos.x += self.vel.x;
            self.pos.y += self.vel.y;
            self.vel.x *= tuning.death_friction;
            self.vel.y *= tuning.death_friction;
            if self.grounded {
                self.rotation =
                    (self.rotation + tuning.death_rotation_step).min(std::f32::consts::FRAC_PI_2);
            }
            return;
        }

        self.pos.x += self.vel.x;
        self.pos.y += self.vel.y;

        if self.grounded {
            self.vel.x *= tuning.friction;
            self.vel.y *= tuning.friction;
            if self.vel.x.abs() < tuning.velocity_snap {
                self.vel.x = 0.0;
            }
            if self.vel.y.abs() < tuning.velocity_snap {
                self.vel.y = 0.0;
            }
        }

        self.pos.x = self.pos.x.max(0.0);
        if self.pos.x + self.w > tuning.arena_width {
            self.pos.x = tuning.arena_width - self.w;
        }
        self.pos.y = self.pos.y.clamp(tuning.floor_top, tuning.floor_bottom);

        self.attack_cooldown = self.attack_cooldown.saturating_sub(1);
        self.burst_cooldown = self.burst_cooldown.saturating_sub(1);
        self.special_cooldown = self.special_cooldown.saturating_sub(1);

        let anchor = self.ring_anchor();
        for ring in &mut self.rings {
            ring.update(&anchor, target, tuning, wall_ms, events);
        }

        if self.state_timer > 0 {
            self.state_timer -= 1;
            if self.state_timer == 0 && self.state.is_timed() {
                self.state = FighterState::Idle;
            }
        }
    }

    /// Accelerate by an input direction (components in [-1, 1])
    pub fn move_by(&mut self, dx: f32, dy: f32, tuning: &Tuning) -> ActionOutcome {
        if let Err(why) = self.can_act() {
            return ActionOutcome::Rejected(why);
        }

        self.vel.x = (self.vel.x + dx * tuning.move_accel).clamp(-tuning.max_speed_x, tuning.max_speed_x);
        self.vel.y = (self.vel.y + dy * tuning.move_accel).clamp(-tuning.max_speed_y, tuning.max_speed_y);

        if dx.abs() > 0.1 {
            self.facing = if dx > 0.0 { 1.0 } else { -1.0 };
            if self.state == FighterState::Idle {
                self.state = FighterState::Run;
            }
        }
        ActionOutcome::Applied
    }

    /// Leap; up to two orbiting rings slam down at the take-off point
    pub fn jump(&mut self, tuning: &Tuning, events: &mut Events) -> ActionOutcome {
        if let Err(why) = self.can_act() {
            return ActionOutcome::Rejected(why);
        }
        if !self.grounded {
            return ActionOutcome::Rejected(Rejection::Airborne);
        }

        self.vel.z = tuning.jump_force;
        self.grounded = false;
        self.state = FighterState::Jump;

        let launch = Vec3::new(self.center_x(), self.pos.y, self.pos.z);
        let ready = self.rings_ready();
        if tuning.jump_boost_rings > 0 && ready >= tuning.jump_boost_rings {
            self.rings
                .iter_mut()
                .filter(|r| r.is_orbiting())
                .take(tuning.jump_boost_rings)
                .for_each(|r| r.start_jump_boost(launch, tuning.jump_boost_ticks));
            events.push(GameEvent::effect(EffectKind::JumpLaunch, launch, self.color));
        }

        events.push(GameEvent::sound(SoundEffect::Jump));
        ActionOutcome::Applied
    }

    /// Punch or kick with a forward hit box
    pub fn melee_attack(
        &mut self,
        kind: MeleeKind,
        target: &mut Fighter,
        tuning: &Tuning,
        events: &mut Events,
    ) -> ActionOutcome {
        if let Err(why) = self.can_act() {
            return ActionOutcome::Rejected(why);
        }
        if self.attack_cooldown > 0 {
            return ActionOutcome::Rejected(Rejection::OnCooldown);
        }

        let (state, range, base_damage) = match kind {
            MeleeKind::Punch => (FighterState::Punch, tuning.punch_range, tuning.melee_damage),
            MeleeKind::Kick => (
                FighterState::Kick,
                tuning.kick_range,
                tuning.melee_damage + tuning.kick_bonus_damage,
            ),
        };
        self.state = state;
        self.state_timer = tuning.melee_state_ticks;
        self.attack_cooldown = tuning.melee_cooldown_ticks;

        // Box starts inside our own body so point-blank targets still get hit
        let overlap = tuning.melee_overlap;
        let hit_x = if self.facing > 0.0 {
            self.pos.x + self.w - overlap
        } else {
            self.pos.x - range + overlap
        };
        let hit_box = Volume::new(hit_x, self.pos.y, self.pos.z, range + overlap, self.h);

        if boxes_overlap(&hit_box, &target.volume(), tuning.depth_tolerance) {
            target.vel.x = self.facing * tuning.melee_knockback;
            target.take_damage(base_damage * self.damage_multiplier, tuning, events);
            let at = Vec3::new(
                target.center_x(),
                target.pos.y,
                target.pos.z + tuning.melee_flash_height,
            );
            events.push(GameEvent::effect(EffectKind::Hit, at, 0xffffff));
        }
        ActionOutcome::Applied
    }

    /// Throw the first orbiting ring, at `target` or along `manual`
    pub fn throw_ring(
        &mut self,
        target: Option<&Fighter>,
        manual: Option<Vec2>,
        tuning: &Tuning,
        rng: &mut impl Rng,
        events: &mut Events,
    ) -> ActionOutcome {
        if let Err(why) = self.can_act() {
            return ActionOutcome::Rejected(why);
        }
        let aim = target.map_or(Vec3::ZERO, |t| t.aim_point(tuning));
        let Some(ring) = self.rings.iter_mut().find(|r| r.is_orbiting()) else {
            return ActionOutcome::Rejected(Rejection::NoRingAvailable);
        };
        ring.throw(aim, false, manual, tuning, rng);
        self.attack_cooldown = tuning.throw_cooldown_ticks;
        events.push(GameEvent::sound(SoundEffect::Throw));
        ActionOutcome::Applied
    }

    /// Throw all five rings at once
    pub fn burst_attack(
        &mut self,
        target: &Fighter,
        tuning: &Tuning,
        rng: &mut impl Rng,
        events: &mut Events,
    ) -> ActionOutcome {
        if let Err(why) = self.can_act() {
            return ActionOutcome::Rejected(why);
        }
        if self.burst_cooldown > 0 {
            return ActionOutcome::Rejected(Rejection::OnCooldown);
        }
        if !self.all_rings_ready() {
            return ActionOutcome::Rejected(Rejection::RingsNotReady);
        }

        let aim = target.aim_point(tuning);
        for ring in &mut self.rings {
            ring.throw(aim, true, None, tuning, rng);
        }
        self.burst_cooldown = tuning.burst_cooldown_ticks;
        self.state = FighterState::Burst;
        self.state_timer = tuning.burst_state_ticks;

        let at = Vec3::new(self.center_x(), self.pos.y, self.pos.z);
        events.push(GameEvent::effect(EffectKind::Shockwave, at, self.color));
        events.push(GameEvent::sound(SoundEffect::Burst));
        log::debug!("{} bursts", self.name);
        ActionOutcome::Applied
    }

    /// Sweep all five rings out in a line. The AI always aims at the target;
    /// a human aims along `aim` when the aim stick is held.
    pub fn whip_attack(
        &mut self,
        target: &Fighter,
        aim: Option<Vec2>,
        tuning: &Tuning,
        wall_ms: f64,
        events: &mut Events,
    ) -> ActionOutcome {
        if let Err(why) = self.can_act() {
            return ActionOutcome::Rejected(why);
        }
        if self.special_cooldown > 0 || self.attack_cooldown > 0 {
            return ActionOutcome::Rejected(Rejection::OnCooldown);
        }
        if !self.all_rings_ready() {
            return ActionOutcome::Rejected(Rejection::RingsNotReady);
        }

        self.attack_cooldown = tuning.whip_lock_ticks;
        self.special_cooldown = tuning.special_cooldown_ticks;
        self.state = FighterState::DragonWhip;
        self.state_timer = tuning.whip_state_ticks;

        let toward_target = Vec2::new(target.center_x() - self.pos.x, target.pos.y - self.pos.y);
        let dir = match aim {
            Some(stick) if !self.is_ai => stick,
            _ => toward_target,
        };
        let angle = crate::heading(dir);
        for ring in &mut self.rings {
            ring.start_whip(wall_ms, angle);
        }

        let at = Vec3::new(self.center_x(), self.pos.y, self.pos.z);
        events.push(GameEvent::effect(EffectKind::Shockwave, at, self.color));
        events.push(GameEvent::sound(SoundEffect::WhipActivate));
        log::debug!("{} whips at angle {:.2}", self.name, angle);
        ActionOutcome::Applied
    }

    /// Lock the fighter out of actions for `ticks`
    pub fn apply_stun(&mut self, ticks: u32) -> ActionOutcome {
        if self.is_dead() {
            return ActionOutcome::Rejected(Rejection::Dead);
        }
        self.state = FighterState::Stun;
        self.state_timer = ticks;
        ActionOutcome::Applied
    }

    /// Lose hp. Reaching zero is terminal; later hits are ignored.
    pub fn take_damage(&mut self, amount: f32, tuning: &Tuning, events: &mut Events) -> DamageOutcome {
        if self.hp <= 0.0 {
            return DamageOutcome::Ignored;
        }

        self.hp = (self.hp - amount).max(0.0);
        let at = Vec3::new(self.center_x(), self.pos.y + tuning.hurt_spark_depth, self.pos.z);
        events.push(GameEvent::effect(EffectKind::Spark, at, 0xffffff));

        if self.hp <= 0.0 {
            self.state = FighterState::Dead;
            self.vel.x = -self.facing * tuning.death_knockback;
            self.vel.z = tuning.death_pop;
            self.grounded = false;
            events.push(GameEvent::sound(SoundEffect::Death));
            log::debug!("{} is down", self.name);
            DamageOutcome::Killed
        } else {
            events.push(GameEvent::sound(SoundEffect::Hit));
            DamageOutcome::Hurt
        }
    }
}
