//! Throwing rings
//!
//! Each fighter owns five rings. A ring rests in `Orbit` and is the fighter's
//! ammo; every other state is in flight, lingering, or homing back.
//!
//! Two clocks drive a ring: orbit phase and whip extension read the wall
//! clock (`wall_ms`), so they look the same at any frame rate, while flight,
//! waiting, and return count ticks.

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{Volume, boxes_overlap};
use super::events::{EffectKind, Events, GameEvent};
use super::fighter::Fighter;
use crate::consts::*;
use crate::polar_to_cartesian;
use crate::tuning::Tuning;

/// Ring state machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RingState {
    /// Circling the owner, ready to throw
    Orbit,
    /// In flight with a fixed velocity
    Thrown,
    /// Part of the five-ring whip line
    Whip { started_ms: f64, angle: f32 },
    /// Homing back to the owner
    Returning,
    /// Lingering where it stopped before homing back
    Waiting { ticks: u32 },
    /// Pinned at a jump origin before homing back
    JumpBoost { ticks: u32, anchor: Vec3 },
}

impl RingState {
    pub fn name(&self) -> &'static str {
        match self {
            RingState::Orbit => "orbit",
            RingState::Thrown => "thrown",
            RingState::Whip { .. } => "whip",
            RingState::Returning => "returning",
            RingState::Waiting { .. } => "waiting",
            RingState::JumpBoost { .. } => "jump_boost",
        }
    }
}

/// Trail point for motion-blur rendering
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrailPoint {
    pub pos: Vec3,
    pub alpha: f32,
}

/// The owner data a ring needs each tick (copied out so the owner's rings
/// can be borrowed mutably while it is read)
#[derive(Debug, Clone, Copy)]
pub struct RingAnchor {
    /// Owner center in plan view (x center, depth)
    pub center: Vec2,
    /// Owner feet height
    pub z: f32,
    /// Owner horizontal velocity (for return boost)
    pub vel_x: f32,
    pub damage_multiplier: f32,
}

/// A throwing ring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ring {
    /// Orbital slot (0-4): phase offset and whip reach
    pub index: usize,
    pub color: u32,
    pub pos: Vec3,
    pub vel: Vec3,
    pub state: RingState,
    /// Thrown as part of a burst volley
    pub burst: bool,
    /// Recent positions (oldest first)
    pub trail: Vec<TrailPoint>,
}

impl Ring {
    pub fn new(index: usize, color: u32) -> Self {
        Self {
            index,
            color,
            pos: Vec3::ZERO,
            vel: Vec3::ZERO,
            state: RingState::Orbit,
            burst: false,
            trail: Vec::with_capacity(TRAIL_LENGTH),
        }
    }

    #[inline]
    pub fn is_orbiting(&self) -> bool {
        self.state == RingState::Orbit
    }

    /// Hit volume (16 units square, centered in x and z)
    pub fn volume(&self, tuning: &Tuning) -> Volume {
        Volume::centered(self.pos, tuning.ring_size)
    }

    /// Where an orbiting ring sits at a given wall-clock time
    pub fn orbit_position(&self, anchor: &RingAnchor, tuning: &Tuning, wall_ms: f64) -> Vec3 {
        let phase = (wall_ms / tuning.ring_orbit_ms_per_radian) as f32;
        let angle = phase + self.index as f32 * (std::f32::consts::TAU / RINGS_PER_FIGHTER as f32);
        let offset = Vec2::new(
            angle.cos() * tuning.ring_orbit_radius,
            angle.sin() * tuning.ring_orbit_radius * tuning.ring_orbit_depth_ratio,
        );
        let plan = anchor.center + offset;
        Vec3::new(plan.x, plan.y, anchor.z + tuning.ring_orbit_height)
    }

    /// Point a returning ring homes toward
    fn home(anchor: &RingAnchor, tuning: &Tuning) -> Vec3 {
        Vec3::new(
            anchor.center.x,
            anchor.center.y,
            anchor.z + tuning.ring_orbit_height,
        )
    }

    /// Launch from orbit. Returns false (and changes nothing) unless orbiting.
    ///
    /// With a `manual` direction the throw is flat along it. Otherwise the
    /// full 3D displacement to `target` is normalized so speed is the same at
    /// any range; burst throws jitter aim angle and velocity to fan the volley.
    pub fn throw(
        &mut self,
        target: Vec3,
        burst: bool,
        manual: Option<Vec2>,
        tuning: &Tuning,
        rng: &mut impl Rng,
    ) -> bool {
        if !self.is_orbiting() {
            return false;
        }
        self.state = RingState::Thrown;
        self.burst = burst;

        self.vel = match manual {
            Some(dir) => {
                let angle = crate::heading(dir);
                let flat = polar_to_cartesian(tuning.ring_speed, angle);
                Vec3::new(flat.x, flat.y, 0.0)
            }
            None => {
                let mut delta = target - self.pos;
                if burst {
                    // Rotate the plan-view aim by a small random angle
                    let jitter = (rng.random::<f32>() - 0.5) * tuning.burst_angle_jitter;
                    let plan = Vec2::from_angle(jitter).rotate(delta.truncate());
                    delta = Vec3::new(plan.x, plan.y, delta.z);
                }
                let dist = delta.length();
                if dist < 0.1 {
                    // On top of the target: default forward
                    Vec3::new(tuning.ring_speed, 0.0, 0.0)
                } else {
                    let mut vel = delta / dist * tuning.ring_speed;
                    if burst {
                        let j = tuning.burst_velocity_jitter;
                        vel += Vec3::new(
                            (rng.random::<f32>() - 0.5) * j,
                            (rng.random::<f32>() - 0.5) * j,
                            (rng.random::<f32>() - 0.5) * j,
                        );
                    }
                    vel
                }
            }
        };
        log::trace!("ring {} thrown (burst={}) vel={:?}", self.index, burst, self.vel);
        true
    }

    /// Start homing back, after `delay` ticks of lingering (0 = now)
    pub fn start_return(&mut self, delay: u32) {
        self.state = if delay > 0 {
            RingState::Waiting { ticks: delay }
        } else {
            RingState::Returning
        };
        log::trace!("ring {} returning (delay {})", self.index, delay);
    }

    /// Pin at `anchor` for `ticks`, then home back
    pub fn start_jump_boost(&mut self, anchor: Vec3, ticks: u32) {
        self.state = RingState::JumpBoost { ticks, anchor };
        self.pos = anchor;
        log::trace!("ring {} pinned for jump boost ({} ticks)", self.index, ticks);
    }

    /// Enter the whip line
    pub fn start_whip(&mut self, started_ms: f64, angle: f32) {
        self.state = RingState::Whip { started_ms, angle };
        log::trace!("ring {} whipping at angle {:.2}", self.index, angle);
    }

    fn enter_orbit(&mut self) {
        self.state = RingState::Orbit;
        self.burst = false;
        self.vel = Vec3::ZERO;
        self.trail.clear();
        log::trace!("ring {} back in orbit", self.index);
    }

    /// Age existing trail points and record the current position
    fn record_trail(&mut self) {
        for point in &mut self.trail {
            point.alpha = (point.alpha - TRAIL_ALPHA_DECAY).max(0.0);
        }
        self.trail.push(TrailPoint {
            pos: self.pos,
            alpha: TRAIL_START_ALPHA,
        });
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.remove(0);
        }
    }

    /// Advance one tick against the opposing fighter
    pub fn update(
        &mut self,
        anchor: &RingAnchor,
        target: &mut Fighter,
        tuning: &Tuning,
        wall_ms: f64,
        events: &mut Events,
    ) {
        // Lingering states only count down
        match &mut self.state {
            RingState::Waiting { ticks } => {
                *ticks = ticks.saturating_sub(1);
                if *ticks == 0 {
                    self.state = RingState::Returning;
                    log::trace!("ring {} done waiting, returning", self.index);
                }
                return;
            }
            RingState::JumpBoost { ticks, anchor: pin } => {
                *ticks = ticks.saturating_sub(1);
                if *ticks == 0 {
                    self.state = RingState::Returning;
                    log::trace!("ring {} jump boost over, returning", self.index);
                } else {
                    self.pos = *pin;
                }
                return;
            }
            _ => {}
        }

        if self.is_orbiting() {
            self.trail.clear();
        } else {
            self.record_trail();
        }

        match self.state {
            RingState::Orbit => {
                self.pos = self.orbit_position(anchor, tuning, wall_ms);
            }
            RingState::Thrown => self.update_thrown(anchor, target, tuning, events),
            RingState::Whip { started_ms, angle } => {
                self.update_whip(anchor, target, tuning, wall_ms, started_ms, angle, events)
            }
            RingState::Returning => self.update_returning(anchor, tuning),
            RingState::Waiting { .. } | RingState::JumpBoost { .. } => {}
        }
    }

    fn update_thrown(
        &mut self,
        anchor: &RingAnchor,
        target: &mut Fighter,
        tuning: &Tuning,
        events: &mut Events,
    ) {
        self.pos += self.vel;

        let margin = tuning.ring_bounds_margin;
        let out_of_bounds = self.pos.x < 0.0
            || self.pos.x > tuning.arena_width
            || self.pos.y < tuning.floor_top - margin
            || self.pos.y > tuning.floor_bottom + margin;
        if out_of_bounds {
            self.start_return(tuning.ring_bounds_wait_ticks);
        }

        // A ring leaving the arena this tick can still connect this tick
        if boxes_overlap(&self.volume(tuning), &target.volume(), tuning.depth_tolerance) {
            let base = if self.burst {
                tuning.burst_damage
            } else {
                tuning.ring_damage
            };
            target.take_damage(base * anchor.damage_multiplier, tuning, events);
            let kind = if self.burst {
                EffectKind::BurstHit
            } else {
                EffectKind::Hit
            };
            events.push(GameEvent::effect(kind, self.pos, self.color));
            self.start_return(0);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn update_whip(
        &mut self,
        anchor: &RingAnchor,
        target: &mut Fighter,
        tuning: &Tuning,
        wall_ms: f64,
        started_ms: f64,
        angle: f32,
        events: &mut Events,
    ) {
        let progress = ((wall_ms - started_ms) / tuning.whip_duration_ms) as f32;
        let extension = if progress > 1.0 {
            0.0
        } else {
            (progress * std::f32::consts::PI).sin()
        };

        if extension <= 0.0 && progress > 0.5 {
            self.start_return(0);
            return;
        }

        let reach = (self.index + 1) as f32 * tuning.whip_spacing + tuning.whip_base_reach;
        let plan = anchor.center + polar_to_cartesian(reach * extension, angle);
        self.pos = Vec3::new(plan.x, plan.y, anchor.z + tuning.whip_height);

        if extension > tuning.whip_hit_extension
            && boxes_overlap(&self.volume(tuning), &target.volume(), tuning.depth_tolerance)
        {
            target.vel.x = angle.cos() * tuning.whip_push;
            target.take_damage(tuning.whip_damage * anchor.damage_multiplier, tuning, events);
            events.push(GameEvent::effect(EffectKind::Spark, self.pos, 0xffffff));
        }
    }

    fn update_returning(&mut self, anchor: &RingAnchor, tuning: &Tuning) {
        let delta = Self::home(anchor, tuning) - self.pos;
        let dist = delta.length();

        // Owner advancing toward the ring's side reels it in faster
        let side = self.pos.x - anchor.center.x;
        let speed = if (anchor.vel_x > 0.0 && side > 0.0) || (anchor.vel_x < 0.0 && side < 0.0) {
            tuning.ring_return_boost_speed
        } else {
            tuning.ring_return_speed
        };

        if dist > 0.0 {
            self.pos += delta / dist * speed;
        }
        if dist < tuning.ring_catch_distance {
            self.enter_orbit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::fighter::FighterKind;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn anchor() -> RingAnchor {
        RingAnchor {
            center: Vec2::new(127.5, 400.0),
            z: 0.0,
            vel_x: 0.0,
            damage_multiplier: 1.0,
        }
    }

    /// A target parked far away so nothing collides
    fn far_target(tuning: &Tuning) -> Fighter {
        let mut f = Fighter::new(FighterKind::Father, tuning);
        f.pos = Vec3::new(900.0, 580.0, 0.0);
        f
    }

    #[test]
    fn test_orbit_is_time_based() {
        let tuning = Tuning::default();
        let mut target = far_target(&tuning);
        let mut events = Events::new();
        let mut a = Ring::new(0, 0);
        let mut b = Ring::new(0, 0);

        // Many ticks vs one tick at the same wall time land on the same spot
        for _ in 0..50 {
            a.update(&anchor(), &mut target, &tuning, 1234.0, &mut events);
        }
        b.update(&anchor(), &mut target, &tuning, 1234.0, &mut events);
        assert!((a.pos - b.pos).length() < 1e-4);

        // Moving the wall clock moves the ring
        b.update(&anchor(), &mut target, &tuning, 1334.0, &mut events);
        assert!((a.pos - b.pos).length() > 1.0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_orbit_ellipse_bounds() {
        let tuning = Tuning::default();
        let ring = Ring::new(3, 0);
        for step in 0..100 {
            let p = ring.orbit_position(&anchor(), &tuning, step as f64 * 37.0);
            assert!((p.x - 127.5).abs() <= 60.0 + 1e-3);
            assert!((p.y - 400.0).abs() <= 18.0 + 1e-3);
            assert!((p.z - 50.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_throw_requires_orbit() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ring = Ring::new(0, 0);
        ring.state = RingState::Returning;
        ring.vel = Vec3::new(1.0, 2.0, 3.0);
        assert!(!ring.throw(Vec3::new(500.0, 400.0, 50.0), false, None, &tuning, &mut rng));
        assert_eq!(ring.state, RingState::Returning);
        assert_eq!(ring.vel, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_targeted_throw_constant_speed() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        for target in [
            Vec3::new(130.0, 400.0, 50.0),
            Vec3::new(900.0, 550.0, 120.0),
            Vec3::new(0.0, 300.0, 0.0),
        ] {
            let mut ring = Ring::new(0, 0);
            ring.pos = Vec3::new(100.0, 400.0, 50.0);
            assert!(ring.throw(target, false, None, &tuning, &mut rng));
            assert!((ring.vel.length() - tuning.ring_speed).abs() < 1e-3);
        }
    }

    #[test]
    fn test_throw_on_top_of_target_defaults_forward() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ring = Ring::new(0, 0);
        ring.pos = Vec3::new(100.0, 400.0, 50.0);
        assert!(ring.throw(ring.pos, false, None, &tuning, &mut rng));
        assert_eq!(ring.vel, Vec3::new(tuning.ring_speed, 0.0, 0.0));
    }

    #[test]
    fn test_manual_throw_is_flat() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ring = Ring::new(0, 0);
        assert!(ring.throw(Vec3::ZERO, false, Some(Vec2::new(0.0, -0.5)), &tuning, &mut rng));
        assert_eq!(ring.vel.z, 0.0);
        assert!(ring.vel.x.abs() < 1e-4);
        assert!((ring.vel.y + tuning.ring_speed).abs() < 1e-4);
    }

    #[test]
    fn test_burst_throw_is_jittered() {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let target = Vec3::new(800.0, 400.0, 50.0);
        let mut a = Ring::new(0, 0);
        let mut b = Ring::new(1, 0);
        a.pos = Vec3::new(100.0, 400.0, 50.0);
        b.pos = a.pos;
        a.throw(target, true, None, &tuning, &mut rng);
        b.throw(target, true, None, &tuning, &mut rng);
        assert!(a.burst && b.burst);
        assert_ne!(a.vel, b.vel);
        // Jitter stays small relative to the throw speed
        assert!((a.vel.length() - tuning.ring_speed).abs() < 2.0);
    }

    #[test]
    fn test_out_of_bounds_waits_then_returns() {
        let tuning = Tuning::default();
        let mut target = far_target(&tuning);
        let mut events = Events::new();
        let mut ring = Ring::new(0, 0);
        ring.state = RingState::Thrown;
        ring.pos = Vec3::new(995.0, 400.0, 50.0);
        ring.vel = Vec3::new(12.0, 0.0, 0.0);

        ring.update(&anchor(), &mut target, &tuning, 0.0, &mut events);
        assert_eq!(ring.state, RingState::Waiting { ticks: 20 });
        let parked = ring.pos;

        for _ in 0..19 {
            ring.update(&anchor(), &mut target, &tuning, 0.0, &mut events);
            assert_eq!(ring.pos, parked);
        }
        assert!(matches!(ring.state, RingState::Waiting { ticks: 1 }));
        ring.update(&anchor(), &mut target, &tuning, 0.0, &mut events);
        assert_eq!(ring.state, RingState::Returning);
    }

    #[test]
    fn test_hit_damages_and_returns_immediately() {
        let tuning = Tuning::default();
        let mut events = Events::new();
        let mut target = Fighter::new(FighterKind::Father, &tuning);
        target.pos = Vec3::new(500.0, 400.0, 0.0);
        let mut ring = Ring::new(0, 0xffd700);
        ring.state = RingState::Thrown;
        ring.pos = Vec3::new(490.0, 400.0, 50.0);
        ring.vel = Vec3::new(12.0, 0.0, 0.0);

        ring.update(&anchor(), &mut target, &tuning, 0.0, &mut events);
        assert_eq!(target.hp, 494.0);
        assert_eq!(ring.state, RingState::Returning);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::Effect { kind: EffectKind::Hit, color: 0xffd700, .. }
        )));
    }

    #[test]
    fn test_returning_converges_within_bound() {
        let tuning = Tuning::default();
        let mut target = far_target(&tuning);
        let mut events = Events::new();
        let a = anchor();
        let mut ring = Ring::new(0, 0);
        ring.state = RingState::Returning;
        ring.pos = Vec3::new(700.0, 300.0, 50.0);
        let start = (Ring::home(&a, &tuning) - ring.pos).length();
        let bound = ((start - tuning.ring_catch_distance) / tuning.ring_return_speed).ceil() as u32 + 2;

        let mut ticks = 0;
        while !ring.is_orbiting() {
            ring.update(&a, &mut target, &tuning, 0.0, &mut events);
            ticks += 1;
            assert!(ticks <= bound, "ring did not return within {bound} ticks");
        }
        assert!(ring.trail.is_empty());
        assert!(!ring.burst);
    }

    #[test]
    fn test_return_boost_when_owner_advances() {
        let tuning = Tuning::default();
        let mut target = far_target(&tuning);
        let mut events = Events::new();
        let mut a = anchor();
        a.vel_x = 2.0;
        let mut ring = Ring::new(0, 0);
        ring.state = RingState::Returning;
        ring.pos = Vec3::new(600.0, 400.0, 50.0);
        ring.update(&a, &mut target, &tuning, 0.0, &mut events);
        assert!((600.0 - ring.pos.x - tuning.ring_return_boost_speed).abs() < 1e-3);
    }

    #[test]
    fn test_trail_is_capped_and_fades() {
        let tuning = Tuning::default();
        let mut target = far_target(&tuning);
        let mut events = Events::new();
        let mut ring = Ring::new(0, 0);
        ring.state = RingState::Thrown;
        ring.pos = Vec3::new(200.0, 400.0, 50.0);
        ring.vel = Vec3::new(1.0, 0.0, 0.0);
        for _ in 0..10 {
            ring.update(&anchor(), &mut target, &tuning, 0.0, &mut events);
        }
        assert_eq!(ring.trail.len(), TRAIL_LENGTH);
        assert!(ring.trail[0].alpha < ring.trail[TRAIL_LENGTH - 1].alpha);
    }

    #[test]
    fn test_whip_extends_and_retracts_on_wall_clock() {
        let tuning = Tuning::default();
        let mut target = far_target(&tuning);
        let mut events = Events::new();
        let a = anchor();
        let mut ring = Ring::new(4, 0);
        ring.start_whip(1000.0, 0.0);

        // Half-way through the cycle the ring is at full reach
        ring.update(&a, &mut target, &tuning, 1700.0, &mut events);
        let reach = 5.0 * tuning.whip_spacing + tuning.whip_base_reach;
        assert!((ring.pos.x - (a.center.x + reach)).abs() < 1e-2);
        assert!(matches!(ring.state, RingState::Whip { .. }));

        // Past the cycle it goes home
        ring.update(&a, &mut target, &tuning, 2500.0, &mut events);
        assert_eq!(ring.state, RingState::Returning);
    }

    #[test]
    fn test_whip_hits_only_when_extended() {
        let tuning = Tuning::default();
        let mut events = Events::new();
        let a = anchor();
        let mut target = Fighter::new(FighterKind::Father, &tuning);
        // Ring 0 full reach is 80 units right of the owner center
        target.pos = Vec3::new(a.center.x + 60.0, 400.0, 0.0);

        let mut ring = Ring::new(0, 0);
        ring.start_whip(0.0, 0.0);
        // Early in the cycle: short reach, no hit
        ring.update(&a, &mut target, &tuning, 50.0, &mut events);
        assert_eq!(target.hp, tuning.max_hp);

        ring.update(&a, &mut target, &tuning, 700.0, &mut events);
        assert_eq!(target.hp, tuning.max_hp - tuning.whip_damage);
        assert!((target.vel.x - tuning.whip_push).abs() < 1e-4);
    }

    #[test]
    fn test_jump_boost_pins_then_returns() {
        let tuning = Tuning::default();
        let mut target = far_target(&tuning);
        let mut events = Events::new();
        let mut ring = Ring::new(0, 0);
        let pin = Vec3::new(127.5, 400.0, 0.0);
        ring.start_jump_boost(pin, 3);
        ring.pos = Vec3::new(0.0, 0.0, 0.0);
        ring.update(&anchor(), &mut target, &tuning, 0.0, &mut events);
        assert_eq!(ring.pos, pin);
        ring.update(&anchor(), &mut target, &tuning, 0.0, &mut events);
        ring.update(&anchor(), &mut target, &tuning, 0.0, &mut events);
        assert_eq!(ring.state, RingState::Returning);
    }
}
