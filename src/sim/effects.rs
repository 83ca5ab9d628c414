//! Simulation-side visual effects
//!
//! Effect events are expanded here into short-lived particles, shockwaves,
//! and flashes that live in world space. Renderers can draw these directly
//! from the snapshot, or ignore them and build their own from the events.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::events::EffectKind;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParticleKind {
    /// Bouncy glowing dot
    Spark,
    /// Ground-hugging cloud that expands
    Dust,
    /// Static scorch mark
    Crater,
    /// Upward energy streak
    Spike,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ShockwaveKind {
    Normal,
    Burst,
    Jump,
}

/// Shape-specific effect data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum EffectBody {
    Particle {
        kind: ParticleKind,
        vel: Vec3,
        size: f32,
    },
    Shockwave {
        kind: ShockwaveKind,
        radius: f32,
        line_width: f32,
        growth: f32,
    },
    /// White core with a colored glow
    Flash { size: f32 },
}

/// A live effect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Effect {
    pub pos: Vec3,
    pub color: u32,
    /// 1.0 at spawn, removed at <= 0
    pub life: f32,
    pub body: EffectBody,
}

impl Effect {
    /// A particle with random scatter velocity and size
    pub fn particle(pos: Vec3, color: u32, kind: ParticleKind, rng: &mut impl Rng) -> Self {
        let vel = Vec3::new(
            rng.random_range(-5.0..5.0),
            rng.random_range(-5.0..5.0),
            rng.random_range(-5.0..5.0),
        );
        Self {
            pos,
            color,
            life: 1.0,
            body: EffectBody::Particle {
                kind,
                vel,
                size: rng.random_range(2.0..7.0),
            },
        }
    }

    pub fn shockwave(pos: Vec3, color: u32, kind: ShockwaveKind) -> Self {
        let (radius, line_width, growth) = match kind {
            ShockwaveKind::Normal => (10.0, 4.0, 12.0),
            ShockwaveKind::Burst => (20.0, 8.0, 25.0),
            ShockwaveKind::Jump => (20.0, 8.0, 15.0),
        };
        Self {
            pos,
            color,
            life: 1.0,
            body: EffectBody::Shockwave {
                kind,
                radius,
                line_width,
                growth,
            },
        }
    }

    pub fn flash(pos: Vec3, glow: u32, size: f32) -> Self {
        Self {
            pos,
            color: glow,
            life: 1.0,
            body: EffectBody::Flash { size },
        }
    }

    /// Short type name for renderers and logs
    pub fn kind_name(&self) -> &'static str {
        match self.body {
            EffectBody::Particle { kind, .. } => match kind {
                ParticleKind::Spark => "spark",
                ParticleKind::Dust => "dust",
                ParticleKind::Crater => "crater",
                ParticleKind::Spike => "spike",
            },
            EffectBody::Shockwave { .. } => "shockwave",
            EffectBody::Flash { .. } => "flash",
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// Advance one tick
    pub fn update(&mut self, tuning: &Tuning) {
        match &mut self.body {
            EffectBody::Particle { kind, vel, size } => match kind {
                ParticleKind::Crater => {
                    self.life -= 0.03;
                }
                ParticleKind::Dust => {
                    self.pos += *vel;
                    vel.x *= 0.85;
                    vel.y *= 0.85;
                    *size *= 1.05;
                    self.life -= 0.03;
                }
                ParticleKind::Spark | ParticleKind::Spike => {
                    self.pos += *vel;
                    vel.z -= tuning.gravity * 0.5;
                    vel.x *= 0.95;
                    vel.y *= 0.95;

                    if self.pos.y > tuning.floor_bottom && vel.z < 0.0 {
                        self.pos.y = tuning.floor_bottom;
                        vel.z *= -0.6;
                        vel.x *= 0.8;
                    }
                    if self.pos.z < 0.0 {
                        self.pos.z = 0.0;
                        vel.z *= -0.6;
                        vel.x *= 0.8;
                    }

                    self.life -= 0.04;
                    *size *= 0.95;
                }
            },
            EffectBody::Shockwave {
                radius,
                line_width,
                growth,
                ..
            } => {
                *radius += *growth;
                *line_width *= 0.9;
                *growth *= 0.9;
                self.life -= 0.08;
            }
            EffectBody::Flash { .. } => {
                self.life -= 0.2;
            }
        }
    }
}

/// Expand one effect event into live effects, evicting the oldest past `tuning.max_effects`
pub fn spawn(
    effects: &mut Vec<Effect>,
    kind: EffectKind,
    pos: Vec3,
    color: u32,
    tuning: &Tuning,
    rng: &mut impl Rng,
) {
    match kind {
        EffectKind::Hit => {
            effects.push(Effect::flash(pos, color, 30.0));
            effects.push(Effect::shockwave(pos, color, ShockwaveKind::Normal));
            for _ in 0..6 {
                effects.push(Effect::particle(pos, color, ParticleKind::Spark, rng));
            }
        }
        EffectKind::BurstHit => {
            effects.push(Effect::flash(pos, color, 60.0));
            effects.push(Effect::shockwave(pos, color, ShockwaveKind::Burst));
            for _ in 0..15 {
                effects.push(Effect::particle(pos, color, ParticleKind::Spark, rng));
                effects.push(Effect::particle(pos, 0xffffff, ParticleKind::Spark, rng));
            }
        }
        EffectKind::Shockwave => {
            effects.push(Effect::shockwave(pos, color, ShockwaveKind::Burst));
            for _ in 0..10 {
                effects.push(Effect::particle(pos, color, ParticleKind::Spark, rng));
            }
        }
        EffectKind::JumpLaunch => spawn_jump_launch(effects, pos, color, rng),
        EffectKind::Spark => {
            effects.push(Effect::particle(pos, color, ParticleKind::Spark, rng));
        }
    }

    if effects.len() > tuning.max_effects {
        let excess = effects.len() - tuning.max_effects;
        effects.drain(..excess);
    }
}

/// Double shockwave, crater, radial dust, and upward spikes
fn spawn_jump_launch(effects: &mut Vec<Effect>, pos: Vec3, color: u32, rng: &mut impl Rng) {
    effects.push(Effect::shockwave(pos, color, ShockwaveKind::Jump));
    let mut outer = Effect::shockwave(pos, color, ShockwaveKind::Jump);
    if let EffectBody::Shockwave {
        radius, line_width, ..
    } = &mut outer.body
    {
        *radius = 35.0;
        *line_width = 6.0;
    }
    effects.push(outer);

    effects.push(Effect {
        pos,
        color: 0x000000,
        life: 1.0,
        body: EffectBody::Particle {
            kind: ParticleKind::Crater,
            vel: Vec3::ZERO,
            size: 40.0,
        },
    });

    const DUST_CLOUDS: usize = 12;
    for i in 0..DUST_CLOUDS {
        let angle = std::f32::consts::TAU / DUST_CLOUDS as f32 * i as f32;
        let speed = rng.random_range(6.0..11.0);
        let plan = crate::polar_to_cartesian(speed, angle);
        effects.push(Effect {
            pos,
            color: 0xaaaaaa,
            life: 1.0,
            body: EffectBody::Particle {
                kind: ParticleKind::Dust,
                vel: Vec3::new(plan.x, plan.y, rng.random_range(0.0..3.0)),
                size: rng.random_range(15.0..25.0),
            },
        });
    }

    for _ in 0..6 {
        let offset = Vec3::new(rng.random_range(-15.0..15.0), rng.random_range(-7.5..7.5), 0.0);
        effects.push(Effect {
            pos: pos + offset,
            color,
            life: 1.0,
            body: EffectBody::Particle {
                kind: ParticleKind::Spike,
                vel: Vec3::new(0.0, 0.0, rng.random_range(20.0..30.0)),
                size: 15.0,
            },
        });
    }
}

/// Advance all effects and drop the dead ones
pub fn update_all(effects: &mut Vec<Effect>, tuning: &Tuning) {
    for effect in effects.iter_mut() {
        effect.update(tuning);
    }
    effects.retain(Effect::is_alive);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn spawned(kind: EffectKind) -> Vec<Effect> {
        let tuning = Tuning::default();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut effects = Vec::new();
        spawn(&mut effects, kind, Vec3::new(500.0, 400.0, 50.0), 0xffd700, &tuning, &mut rng);
        effects
    }

    #[test]
    fn test_recipe_sizes() {
        assert_eq!(spawned(EffectKind::Hit).len(), 8);
        assert_eq!(spawned(EffectKind::BurstHit).len(), 32);
        assert_eq!(spawned(EffectKind::Shockwave).len(), 11);
        assert_eq!(spawned(EffectKind::JumpLaunch).len(), 2 + 1 + 12 + 6);
        assert_eq!(spawned(EffectKind::Spark).len(), 1);
    }

    #[test]
    fn test_jump_launch_outer_ring() {
        let effects = spawned(EffectKind::JumpLaunch);
        let radii: Vec<f32> = effects
            .iter()
            .filter_map(|e| match e.body {
                EffectBody::Shockwave { radius, .. } => Some(radius),
                _ => None,
            })
            .collect();
        assert_eq!(radii, vec![20.0, 35.0]);
        assert_eq!(effects.iter().filter(|e| e.kind_name() == "dust").count(), 12);
        assert_eq!(effects.iter().filter(|e| e.kind_name() == "spike").count(), 6);
    }

    #[test]
    fn test_everything_expires() {
        let tuning = Tuning::default();
        let mut effects = spawned(EffectKind::BurstHit);
        effects.extend(spawned(EffectKind::JumpLaunch));
        // Slowest decay is 0.03 per tick
        for _ in 0..34 {
            update_all(&mut effects, &tuning);
        }
        assert!(effects.is_empty());
    }

    #[test]
    fn test_flash_is_short_lived() {
        let tuning = Tuning::default();
        let mut effects = vec![Effect::flash(Vec3::ZERO, 0xffffff, 30.0)];
        for _ in 0..4 {
            update_all(&mut effects, &tuning);
        }
        assert_eq!(effects.len(), 1);
        update_all(&mut effects, &tuning);
        update_all(&mut effects, &tuning);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_spark_bounces_off_ground() {
        let tuning = Tuning::default();
        let mut spark = Effect {
            pos: Vec3::new(0.0, 400.0, 1.0),
            color: 0,
            life: 1.0,
            body: EffectBody::Particle {
                kind: ParticleKind::Spark,
                vel: Vec3::new(0.0, 0.0, -3.0),
                size: 4.0,
            },
        };
        spark.update(&tuning);
        assert_eq!(spark.pos.z, 0.0);
        let EffectBody::Particle { vel, .. } = spark.body else {
            panic!("expected particle");
        };
        assert!(vel.z > 0.0);
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let tuning = Tuning {
            max_effects: 10,
            ..Tuning::default()
        };
        let mut rng = Pcg32::seed_from_u64(5);
        let mut effects = Vec::new();
        spawn(&mut effects, EffectKind::Hit, Vec3::ZERO, 0x111111, &tuning, &mut rng);
        spawn(&mut effects, EffectKind::Hit, Vec3::ZERO, 0x222222, &tuning, &mut rng);
        assert_eq!(effects.len(), 10);
        // 6 of the first burst were evicted, the newest 8 all survive
        assert_eq!(effects.iter().filter(|e| e.color == 0x222222).count(), 8);
    }
}
