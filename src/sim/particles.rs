//! Short-lived debris spawned when a knot is destroyed

use glam::Vec2;
use rand::Rng;

use crate::consts::*;
use crate::random_unit;

/// A purely visual particle
#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec2,
    pub direction: Vec2,
    pub speed: f32,
    pub radius: f32,
    /// Ticks left; drawn at full opacity when fresh
    pub lifetime: i32,
}

impl Particle {
    /// Fill opacity, 1.0 when fresh and 0.0 once expired
    pub fn alpha(&self) -> f32 {
        (self.lifetime as f32 / PARTICLE_LIFETIME as f32).clamp(0.0, 1.0)
    }
}

/// All live particles, oldest first
#[derive(Debug, Clone, Default)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
}

impl ParticleSystem {
    /// Emit a burst of particles around `center`
    pub fn spawn_burst<R: Rng + ?Sized>(&mut self, center: Vec2, rng: &mut R) {
        self.particles.reserve(PARTICLE_BURST);
        for index in 0..PARTICLE_BURST {
            let jitter = Vec2::new(rng.random::<f32>() - 0.5, rng.random::<f32>() - 0.5);
            self.particles.push(Particle {
                position: center + jitter * PARTICLE_JITTER,
                direction: random_unit(rng),
                speed: PARTICLE_BASE_SPEED
                    + index as f32 * 0.001
                    + rng.random::<f32>() * PARTICLE_SPEED_SPREAD,
                radius: PARTICLE_RADIUS,
                lifetime: PARTICLE_LIFETIME,
            });
        }
    }

    /// Age every particle by one tick.
    ///
    /// As soon as any particle expires the oldest [`PARTICLE_EVICT_COUNT`]
    /// are dropped in one go, expired or not. Returns the number evicted.
    pub fn update(&mut self) -> usize {
        let mut expired = false;
        for particle in &mut self.particles {
            if particle.speed > PARTICLE_SPEED_FLOOR {
                particle.speed -= PARTICLE_DECELERATION;
            }
            particle.position += particle.direction * particle.speed;
            particle.radius = (particle.radius - PARTICLE_SHRINK).max(0.0);
            particle.lifetime -= 1;
            if particle.lifetime < 0 {
                expired = true;
            }
        }

        if !expired {
            return 0;
        }
        let count = PARTICLE_EVICT_COUNT.min(self.particles.len());
        self.particles.drain(..count);
        count
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}
