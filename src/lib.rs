//! Knot Web - an interactive web of drifting knots
//!
//! Core modules:
//! - `sim`: Deterministic simulation (knots, links, particles, effects)
//! - `renderer`: Drawing surface abstraction, shapes and the scene pass
//! - `platform`: Browser/native input normalization
//! - `driver`: Frame driver gluing simulation and rendering together
//! - `tuning`: Data-driven simulation parameters

pub mod driver;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use driver::{DriverPhase, FpsMeter, FrameDriver, FrameOutcome};
pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

use glam::Vec2;
use rand::Rng;

/// Simulation constants that are not exposed through [`Tuning`]
pub mod consts {
    /// Frame length used when no previous timestamp is known (60 Hz)
    pub const DEFAULT_FRAME_MS: f64 = 1000.0 / 60.0;
    /// Longest frame the driver will feed into the simulation
    pub const MAX_FRAME_MS: f64 = 100.0;

    /// Connect distance moves this many units per tick toward its target
    pub const CONNECT_EASE_STEP: f32 = 1.0;

    /// Particles spawned per destroyed knot
    pub const PARTICLE_BURST: usize = 96;
    /// Particles evicted from the front once any particle expires
    pub const PARTICLE_EVICT_COUNT: usize = 100;
    /// Lifetime of a fresh particle, in ticks
    pub const PARTICLE_LIFETIME: i32 = 60;
    /// Width of the square a burst is jittered inside
    pub const PARTICLE_JITTER: f32 = 12.0;
    pub const PARTICLE_RADIUS: f32 = 3.0;
    pub const PARTICLE_BASE_SPEED: f32 = 3.0;
    pub const PARTICLE_SPEED_SPREAD: f32 = 3.0;
    /// Particles stop decelerating at this speed
    pub const PARTICLE_SPEED_FLOOR: f32 = 1.5;
    pub const PARTICLE_DECELERATION: f32 = 0.1;
    pub const PARTICLE_SHRINK: f32 = 0.03;

    /// Effect durations (simulated milliseconds)
    pub const DISTURB_DURATION_MS: f64 = 3333.0;
    pub const STOP_DURATION_MS: f64 = 1111.0;
    pub const EXPAND_DURATION_MS: f64 = 7777.0;

    /// Control point factor for a quarter circle drawn as a cubic Bézier
    pub const BEZIER_CIRCLE_K: f32 = 0.552;
}

/// Clamp `value` into `[min, max]`, or wrap it around the range when `wrap` is set.
///
/// Wrapping treats the range as half-open, so `max` itself maps back to `min`.
#[inline]
pub fn clamp_range(value: f32, min: f32, max: f32, wrap: bool) -> f32 {
    if wrap {
        let span = max - min;
        if span <= 0.0 {
            return min;
        }
        min + (value - min).rem_euclid(span)
    } else {
        value.max(min).min(max)
    }
}

/// Uniformly distributed unit vector
#[inline]
pub fn random_unit<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    Vec2::new(angle.cos(), angle.sin())
}

/// Unit vector pointing from `origin` toward `pos`, `Vec2::X` when they coincide
#[inline]
pub fn away_from(pos: Vec2, origin: Vec2) -> Vec2 {
    (pos - origin).try_normalize().unwrap_or(Vec2::X)
}
