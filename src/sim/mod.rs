//! Deterministic simulation module
//!
//! All knot behaviour lives here. This module must stay headless:
//! - Seeded RNG only
//! - Timers are simulated deadlines, never wall-clock callbacks
//! - No rendering or platform dependencies

pub mod effects;
pub mod particles;
pub mod state;
pub mod tick;

pub use effects::{ActiveEffects, Deadline, Effect};
pub use particles::{Particle, ParticleSystem};
pub use state::{Knot, Link, PointerState, SimEvent, SimState, radius_for_energy};
pub use tick::advance;
