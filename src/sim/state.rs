//! Simulation state and core entity types
//!
//! One [`SimState`] owns everything the frame step touches: the knot
//! population, the particle system, effect deadlines and the pointer sample.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::effects::{ActiveEffects, Effect};
use super::particles::ParticleSystem;
use crate::platform::input::PointerSample;
use crate::random_unit;
use crate::tuning::Tuning;

/// Proximity edge from a knot to a later knot in the population
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    /// Position of the linked knot when the link was built
    pub target: Vec2,
    pub distance: f32,
}

/// A simulated node
#[derive(Debug, Clone)]
pub struct Knot {
    pub position: Vec2,
    /// Heading; unit length unless link attraction stretched it
    pub direction: Vec2,
    pub speed: f32,
    pub radius: f32,
    /// Links to later knots only, rebuilt every tick
    pub links: Vec<Link>,
    /// Sum of `connect_distance - distance` over `links`
    pub link_energy: f32,
    /// Links touching this knot from either side
    pub neighbors: usize,
    pub special: Option<Effect>,
}

impl Knot {
    pub fn new(position: Vec2, direction: Vec2, speed: f32, radius: f32) -> Self {
        Self {
            position,
            direction,
            speed,
            radius,
            links: Vec::new(),
            link_energy: 0.0,
            neighbors: 0,
            special: None,
        }
    }

    /// True while any other knot is within link distance
    pub fn is_linked(&self) -> bool {
        self.neighbors > 0
    }
}

/// Radius a knot takes on for a given link energy
///
/// Highly connected knots shrink, but never below the link stroke width.
#[inline]
pub fn radius_for_energy(base_radius: f32, link_energy: f32, line_width: f32) -> f32 {
    ((base_radius * 10.0 - link_energy).round() * 0.1).max(line_width)
}

/// Latest pointer state as seen by the simulation
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerState {
    pub position: Vec2,
    pub pressed: bool,
}

/// Things that happened during a tick, drained by the frame driver
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    KnotDestroyed {
        position: Vec2,
        special: Option<Effect>,
    },
    EffectStarted(Effect),
    EffectEnded(Effect),
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct SimState {
    /// Seed the RNG was created from
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub tuning: Tuning,
    /// Drawing surface size
    pub bounds: Vec2,
    /// Live knots in insertion order
    pub knots: Vec<Knot>,
    pub particles: ParticleSystem,
    /// Current link threshold, eased toward `connect_distance_target`
    pub connect_distance: f32,
    pub connect_distance_target: f32,
    /// Link attraction multiplier (negative repels)
    pub gravitation: f32,
    /// Current speed floor (lowered by the stop effect)
    pub min_speed: f32,
    pub pointer: PointerState,
    pub effects: ActiveEffects,
    /// Simulated clock
    pub now_ms: f64,
    pub time_ticks: u64,
    pub events: Vec<SimEvent>,
}

impl SimState {
    pub fn new(seed: u64, tuning: Tuning, bounds: Vec2) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            connect_distance: tuning.connect_distance,
            connect_distance_target: tuning.connect_distance,
            gravitation: tuning.gravitation,
            min_speed: tuning.min_speed,
            tuning,
            bounds,
            knots: Vec::new(),
            particles: ParticleSystem::default(),
            pointer: PointerState::default(),
            effects: ActiveEffects::default(),
            now_ms: 0.0,
            time_ticks: 0,
            events: Vec::new(),
        }
    }

    /// Spawn a batch of knots at random positions inside the bounds
    pub fn spawn_knots(&mut self, amount: usize) {
        self.knots.reserve(amount);
        for index in 0..amount {
            let position = Vec2::new(
                self.rng.random::<f32>() * self.bounds.x,
                self.rng.random::<f32>() * self.bounds.y,
            );
            let direction = random_unit(&mut self.rng);
            // Start at or above the floor; recovery from below is only for stop
            let speed = self.min_speed
                + self.rng.random::<f32>()
                + index as f32 * 0.05 * self.min_speed;
            let speed = speed.min(self.tuning.max_speed);
            let mut knot = Knot::new(position, direction, speed, self.tuning.knot_radius);
            if self.rng.random::<f32>() < self.tuning.special_chance {
                let pick = self.rng.random_range(0..Effect::ALL.len());
                knot.special = Some(Effect::ALL[pick]);
            }
            self.knots.push(knot);
        }
        log::debug!("spawned {} knots ({} total)", amount, self.knots.len());
    }

    /// Spawn one knot at a fixed position, resting at the speed floor
    pub fn spawn_knot(&mut self, position: Vec2, direction: Vec2, special: Option<Effect>) {
        let mut knot = Knot::new(
            position,
            direction.try_normalize().unwrap_or(Vec2::X),
            self.min_speed,
            self.tuning.knot_radius,
        );
        knot.special = special;
        self.knots.push(knot);
    }

    /// Apply a pointer sample; a missing press state keeps the previous one
    pub fn apply_pointer(&mut self, sample: PointerSample) {
        self.pointer.position = sample.position;
        if let Some(pressed) = sample.pressed {
            self.pointer.pressed = pressed;
        }
    }

    /// Rebuild every knot's links from current positions.
    ///
    /// Each pair is stored once, on the earlier knot. `neighbors` counts both ends.
    pub fn rebuild_links(&mut self) {
        let connect_distance = self.connect_distance;
        let positions: Vec<Vec2> = self.knots.iter().map(|k| k.position).collect();
        let mut neighbors = vec![0usize; positions.len()];

        for (i, knot) in self.knots.iter_mut().enumerate() {
            knot.links.clear();
            knot.link_energy = 0.0;
            for (j, &target) in positions.iter().enumerate().skip(i + 1) {
                let distance = positions[i].distance(target);
                if distance < connect_distance {
                    knot.links.push(Link { target, distance });
                    knot.link_energy += connect_distance - distance;
                    neighbors[i] += 1;
                    neighbors[j] += 1;
                }
            }
        }

        for (knot, count) in self.knots.iter_mut().zip(neighbors) {
            knot.neighbors = count;
        }
    }

    /// Total number of stored links
    pub fn link_count(&self) -> usize {
        self.knots.iter().map(|k| k.links.len()).sum()
    }

    /// Take the events recorded since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }
}
