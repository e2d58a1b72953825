//! Special knot effects and their deadlines
//!
//! Timed effects are tracked as simulated-time deadlines instead of platform
//! timers, so expiry happens inside [`super::advance`] and tests can step time
//! deterministically.

use serde::{Deserialize, Serialize};

use super::state::{SimEvent, SimState};
use crate::consts::*;
use crate::random_unit;

/// Global effect carried by a special knot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Effect {
    /// Halves the link distance for a while
    Disturb,
    /// Freezes every knot
    Stop,
    /// Turns link attraction into repulsion
    Expand,
    /// Placeholder for scoring
    Score,
    /// Destroys every unlinked knot at once
    Detonation,
}

impl Effect {
    pub const ALL: [Effect; 5] = [
        Effect::Disturb,
        Effect::Stop,
        Effect::Expand,
        Effect::Score,
        Effect::Detonation,
    ];

    /// Legacy integer code (also the number of star points drawn on the knot)
    pub fn code(self) -> u32 {
        match self {
            Effect::Disturb => 2,
            Effect::Stop => 3,
            Effect::Expand => 4,
            Effect::Score => 5,
            Effect::Detonation => 6,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            2 => Some(Effect::Disturb),
            3 => Some(Effect::Stop),
            4 => Some(Effect::Expand),
            5 => Some(Effect::Score),
            6 => Some(Effect::Detonation),
            _ => None,
        }
    }

    /// How long the effect lasts; `None` for instantaneous effects
    pub fn duration_ms(self) -> Option<f64> {
        match self {
            Effect::Disturb => Some(DISTURB_DURATION_MS),
            Effect::Stop => Some(STOP_DURATION_MS),
            Effect::Expand => Some(EXPAND_DURATION_MS),
            Effect::Score | Effect::Detonation => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Effect::Disturb => "disturb",
            Effect::Stop => "stop",
            Effect::Expand => "expand",
            Effect::Score => "score",
            Effect::Detonation => "detonation",
        }
    }
}

/// Point in simulated time at which a timed effect ends
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Deadline {
    pub at_ms: f64,
}

impl Deadline {
    pub fn after(now_ms: f64, duration_ms: f64) -> Self {
        Self {
            at_ms: now_ms + duration_ms,
        }
    }

    pub fn is_due(&self, now_ms: f64) -> bool {
        now_ms >= self.at_ms
    }
}

/// Pending restorations for the timed effects
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub disturb: Option<Deadline>,
    pub stop: Option<Deadline>,
    pub expand: Option<Deadline>,
}

impl ActiveEffects {
    pub fn is_active(&self, effect: Effect) -> bool {
        match effect {
            Effect::Disturb => self.disturb.is_some(),
            Effect::Stop => self.stop.is_some(),
            Effect::Expand => self.expand.is_some(),
            Effect::Score | Effect::Detonation => false,
        }
    }
}

/// Apply `effect` to the simulation.
///
/// `doomed` is the removal mask of the pointer pass in progress; detonation
/// marks every unlinked knot in it and bursts particles at each one.
pub(crate) fn fire(state: &mut SimState, effect: Effect, doomed: &mut [bool]) {
    let now = state.now_ms;
    match effect {
        Effect::Disturb => {
            if state.effects.disturb.is_some() {
                log::debug!("disturb already active, ignoring");
                return;
            }
            state.connect_distance_target = state.tuning.connect_distance * 0.5;
            state.effects.disturb = Some(Deadline::after(now, DISTURB_DURATION_MS));
        }
        Effect::Stop => {
            for knot in &mut state.knots {
                knot.direction = glam::Vec2::ZERO;
                knot.speed = 0.0;
            }
            state.min_speed = 0.0;
            state.effects.stop = Some(Deadline::after(now, STOP_DURATION_MS));
        }
        Effect::Expand => {
            state.gravitation = state.tuning.expand_gravitation;
            state.effects.expand = Some(Deadline::after(now, EXPAND_DURATION_MS));
        }
        Effect::Score => {}
        Effect::Detonation => {
            let mut destroyed = 0;
            for (index, knot) in state.knots.iter().enumerate() {
                if doomed[index] || knot.is_linked() {
                    continue;
                }
                doomed[index] = true;
                state.particles.spawn_burst(knot.position, &mut state.rng);
                state.events.push(SimEvent::KnotDestroyed {
                    position: knot.position,
                    special: None,
                });
                destroyed += 1;
            }
            log::debug!("detonation destroyed {} knots", destroyed);
        }
    }
    state.events.push(SimEvent::EffectStarted(effect));
}

/// Restore every effect whose deadline has passed
pub(crate) fn expire_due(state: &mut SimState) {
    let now = state.now_ms;

    if state.effects.disturb.is_some_and(|d| d.is_due(now)) {
        state.effects.disturb = None;
        state.connect_distance_target = state.tuning.connect_distance;
        state.events.push(SimEvent::EffectEnded(Effect::Disturb));
    }

    if state.effects.stop.is_some_and(|d| d.is_due(now)) {
        state.effects.stop = None;
        state.min_speed = state.tuning.min_speed;
        // Frozen knots need a heading to drift again
        for knot in &mut state.knots {
            if knot.direction == glam::Vec2::ZERO {
                knot.direction = random_unit(&mut state.rng);
            }
        }
        state.events.push(SimEvent::EffectEnded(Effect::Stop));
    }

    if state.effects.expand.is_some_and(|d| d.is_due(now)) {
        state.effects.expand = None;
        state.gravitation = state.tuning.gravitation;
        state.events.push(SimEvent::EffectEnded(Effect::Expand));
    }
}
