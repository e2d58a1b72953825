//! Frame driver
//!
//! Runs one simulation tick and one render pass per display refresh. The
//! platform owns the actual frame callback; it calls [`FrameDriver::frame`]
//! and keeps rescheduling while the returned outcome asks for it.

use std::collections::VecDeque;

use glam::Vec2;

use crate::consts::{DEFAULT_FRAME_MS, MAX_FRAME_MS};
use crate::renderer::{Surface, render};
use crate::sim::{SimEvent, SimState, advance};
use crate::tuning::Tuning;

/// Play/pause state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverPhase {
    Paused,
    Running,
}

/// What happened in a frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Paused; do not schedule another frame
    Paused,
    /// Surface missing; state untouched, try again next frame
    Skipped,
    /// Simulated and drew one frame
    Rendered,
}

impl FrameOutcome {
    pub fn reschedule(self) -> bool {
        !matches!(self, FrameOutcome::Paused)
    }
}

/// Frames averaged by [`FpsMeter`]
const FPS_WINDOW: usize = 60;

/// Rolling frames-per-second estimate
#[derive(Debug, Clone, Default)]
pub struct FpsMeter {
    deltas: VecDeque<f64>,
    last_timestamp: Option<f64>,
    fps: u32,
}

impl FpsMeter {
    pub fn record(&mut self, timestamp: f64) {
        if let Some(last) = self.last_timestamp {
            self.deltas.push_back(timestamp - last);
            if self.deltas.len() > FPS_WINDOW {
                self.deltas.pop_front();
            }
            let mean = self.deltas.iter().sum::<f64>() / self.deltas.len() as f64;
            if mean > 0.0 {
                self.fps = (1000.0 / mean).round() as u32;
            }
        }
        self.last_timestamp = Some(timestamp);
    }

    /// Forget the last timestamp so a pause does not count as one long frame
    pub fn reset_clock(&mut self) {
        self.last_timestamp = None;
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }
}

/// Owns the simulation and decides when it advances
#[derive(Debug, Clone)]
pub struct FrameDriver {
    pub state: SimState,
    phase: DriverPhase,
    last_timestamp: Option<f64>,
    fps: FpsMeter,
}

impl FrameDriver {
    pub fn new(seed: u64, tuning: Tuning, bounds: Vec2) -> Self {
        Self {
            state: SimState::new(seed, tuning, bounds),
            phase: DriverPhase::Running,
            last_timestamp: None,
            fps: FpsMeter::default(),
        }
    }

    pub fn phase(&self) -> DriverPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == DriverPhase::Running
    }

    pub fn fps(&self) -> u32 {
        self.fps.fps()
    }

    pub fn pause(&mut self) {
        if self.phase == DriverPhase::Running {
            self.phase = DriverPhase::Paused;
            log::info!("Paused at tick {}", self.state.time_ticks);
        }
    }

    /// Resume from the current state; the paused interval is not simulated
    pub fn resume(&mut self) {
        if self.phase == DriverPhase::Paused {
            self.phase = DriverPhase::Running;
            self.last_timestamp = None;
            self.fps.reset_clock();
            log::info!("Resumed at tick {}", self.state.time_ticks);
        }
    }

    /// Flip between running and paused; returns true if now running
    pub fn toggle(&mut self) -> bool {
        match self.phase {
            DriverPhase::Running => self.pause(),
            DriverPhase::Paused => self.resume(),
        }
        self.is_running()
    }

    /// Run one frame at `timestamp` (milliseconds, monotonic)
    pub fn frame<S: Surface + ?Sized>(&mut self, timestamp: f64, surface: &mut S) -> FrameOutcome {
        if self.phase == DriverPhase::Paused {
            return FrameOutcome::Paused;
        }
        let Some(size) = surface.size() else {
            return FrameOutcome::Skipped;
        };
        self.state.bounds = size;

        let dt = match self.last_timestamp {
            Some(last) => (timestamp - last).clamp(0.0, MAX_FRAME_MS),
            None => DEFAULT_FRAME_MS,
        };
        self.last_timestamp = Some(timestamp);
        self.fps.record(timestamp);

        advance(&mut self.state, dt);
        for event in self.state.drain_events() {
            log_event(&event);
        }
        render(&self.state, surface);

        FrameOutcome::Rendered
    }
}

fn log_event(event: &SimEvent) {
    match event {
        SimEvent::KnotDestroyed { position, special } => {
            log::debug!(
                "knot destroyed at ({:.0}, {:.0}), special: {:?}",
                position.x,
                position.y,
                special
            );
        }
        SimEvent::EffectStarted(effect) => log::info!("effect {} started", effect.name()),
        SimEvent::EffectEnded(effect) => log::info!("effect {} ended", effect.name()),
    }
}
