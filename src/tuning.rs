//! Data-driven simulation parameters
//!
//! Everything a designer may want to tweak lives in [`Tuning`]. Values are
//! plain JSON so they can be stored next to the settings or loaded from disk.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Simulation balance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Pointer influence radius
    pub range: f32,
    /// Pointer push strength
    pub power: f32,
    /// Radius of an unlinked knot
    pub knot_radius: f32,
    /// Stroke width for links, and the smallest radius a knot shrinks to
    pub line_width: f32,
    /// Baseline proximity threshold for links
    pub connect_distance: f32,
    /// Baseline speed floor
    pub min_speed: f32,
    pub max_speed: f32,
    /// Speed lost per tick above the floor
    pub damping: f32,
    /// Speed gained per tick below the floor
    pub speed_recovery: f32,
    /// Link pull per unit of separation
    pub attraction: f32,
    /// Baseline link gravitation (positive attracts)
    pub gravitation: f32,
    /// Gravitation while the expand effect is active
    pub expand_gravitation: f32,
    /// Direction scale applied on a wall bounce
    pub bounce_damping: f32,
    /// Probability that a spawned knot carries a special effect
    pub special_chance: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            range: 120.0,
            power: 64.0,
            knot_radius: 32.0,
            line_width: 5.0,
            connect_distance: 140.0,
            min_speed: 0.3,
            max_speed: 5.0,
            damping: 0.005,
            speed_recovery: 0.01,
            attraction: 0.00008,
            gravitation: 1.0,
            expand_gravitation: -8.0,
            bounce_damping: 0.8,
            special_chance: 0.15,
        }
    }
}

/// Errors that can occur while loading tuning data.
#[derive(Debug)]
pub enum TuningError {
    /// Failed to read the tuning file.
    Io(std::io::Error),
    /// The file is not valid tuning JSON.
    Parse(serde_json::Error),
    /// A parameter is out of its allowed range.
    Invalid(String),
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::Io(e) => write!(f, "Failed to read tuning file: {}", e),
            TuningError::Parse(e) => write!(f, "Failed to parse tuning: {}", e),
            TuningError::Invalid(msg) => write!(f, "Invalid tuning: {}", msg),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TuningError::Io(e) => Some(e),
            TuningError::Parse(e) => Some(e),
            TuningError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for TuningError {
    fn from(e: std::io::Error) -> Self {
        TuningError::Io(e)
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(e: serde_json::Error) -> Self {
        TuningError::Parse(e)
    }
}

impl Tuning {
    /// Parse and validate tuning JSON. Missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read tuning JSON from a file
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check parameter ranges the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        let finite = [
            ("power", self.power),
            ("min_speed", self.min_speed),
            ("damping", self.damping),
            ("speed_recovery", self.speed_recovery),
            ("attraction", self.attraction),
            ("gravitation", self.gravitation),
            ("expand_gravitation", self.expand_gravitation),
            ("bounce_damping", self.bounce_damping),
            ("special_chance", self.special_chance),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(TuningError::Invalid(format!("{name} must be finite, got {value}")));
            }
        }
        let positive = [
            ("range", self.range),
            ("knot_radius", self.knot_radius),
            ("line_width", self.line_width),
            ("connect_distance", self.connect_distance),
            ("max_speed", self.max_speed),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TuningError::Invalid(format!("{name} must be positive, got {value}")));
            }
        }
        if !(self.min_speed >= 0.0 && self.min_speed <= self.max_speed) {
            return Err(TuningError::Invalid(format!(
                "min_speed {} must lie in [0, max_speed {}]",
                self.min_speed, self.max_speed
            )));
        }
        if self.damping < 0.0 || self.speed_recovery <= 0.0 {
            return Err(TuningError::Invalid(
                "damping must be >= 0 and speed_recovery > 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.special_chance) {
            return Err(TuningError::Invalid(format!(
                "special_chance must be a probability, got {}",
                self.special_chance
            )));
        }
        if !(0.0..=1.0).contains(&self.bounce_damping) {
            return Err(TuningError::Invalid(format!(
                "bounce_damping must lie in [0, 1], got {}",
                self.bounce_damping
            )));
        }
        Ok(())
    }
}
