//! Scroll momentum parameters.

use serde::Deserialize;

use crate::error::ConfigError;

/// Wheel momentum → discrete index advance
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MomentumConfig {
    /// Accumulated wheel distance that triggers one advance (pixels)
    pub threshold: f32,

    /// Multiplicative decay applied once per frame (dimensionless, 0..1)
    pub decay: f32,

    /// Magnitude at or below which the accumulator snaps to 0 and ticking stops
    pub rest_epsilon: f32,

    /// Wheel distance reported for one line-based wheel notch (pixels)
    pub pixels_per_line: f32,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            threshold: 80.0,
            decay: 0.6,
            rest_epsilon: 1.0,
            pixels_per_line: 100.0,
        }
    }
}

impl MomentumConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.threshold > self.rest_epsilon) {
            return Err(ConfigError::invalid(
                "momentum.threshold",
                format!(
                    "must exceed rest_epsilon ({} <= {})",
                    self.threshold, self.rest_epsilon
                ),
            ));
        }
        if !(self.decay > 0.0 && self.decay < 1.0) {
            return Err(ConfigError::invalid(
                "momentum.decay",
                format!("must be in (0, 1), got {}", self.decay),
            ));
        }
        if self.rest_epsilon < 0.0 {
            return Err(ConfigError::invalid(
                "momentum.rest_epsilon",
                "must be non-negative",
            ));
        }
        Ok(())
    }
}
