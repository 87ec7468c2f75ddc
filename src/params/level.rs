//! Energy extraction and level smoothing parameters.

use serde::Deserialize;

use crate::error::ConfigError;

/// Bounds the idle breathing signal must stay within
pub const IDLE_MIN: f32 = 0.1;
pub const IDLE_MAX: f32 = 0.25;

/// Bass-band extraction and smoothing of the energy level
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Fraction of the lowest bins averaged into the level (bass band)
    pub band_fraction: f32,

    /// Floor on the band width so short transforms keep a usable band
    pub min_bins: usize,

    /// Low-pass factor per frame: next = lerp(current, raw, smoothing)
    pub smoothing: f32,

    /// Level the smoother starts from before any frame runs
    pub baseline: f32,

    /// Idle breathing floor (dimensionless level)
    pub idle_floor: f32,

    /// Idle breathing half-swing; the signal spans floor..floor + 2 * amplitude
    pub idle_amplitude: f32,

    /// Idle breathing angular rate (radians per second)
    pub idle_rate: f32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            band_fraction: 0.18,
            min_bins: 12,
            smoothing: 0.18,
            baseline: 0.12,
            idle_floor: 0.1,
            idle_amplitude: 0.07,
            idle_rate: 0.6,
        }
    }
}

impl LevelConfig {
    /// Lowest and highest idle breathing level
    pub fn idle_range(&self) -> (f32, f32) {
        (self.idle_floor, self.idle_floor + 2.0 * self.idle_amplitude)
    }

    /// Steepest change of the idle signal (level units per second)
    pub fn idle_max_slope(&self) -> f32 {
        self.idle_amplitude * self.idle_rate
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.band_fraction > 0.0 && self.band_fraction <= 1.0) {
            return Err(ConfigError::invalid(
                "level.band_fraction",
                format!("must be in (0, 1], got {}", self.band_fraction),
            ));
        }
        if self.min_bins == 0 {
            return Err(ConfigError::invalid("level.min_bins", "must be > 0"));
        }
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(ConfigError::invalid(
                "level.smoothing",
                format!("must be in (0, 1], got {}", self.smoothing),
            ));
        }
        if self.idle_amplitude < 0.0 {
            return Err(ConfigError::invalid(
                "level.idle_amplitude",
                format!("must be non-negative, got {}", self.idle_amplitude),
            ));
        }
        if self.idle_rate < 0.0 {
            return Err(ConfigError::invalid(
                "level.idle_rate",
                format!("must be non-negative, got {}", self.idle_rate),
            ));
        }
        let (low, high) = self.idle_range();
        if low < IDLE_MIN || high > IDLE_MAX {
            return Err(ConfigError::invalid(
                "level.idle_floor",
                format!("idle signal spans {low}..{high}, must stay within {IDLE_MIN}..{IDLE_MAX}"),
            ));
        }
        Ok(())
    }
}
