//! Spectrum analysis configuration.

use serde::Deserialize;

use crate::error::ConfigError;

/// Smallest and largest transform sizes the analyser accepts
pub const MIN_FFT_SIZE: usize = 32;
pub const MAX_FFT_SIZE: usize = 32768;

/// Frequency analysis tap configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalyserConfig {
    /// FFT window size (must be power of 2)
    /// 256 = 128 frequency bins, tight enough for bass reads at 60 fps
    pub fft_size: usize,

    /// Per-bin averaging constant between successive polls (0 = none, 1 = frozen)
    pub smoothing_time_constant: f32,

    /// Magnitude mapped to byte 0 (dBFS)
    pub min_decibels: f32,

    /// Magnitude mapped to byte 255 (dBFS)
    pub max_decibels: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 256,
            smoothing_time_constant: 0.6,
            min_decibels: -85.0,
            max_decibels: -30.0,
        }
    }
}

impl AnalyserConfig {
    /// Number of magnitude bins produced per poll (half the FFT size)
    pub fn frequency_bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Validate configuration (FFT size must be power of 2, etc.)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fft_size.is_power_of_two()
            || !(MIN_FFT_SIZE..=MAX_FFT_SIZE).contains(&self.fft_size)
        {
            return Err(ConfigError::invalid(
                "analyser.fft_size",
                format!(
                    "must be a power of 2 in {}..={}, got {}",
                    MIN_FFT_SIZE, MAX_FFT_SIZE, self.fft_size
                ),
            ));
        }
        if !(0.0..=1.0).contains(&self.smoothing_time_constant) {
            return Err(ConfigError::invalid(
                "analyser.smoothing_time_constant",
                format!("must be in 0..=1, got {}", self.smoothing_time_constant),
            ));
        }
        if self.min_decibels >= self.max_decibels {
            return Err(ConfigError::invalid(
                "analyser.min_decibels",
                format!(
                    "must be below max_decibels ({} >= {})",
                    self.min_decibels, self.max_decibels
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bin_count() {
        let config = AnalyserConfig::default();
        assert_eq!(config.frequency_bin_count(), 128);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        let config = AnalyserConfig {
            fft_size: 300,
            ..AnalyserConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_decibel_range() {
        let config = AnalyserConfig {
            min_decibels: -20.0,
            max_decibels: -30.0,
            ..AnalyserConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
