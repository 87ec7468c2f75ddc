//! Level smoother: first-order low-pass over the per-frame bass level.
//!
//! Runs once per frame whether or not audio is playing. Without a live
//! spectrum the raw input is a slow "breathing" sine, so the visuals never
//! freeze, and switching between the two sources is absorbed by the same
//! smoothing step.

use super::energy;
use super::sampler::Spectrum;
use crate::params::LevelConfig;

/// Idle breathing level at wall-clock time `elapsed_s`
///
/// `floor + (sin(t * rate) + 1) * amplitude`
pub fn idle_level(config: &LevelConfig, elapsed_s: f64) -> f32 {
    let phase = (elapsed_s * f64::from(config.idle_rate)).sin() as f32;
    config.idle_floor + (phase + 1.0) * config.idle_amplitude
}

/// Smoothed energy level carried across frames
#[derive(Debug, Clone)]
pub struct LevelSmoother {
    config: LevelConfig,
    smoothed: f32,
}

impl LevelSmoother {
    pub fn new(config: LevelConfig) -> Self {
        Self {
            smoothed: config.baseline,
            config,
        }
    }

    pub fn config(&self) -> &LevelConfig {
        &self.config
    }

    /// Current smoothed level
    pub fn level(&self) -> f32 {
        self.smoothed
    }

    /// Raw (unsmoothed) level for this frame
    pub fn raw_level(&self, spectrum: Spectrum<'_>, elapsed_s: f64) -> f32 {
        match spectrum {
            Spectrum::Live(bins) => {
                energy::extract_with_floor(bins, self.config.band_fraction, self.config.min_bins)
            }
            Spectrum::Idle => idle_level(&self.config, elapsed_s),
        }
    }

    /// Advance one frame toward `raw`
    pub fn step(&mut self, raw: f32) -> f32 {
        if raw.is_finite() {
            self.smoothed += (raw - self.smoothed) * self.config.smoothing;
        }
        self.smoothed
    }

    /// Extract this frame's raw level and advance one frame
    pub fn update(&mut self, spectrum: Spectrum<'_>, elapsed_s: f64) -> f32 {
        let raw = self.raw_level(spectrum, elapsed_s);
        self.step(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_step_from_baseline() {
        let mut smoother = LevelSmoother::new(LevelConfig::default());
        assert_eq!(smoother.level(), 0.12);

        let next = smoother.step(1.0);
        // 0.12 + 0.18 * (1.0 - 0.12)
        assert!((next - 0.2784).abs() < 1e-6);
    }

    #[test]
    fn test_live_spectrum_drives_level() {
        let mut smoother = LevelSmoother::new(LevelConfig::default());
        let bins = [255u8; 128];
        for _ in 0..200 {
            smoother.update(Spectrum::Live(&bins), 0.0);
        }
        assert!((smoother.level() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_idle_range() {
        let config = LevelConfig::default();
        for i in 0..2000 {
            let level = idle_level(&config, i as f64 * 0.05);
            assert!((0.1..=0.24 + 1e-6).contains(&level), "idle level {level}");
        }
    }

    #[test]
    fn test_non_finite_raw_is_ignored() {
        let mut smoother = LevelSmoother::new(LevelConfig::default());
        assert_eq!(smoother.step(f32::NAN), 0.12);
    }

    #[test]
    fn test_losing_the_tap_moves_at_most_one_step() {
        let config = LevelConfig::default();
        let mut smoother = LevelSmoother::new(config.clone());
        let loud = [255u8; 128];
        for _ in 0..50 {
            smoother.update(Spectrum::Live(&loud), 1.0);
        }
        let before = smoother.level();
        let after = smoother.update(Spectrum::Idle, 1.0);

        let idle = idle_level(&config, 1.0);
        let max_jump = config.smoothing * (before - idle).abs();
        assert!((before - after).abs() <= max_jump + 1e-6);
    }
}
