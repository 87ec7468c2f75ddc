//! Frequency analysis tap over the playback output.
//!
//! Windowed FFT over the newest samples of the output ring, with per-bin
//! temporal smoothing and decibel → byte quantization, so consumers only
//! ever see a fixed-size array of magnitudes in 0..=255.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use tracing::debug;

use super::ring::SharedRing;
use crate::params::AnalyserConfig;

/// Narrow capability the sampler depends on
pub trait AnalysisTap {
    /// Number of magnitude bins written by `frequency_magnitudes`
    fn frequency_bin_count(&self) -> usize;

    /// Fill the caller's buffer with the current magnitude bytes
    ///
    /// Writes `min(out.len(), frequency_bin_count())` entries.
    fn frequency_magnitudes(&mut self, out: &mut [u8]);
}

/// Blackman window coefficient (alpha = 0.16)
pub fn blackman_window(index: usize, size: usize) -> f32 {
    const ALPHA: f32 = 0.16;
    let a0 = 0.5 * (1.0 - ALPHA);
    let a1 = 0.5;
    let a2 = 0.5 * ALPHA;
    let x = index as f32 / size as f32;
    a0 - a1 * (2.0 * PI * x).cos() + a2 * (4.0 * PI * x).cos()
}

/// FFT analyser reading from the shared output ring
pub struct SpectrumAnalyser {
    config: AnalyserConfig,

    /// FFT instance
    fft: Arc<dyn Fft<f32>>,

    /// Output history written by the audio callback
    ring: SharedRing,

    /// Precomputed window coefficients
    window: Vec<f32>,

    /// Newest time-domain samples, copied out of the ring
    time_domain: Vec<f32>,

    /// FFT in-place buffer
    fft_buffer: Vec<Complex<f32>>,

    /// FFT scratch buffer
    scratch: Vec<Complex<f32>>,

    /// Temporally smoothed linear magnitudes (half of FFT size)
    smoothed: Vec<f32>,
}

impl SpectrumAnalyser {
    /// Create an analyser; all buffers are allocated here and reused per poll
    pub fn new(config: AnalyserConfig, ring: SharedRing) -> Self {
        let fft_size = config.fft_size;
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(fft_size);
        let scratch_len = fft.get_inplace_scratch_len();

        let window = (0..fft_size).map(|i| blackman_window(i, fft_size)).collect();

        debug!(
            "SpectrumAnalyser created: fft_size={}, bins={}, smoothing={}",
            fft_size,
            config.frequency_bin_count(),
            config.smoothing_time_constant
        );

        Self {
            fft,
            ring,
            window,
            time_domain: vec![0.0; fft_size],
            fft_buffer: vec![Complex::new(0.0, 0.0); fft_size],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
            smoothed: vec![0.0; config.frequency_bin_count()],
            config,
        }
    }

    pub fn config(&self) -> &AnalyserConfig {
        &self.config
    }

    /// Run one windowed transform and fold it into the smoothed magnitudes
    fn analyse(&mut self) {
        if let Ok(ring) = self.ring.lock() {
            ring.copy_latest(&mut self.time_domain);
        }

        for ((slot, &sample), &w) in self
            .fft_buffer
            .iter_mut()
            .zip(&self.time_domain)
            .zip(&self.window)
        {
            *slot = Complex::new(sample * w, 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.fft_buffer, &mut self.scratch);

        let tau = self.config.smoothing_time_constant;
        let scale = 1.0 / self.config.fft_size as f32;
        for (smoothed, bin) in self.smoothed.iter_mut().zip(&self.fft_buffer) {
            let magnitude = bin.norm() * scale;
            let next = tau * *smoothed + (1.0 - tau) * magnitude;
            *smoothed = if next.is_finite() { next } else { 0.0 };
        }
    }

    /// Quantize a linear magnitude into the configured decibel window
    fn to_byte(&self, magnitude: f32) -> u8 {
        if magnitude <= 0.0 {
            return 0;
        }
        let db = 20.0 * magnitude.log10();
        let span = self.config.max_decibels - self.config.min_decibels;
        let scaled = 255.0 * (db - self.config.min_decibels) / span;
        scaled.floor().clamp(0.0, 255.0) as u8
    }
}

impl AnalysisTap for SpectrumAnalyser {
    fn frequency_bin_count(&self) -> usize {
        self.config.frequency_bin_count()
    }

    fn frequency_magnitudes(&mut self, out: &mut [u8]) {
        self.analyse();
        for (byte, &magnitude) in out.iter_mut().zip(&self.smoothed) {
            *byte = self.to_byte(magnitude);
        }
    }
}
