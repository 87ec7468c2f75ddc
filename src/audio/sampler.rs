//! Spectrum sampler: polls an optional analysis tap into a reused buffer.

use tracing::debug;

use super::analyser::AnalysisTap;

/// Result of one poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Spectrum<'a> {
    /// Fresh magnitudes, one byte per bin, lowest frequency first
    Live(&'a [u8]),
    /// No tap connected; callers fall back to the idle signal
    Idle,
}

/// Owns the tap and the magnitude buffer it is polled into
#[derive(Default)]
pub struct SpectrumSampler {
    tap: Option<Box<dyn AnalysisTap>>,
    buffer: Vec<u8>,
}

impl SpectrumSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a tap, sizing the buffer once for its bin count
    pub fn connect(&mut self, tap: Box<dyn AnalysisTap>) {
        let bins = tap.frequency_bin_count();
        self.buffer.clear();
        self.buffer.resize(bins, 0);
        self.tap = Some(tap);
        debug!("Spectrum sampler connected ({} bins)", bins);
    }

    /// Release the tap; later polls are idle
    pub fn disconnect(&mut self) {
        if self.tap.take().is_some() {
            debug!("Spectrum sampler disconnected");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.tap.is_some()
    }

    /// Current magnitude snapshot, overwritten in place on every call
    pub fn poll(&mut self) -> Spectrum<'_> {
        match self.tap.as_mut() {
            Some(tap) if !self.buffer.is_empty() => {
                tap.frequency_magnitudes(&mut self.buffer);
                Spectrum::Live(&self.buffer)
            }
            _ => Spectrum::Idle,
        }
    }
}
