//! Fixed-capacity history of the most recent output samples.

use std::sync::{Arc, Mutex};

/// Ring shared between the output callback (writer) and the analyser (reader)
pub type SharedRing = Arc<Mutex<SampleRing>>;

/// Mono sample history; oldest samples are overwritten
#[derive(Debug, Clone)]
pub struct SampleRing {
    samples: Vec<f32>,
    write_pos: usize,
}

impl SampleRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity.max(1)],
            write_pos: 0,
        }
    }

    pub fn shared(capacity: usize) -> SharedRing {
        Arc::new(Mutex::new(Self::new(capacity)))
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    pub fn push(&mut self, sample: f32) {
        self.samples[self.write_pos] = if sample.is_finite() { sample } else { 0.0 };
        self.write_pos = (self.write_pos + 1) % self.samples.len();
    }

    pub fn extend_from_slice(&mut self, samples: &[f32]) {
        for &sample in samples {
            self.push(sample);
        }
    }

    /// Fill `out` with the newest `out.len()` samples, oldest first
    ///
    /// When `out` is longer than the ring, the leading excess is zeroed.
    pub fn copy_latest(&self, out: &mut [f32]) {
        let capacity = self.samples.len();
        let n = out.len().min(capacity);
        let pad = out.len() - n;
        out[..pad].fill(0.0);

        let start = (self.write_pos + capacity - n) % capacity;
        let first = n.min(capacity - start);
        out[pad..pad + first].copy_from_slice(&self.samples[start..start + first]);
        out[pad + first..].copy_from_slice(&self.samples[..n - first]);
    }

    pub fn clear(&mut self) {
        self.samples.fill(0.0);
        self.write_pos = 0;
    }
}
