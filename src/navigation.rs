//! Scroll momentum and the clamped active index it drives.
//!
//! Wheel deltas accumulate into a single value that decays every frame.
//! Crossing the threshold in either direction moves the index by one and
//! empties the accumulator, so a fling advances at most one album per
//! crossing instead of skipping through the list.

use tracing::debug;

use crate::params::MomentumConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Position in the album list, always within `0..len`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveIndex {
    index: usize,
    len: usize,
}

impl ActiveIndex {
    /// Start at the first item; `len` is raised to at least 1
    pub fn new(len: usize) -> Self {
        Self {
            index: 0,
            len: len.max(1),
        }
    }

    pub fn get(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn can_advance(&self, direction: Direction) -> bool {
        match direction {
            Direction::Forward => self.index + 1 < self.len,
            Direction::Backward => self.index > 0,
        }
    }

    /// Move one step; returns false at the boundary
    pub fn advance(&mut self, direction: Direction) -> bool {
        if !self.can_advance(direction) {
            return false;
        }
        match direction {
            Direction::Forward => self.index += 1,
            Direction::Backward => self.index -= 1,
        }
        true
    }

    /// Jump to `index`, clamped; returns whether the position changed
    pub fn jump(&mut self, index: usize) -> bool {
        let index = index.min(self.len - 1);
        let changed = index != self.index;
        self.index = index;
        changed
    }
}

/// Outcome of one momentum frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MomentumStep {
    /// Threshold crossed and the index moved
    Advanced(Direction),
    /// Still decaying; tick again next frame
    Coasting,
    /// Accumulator is empty; no further ticks needed
    Rest,
}

/// Decaying wheel accumulator
#[derive(Debug, Clone)]
pub struct ScrollMomentum {
    config: MomentumConfig,
    value: f32,
    ticking: bool,
}

impl ScrollMomentum {
    pub fn new(config: MomentumConfig) -> Self {
        Self {
            config,
            value: 0.0,
            ticking: false,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    /// Whether a frame tick is armed
    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    /// Accumulate a wheel delta (pixels, positive = forward)
    ///
    /// Returns true when this call armed the frame tick.
    pub fn push_delta(&mut self, delta: f32) -> bool {
        if !delta.is_finite() || delta == 0.0 {
            return false;
        }
        self.value += delta;
        let armed = !self.ticking;
        self.ticking = true;
        armed
    }

    /// Run one frame against `index`
    pub fn tick(&mut self, index: &mut ActiveIndex) -> MomentumStep {
        let threshold = self.config.threshold;
        let crossing = if self.value >= threshold {
            Some(Direction::Forward)
        } else if self.value <= -threshold {
            Some(Direction::Backward)
        } else {
            None
        };

        if let Some(direction) = crossing {
            // Reset whether or not the index could move
            self.stop();
            if index.advance(direction) {
                return MomentumStep::Advanced(direction);
            }
            debug!("Momentum crossing at boundary ({:?}), discarded", direction);
            return MomentumStep::Rest;
        }

        self.value *= self.config.decay;
        if self.value.abs() <= self.config.rest_epsilon {
            self.stop();
            return MomentumStep::Rest;
        }
        MomentumStep::Coasting
    }

    /// Empty the accumulator and disarm
    pub fn stop(&mut self) {
        self.value = 0.0;
        self.ticking = false;
    }
}
