//! Events published by the showcase to its subscribers.

use crossbeam_channel::{Receiver, Sender, TrySendError};
use tracing::{debug, trace};

use crate::catalog::Track;
use crate::visual::AnimationSnapshot;

#[derive(Debug, Clone, PartialEq)]
pub enum ShowcaseEvent {
    /// Active album changed
    IndexChanged(usize),

    /// Published once per visualizer frame
    AnimationParamsUpdated(AnimationSnapshot),

    PlaybackChanged {
        playing: bool,
        track: Option<Track>,
    },

    DetailChanged {
        open: bool,
        /// Selected album while open
        album: Option<usize>,
    },
}

/// Fan-out over bounded channels
///
/// Publishing never blocks: a subscriber whose queue is full misses the
/// event, and one whose receiver was dropped is removed.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Vec<Sender<ShowcaseEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, capacity: usize) -> Receiver<ShowcaseEvent> {
        let (tx, rx) = crossbeam_channel::bounded(capacity.max(1));
        self.subscribers.push(tx);
        debug!("Subscriber added ({} total)", self.subscribers.len());
        rx
    }

    pub fn publish(&mut self, event: &ShowcaseEvent) {
        self.subscribers.retain(|tx| match tx.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                trace!("Subscriber queue full, dropping event");
                true
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!("Subscriber disconnected, removing");
                false
            }
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn clear(&mut self) {
        self.subscribers.clear();
    }
}
