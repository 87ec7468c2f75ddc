//! In-process playback backend with no audio device.
//!
//! Used by tests and by headless runs. Start requests settle only when told
//! to (or immediately with `auto_start`), and the analysis tap reports
//! whatever spectrum was last set.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use super::analyser::AnalysisTap;
use super::playback::{BackendEvent, PlayResult, PlaybackBackend, RequestId, StartKind};

/// Bin count reported by the scripted tap
pub const SCRIPTED_BINS: usize = 128;

/// Record of one `start` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartRecord {
    pub request: RequestId,
    /// `None` for a resume
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ScriptedBackend {
    auto_start: bool,
    starts: Vec<StartRecord>,
    pauses: usize,
    events: VecDeque<BackendEvent>,
    spectrum: Rc<RefCell<Vec<u8>>>,
    offer_tap: bool,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self {
            spectrum: Rc::new(RefCell::new(vec![0; SCRIPTED_BINS])),
            offer_tap: true,
            ..Self::default()
        }
    }

    /// Settle every start request as `Started` right away
    pub fn auto_start() -> Self {
        Self {
            auto_start: true,
            ..Self::new()
        }
    }

    /// Backend that never offers an analysis tap
    pub fn without_tap(mut self) -> Self {
        self.offer_tap = false;
        self
    }

    /// Queue the outcome of a start request
    pub fn settle(&mut self, request: RequestId, result: PlayResult) {
        self.events
            .push_back(BackendEvent::Settled { request, result });
    }

    /// Queue the end of the source started by `request`
    pub fn finish(&mut self, request: RequestId) {
        self.events.push_back(BackendEvent::Ended { request });
    }

    /// Replace the spectrum every tap handed out will report
    pub fn set_spectrum(&self, bins: &[u8]) {
        let mut spectrum = self.spectrum.borrow_mut();
        for (slot, &value) in spectrum.iter_mut().zip(bins.iter().chain(std::iter::repeat(&0))) {
            *slot = value;
        }
    }

    /// Fill every bin with the same magnitude
    pub fn set_level(&self, magnitude: u8) {
        self.spectrum.borrow_mut().fill(magnitude);
    }

    pub fn starts(&self) -> &[StartRecord] {
        &self.starts
    }

    pub fn pauses(&self) -> usize {
        self.pauses
    }

    /// Request id and whether it was a resume, for the last `start`
    pub fn last_start(&self) -> Option<(RequestId, bool)> {
        self.starts
            .last()
            .map(|record| (record.request, record.path.is_none()))
    }

    /// Path of the last load request
    pub fn last_load(&self) -> Option<&Path> {
        self.starts
            .iter()
            .rev()
            .find_map(|record| record.path.as_deref())
    }
}

impl PlaybackBackend for ScriptedBackend {
    fn start(&mut self, request: RequestId, kind: StartKind<'_>) {
        let path = match kind {
            StartKind::Load(path) => Some(path.to_path_buf()),
            StartKind::Resume => None,
        };
        self.starts.push(StartRecord { request, path });
        if self.auto_start {
            self.settle(request, PlayResult::Started);
        }
    }

    fn pause(&mut self) {
        self.pauses += 1;
    }

    fn poll_event(&mut self) -> Option<BackendEvent> {
        self.events.pop_front()
    }

    fn analysis_tap(&mut self) -> Option<Box<dyn AnalysisTap>> {
        if !self.offer_tap {
            return None;
        }
        Some(Box::new(ScriptedTap {
            spectrum: Rc::clone(&self.spectrum),
        }))
    }
}

/// Tap reading the backend's scripted spectrum
struct ScriptedTap {
    spectrum: Rc<RefCell<Vec<u8>>>,
}

impl AnalysisTap for ScriptedTap {
    fn frequency_bin_count(&self) -> usize {
        self.spectrum.borrow().len()
    }

    fn frequency_magnitudes(&mut self, out: &mut [u8]) {
        let spectrum = self.spectrum.borrow();
        for (slot, &value) in out.iter_mut().zip(spectrum.iter()) {
            *slot = value;
        }
    }
}
