//! Playback source: single active track, asynchronous start, explicit results.
//!
//! The transport is a [`PlaybackBackend`]; this module owns the reported
//! state and decides what each backend outcome means:
//! - `Started` for the latest request makes it the current, playing track
//! - `Aborted` (or any outcome for a superseded request) changes nothing
//! - `Failed` is logged and forces "not playing", without retry
//! - `Ended` only counts for the request that started what is playing

use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use super::analyser::AnalysisTap;
use crate::catalog::Track;

/// Identifies one start request
pub type RequestId = u64;

/// How a start request settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayResult {
    Started,
    /// Interrupted, typically by a newer request; not an error
    Aborted,
    Failed(String),
}

/// What to start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartKind<'a> {
    /// Replace the source with this file
    Load(&'a Path),
    /// Continue the current source where it paused
    Resume,
}

/// Notifications from the backend, drained once per frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    Settled { request: RequestId, result: PlayResult },
    /// The source started by `request` played to its end
    Ended { request: RequestId },
}

/// Platform transport the playback source drives
pub trait PlaybackBackend {
    /// Begin starting playback; the outcome arrives later as `Settled`
    ///
    /// A newer `start` or a `pause` supersedes any request still in flight.
    fn start(&mut self, request: RequestId, kind: StartKind<'_>);

    fn pause(&mut self);

    fn poll_event(&mut self) -> Option<BackendEvent>;

    /// Frequency analysis over what the backend outputs, if it offers one
    fn analysis_tap(&mut self) -> Option<Box<dyn AnalysisTap>>;
}

/// Reported transport state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackState {
    pub is_active: bool,
    pub has_source: bool,
}

/// Outcome of a `play` call, before any asynchronous settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayCommand {
    /// The track was already playing and is now paused
    Paused,
    /// A start request is in flight
    Requested(RequestId),
    /// The track has no audio
    Unplayable,
}

/// State changes surfaced to the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    Started(Track),
    Failed { track: Track, reason: String },
    Ended,
}

#[derive(Debug, Clone)]
struct Pending {
    request: RequestId,
    track: Track,
}

/// Single-track playback source over a backend
pub struct PlaybackSource<B> {
    backend: B,
    media_root: PathBuf,
    state: PlaybackState,
    current: Option<Track>,
    /// Request whose `Started` produced the current output
    started: Option<RequestId>,
    pending: Option<Pending>,
    next_request: RequestId,
}

impl<B: PlaybackBackend> PlaybackSource<B> {
    pub fn new(backend: B, media_root: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            media_root: media_root.into(),
            state: PlaybackState::default(),
            current: None,
            started: None,
            pending: None,
            next_request: 1,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_active
    }

    /// Last track that actually started
    pub fn current_track(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    /// Request in flight, if any
    pub fn pending_request(&self) -> Option<RequestId> {
        self.pending.as_ref().map(|p| p.request)
    }

    /// Toggle the current track, or switch to and start `track`
    pub fn play(&mut self, track: &Track) -> PlayCommand {
        let same_track = self
            .current
            .as_ref()
            .is_some_and(|current| current.title == track.title);

        if self.state.is_active && same_track {
            self.pause();
            return PlayCommand::Paused;
        }

        let Some(audio_ref) = track.audio_ref.as_deref() else {
            debug!("'{}' has no audio, ignoring play request", track.title);
            return PlayCommand::Unplayable;
        };

        let request = self.next_request;
        self.next_request += 1;

        if same_track && self.state.has_source {
            self.backend.start(request, StartKind::Resume);
        } else {
            let path = self.media_root.join(audio_ref);
            self.backend.start(request, StartKind::Load(&path));
            self.state.has_source = true;
        }

        debug!("Play request {} for '{}'", request, track.title);
        self.pending = Some(Pending {
            request,
            track: track.clone(),
        });
        PlayCommand::Requested(request)
    }

    pub fn pause(&mut self) {
        self.backend.pause();
        self.pending = None;
        if self.state.is_active {
            self.state.is_active = false;
            info!("Playback paused");
        }
    }

    /// Apply the next backend event, returning any visible state change
    pub fn poll(&mut self) -> Option<PlaybackEvent> {
        while let Some(event) = self.backend.poll_event() {
            if let Some(change) = self.apply(event) {
                return Some(change);
            }
        }
        None
    }

    fn apply(&mut self, event: BackendEvent) -> Option<PlaybackEvent> {
        match event {
            BackendEvent::Ended { request } => {
                if !self.state.is_active || self.started != Some(request) {
                    debug!("End of request {} is stale, ignoring", request);
                    return None;
                }
                self.state.is_active = false;
                info!("Playback ended");
                Some(PlaybackEvent::Ended)
            }
            BackendEvent::Settled { request, result } => {
                let is_latest = self
                    .pending
                    .as_ref()
                    .is_some_and(|pending| pending.request == request);
                if !is_latest {
                    debug!("Request {} superseded ({:?}), ignoring", request, result);
                    return None;
                }
                let Pending { track, .. } = self.pending.take()?;

                match result {
                    PlayResult::Started => {
                        info!("Now playing '{}'", track.title);
                        self.state.is_active = true;
                        self.started = Some(request);
                        self.current = Some(track.clone());
                        Some(PlaybackEvent::Started(track))
                    }
                    PlayResult::Aborted => {
                        debug!("Playback of '{}' aborted", track.title);
                        None
                    }
                    PlayResult::Failed(reason) => {
                        error!("Playback of '{}' failed: {}", track.title, reason);
                        self.state.is_active = false;
                        self.started = None;
                        Some(PlaybackEvent::Failed { track, reason })
                    }
                }
            }
        }
    }

    pub fn analysis_tap(&mut self) -> Option<Box<dyn AnalysisTap>> {
        self.backend.analysis_tap()
    }

    /// Stop output and forget any request in flight
    pub fn teardown(&mut self) {
        self.pause();
        self.state.has_source = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::scripted::ScriptedBackend;

    fn track(title: &str, audio: Option<&str>) -> Track {
        Track {
            title: title.to_string(),
            duration: "1:00".to_string(),
            audio_ref: audio.map(str::to_string),
        }
    }

    fn source() -> PlaybackSource<ScriptedBackend> {
        PlaybackSource::new(ScriptedBackend::new(), "media")
    }

    fn drain(source: &mut PlaybackSource<ScriptedBackend>) -> Vec<PlaybackEvent> {
        std::iter::from_fn(|| source.poll()).collect()
    }

    #[test]
    fn test_started_request_becomes_current() {
        let mut source = source();
        let a = track("A", Some("a.wav"));

        let PlayCommand::Requested(id) = source.play(&a) else {
            panic!("expected a request");
        };
        assert!(!source.is_playing());
        assert_eq!(
            source.backend().last_load().map(Path::to_path_buf),
            Some(PathBuf::from("media/a.wav"))
        );

        source.backend_mut().settle(id, PlayResult::Started);
        assert_eq!(drain(&mut source), vec![PlaybackEvent::Started(a.clone())]);
        assert!(source.is_playing());
        assert_eq!(source.current_track(), Some(&a));
    }

    #[test]
    fn test_same_track_toggles_pause_then_resumes() {
        let mut source = source();
        let a = track("A", Some("a.wav"));
        let PlayCommand::Requested(id) = source.play(&a) else {
            panic!("expected a request");
        };
        source.backend_mut().settle(id, PlayResult::Started);
        drain(&mut source);

        assert_eq!(source.play(&a), PlayCommand::Paused);
        assert!(!source.is_playing());

        let PlayCommand::Requested(resume) = source.play(&a) else {
            panic!("expected a resume request");
        };
        assert_eq!(source.backend().last_start(), Some((resume, true)));
    }

    #[test]
    fn test_superseded_request_is_ignored_in_either_order() {
        let a = track("A", Some("a.wav"));
        let b = track("B", Some("b.wav"));

        // Older settles after the newer one
        let mut source = source();
        let PlayCommand::Requested(first) = source.play(&a) else {
            panic!()
        };
        let PlayCommand::Requested(second) = source.play(&b) else {
            panic!()
        };
        source.backend_mut().settle(second, PlayResult::Started);
        source.backend_mut().settle(first, PlayResult::Started);
        assert_eq!(drain(&mut source), vec![PlaybackEvent::Started(b.clone())]);
        assert_eq!(source.current_track(), Some(&b));

        // Older settles first
        let mut source = self::source();
        let PlayCommand::Requested(first) = source.play(&a) else {
            panic!()
        };
        let PlayCommand::Requested(second) = source.play(&b) else {
            panic!()
        };
        source.backend_mut().settle(first, PlayResult::Aborted);
        source.backend_mut().settle(second, PlayResult::Started);
        assert_eq!(drain(&mut source), vec![PlaybackEvent::Started(b.clone())]);
        assert!(source.is_playing());
    }

    #[test]
    fn test_abort_is_a_no_op() {
        let mut source = source();
        let a = track("A", Some("a.wav"));
        let PlayCommand::Requested(id) = source.play(&a) else {
            panic!()
        };
        source.backend_mut().settle(id, PlayResult::Aborted);
        assert!(drain(&mut source).is_empty());
        assert!(!source.is_playing());
        assert_eq!(source.current_track(), None);
    }

    #[test]
    fn test_failure_forces_not_playing() {
        let mut source = source();
        let a = track("A", Some("a.wav"));
        let b = track("B", Some("missing.wav"));

        let PlayCommand::Requested(id) = source.play(&a) else {
            panic!()
        };
        source.backend_mut().settle(id, PlayResult::Started);
        drain(&mut source);

        let PlayCommand::Requested(id) = source.play(&b) else {
            panic!()
        };
        source
            .backend_mut()
            .settle(id, PlayResult::Failed("no such file".into()));

        let events = drain(&mut source);
        assert_eq!(
            events,
            vec![PlaybackEvent::Failed {
                track: b,
                reason: "no such file".into()
            }]
        );
        assert!(!source.is_playing());
    }

    #[test]
    fn test_tracks_without_audio_are_unplayable() {
        let mut source = source();
        assert_eq!(source.play(&track("Silent", None)), PlayCommand::Unplayable);
        assert_eq!(source.pending_request(), None);
        assert!(source.backend().last_start().is_none());
    }

    #[test]
    fn test_ended_stops_playing() {
        let mut source = source();
        let a = track("A", Some("a.wav"));
        let PlayCommand::Requested(id) = source.play(&a) else {
            panic!()
        };
        source.backend_mut().settle(id, PlayResult::Started);
        source.backend_mut().finish(id);
        assert_eq!(
            drain(&mut source),
            vec![PlaybackEvent::Started(a), PlaybackEvent::Ended]
        );
        assert!(!source.is_playing());
    }

    #[test]
    fn test_end_of_replaced_track_is_ignored() {
        let mut source = source();
        let a = track("A", Some("a.wav"));
        let b = track("B", Some("b.wav"));

        let PlayCommand::Requested(first) = source.play(&a) else {
            panic!()
        };
        source.backend_mut().settle(first, PlayResult::Started);
        drain(&mut source);

        // A runs out while B is decoding; B's start is reported first
        let PlayCommand::Requested(second) = source.play(&b) else {
            panic!()
        };
        source.backend_mut().settle(second, PlayResult::Started);
        source.backend_mut().finish(first);

        assert_eq!(drain(&mut source), vec![PlaybackEvent::Started(b.clone())]);
        assert!(source.is_playing());
        assert_eq!(source.current_track(), Some(&b));

        source.backend_mut().finish(second);
        assert_eq!(drain(&mut source), vec![PlaybackEvent::Ended]);
        assert!(!source.is_playing());
    }

    #[test]
    fn test_end_after_resume_counts() {
        let mut source = source();
        let a = track("A", Some("a.wav"));
        let PlayCommand::Requested(first) = source.play(&a) else {
            panic!()
        };
        source.backend_mut().settle(first, PlayResult::Started);
        drain(&mut source);
        assert_eq!(source.play(&a), PlayCommand::Paused);
        let PlayCommand::Requested(resume) = source.play(&a) else {
            panic!()
        };
        source.backend_mut().settle(resume, PlayResult::Started);
        source.backend_mut().finish(resume);

        let events = drain(&mut source);
        assert_eq!(events.last(), Some(&PlaybackEvent::Ended));
        assert!(!source.is_playing());
    }
}
