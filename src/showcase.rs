//! Showcase controller: the single context object owning the whole pipeline.
//!
//! Input events mutate navigation and playback state; `frame` runs the
//! scheduled per-frame work (visualizer, momentum) and publishes the results.

use tracing::{debug, info, warn};

use crate::audio::{
    LevelSmoother, PlayCommand, PlaybackBackend, PlaybackEvent, PlaybackSource, Spectrum,
    SpectrumSampler,
};
use crate::catalog::{Album, Catalog, Track};
use crate::events::{EventBus, ShowcaseEvent};
use crate::navigation::{ActiveIndex, Direction, MomentumStep, ScrollMomentum};
use crate::params::ShowcaseConfig;
use crate::scheduler::{FrameScheduler, FrameToken};
use crate::visual::{AnimationDriver, AnimationSnapshot};

/// User input, already mapped from the windowing layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Wheel distance in pixels, positive = toward later albums
    Wheel(f32),
    Next,
    Previous,
    /// Card click: jump to the album, or open it if it is already active
    Jump(usize),
    /// Open the detail panel for the active album
    Select,
    Close,
    /// Toggle the active album's first track
    PlayFeatured,
    PlayTrack { album: usize, track: usize },
}

/// Timing of one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    pub delta_s: f32,
    /// Seconds since the showcase started
    pub elapsed_s: f64,
}

/// Work the frame scheduler runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameTask {
    Visualize,
    Momentum,
}

pub struct Showcase<B> {
    catalog: Catalog,
    index: ActiveIndex,
    /// Album shown in the detail panel while it is open
    detail: Option<usize>,

    playback: PlaybackSource<B>,
    sampler: SpectrumSampler,
    tap_requested: bool,
    smoother: LevelSmoother,
    driver: AnimationDriver,

    momentum: ScrollMomentum,
    momentum_token: Option<FrameToken>,
    scheduler: FrameScheduler<FrameTask>,
    due: Vec<FrameTask>,

    bus: EventBus,
    torn_down: bool,
}

impl<B: PlaybackBackend> Showcase<B> {
    pub fn new(catalog: Catalog, config: &ShowcaseConfig, backend: B) -> Self {
        let index = ActiveIndex::new(catalog.len());
        let palette = catalog.palette(index.get()).unwrap_or_default();

        let mut scheduler = FrameScheduler::new();
        scheduler.schedule(FrameTask::Visualize);

        info!("Showcase ready with {} albums", catalog.len());

        Self {
            index,
            detail: None,
            playback: PlaybackSource::new(backend, config.playback.media_root.clone()),
            sampler: SpectrumSampler::new(),
            tap_requested: false,
            smoother: LevelSmoother::new(config.level.clone()),
            driver: AnimationDriver::new(config.animation.clone(), palette),
            momentum: ScrollMomentum::new(config.momentum.clone()),
            momentum_token: None,
            scheduler,
            due: Vec::new(),
            bus: EventBus::new(),
            torn_down: false,
            catalog,
        }
    }

    /// Register a subscriber with a queue of `capacity` events
    pub fn subscribe(&mut self, capacity: usize) -> crossbeam_channel::Receiver<ShowcaseEvent> {
        self.bus.subscribe(capacity)
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        if self.torn_down {
            return;
        }

        // The detail panel captures navigation
        if self.detail.is_some()
            && matches!(
                event,
                InputEvent::Wheel(_)
                    | InputEvent::Next
                    | InputEvent::Previous
                    | InputEvent::Jump(_)
                    | InputEvent::Select
            )
        {
            return;
        }

        match event {
            InputEvent::Wheel(delta) => {
                if self.momentum.push_delta(delta) {
                    self.momentum_token = Some(self.scheduler.schedule(FrameTask::Momentum));
                }
            }
            InputEvent::Next => self.advance(Direction::Forward),
            InputEvent::Previous => self.advance(Direction::Backward),
            InputEvent::Jump(target) => {
                if target >= self.catalog.len() {
                    warn!("Ignoring jump to album {} (only {})", target, self.catalog.len());
                } else if target == self.index.get() {
                    self.open_detail(target);
                } else if self.index.jump(target) {
                    self.on_index_changed();
                }
            }
            InputEvent::Select => self.open_detail(self.index.get()),
            InputEvent::Close => self.close_detail(),
            InputEvent::PlayFeatured => {
                if let Some(track) = self.featured_track().cloned() {
                    self.play(&track);
                }
            }
            InputEvent::PlayTrack { album, track } => {
                let found = self
                    .catalog
                    .get(album)
                    .and_then(|a| a.tracks.get(track))
                    .cloned();
                match found {
                    Some(found) => self.play(&found),
                    None => warn!("No track {} on album {}", track, album),
                }
            }
        }
    }

    /// Run everything scheduled for this frame
    ///
    /// Returns the snapshot published this frame, if the visualizer ran.
    pub fn frame(&mut self, time: FrameTime) -> Option<AnimationSnapshot> {
        if self.torn_down {
            return None;
        }

        while let Some(event) = self.playback.poll() {
            self.on_playback_event(event);
        }

        let mut due = std::mem::take(&mut self.due);
        self.scheduler.take_due(&mut due);

        let mut published = None;
        for task in due.drain(..) {
            match task {
                FrameTask::Visualize => {
                    published = Some(self.visualize(time));
                    self.scheduler.schedule(FrameTask::Visualize);
                }
                FrameTask::Momentum => self.tick_momentum(),
            }
        }
        self.due = due;

        published
    }

    /// Whether anything is scheduled for the next frame
    pub fn wants_frame(&self) -> bool {
        !self.torn_down && !self.scheduler.is_empty()
    }

    /// Cancel frame work, release the tap and stop playback
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.scheduler.cancel_all();
        self.momentum_token = None;
        self.momentum.stop();
        self.sampler.disconnect();
        self.playback.teardown();
        // Subscribers see their channel disconnect
        self.bus.clear();
        self.torn_down = true;
        info!("Showcase torn down");
    }

    // === Accessors ===

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn active_index(&self) -> usize {
        self.index.get()
    }

    pub fn is_detail_open(&self) -> bool {
        self.detail.is_some()
    }

    pub fn selected_album(&self) -> Option<&Album> {
        self.detail.and_then(|i| self.catalog.get(i))
    }

    /// Album the detail panel shows: the selected one while open, else the active one
    pub fn displayed_album(&self) -> Option<&Album> {
        self.selected_album()
            .or_else(|| self.catalog.get(self.index.get()))
    }

    /// First track of the active album
    pub fn featured_track(&self) -> Option<&Track> {
        self.catalog.featured_track(self.index.get())
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.playback.current_track()
    }

    pub fn is_featured_playing(&self) -> bool {
        match (self.featured_track(), self.playing_track()) {
            (Some(featured), Some(playing)) => featured.title == playing.title,
            _ => false,
        }
    }

    /// Whether the playing track belongs to album `index`
    pub fn is_album_playing(&self, index: usize) -> bool {
        let (Some(album), Some(playing)) = (self.catalog.get(index), self.playing_track()) else {
            return false;
        };
        album.tracks.iter().any(|t| t.title == playing.title)
    }

    pub fn level(&self) -> f32 {
        self.smoother.level()
    }

    pub fn snapshot(&self) -> AnimationSnapshot {
        self.driver.snapshot()
    }

    pub fn momentum(&self) -> &ScrollMomentum {
        &self.momentum
    }

    pub fn playback(&self) -> &PlaybackSource<B> {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut PlaybackSource<B> {
        &mut self.playback
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    // === Internals ===

    fn playing_track(&self) -> Option<&Track> {
        self.current_track().filter(|_| self.is_playing())
    }

    fn advance(&mut self, direction: Direction) {
        if self.index.advance(direction) {
            self.on_index_changed();
        }
    }

    fn on_index_changed(&mut self) {
        let index = self.index.get();
        if let Some(palette) = self.catalog.palette(index) {
            self.driver.set_palette(palette);
        }
        debug!("Active album {}", index);
        self.bus.publish(&ShowcaseEvent::IndexChanged(index));
    }

    fn open_detail(&mut self, album: usize) {
        // Pending momentum would otherwise move the list behind the panel
        if let Some(token) = self.momentum_token.take() {
            self.scheduler.cancel(token);
        }
        self.momentum.stop();
        self.detail = Some(album);
        self.bus.publish(&ShowcaseEvent::DetailChanged {
            open: true,
            album: Some(album),
        });
    }

    fn close_detail(&mut self) {
        if self.detail.take().is_some() {
            self.bus.publish(&ShowcaseEvent::DetailChanged {
                open: false,
                album: None,
            });
        }
    }

    fn play(&mut self, track: &Track) {
        if !self.tap_requested {
            self.tap_requested = true;
            match self.playback.analysis_tap() {
                Some(tap) => self.sampler.connect(tap),
                None => warn!("Playback backend offers no analysis tap; visuals stay idle"),
            }
        }

        match self.playback.play(track) {
            PlayCommand::Paused => self.bus.publish(&ShowcaseEvent::PlaybackChanged {
                playing: false,
                track: self.playback.current_track().cloned(),
            }),
            PlayCommand::Requested(request) => {
                debug!("Waiting on request {} for '{}'", request, track.title);
            }
            PlayCommand::Unplayable => {}
        }
    }

    fn on_playback_event(&mut self, event: PlaybackEvent) {
        let change = match event {
            PlaybackEvent::Started(track) => ShowcaseEvent::PlaybackChanged {
                playing: true,
                track: Some(track),
            },
            PlaybackEvent::Failed { track, .. } => ShowcaseEvent::PlaybackChanged {
                playing: false,
                track: Some(track),
            },
            PlaybackEvent::Ended => ShowcaseEvent::PlaybackChanged {
                playing: false,
                track: self.playback.current_track().cloned(),
            },
        };
        self.bus.publish(&change);
    }

    fn visualize(&mut self, time: FrameTime) -> AnimationSnapshot {
        // The tap only carries signal while something is playing
        let spectrum = if self.playback.is_playing() {
            self.sampler.poll()
        } else {
            Spectrum::Idle
        };
        let level = self.smoother.update(spectrum, time.elapsed_s);
        let snapshot = self.driver.step(level, time.delta_s, time.elapsed_s);
        self.bus
            .publish(&ShowcaseEvent::AnimationParamsUpdated(snapshot));
        snapshot
    }

    fn tick_momentum(&mut self) {
        self.momentum_token = None;
        match self.momentum.tick(&mut self.index) {
            MomentumStep::Advanced(_) => self.on_index_changed(),
            MomentumStep::Coasting => {
                self.momentum_token = Some(self.scheduler.schedule(FrameTask::Momentum));
            }
            MomentumStep::Rest => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{PlayResult, ScriptedBackend};

    const FRAME: FrameTime = FrameTime {
        delta_s: 1.0 / 60.0,
        elapsed_s: 0.0,
    };

    fn showcase() -> Showcase<ScriptedBackend> {
        Showcase::new(
            Catalog::builtin().unwrap(),
            &ShowcaseConfig::default(),
            ScriptedBackend::auto_start(),
        )
    }

    #[test]
    fn test_visualizer_runs_every_frame() {
        let mut showcase = showcase();
        assert!(showcase.wants_frame());
        assert!(showcase.frame(FRAME).is_some());
        assert!(showcase.frame(FRAME).is_some());
    }

    #[test]
    fn test_wheel_arms_momentum_once() {
        let mut showcase = showcase();
        showcase.handle_input(InputEvent::Wheel(40.0));
        showcase.handle_input(InputEvent::Wheel(50.0));
        assert_eq!(showcase.scheduler.len(), 2);

        showcase.frame(FRAME);
        assert_eq!(showcase.active_index(), 1);
        assert!(!showcase.momentum().is_ticking());
    }

    #[test]
    fn test_detail_blocks_navigation() {
        let mut showcase = showcase();
        showcase.handle_input(InputEvent::Select);
        assert!(showcase.is_detail_open());

        showcase.handle_input(InputEvent::Next);
        showcase.handle_input(InputEvent::Wheel(500.0));
        showcase.frame(FRAME);
        assert_eq!(showcase.active_index(), 0);

        showcase.handle_input(InputEvent::Close);
        showcase.handle_input(InputEvent::Next);
        assert_eq!(showcase.active_index(), 1);
    }

    #[test]
    fn test_jump_then_click_active_opens_detail() {
        let mut showcase = showcase();
        showcase.handle_input(InputEvent::Jump(2));
        assert_eq!(showcase.active_index(), 2);
        assert!(!showcase.is_detail_open());

        showcase.handle_input(InputEvent::Jump(2));
        assert_eq!(showcase.selected_album().map(|a| a.id.as_str()), Some("project119"));
    }

    #[test]
    fn test_tap_connects_on_first_play() {
        let mut showcase = showcase();
        assert!(!showcase.sampler.is_connected());
        showcase.handle_input(InputEvent::PlayFeatured);
        assert!(showcase.sampler.is_connected());
    }

    #[test]
    fn test_failed_start_reports_not_playing() {
        let mut showcase = Showcase::new(
            Catalog::builtin().unwrap(),
            &ShowcaseConfig::default(),
            ScriptedBackend::new(),
        );
        let events = showcase.subscribe(16);
        showcase.handle_input(InputEvent::PlayFeatured);
        let request = showcase.playback().pending_request().unwrap();
        showcase
            .playback_mut()
            .backend_mut()
            .settle(request, PlayResult::Failed("device lost".into()));
        showcase.frame(FRAME);

        assert!(!showcase.is_playing());
        let playback_changes: Vec<_> = events
            .try_iter()
            .filter(|e| matches!(e, ShowcaseEvent::PlaybackChanged { .. }))
            .collect();
        assert_eq!(playback_changes.len(), 1);
    }

    #[test]
    fn test_teardown_stops_everything() {
        let mut showcase = showcase();
        showcase.handle_input(InputEvent::PlayFeatured);
        showcase.frame(FRAME);
        assert!(showcase.is_playing());

        showcase.handle_input(InputEvent::Wheel(30.0));
        showcase.teardown();

        assert!(!showcase.wants_frame());
        assert!(!showcase.is_playing());
        assert!(!showcase.sampler.is_connected());
        assert!(showcase.frame(FRAME).is_none());
    }
}
