//! End-to-end behavior of the showcase with a scripted playback backend.

use sonic_visions::audio::{PlayResult, ScriptedBackend};
use sonic_visions::catalog::Catalog;
use sonic_visions::events::ShowcaseEvent;
use sonic_visions::params::ShowcaseConfig;
use sonic_visions::{FrameTime, InputEvent, Showcase};

const DELTA_S: f32 = 1.0 / 60.0;

fn showcase(backend: ScriptedBackend) -> Showcase<ScriptedBackend> {
    Showcase::new(
        Catalog::builtin().expect("built-in catalog"),
        &ShowcaseConfig::default(),
        backend,
    )
}

fn run_frames(showcase: &mut Showcase<ScriptedBackend>, frames: u32) {
    // Frozen clock keeps the idle breathing signal constant
    for _ in 0..frames {
        showcase.frame(FrameTime {
            delta_s: DELTA_S,
            elapsed_s: 0.0,
        });
    }
}

#[test]
fn selected_album_featured_track_plays() {
    for album in 0..4 {
        let mut showcase = showcase(ScriptedBackend::auto_start());
        if album > 0 {
            showcase.handle_input(InputEvent::Jump(album));
        }
        assert_eq!(showcase.active_index(), album);

        showcase.handle_input(InputEvent::PlayFeatured);
        run_frames(&mut showcase, 1);

        let expected = &showcase.catalog().get(album).unwrap().tracks[0].title;
        assert_eq!(&showcase.current_track().unwrap().title, expected);
        assert!(showcase.is_playing());
        assert!(showcase.is_featured_playing());
        assert!(showcase.is_album_playing(album));
    }
}

#[test]
fn play_track_from_detail_panel() {
    let mut showcase = showcase(ScriptedBackend::auto_start());
    showcase.handle_input(InputEvent::Jump(1));
    showcase.handle_input(InputEvent::Select);
    assert_eq!(showcase.displayed_album().unwrap().id, "project108");

    showcase.handle_input(InputEvent::PlayTrack { album: 1, track: 0 });
    run_frames(&mut showcase, 1);
    assert!(showcase.is_album_playing(1));
    assert!(!showcase.is_album_playing(0));

    // Tracks without audio are ignored
    showcase.handle_input(InputEvent::PlayTrack { album: 1, track: 2 });
    run_frames(&mut showcase, 1);
    assert!(showcase.is_album_playing(1));
}

#[test]
fn second_play_of_same_track_pauses() {
    let mut showcase = showcase(ScriptedBackend::auto_start());
    let events = showcase.subscribe(256);

    showcase.handle_input(InputEvent::PlayFeatured);
    run_frames(&mut showcase, 1);
    showcase.handle_input(InputEvent::PlayFeatured);
    assert!(!showcase.is_playing());

    let playback: Vec<bool> = events
        .try_iter()
        .filter_map(|event| match event {
            ShowcaseEvent::PlaybackChanged { playing, .. } => Some(playing),
            _ => None,
        })
        .collect();
    assert_eq!(playback, vec![true, false]);
}

#[test]
fn superseded_request_never_becomes_current() {
    let mut showcase = showcase(ScriptedBackend::new());

    showcase.handle_input(InputEvent::PlayFeatured);
    let first = showcase.playback().pending_request().unwrap();
    showcase.handle_input(InputEvent::Next);
    showcase.handle_input(InputEvent::PlayFeatured);
    let second = showcase.playback().pending_request().unwrap();
    assert_ne!(first, second);

    let backend = showcase.playback_mut().backend_mut();
    backend.settle(second, PlayResult::Started);
    backend.settle(first, PlayResult::Started);
    run_frames(&mut showcase, 2);

    assert_eq!(showcase.current_track().unwrap().title, "Project 108 (v3)");
    assert!(showcase.is_album_playing(1));
}

#[test]
fn level_follows_tap_only_while_playing() {
    let mut showcase = showcase(ScriptedBackend::auto_start());
    showcase.playback().backend().set_level(255);

    // Not playing yet: idle breathing only
    run_frames(&mut showcase, 100);
    assert!(showcase.level() <= 0.25);

    showcase.handle_input(InputEvent::PlayFeatured);
    run_frames(&mut showcase, 100);
    assert!(showcase.level() > 0.99);

    showcase.handle_input(InputEvent::PlayFeatured);
    run_frames(&mut showcase, 100);
    let level = showcase.level();
    assert!((0.1..=0.25).contains(&level), "level {level}");
}

#[test]
fn wheel_fling_advances_one_album_and_publishes() {
    let mut showcase = showcase(ScriptedBackend::auto_start());
    let events = showcase.subscribe(256);

    showcase.handle_input(InputEvent::Wheel(90.0));
    run_frames(&mut showcase, 20);
    assert_eq!(showcase.active_index(), 1);

    let received: Vec<ShowcaseEvent> = events.try_iter().collect();
    let index_changes: Vec<usize> = received
        .iter()
        .filter_map(|event| match event {
            ShowcaseEvent::IndexChanged(i) => Some(*i),
            _ => None,
        })
        .collect();
    assert_eq!(index_changes, vec![1]);

    let snapshots = received
        .iter()
        .filter(|event| matches!(event, ShowcaseEvent::AnimationParamsUpdated(_)))
        .count();
    assert_eq!(snapshots, 20);
}

#[test]
fn album_change_retargets_colors() {
    let mut showcase = showcase(ScriptedBackend::auto_start());
    run_frames(&mut showcase, 1);
    let before = showcase.snapshot().surface_color;

    showcase.handle_input(InputEvent::Next);
    let target = showcase.catalog().palette(1).unwrap().primary;
    run_frames(&mut showcase, 1);
    let after = showcase.snapshot().surface_color;

    // Eases, does not jump
    assert!(after.distance(target) < before.distance(target));
    assert!(after.distance(target) > 1e-3);

    run_frames(&mut showcase, 600);
    assert!(showcase.snapshot().surface_color.distance(target) < 1e-3);
}

#[test]
fn detail_panel_events() {
    let mut showcase = showcase(ScriptedBackend::auto_start());
    let events = showcase.subscribe(16);

    showcase.handle_input(InputEvent::Jump(0));
    showcase.handle_input(InputEvent::Close);

    let received: Vec<ShowcaseEvent> = events.try_iter().collect();
    assert_eq!(
        received,
        vec![
            ShowcaseEvent::DetailChanged {
                open: true,
                album: Some(0)
            },
            ShowcaseEvent::DetailChanged {
                open: false,
                album: None
            },
        ]
    );
}

#[test]
fn teardown_is_final() {
    let mut showcase = showcase(ScriptedBackend::auto_start());
    let events = showcase.subscribe(256);
    showcase.handle_input(InputEvent::PlayFeatured);
    run_frames(&mut showcase, 1);

    showcase.teardown();
    assert!(events.try_iter().count() > 0);
    assert!(events.recv().is_err());
    showcase.handle_input(InputEvent::Next);
    assert!(showcase.frame(FrameTime {
        delta_s: DELTA_S,
        elapsed_s: 1.0
    })
    .is_none());
    assert!(!showcase.wants_frame());
    assert!(!showcase.is_playing());
    assert_eq!(showcase.active_index(), 0);
}
