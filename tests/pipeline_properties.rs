//! Numerical invariants of the level pipeline and navigation.

use proptest::prelude::*;

use sonic_visions::audio::energy;
use sonic_visions::audio::{idle_level, LevelSmoother, ScriptedBackend};
use sonic_visions::catalog::Catalog;
use sonic_visions::navigation::{ActiveIndex, MomentumStep, ScrollMomentum};
use sonic_visions::params::{LevelConfig, MomentumConfig, ShowcaseConfig, IDLE_MAX, IDLE_MIN};
use sonic_visions::{FrameTime, InputEvent, Showcase};

#[test]
fn full_scale_bass_band_is_one() {
    let sample = [255u8; 256];
    assert_eq!(energy::extract(&sample, 0.18), 1.0);
}

#[test]
fn momentum_fifty_decays_to_rest() {
    let mut momentum = ScrollMomentum::new(MomentumConfig::default());
    let mut index = ActiveIndex::new(4);
    momentum.push_delta(50.0);

    momentum.tick(&mut index);
    assert!((momentum.value() - 30.0).abs() < 1e-4);

    let mut frames = 0;
    while momentum.is_ticking() {
        momentum.tick(&mut index);
        frames += 1;
    }
    assert!((5..=9).contains(&frames));
    assert_eq!(momentum.value(), 0.0);
}

fn input_strategy() -> impl Strategy<Value = InputEvent> {
    prop_oneof![
        (-300.0f32..300.0).prop_map(InputEvent::Wheel),
        Just(InputEvent::Next),
        Just(InputEvent::Previous),
        (0usize..8).prop_map(InputEvent::Jump),
        Just(InputEvent::Select),
        Just(InputEvent::Close),
    ]
}

proptest! {
    #[test]
    fn extract_stays_normalized(
        sample in prop::collection::vec(any::<u8>(), 1..512),
        fraction in 0.01f32..=1.0,
    ) {
        let level = energy::extract(&sample, fraction);
        prop_assert!((0.0..=1.0).contains(&level));
    }

    #[test]
    fn smoother_converges_without_overshoot(raw in 0.0f32..1.3) {
        let mut smoother = LevelSmoother::new(LevelConfig::default());
        let start_side = (raw - smoother.level()).signum();
        let mut distance = (raw - smoother.level()).abs();
        for _ in 0..200 {
            let level = smoother.step(raw);
            let next = (raw - level).abs();
            prop_assert!(next <= distance + 1e-6);
            if next > 1e-6 {
                prop_assert_eq!((raw - level).signum(), start_side);
            }
            distance = next;
        }
    }

    #[test]
    fn idle_level_is_bounded_and_slow(t in 0.0f64..10_000.0, dt in 0.0f64..0.1) {
        let config = LevelConfig::default();
        let a = idle_level(&config, t);
        let b = idle_level(&config, t + dt);
        prop_assert!((IDLE_MIN..=IDLE_MAX).contains(&a));
        prop_assert!((a - b).abs() <= config.idle_max_slope() * dt as f32 + 1e-5);
    }

    #[test]
    fn deltas_summing_to_threshold_advance_once(first in 1u32..80) {
        let mut momentum = ScrollMomentum::new(MomentumConfig::default());
        let mut index = ActiveIndex::new(4);
        momentum.push_delta(first as f32);
        momentum.push_delta((80 - first) as f32);

        prop_assert!(matches!(momentum.tick(&mut index), MomentumStep::Advanced(_)));
        prop_assert_eq!(index.get(), 1);
        prop_assert_eq!(momentum.value(), 0.0);
    }

    #[test]
    fn active_index_stays_in_catalog(inputs in prop::collection::vec(input_strategy(), 0..48)) {
        let catalog = Catalog::builtin().unwrap();
        let len = catalog.len();
        let mut showcase =
            Showcase::new(catalog, &ShowcaseConfig::default(), ScriptedBackend::new());

        for input in inputs {
            showcase.handle_input(input);
            showcase.frame(FrameTime { delta_s: 1.0 / 60.0, elapsed_s: 0.0 });
            prop_assert!(showcase.active_index() < len);
        }
    }
}
