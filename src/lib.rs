//! Sonic Visions library - audio-reactive album showcase
//!
//! Pipeline, leaves first: playback output → [`audio::SpectrumAnalyser`] →
//! [`audio::SpectrumSampler`] → [`audio::energy`] → [`audio::LevelSmoother`]
//! → [`visual::AnimationDriver`] → snapshots published by
//! [`showcase::Showcase`], which also owns catalog navigation.

pub mod audio;
pub mod catalog;
pub mod cli;
pub mod error;
pub mod events;
pub mod navigation;
pub mod params;
pub mod rendering;
pub mod scheduler;
pub mod showcase;
pub mod visual;

pub use error::Error;
pub use showcase::{FrameTime, InputEvent, Showcase};
