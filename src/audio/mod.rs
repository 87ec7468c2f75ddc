//! Audio side of the pipeline: playback, analysis and level extraction.
//!
//! The output callback feeds a [`ring::SampleRing`]; a [`SpectrumAnalyser`]
//! turns the newest samples into magnitude bytes; the [`SpectrumSampler`]
//! polls them once per frame; [`energy`] reduces them to a bass level and
//! [`LevelSmoother`] low-passes that into the value the visuals follow.

pub mod analyser;
pub mod energy;
pub mod level;
pub mod output;
pub mod playback;
pub mod ring;
pub mod sampler;
pub mod scripted;

pub use analyser::{AnalysisTap, SpectrumAnalyser};
pub use level::{idle_level, LevelSmoother};
pub use output::CpalBackend;
pub use playback::{
    BackendEvent, PlayCommand, PlayResult, PlaybackBackend, PlaybackEvent, PlaybackSource,
    PlaybackState, RequestId, StartKind,
};
pub use sampler::{Spectrum, SpectrumSampler};
pub use scripted::ScriptedBackend;
