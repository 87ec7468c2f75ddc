//! Playback configuration.

use std::path::PathBuf;

use serde::Deserialize;

/// Track loading and output settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Directory that track `audio_ref` paths are resolved against
    pub media_root: PathBuf,

    /// Output gain applied before the limiter (dimensionless)
    pub volume: f32,

    /// Hard clip applied to every output sample (full scale = 1.0)
    pub limiter: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            media_root: PathBuf::from("."),
            volume: 1.0,
            limiter: 1.0,
        }
    }
}
