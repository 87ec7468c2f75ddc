//! Parameter definitions with units and documented semantics.
//!
//! Every tunable number of the pipeline lives here with:
//! - Units (seconds, pixels, dBFS, etc.)
//! - Documented ranges and meanings
//! - A default matching the shipped look

mod analyser;
mod animation;
mod level;
mod navigation;
mod playback;
mod render;

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::ConfigError;

// Re-export all types
pub use analyser::{AnalyserConfig, MAX_FFT_SIZE, MIN_FFT_SIZE};
pub use animation::{AnimationParams, BeatShaping, Drive, EaseRate, EasedParam};
pub use level::{LevelConfig, IDLE_MAX, IDLE_MIN};
pub use navigation::MomentumConfig;
pub use playback::PlaybackConfig;
pub use render::RenderConfig;

/// Complete configuration, loadable from a TOML file
///
/// Every section is optional; missing keys fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShowcaseConfig {
    pub analyser: AnalyserConfig,
    pub level: LevelConfig,
    pub animation: AnimationParams,
    pub momentum: MomentumConfig,
    pub playback: PlaybackConfig,
    pub render: RenderConfig,
}

impl ShowcaseConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.analyser.validate()?;
        self.level.validate()?;
        self.momentum.validate()?;
        Ok(())
    }
}
