//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use crate::catalog::Catalog;
use crate::error::{CatalogError, ConfigError};
use crate::params::ShowcaseConfig;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "sonic-visions")]
#[command(about = "Audio-reactive album showcase", long_about = None)]
pub struct Args {
    /// Album catalog (JSON array); the built-in catalog when omitted
    #[arg(long, value_name = "PATH")]
    pub catalog: Option<PathBuf>,

    /// Configuration file (TOML)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory that track audio paths are resolved against
    #[arg(long, value_name = "DIR")]
    pub media_root: Option<PathBuf>,

    /// Run this many frames without a window or audio device, logging snapshots
    #[arg(long, value_name = "FRAMES")]
    pub headless: Option<u32>,

    /// Start the featured track on launch
    #[arg(long)]
    pub autoplay: bool,
}

impl Args {
    /// Load the config file (or defaults) and apply command-line overrides
    pub fn load_config(&self) -> Result<ShowcaseConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => ShowcaseConfig::load(path)?,
            None => ShowcaseConfig::default(),
        };
        if let Some(root) = &self.media_root {
            config.playback.media_root = root.clone();
        }
        Ok(config)
    }

    pub fn load_catalog(&self) -> Result<Catalog, CatalogError> {
        match &self.catalog {
            Some(path) => Catalog::load(path),
            None => {
                info!("Using built-in catalog");
                Catalog::builtin()
            }
        }
    }
}
