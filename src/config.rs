//! Configuration System
//!
//! Layered configuration built with the `config` crate. Sources, lowest
//! precedence first: built-in defaults, the global user file, the
//! repository's `config/config.toml`, `config/{SCREENSHOTR_ENV}.toml`, and
//! `SCREENSHOTR__*` environment variables.

use crate::error::ConfigError;
use crate::filter::SortingMode;
use crate::logging::LoggingConfig;
use crate::store::StoreOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

mod merge {
    pub mod merge_policy;
}
mod sources {
    pub mod global_file;
    pub mod workspace_file;
}

pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScreenshotrConfig {
    #[serde(default)]
    pub repository: RepositoryConfig,

    #[serde(default)]
    pub filter: FilterConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Repository location and thumbnail settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Edge of the square thumbnail box, in pixels
    #[serde(default = "default_thumbnail_size")]
    pub thumbnail_size: u32,

    /// Videos longer than this are thumbnailed at this offset
    #[serde(default = "default_video_seek_seconds")]
    pub video_seek_seconds: u64,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_thumbnail_size() -> u32 {
    256
}

fn default_video_seek_seconds() -> u64 {
    5
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            thumbnail_size: default_thumbnail_size(),
            video_seek_seconds: default_video_seek_seconds(),
        }
    }
}

impl RepositoryConfig {
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            thumbnail_size: self.thumbnail_size,
            video_seek: Duration::from_secs(self.video_seek_seconds),
        }
    }
}

/// Initial filter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub sorting: SortingMode,

    #[serde(default = "default_take")]
    pub take: usize,
}

fn default_take() -> usize {
    128
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            sorting: SortingMode::default(),
            take: default_take(),
        }
    }
}

impl ScreenshotrConfig {
    /// Validate the entire configuration, collecting every problem
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.repository.base_dir.as_os_str().is_empty() {
            errors.push("repository.base_dir cannot be empty".to_string());
        }
        if self.repository.thumbnail_size == 0 {
            errors.push("repository.thumbnail_size must be positive".to_string());
        }
        if self.filter.take == 0 {
            errors.push("filter.take must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Loads [`ScreenshotrConfig`] from all sources
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration for the repository at `base_dir`
    pub fn load(base_dir: &Path) -> Result<ScreenshotrConfig, ConfigError> {
        let builder = merge::merge_policy::builder_with_defaults(base_dir)?;
        let builder = sources::global_file::add_to_builder(builder)?;
        let builder = sources::workspace_file::add_to_builder(builder, base_dir)?;
        let builder = builder.add_source(
            config::Environment::with_prefix("SCREENSHOTR")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: ScreenshotrConfig = builder.build()?.try_deserialize()?;
        config
            .validate()
            .map_err(|errors| ConfigError::Validation(errors.join("\n")))?;
        Ok(config)
    }
}
