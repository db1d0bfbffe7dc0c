//! Merge rules: built-in defaults applied beneath every other source.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};
use std::path::Path;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults(base_dir: &Path) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("repository.base_dir", base_dir.to_string_lossy().into_owned())?
        .set_default("repository.thumbnail_size", 256)?
        .set_default("repository.video_seek_seconds", 5)?
        .set_default("filter.sorting", "CreatedDescending")?
        .set_default("filter.take", 128)
}
