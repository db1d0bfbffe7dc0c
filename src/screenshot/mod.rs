//! Screenshot descriptors
//!
//! Immutable records describing one stored item. Each descriptor is
//! content-addressed and its on-disk layout is derived from `created` and `id`:
//!
//! ```text
//! data/YYYY/MM/DD/YYYYMMDD-HHMMSS-<id>.jpg
//! data/YYYY/MM/DD/YYYYMMDD-HHMMSS-<id>.thumb.png
//! data/YYYY/MM/DD/YYYYMMDD-HHMMSS-<id>.json
//! data/YYYY/MM/DD.json
//! ```

pub mod codec;
pub mod id;

use crate::types::{Custom, ImgSize, ImportInfo, MediaType, ScreenshotId};
use chrono::{DateTime, Datelike, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Name of the directory holding all shards below a repository root
pub const DATA_DIR: &str = "data";

/// Descriptor of one stored screenshot or video clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Screenshot {
    pub id: ScreenshotId,
    pub created: DateTime<FixedOffset>,
    pub bytes: u64,
    pub size: ImgSize,
    #[serde(default)]
    pub media_type: MediaType,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub custom: Custom,
    pub import_info: ImportInfo,
}

impl Screenshot {
    /// Calendar year of `created`, in the timestamp's own offset
    pub fn year(&self) -> i32 {
        self.created.year()
    }

    /// Copy with `tag` added; unchanged if already present
    pub fn with_tag(&self, tag: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.tags.insert(tag.into());
        next
    }

    /// Copy with `tag` removed
    pub fn without_tag(&self, tag: &str) -> Self {
        let mut next = self.clone();
        next.tags.remove(tag);
        next
    }

    /// Copy with the tag set replaced
    pub fn with_tags<I, S>(&self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut next = self.clone();
        next.tags = tags.into_iter().map(Into::into).collect();
        next
    }

    /// Day shard relative to the repository root: `data/YYYY/MM/DD`
    pub fn rel_dir(&self) -> PathBuf {
        let c = &self.created;
        PathBuf::from(DATA_DIR)
            .join(format!("{:04}", c.year()))
            .join(format!("{:02}", c.month()))
            .join(format!("{:02}", c.day()))
    }

    /// Filename stem: `YYYYMMDD-HHMMSS-<id>`
    pub fn file_stem(&self) -> String {
        format!("{}-{}", self.created.format("%Y%m%d-%H%M%S"), self.id)
    }

    /// Full-resolution file (always `.jpg`, whatever the container)
    pub fn rel_path_full_res(&self) -> PathBuf {
        self.rel_dir().join(format!("{}.jpg", self.file_stem()))
    }

    pub fn rel_path_thumb(&self) -> PathBuf {
        self.rel_dir().join(format!("{}.thumb.png", self.file_stem()))
    }

    /// Metadata sidecar
    pub fn rel_path_meta(&self) -> PathBuf {
        self.rel_dir().join(format!("{}.json", self.file_stem()))
    }

    /// Day aggregate cache, a sibling of the day directory: `data/YYYY/MM/DD.json`
    pub fn rel_path_day_cache(&self) -> PathBuf {
        self.rel_dir().with_extension("json")
    }
}
