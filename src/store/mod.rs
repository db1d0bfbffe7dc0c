//! Content Store
//!
//! Maps a content id to its files below `{root}/data` and performs the
//! write-once import of a new item: full-resolution bytes, thumbnail and
//! metadata sidecar. Any write touching a day shard deletes that day's
//! aggregate cache so the next startup rebuilds it.

pub mod day_cache;

pub use day_cache::DayCacheLoader;

use crate::error::{MediaError, RepositoryError};
use crate::media::{self, MediaBackend, MediaInfo};
use crate::screenshot::{codec, Screenshot, DATA_DIR};
use crate::types::MediaType;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Tunables for thumbnail production
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoreOptions {
    /// Edge of the square thumbnail box
    pub thumbnail_size: u32,
    /// Videos longer than this are thumbnailed at this offset
    pub video_seek: Duration,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            thumbnail_size: 256,
            video_seek: Duration::from_secs(5),
        }
    }
}

/// Filesystem side of a repository
pub struct ContentStore {
    root: PathBuf,
    media: Arc<dyn MediaBackend>,
    options: StoreOptions,
}

impl ContentStore {
    /// Open a store rooted at `root`, creating `{root}/data` if needed
    pub fn new<P: AsRef<Path>>(
        root: P,
        media: Arc<dyn MediaBackend>,
        options: StoreOptions,
    ) -> Result<Self, RepositoryError> {
        let root = root.as_ref().to_path_buf();
        let data_dir = root.join(DATA_DIR);
        fs::create_dir_all(&data_dir).map_err(|e| RepositoryError::io(&data_dir, e))?;

        Ok(Self {
            root,
            media,
            options,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    pub fn options(&self) -> StoreOptions {
        self.options
    }

    pub fn media(&self) -> &dyn MediaBackend {
        self.media.as_ref()
    }

    pub fn full_res_path(&self, screenshot: &Screenshot) -> PathBuf {
        self.root.join(screenshot.rel_path_full_res())
    }

    pub fn thumb_path(&self, screenshot: &Screenshot) -> PathBuf {
        self.root.join(screenshot.rel_path_thumb())
    }

    pub fn meta_path(&self, screenshot: &Screenshot) -> PathBuf {
        self.root.join(screenshot.rel_path_meta())
    }

    pub fn day_cache_path(&self, screenshot: &Screenshot) -> PathBuf {
        self.root.join(screenshot.rel_path_day_cache())
    }

    /// Write all files of a freshly imported item
    ///
    /// Order: full-resolution bytes, thumbnail, sidecar, day cache
    /// invalidation. A failure after the first write leaves earlier files in
    /// place; nothing is rolled back.
    pub fn store_new(
        &self,
        screenshot: &Screenshot,
        buffer: &[u8],
        info: &MediaInfo,
    ) -> Result<(), RepositoryError> {
        let full_res = self.full_res_path(screenshot);
        if let Some(parent) = full_res.parent() {
            fs::create_dir_all(parent).map_err(|e| RepositoryError::io(parent, e))?;
        }
        fs::write(&full_res, buffer).map_err(|e| RepositoryError::io(&full_res, e))?;

        self.render_thumbnail(screenshot, &full_res, buffer, info)
            .map_err(|e| RepositoryError::ImportFailed {
                id: screenshot.id.clone(),
                reason: format!("thumbnail: {}", e),
            })?;

        self.write_sidecar(screenshot)?;
        self.invalidate_day_cache(screenshot)?;
        Ok(())
    }

    fn render_thumbnail(
        &self,
        screenshot: &Screenshot,
        full_res: &Path,
        buffer: &[u8],
        info: &MediaInfo,
    ) -> Result<(), MediaError> {
        let dest = self.thumb_path(screenshot);
        match info.media_type {
            MediaType::Image => self
                .media
                .image_thumbnail(buffer, &dest, self.options.thumbnail_size),
            MediaType::Video => {
                let target = media::fit_within(info.size, self.options.thumbnail_size);
                let seek = media::video_seek(info.duration, self.options.video_seek);
                self.media.video_thumbnail(full_res, &dest, target, seek)
            }
            MediaType::Unknown => Err(MediaError::Unsupported(format!(
                "cannot thumbnail unknown media {}",
                screenshot.id
            ))),
        }
    }

    /// Serialize the descriptor to its sidecar, overwriting any previous one
    pub fn write_sidecar(&self, screenshot: &Screenshot) -> Result<(), RepositoryError> {
        let path = self.meta_path(screenshot);
        let json = codec::to_json(screenshot).map_err(|e| RepositoryError::ImportFailed {
            id: screenshot.id.clone(),
            reason: format!("encode sidecar: {}", e),
        })?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| RepositoryError::io(parent, e))?;
        }
        fs::write(&path, json).map_err(|e| RepositoryError::io(&path, e))
    }

    /// Delete the aggregate cache of the item's day; returns whether one existed
    pub fn invalidate_day_cache(&self, screenshot: &Screenshot) -> Result<bool, RepositoryError> {
        let path = self.day_cache_path(screenshot);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "Invalidated day cache");
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(RepositoryError::io(&path, e)),
        }
    }

    /// Read every descriptor below `data/`, rebuilding missing day caches
    pub fn load_all(&self) -> Result<Vec<Screenshot>, RepositoryError> {
        DayCacheLoader::new(self.data_dir()).load_all()
    }
}
