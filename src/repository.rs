//! Repository
//!
//! Owns the authoritative collection (id -> descriptor) on top of a
//! [`ContentStore`]. Values are copy-on-write: `import` and `update` take
//! `&self` and hand back a new repository, so a caller holding an older value
//! keeps seeing the collection as it was.

use crate::error::RepositoryError;
use crate::media::{ImageBackend, MediaBackend};
use crate::screenshot::{id, Screenshot};
use crate::store::{ContentStore, StoreOptions};
use crate::types::{Custom, ImportInfo, ScreenshotId};
use chrono::{DateTime, FixedOffset, Local};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shared, immutable collection
pub type Collection = HashMap<ScreenshotId, Arc<Screenshot>>;

/// Caller-supplied attributes of an import
#[derive(Debug, Clone, Default)]
pub struct ImportRequest {
    /// Defaults to the wall clock at import
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub tags: BTreeSet<String>,
    pub custom: Custom,
    /// Defaults to [`ImportInfo::current`]
    pub import_info: Option<ImportInfo>,
}

impl ImportRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timestamp(mut self, timestamp: DateTime<FixedOffset>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn custom(mut self, custom: Custom) -> Self {
        self.custom = custom;
        self
    }

    pub fn import_info(mut self, import_info: ImportInfo) -> Self {
        self.import_info = Some(import_info);
        self
    }
}

/// What an import produced
#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    /// New content, stored on disk
    Imported(Arc<Screenshot>),
    /// Content already present; nothing was written
    Duplicate(Arc<Screenshot>),
    /// Neither image nor video; nothing was written
    Unsupported,
}

impl ImportOutcome {
    pub fn screenshot(&self) -> Option<&Arc<Screenshot>> {
        match self {
            ImportOutcome::Imported(s) | ImportOutcome::Duplicate(s) => Some(s),
            ImportOutcome::Unsupported => None,
        }
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, ImportOutcome::Duplicate(_))
    }
}

#[derive(Clone)]
pub struct Repository {
    store: Arc<ContentStore>,
    entries: Arc<Collection>,
}

impl Repository {
    /// Open the repository at `base_dir` with the still-image backend
    pub fn init<P: AsRef<Path>>(base_dir: P) -> Result<Self, RepositoryError> {
        Self::init_with(base_dir, Arc::new(ImageBackend), StoreOptions::default())
    }

    /// Open the repository with an explicit media backend
    ///
    /// Loads every day shard; a corrupt cache or sidecar aborts startup.
    pub fn init_with<P: AsRef<Path>>(
        base_dir: P,
        media: Arc<dyn MediaBackend>,
        options: StoreOptions,
    ) -> Result<Self, RepositoryError> {
        let store = ContentStore::new(base_dir, media, options)?;
        let entries: Collection = store
            .load_all()?
            .into_iter()
            .map(|s| (s.id.clone(), Arc::new(s)))
            .collect();

        info!(
            base_dir = %store.root().display(),
            count = entries.len(),
            "Repository initialized"
        );

        Ok(Self {
            store: Arc::new(store),
            entries: Arc::new(entries),
        })
    }

    pub fn base_dir(&self) -> &Path {
        self.store.root()
    }

    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    pub fn entries(&self) -> &Arc<Collection> {
        &self.entries
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Screenshot>> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Page over the collection, newest first
    pub fn segment(&self, skip: usize, take: usize) -> Vec<Arc<Screenshot>> {
        let mut all: Vec<_> = self.entries.values().cloned().collect();
        all.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| a.id.cmp(&b.id)));
        all.into_iter().skip(skip).take(take).collect()
    }

    /// Import a buffer
    ///
    /// Duplicate and unsupported content return `self` unchanged without
    /// touching the disk. On `Err` the receiver is still the valid, unchanged
    /// repository; files written before the failure are left in place.
    pub fn import(
        &self,
        buffer: &[u8],
        request: ImportRequest,
    ) -> Result<(Repository, ImportOutcome), RepositoryError> {
        let id = id::compute_screenshot_id(buffer);
        if let Some(existing) = self.entries.get(&id) {
            debug!(id = %id, "Duplicate import skipped");
            return Ok((self.clone(), ImportOutcome::Duplicate(existing.clone())));
        }

        let Some(info) = self.store.media().probe(buffer) else {
            debug!(id = %id, bytes = buffer.len(), "Unsupported content");
            return Ok((self.clone(), ImportOutcome::Unsupported));
        };

        let screenshot = Screenshot {
            id,
            created: request
                .timestamp
                .unwrap_or_else(|| Local::now().fixed_offset()),
            bytes: buffer.len() as u64,
            size: info.size,
            media_type: info.media_type,
            tags: request.tags,
            custom: request.custom,
            import_info: request.import_info.unwrap_or_else(ImportInfo::current),
        };

        if let Err(e) = self.store.store_new(&screenshot, buffer, &info) {
            warn!(id = %screenshot.id, error = %e, "Import failed, partial files left on disk");
            return Err(e);
        }

        info!(id = %screenshot.id, media_type = ?screenshot.media_type, "Imported screenshot");

        let screenshot = Arc::new(screenshot);
        let next = self.with_entry(screenshot.clone());
        Ok((next, ImportOutcome::Imported(screenshot)))
    }

    /// Replace the descriptor of an existing item
    ///
    /// Only the sidecar is rewritten. The creation timestamp is part of the
    /// on-disk location and must not change.
    pub fn update(
        &self,
        screenshot: Screenshot,
    ) -> Result<(Repository, Arc<Screenshot>), RepositoryError> {
        if !id::is_valid_id(&screenshot.id) {
            return Err(RepositoryError::InvalidDescriptor(format!(
                "malformed id {:?}",
                screenshot.id
            )));
        }
        let existing = self
            .entries
            .get(&screenshot.id)
            .ok_or_else(|| RepositoryError::NotFound(screenshot.id.clone()))?;
        // DateTime equality ignores the offset, but the shard path does not.
        if existing.created != screenshot.created
            || existing.created.offset() != screenshot.created.offset()
        {
            return Err(RepositoryError::CreatedChanged {
                id: screenshot.id.clone(),
            });
        }

        self.store.write_sidecar(&screenshot)?;
        self.store.invalidate_day_cache(&screenshot)?;
        debug!(id = %screenshot.id, "Updated screenshot");

        let screenshot = Arc::new(screenshot);
        Ok((self.with_entry(screenshot.clone()), screenshot))
    }

    fn with_entry(&self, screenshot: Arc<Screenshot>) -> Repository {
        let mut entries = Collection::clone(&self.entries);
        entries.insert(screenshot.id.clone(), screenshot);
        Repository {
            store: self.store.clone(),
            entries: Arc::new(entries),
        }
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("base_dir", &self.base_dir())
            .field("count", &self.count())
            .finish()
    }
}
