//! Library service
//!
//! Serialises writers and publishes immutable snapshots to readers. Imports
//! and updates run one at a time under the writer lock, so the dedup check
//! and the write always see the latest repository. Readers clone the current
//! `Arc<Filter>` and never observe a half-applied change.

use crate::config::ScreenshotrConfig;
use crate::error::RepositoryError;
use crate::filter::{Filter, FilterCommand, SortingMode};
use crate::media::ImageBackend;
use crate::repository::{ImportOutcome, ImportRequest, Repository};
use crate::screenshot::Screenshot;
use parking_lot::{Mutex, RwLock};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

/// Change notification for subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum LibraryEvent {
    Added(Arc<Screenshot>),
    Updated(Arc<Screenshot>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryStatus {
    pub version: String,
    pub count: usize,
}

pub struct Library {
    writer: Mutex<Repository>,
    filter: RwLock<Arc<Filter>>,
    subscribers: Mutex<Vec<Sender<LibraryEvent>>>,
}

impl Library {
    /// Open the repository named by the configuration
    pub fn open(config: &ScreenshotrConfig) -> Result<Self, RepositoryError> {
        let repository = Repository::init_with(
            &config.repository.base_dir,
            Arc::new(ImageBackend),
            config.repository.store_options(),
        )?;
        Ok(Self::with_repository(
            repository,
            config.filter.sorting,
            config.filter.take,
        ))
    }

    pub fn with_repository(repository: Repository, sorting: SortingMode, take: usize) -> Self {
        let filter = Filter::create(repository.entries(), sorting, take);
        Self {
            writer: Mutex::new(repository),
            filter: RwLock::new(Arc::new(filter)),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn status(&self) -> LibraryStatus {
        LibraryStatus {
            version: env!("CARGO_PKG_VERSION").to_string(),
            count: self.writer.lock().count(),
        }
    }

    /// Current repository value
    pub fn repository(&self) -> Repository {
        self.writer.lock().clone()
    }

    /// Current filter snapshot
    pub fn snapshot(&self) -> Arc<Filter> {
        self.filter.read().clone()
    }

    pub fn get(&self, id: &str) -> Option<Arc<Screenshot>> {
        self.snapshot().index().get(id).cloned()
    }

    /// Newest-first page of the whole collection
    pub fn segment(&self, skip: usize, take: usize) -> Vec<Arc<Screenshot>> {
        self.repository().segment(skip, take)
    }

    /// Receive `Added`/`Updated` events from now on
    pub fn subscribe(&self) -> Receiver<LibraryEvent> {
        let (sender, receiver) = channel();
        self.subscribers.lock().push(sender);
        receiver
    }

    pub fn import(
        &self,
        buffer: &[u8],
        request: ImportRequest,
    ) -> Result<ImportOutcome, RepositoryError> {
        let mut repository = self.writer.lock();
        let (next, outcome) = repository.import(buffer, request)?;
        *repository = next;

        if let ImportOutcome::Imported(screenshot) = &outcome {
            self.publish(screenshot.clone());
            self.notify(LibraryEvent::Added(screenshot.clone()));
        }
        Ok(outcome)
    }

    pub fn update(&self, screenshot: Screenshot) -> Result<Arc<Screenshot>, RepositoryError> {
        let mut repository = self.writer.lock();
        let (next, updated) = repository.update(screenshot)?;
        *repository = next;

        self.publish(updated.clone());
        self.notify(LibraryEvent::Updated(updated.clone()));
        Ok(updated)
    }

    /// Apply a selection change to the shared snapshot
    pub fn select(&self, command: FilterCommand) -> Arc<Filter> {
        let mut filter = self.filter.write();
        *filter = Arc::new(filter.apply(command));
        filter.clone()
    }

    fn publish(&self, screenshot: Arc<Screenshot>) {
        let mut filter = self.filter.write();
        *filter = Arc::new(filter.upsert(screenshot));
    }

    fn notify(&self, event: LibraryEvent) {
        self.subscribers
            .lock()
            .retain(|sender| sender.send(event.clone()).is_ok());
    }
}
