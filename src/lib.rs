//! Screenshotr: Content-Addressed Screenshot Repository
//!
//! Stores screenshots and short recordings under their SHA-1 content hash in a
//! date-sharded directory tree, keeps a JSON sidecar per item plus a per-day
//! aggregate cache, and maintains a faceted index (tags, year, user, host,
//! process) that drives a cross-filtered browsing view.

pub mod config;
pub mod error;
pub mod filter;
pub mod index;
pub mod library;
pub mod logging;
pub mod media;
pub mod repository;
pub mod screenshot;
pub mod store;
pub mod types;

pub use error::{ConfigError, MediaError, RepositoryError};
pub use filter::{FacetCount, Filter, FilterCommand, SortingMode, HIDE_TAG};
pub use index::IndexedScreenshots;
pub use library::{Library, LibraryEvent};
pub use repository::{ImportOutcome, ImportRequest, Repository};
pub use screenshot::Screenshot;
pub use types::{Custom, CustomEntry, ImgSize, ImportInfo, MediaType, ScreenshotId};
