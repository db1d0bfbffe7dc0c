//! Day-Cache Loader
//!
//! Rebuilds the collection at startup from `data/<year>/<month>/<day>/`.
//! Each day has an optional aggregate sibling `<day>.json` holding every
//! sidecar of that day. If present it is read directly; otherwise the
//! individual sidecars are parsed and the aggregate is written back, so the
//! next startup costs O(days) instead of O(files).

use crate::error::RepositoryError;
use crate::screenshot::{codec, id, Screenshot};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use walkdir::WalkDir;

/// Depth of a day directory below `data/`
const DAY_DEPTH: usize = 3;

pub struct DayCacheLoader {
    data_dir: PathBuf,
}

impl DayCacheLoader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load every descriptor of every day, in path order
    ///
    /// Fails on the first unreadable directory or unparsable file; a corrupt
    /// cache is never skipped.
    pub fn load_all(&self) -> Result<Vec<Screenshot>, RepositoryError> {
        let mut all = Vec::new();
        for day_dir in self.day_dirs()? {
            all.extend(self.load_day(&day_dir)?);
        }
        Ok(all)
    }

    /// All `data/YYYY/MM/DD` directories, sorted
    pub fn day_dirs(&self) -> Result<Vec<PathBuf>, RepositoryError> {
        let walker = WalkDir::new(&self.data_dir)
            .min_depth(DAY_DEPTH)
            .max_depth(DAY_DEPTH)
            .sort_by_file_name();

        let mut dirs = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| self.data_dir.clone());
                RepositoryError::io(path, e.into())
            })?;
            if entry.file_type().is_dir() {
                dirs.push(entry.into_path());
            }
        }
        Ok(dirs)
    }

    /// Load one day, via its aggregate if present, else by scanning sidecars
    pub fn load_day(&self, day_dir: &Path) -> Result<Vec<Screenshot>, RepositoryError> {
        let cache_file = day_dir.with_extension("json");
        if cache_file.is_file() {
            let entries: Vec<Screenshot> = read_json(&cache_file)?;
            for s in &entries {
                check_id(&cache_file, s)?;
            }
            return Ok(entries);
        }

        let mut sidecars = Vec::new();
        for entry in fs::read_dir(day_dir).map_err(|e| RepositoryError::io(day_dir, e))? {
            let path = entry.map_err(|e| RepositoryError::io(day_dir, e))?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                sidecars.push(path);
            }
        }
        sidecars.sort();

        let mut entries = Vec::with_capacity(sidecars.len());
        for path in &sidecars {
            let s = read_json::<Screenshot>(path)?;
            check_id(path, &s)?;
            entries.push(s);
        }

        let json = codec::to_json(&entries).map_err(|e| RepositoryError::CorruptCache {
            path: cache_file.clone(),
            reason: e.to_string(),
        })?;
        fs::write(&cache_file, json).map_err(|e| RepositoryError::io(&cache_file, e))?;
        info!(
            path = %cache_file.display(),
            entries = entries.len(),
            "Rebuilt day cache"
        );

        Ok(entries)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, RepositoryError> {
    let text = fs::read_to_string(path).map_err(|e| RepositoryError::io(path, e))?;
    codec::parse_lenient(&text).map_err(|reason| RepositoryError::CorruptCache {
        path: path.to_path_buf(),
        reason,
    })
}

/// Reject descriptors whose id is not a content hash
fn check_id(path: &Path, screenshot: &Screenshot) -> Result<(), RepositoryError> {
    if id::is_valid_id(&screenshot.id) {
        Ok(())
    } else {
        Err(RepositoryError::CorruptCache {
            path: path.to_path_buf(),
            reason: format!("malformed screenshot id {:?}", screenshot.id),
        })
    }
}
