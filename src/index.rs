//! Faceted index over the collection
//!
//! One [`FacetIndex`] per filter dimension maps a facet value to the bucket
//! of descriptors carrying it. All five share the same upsert/remove logic
//! and differ only in the key-extraction function.
//!
//! Invariant after every upsert: each bucket is non-empty, every member
//! really has the bucket's value, and every descriptor in `all` is present
//! in exactly the buckets of its own values.

use crate::screenshot::{id, Screenshot};
use crate::types::ScreenshotId;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Descriptors sharing one facet value, keyed by id
pub type Bucket = BTreeMap<ScreenshotId, Arc<Screenshot>>;

/// Secondary index for one facet family
#[derive(Clone)]
pub struct FacetIndex<K> {
    extract: fn(&Screenshot) -> Vec<K>,
    buckets: BTreeMap<K, Bucket>,
}

impl<K: Ord + Clone> FacetIndex<K> {
    pub fn new(extract: fn(&Screenshot) -> Vec<K>) -> Self {
        Self {
            extract,
            buckets: BTreeMap::new(),
        }
    }

    /// Facet values of a descriptor
    pub fn keys_of(&self, screenshot: &Screenshot) -> Vec<K> {
        (self.extract)(screenshot)
    }

    /// Insert or refresh `new`; `old` is the previous value of the same id
    pub fn upsert(&mut self, new: &Arc<Screenshot>, old: Option<&Screenshot>) {
        let new_keys = self.keys_of(new);
        for key in &new_keys {
            self.buckets
                .entry(key.clone())
                .or_default()
                .insert(new.id.clone(), new.clone());
        }

        if let Some(old) = old {
            for key in self.keys_of(old) {
                if !new_keys.contains(&key) {
                    self.remove(&key, &old.id);
                }
            }
        }
    }

    fn remove(&mut self, key: &K, id: &str) {
        if let Some(bucket) = self.buckets.get_mut(key) {
            bucket.remove(id);
            if bucket.is_empty() {
                self.buckets.remove(key);
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<&Bucket> {
        self.buckets.get(key)
    }

    /// Number of descriptors with value `key`
    pub fn count(&self, key: &K) -> usize {
        self.buckets.get(key).map_or(0, |b| b.len())
    }

    /// Known facet values, ascending
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.buckets.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &Bucket)> {
        self.buckets.iter()
    }

    /// Number of distinct facet values
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Panic if the index disagrees with `all`
    pub fn assert_consistent(&self, all: &HashMap<ScreenshotId, Arc<Screenshot>>) {
        for (key, bucket) in &self.buckets {
            assert!(!bucket.is_empty(), "empty facet bucket left behind");
            for (id, s) in bucket {
                let current = all.get(id).expect("bucket member missing from collection");
                assert!(Arc::ptr_eq(current, s) || **current == **s, "stale bucket member {id}");
                assert!(self.keys_of(s).contains(key), "bucket member {id} lacks facet value");
            }
        }
        for s in all.values() {
            for key in self.keys_of(s) {
                assert!(
                    self.get(&key).is_some_and(|b| b.contains_key(&s.id)),
                    "descriptor {} missing from its facet bucket",
                    s.id
                );
            }
        }
    }
}

fn tag_keys(s: &Screenshot) -> Vec<String> {
    s.tags.iter().cloned().collect()
}

fn year_keys(s: &Screenshot) -> Vec<i32> {
    vec![s.year()]
}

fn user_keys(s: &Screenshot) -> Vec<String> {
    vec![s.import_info.username.clone()]
}

fn hostname_keys(s: &Screenshot) -> Vec<String> {
    vec![s.import_info.hostname.clone()]
}

fn process_keys(s: &Screenshot) -> Vec<String> {
    vec![s.import_info.process.clone()]
}

/// The collection plus its five secondary indices
#[derive(Clone)]
pub struct IndexedScreenshots {
    all: HashMap<ScreenshotId, Arc<Screenshot>>,
    pub per_tag: FacetIndex<String>,
    pub per_year: FacetIndex<i32>,
    pub per_user: FacetIndex<String>,
    pub per_hostname: FacetIndex<String>,
    pub per_process: FacetIndex<String>,
}

impl Default for IndexedScreenshots {
    fn default() -> Self {
        Self::new()
    }
}

impl IndexedScreenshots {
    pub fn new() -> Self {
        Self {
            all: HashMap::new(),
            per_tag: FacetIndex::new(tag_keys),
            per_year: FacetIndex::new(year_keys),
            per_user: FacetIndex::new(user_keys),
            per_hostname: FacetIndex::new(hostname_keys),
            per_process: FacetIndex::new(process_keys),
        }
    }

    /// Index a whole collection
    pub fn create<'a, I>(screenshots: I) -> Self
    where
        I: IntoIterator<Item = &'a Arc<Screenshot>>,
    {
        let mut index = Self::new();
        for s in screenshots {
            index.upsert(s.clone());
        }
        index
    }

    pub fn all(&self) -> &HashMap<ScreenshotId, Arc<Screenshot>> {
        &self.all
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Screenshot>> {
        self.all.get(id)
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Insert a new descriptor or replace the one with the same id
    ///
    /// Panics on a descriptor whose id is not a content hash.
    pub fn upsert(&mut self, screenshot: Arc<Screenshot>) {
        assert!(
            id::is_valid_id(&screenshot.id),
            "malformed screenshot id {:?}",
            screenshot.id
        );
        let old = self.all.insert(screenshot.id.clone(), screenshot.clone());
        let old = old.as_deref();

        self.per_tag.upsert(&screenshot, old);
        self.per_year.upsert(&screenshot, old);
        self.per_user.upsert(&screenshot, old);
        self.per_hostname.upsert(&screenshot, old);
        self.per_process.upsert(&screenshot, old);
    }

    /// Copy-on-write variant of [`upsert`](Self::upsert)
    pub fn upserted(&self, screenshot: Arc<Screenshot>) -> Self {
        let mut next = self.clone();
        next.upsert(screenshot);
        next
    }

    /// Panic if any facet disagrees with the collection
    pub fn assert_consistent(&self) {
        self.per_tag.assert_consistent(&self.all);
        self.per_year.assert_consistent(&self.all);
        self.per_user.assert_consistent(&self.all);
        self.per_hostname.assert_consistent(&self.all);
        self.per_process.assert_consistent(&self.all);
    }
}
