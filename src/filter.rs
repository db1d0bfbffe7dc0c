//! Filter
//!
//! Active facet selections plus a sort mode over an [`IndexedScreenshots`]
//! snapshot. Every change produces a new `Filter` whose derived views are
//! recomputed together from one snapshot:
//!
//! - the filtered, sorted list of descriptors
//! - per-facet candidate counts for tags, years, users, hostnames, processes
//!
//! Facet counts are cross-filtered: each facet relaxes its own selection and
//! applies all the others, so a count answers "how many items would match if
//! only this facet changed".

use crate::index::{FacetIndex, IndexedScreenshots};
use crate::repository::Collection;
use crate::screenshot::Screenshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

/// Items carrying this tag are hidden unless it is selected
pub const HIDE_TAG: &str = "!hide";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortingMode {
    Created,
    #[default]
    CreatedDescending,
    Bytes,
    BytesDescending,
    TagsCount,
    TagsCountDescending,
}

/// One facet value and its cross-filtered count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetCount<K> {
    pub value: K,
    pub count: usize,
}

impl<K> FacetCount<K> {
    pub fn new(value: K, count: usize) -> Self {
        Self { value, count }
    }
}

/// A single change to a filter
#[derive(Debug, Clone, PartialEq)]
pub enum FilterCommand {
    ToggleTag(String),
    ToggleYear(i32),
    ToggleUser(String),
    ToggleHostname(String),
    ToggleProcess(String),
    Reset,
    Sort(SortingMode),
    LiveSearch(String),
    Page { skip: usize, take: usize },
}

#[derive(Debug, Default)]
struct Derived {
    screenshots: Vec<Arc<Screenshot>>,
    tags: Vec<FacetCount<String>>,
    years: Vec<FacetCount<i32>>,
    users: Vec<FacetCount<String>>,
    hostnames: Vec<FacetCount<String>>,
    processes: Vec<FacetCount<String>>,
}

#[derive(Clone)]
pub struct Filter {
    index: Arc<IndexedScreenshots>,
    live_search: String,
    selected_tags: BTreeSet<String>,
    selected_years: BTreeSet<i32>,
    selected_users: BTreeSet<String>,
    selected_hostnames: BTreeSet<String>,
    selected_processes: BTreeSet<String>,
    sorting: SortingMode,
    skip: usize,
    take: usize,
    derived: Arc<Derived>,
}

impl Default for Filter {
    fn default() -> Self {
        Self::empty()
    }
}

impl Filter {
    /// Filter over nothing, newest first
    pub fn empty() -> Self {
        Self::from_index(IndexedScreenshots::new(), SortingMode::default(), 0)
    }

    /// Index a repository collection and filter it with no selections
    pub fn create(collection: &Collection, sorting: SortingMode, take: usize) -> Self {
        Self::from_index(IndexedScreenshots::create(collection.values()), sorting, take)
    }

    pub fn from_index(index: IndexedScreenshots, sorting: SortingMode, take: usize) -> Self {
        Filter {
            index: Arc::new(index),
            live_search: String::new(),
            selected_tags: BTreeSet::new(),
            selected_years: BTreeSet::new(),
            selected_users: BTreeSet::new(),
            selected_hostnames: BTreeSet::new(),
            selected_processes: BTreeSet::new(),
            sorting,
            skip: 0,
            take,
            derived: Arc::new(Derived::default()),
        }
        .recompute()
    }

    pub fn index(&self) -> &IndexedScreenshots {
        &self.index
    }

    pub fn live_search(&self) -> &str {
        &self.live_search
    }

    pub fn sorting(&self) -> SortingMode {
        self.sorting
    }

    pub fn selected_tags(&self) -> &BTreeSet<String> {
        &self.selected_tags
    }

    pub fn selected_years(&self) -> &BTreeSet<i32> {
        &self.selected_years
    }

    pub fn selected_users(&self) -> &BTreeSet<String> {
        &self.selected_users
    }

    pub fn selected_hostnames(&self) -> &BTreeSet<String> {
        &self.selected_hostnames
    }

    pub fn selected_processes(&self) -> &BTreeSet<String> {
        &self.selected_processes
    }

    /// Filtered and sorted descriptors
    pub fn screenshots(&self) -> &[Arc<Screenshot>] {
        &self.derived.screenshots
    }

    pub fn tags(&self) -> &[FacetCount<String>] {
        &self.derived.tags
    }

    pub fn years(&self) -> &[FacetCount<i32>] {
        &self.derived.years
    }

    pub fn users(&self) -> &[FacetCount<String>] {
        &self.derived.users
    }

    pub fn hostnames(&self) -> &[FacetCount<String>] {
        &self.derived.hostnames
    }

    pub fn processes(&self) -> &[FacetCount<String>] {
        &self.derived.processes
    }

    pub fn count_all(&self) -> usize {
        self.index.len()
    }

    pub fn count_filtered(&self) -> usize {
        self.derived.screenshots.len()
    }

    /// Advisory `skip/take` window over the filtered list; `take == 0` means all
    pub fn page(&self) -> &[Arc<Screenshot>] {
        let all = self.screenshots();
        let start = self.skip.min(all.len());
        let end = if self.take == 0 {
            all.len()
        } else {
            start.saturating_add(self.take).min(all.len())
        };
        &all[start..end]
    }

    pub fn apply(&self, command: FilterCommand) -> Filter {
        match command {
            FilterCommand::ToggleTag(x) => self.toggle_tag(&x),
            FilterCommand::ToggleYear(x) => self.toggle_year(x),
            FilterCommand::ToggleUser(x) => self.toggle_user(&x),
            FilterCommand::ToggleHostname(x) => self.toggle_hostname(&x),
            FilterCommand::ToggleProcess(x) => self.toggle_process(&x),
            FilterCommand::Reset => self.reset(),
            FilterCommand::Sort(mode) => self.with_sorting(mode),
            FilterCommand::LiveSearch(s) => self.with_live_search(s),
            FilterCommand::Page { skip, take } => self.with_paging(skip, take),
        }
    }

    /// Clear every selection
    pub fn reset(&self) -> Filter {
        let mut next = self.clone();
        next.selected_tags.clear();
        next.selected_years.clear();
        next.selected_users.clear();
        next.selected_hostnames.clear();
        next.selected_processes.clear();
        next.recompute()
    }

    pub fn toggle_tag(&self, tag: &str) -> Filter {
        let mut next = self.clone();
        toggle(&mut next.selected_tags, tag.to_string());
        next.recompute()
    }

    pub fn toggle_year(&self, year: i32) -> Filter {
        let mut next = self.clone();
        toggle(&mut next.selected_years, year);
        next.recompute()
    }

    /// Users, hostnames and processes are exclusive: toggling one clears the others
    pub fn toggle_user(&self, user: &str) -> Filter {
        let mut next = self.clone();
        toggle(&mut next.selected_users, user.to_string());
        next.selected_hostnames.clear();
        next.selected_processes.clear();
        next.recompute()
    }

    pub fn toggle_hostname(&self, hostname: &str) -> Filter {
        let mut next = self.clone();
        next.selected_users.clear();
        toggle(&mut next.selected_hostnames, hostname.to_string());
        next.selected_processes.clear();
        next.recompute()
    }

    pub fn toggle_process(&self, process: &str) -> Filter {
        let mut next = self.clone();
        next.selected_users.clear();
        next.selected_hostnames.clear();
        toggle(&mut next.selected_processes, process.to_string());
        next.recompute()
    }

    pub fn with_sorting(&self, sorting: SortingMode) -> Filter {
        let mut next = self.clone();
        next.sorting = sorting;
        next.recompute()
    }

    /// Stored for callers; does not affect the derived views
    pub fn with_live_search(&self, live_search: impl Into<String>) -> Filter {
        let mut next = self.clone();
        next.live_search = live_search.into();
        next
    }

    pub fn with_paging(&self, skip: usize, take: usize) -> Filter {
        let mut next = self.clone();
        next.skip = skip;
        next.take = take;
        next
    }

    /// Insert or replace a descriptor and recompute
    pub fn upsert(&self, screenshot: Arc<Screenshot>) -> Filter {
        let mut next = self.clone();
        Arc::make_mut(&mut next.index).upsert(screenshot);
        next.recompute()
    }

    fn hide_ok(&self, s: &Screenshot) -> bool {
        self.selected_tags.contains(HIDE_TAG) || !s.tags.contains(HIDE_TAG)
    }

    fn tag_ok(&self, s: &Screenshot) -> bool {
        self.selected_tags.is_empty() || s.tags.iter().any(|t| self.selected_tags.contains(t))
    }

    fn year_ok(&self, s: &Screenshot) -> bool {
        self.selected_years.is_empty() || self.selected_years.contains(&s.year())
    }

    fn user_ok(&self, s: &Screenshot) -> bool {
        self.selected_users.is_empty() || self.selected_users.contains(&s.import_info.username)
    }

    fn hostname_ok(&self, s: &Screenshot) -> bool {
        self.selected_hostnames.is_empty()
            || self.selected_hostnames.contains(&s.import_info.hostname)
    }

    fn process_ok(&self, s: &Screenshot) -> bool {
        self.selected_processes.is_empty()
            || self.selected_processes.contains(&s.import_info.process)
    }

    fn origin_ok(&self, s: &Screenshot) -> bool {
        self.user_ok(s) && self.hostname_ok(s) && self.process_ok(s)
    }

    fn recompute(mut self) -> Filter {
        let mut screenshots: Vec<Arc<Screenshot>> = self
            .index
            .all()
            .values()
            .filter(|s| {
                let s: &Screenshot = s;
                self.hide_ok(s) && self.tag_ok(s) && self.year_ok(s) && self.origin_ok(s)
            })
            .cloned()
            .collect();
        screenshots.sort_by(|a, b| a.id.cmp(&b.id));
        sort(&mut screenshots, self.sorting);

        // Tag counts skip the hide rule so "!hide" itself stays selectable.
        let tags = facet_counts(&self.index.per_tag, &self.selected_tags, |s| {
            self.year_ok(s) && self.origin_ok(s)
        });
        let years = facet_counts(&self.index.per_year, &self.selected_years, |s| {
            self.hide_ok(s) && self.tag_ok(s) && self.origin_ok(s)
        });
        let users = facet_counts(&self.index.per_user, &self.selected_users, |s| {
            self.hide_ok(s)
                && self.tag_ok(s)
                && self.year_ok(s)
                && self.hostname_ok(s)
                && self.process_ok(s)
        });
        let hostnames = facet_counts(&self.index.per_hostname, &self.selected_hostnames, |s| {
            self.hide_ok(s) && self.tag_ok(s) && self.year_ok(s) && self.user_ok(s) && self.process_ok(s)
        });
        let processes = facet_counts(&self.index.per_process, &self.selected_processes, |s| {
            self.hide_ok(s)
                && self.tag_ok(s)
                && self.year_ok(s)
                && self.user_ok(s)
                && self.hostname_ok(s)
        });

        debug!(
            total = self.index.len(),
            filtered = screenshots.len(),
            tags = tags.len(),
            years = years.len(),
            "Recomputed filter"
        );

        self.derived = Arc::new(Derived {
            screenshots,
            tags,
            years,
            users,
            hostnames,
            processes,
        });
        self
    }
}

fn toggle<K: Ord>(set: &mut BTreeSet<K>, value: K) {
    if !set.remove(&value) {
        set.insert(value);
    }
}

fn sort(xs: &mut [Arc<Screenshot>], mode: SortingMode) {
    match mode {
        SortingMode::Created => xs.sort_by(|a, b| a.created.cmp(&b.created)),
        SortingMode::CreatedDescending => xs.sort_by(|a, b| b.created.cmp(&a.created)),
        SortingMode::Bytes => xs.sort_by_key(|s| s.bytes),
        SortingMode::BytesDescending => xs.sort_by(|a, b| b.bytes.cmp(&a.bytes)),
        SortingMode::TagsCount => xs.sort_by_key(|s| s.tags.len()),
        SortingMode::TagsCountDescending => xs.sort_by(|a, b| b.tags.len().cmp(&a.tags.len())),
    }
}

/// Count bucket members passing `keep`; zero counts survive only if selected
fn facet_counts<K, F>(index: &FacetIndex<K>, selected: &BTreeSet<K>, keep: F) -> Vec<FacetCount<K>>
where
    K: Ord + Clone,
    F: Fn(&Screenshot) -> bool,
{
    index
        .iter()
        .filter_map(|(value, bucket)| {
            let count = bucket.values().filter(|s| keep(&***s)).count();
            (count > 0 || selected.contains(value)).then(|| FacetCount::new(value.clone(), count))
        })
        .collect()
}
