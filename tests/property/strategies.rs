//! Generators shared by the property suites
//!
//! Facet values come from small pools so that generated collections collide
//! on tags, years and origins often enough to exercise bucket moves.

use chrono::DateTime;
use proptest::prelude::*;
use screenshotr::filter::HIDE_TAG;
use screenshotr::screenshot::id::compute_screenshot_id;
use screenshotr::screenshot::Screenshot;
use screenshotr::types::{Custom, ImgSize, ImportInfo, MediaType};
use std::sync::Arc;

pub const TAGS: &[&str] = &["a", "b", "c", HIDE_TAG];
pub const YEARS: &[i32] = &[2020, 2021, 2022];
pub const USERS: &[&str] = &["alice", "bob"];
pub const HOSTS: &[&str] = &["desk", "laptop"];
pub const PROCESSES: &[&str] = &["snip", "obs"];
const NO_ORIGINS: &[&str] = &[];
const ORIGIN_PICKS: &[usize] = &[0, 1];

/// A descriptor whose id is drawn from eight slots, so later ones replace earlier ones
pub fn screenshot() -> impl Strategy<Value = Arc<Screenshot>> {
    (
        0u8..8,
        0..YEARS.len(),
        proptest::sample::subsequence(TAGS, 0..=TAGS.len()),
        0..USERS.len(),
        0..HOSTS.len(),
        0..PROCESSES.len(),
        0u64..1000,
    )
        .prop_map(|(slot, year, tags, user, host, process, bytes)| {
            Arc::new(Screenshot {
                id: compute_screenshot_id(&[slot]),
                created: DateTime::parse_from_rfc3339(&format!(
                    "{}-0{}-01T12:00:00+00:00",
                    YEARS[year],
                    1 + bytes % 9
                ))
                .unwrap(),
                bytes,
                size: ImgSize::new(1, 1),
                media_type: MediaType::Image,
                tags: tags.into_iter().map(String::from).collect(),
                custom: Custom::new(),
                import_info: ImportInfo {
                    username: USERS[user].into(),
                    hostname: HOSTS[host].into(),
                    process: PROCESSES[process].into(),
                    os_version: String::new(),
                    runtime_version: String::new(),
                    original_file_name: None,
                },
            })
        })
}

pub fn screenshots(max: usize) -> impl Strategy<Value = Vec<Arc<Screenshot>>> {
    proptest::collection::vec(screenshot(), 0..max)
}

/// Which origin group a selection targets
#[derive(Debug, Clone, Copy)]
pub enum OriginGroup {
    None,
    User,
    Hostname,
    Process,
}

/// Tag, year and origin selections to toggle on a filter
#[derive(Debug, Clone)]
pub struct Selection {
    pub tags: Vec<&'static str>,
    pub years: Vec<i32>,
    pub group: OriginGroup,
    pub origins: Vec<&'static str>,
}

pub fn selection() -> impl Strategy<Value = Selection> {
    (
        proptest::sample::subsequence(TAGS, 0..=2),
        proptest::sample::subsequence(YEARS, 0..=2),
        prop_oneof![
            Just(OriginGroup::None),
            Just(OriginGroup::User),
            Just(OriginGroup::Hostname),
            Just(OriginGroup::Process),
        ],
        proptest::sample::subsequence(ORIGIN_PICKS, 0..=2),
    )
        .prop_map(|(tags, years, group, picks)| {
            let pool = match group {
                OriginGroup::None => NO_ORIGINS,
                OriginGroup::User => USERS,
                OriginGroup::Hostname => HOSTS,
                OriginGroup::Process => PROCESSES,
            };
            let origins = picks.into_iter().filter_map(|i| pool.get(i).copied()).collect();
            Selection {
                tags,
                years,
                group,
                origins,
            }
        })
}
