//! Integration tests for the Screenshotr repository, index and filter

mod repository_import;
pub mod test_utils;

pub use test_utils::*;
