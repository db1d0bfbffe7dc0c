//! Property-based tests for the repository, index and filter

mod content_addressing;
pub mod strategies;
