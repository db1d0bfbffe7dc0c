//! Content identifiers for stored screenshots

use crate::types::ScreenshotId;
use sha1::{Digest, Sha1};

/// Length of a hex-encoded SHA-1 digest
pub const ID_LEN: usize = 40;

/// Compute the content id of a buffer
///
/// id = lowercase hex(sha1(buffer)). Tags, timestamps and provenance never
/// take part, so identical bytes always map to the same id.
pub fn compute_screenshot_id(buffer: &[u8]) -> ScreenshotId {
    let digest = Sha1::digest(buffer);
    hex::encode(digest)
}

/// Check that `id` looks like a value produced by [`compute_screenshot_id`]
pub fn is_valid_id(id: &str) -> bool {
    id.len() == ID_LEN && id.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
