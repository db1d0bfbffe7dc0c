//! Property tests for content addressing

use proptest::prelude::*;
use screenshotr::screenshot::id::{compute_screenshot_id, is_valid_id, ID_LEN};

/// Ids are deterministic, well-formed, and distinct for distinct content
#[test]
fn test_id_determinism_property() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(any::<Vec<u8>>(), any::<Vec<u8>>()), |(content1, content2)| {
            let id1 = compute_screenshot_id(&content1);
            let id2 = compute_screenshot_id(&content2);

            prop_assert_eq!(id1.len(), ID_LEN);
            prop_assert!(is_valid_id(&id1));
            prop_assert_eq!(&id1, &compute_screenshot_id(&content1));

            if content1 == content2 {
                prop_assert_eq!(id1, id2);
            } else {
                // SHA-1 collisions are not expected on random input
                prop_assert_ne!(id1, id2);
            }
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_uppercase_and_short_ids_rejected() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&any::<Vec<u8>>(), |content| {
            let id = compute_screenshot_id(&content);
            prop_assert!(!is_valid_id(&id.to_uppercase()) || !id.chars().any(|c| c.is_ascii_alphabetic()));
            prop_assert!(!is_valid_id(&id[..ID_LEN - 1]));
            Ok(())
        })
        .unwrap();
}
