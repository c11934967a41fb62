//! Property-based tests for URL path segmentation.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::path::{UrlPath, ADDRESSABLE_SEGMENTS};
    use proptest::prelude::*;
    use std::path::PathBuf;

    // ============================================================================
    // UrlPath::parse property tests
    // ============================================================================

    proptest! {
        /// Property: parsing never yields empty segments
        #[test]
        fn parse_never_yields_empty_segments(input in ".*") {
            let url = UrlPath::parse(&input);
            for segment in url.segments() {
                prop_assert!(!segment.is_empty());
                prop_assert!(!segment.contains('/'));
            }
        }

        /// Property: display output parses back to the same path
        #[test]
        fn parse_display_is_stable(input in "[a-z0-9_/.-]*") {
            let url = UrlPath::parse(&input);
            let reparsed = UrlPath::parse(&url.to_string());
            prop_assert_eq!(url, reparsed);
        }

        /// Property: addressability depends only on the segment count
        #[test]
        fn addressable_iff_four_segments(parts in prop::collection::vec("[a-z0-9_-]{1,8}", 0..7)) {
            let url = UrlPath::parse(&format!("/{}", parts.join("/")));
            prop_assert_eq!(url.is_addressable(), parts.len() == ADDRESSABLE_SEGMENTS);
        }
    }

    // ============================================================================
    // UrlPath::for_document property tests
    // ============================================================================

    proptest! {
        /// Property: a document URL has one segment for the label plus one
        /// per path component
        #[test]
        fn document_url_segment_count(
            dirs in prop::collection::vec("[a-z0-9_-]{1,8}", 0..5),
            stem in "[a-z0-9_-]{1,8}",
        ) {
            let mut relative = PathBuf::new();
            for dir in &dirs {
                relative.push(dir);
            }
            relative.push(format!("{}.md", stem));

            let url = UrlPath::for_document("software", &relative).unwrap();
            prop_assert_eq!(url.len(), dirs.len() + 2);
            prop_assert_eq!(url.segment(0), Some("software"));
            prop_assert_eq!(url.basename(), Some(stem.as_str()));
        }
    }
}
