//! Property-based tests for resource naming functions.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use crate::naming::{
        filename_for, release_reference_name, repository_basename, repository_reference_name,
        validate_name, MAX_NAME_LENGTH,
    };
    use proptest::prelude::*;

    proptest! {
        /// Property: repository reference names are deterministic
        #[test]
        fn repository_reference_name_is_deterministic(
            url in "https://[a-z]{1,10}\\.com/[a-z]{1,10}/[a-z-]{1,20}(\\.git)?",
            branch in "[a-z0-9/-]{1,20}",
        ) {
            let first = repository_reference_name(&url, &branch);
            let second = repository_reference_name(&url, &branch);
            prop_assert_eq!(first, second);
        }

        /// Property: the repository basename never contains a slash or a `.git` suffix
        #[test]
        fn repository_basename_is_a_single_segment(
            url in "https://[a-z]{1,10}\\.com/[a-z]{1,10}/[a-z-]{1,20}(\\.git)?/?",
        ) {
            let base = repository_basename(&url);
            prop_assert!(!base.contains('/'));
            prop_assert!(!base.ends_with(".git"));
        }

        /// Property: release names always carry the release prefix and end with the artifact name
        #[test]
        fn release_reference_name_wraps_artifact(artifact in "[a-z0-9-]{1,30}") {
            let name = release_reference_name(&artifact);
            prop_assert!(name.starts_with("subscription-helm-release-"));
            prop_assert!(name.ends_with(&artifact));
        }

        /// Property: generated names never contain a slash, whatever the branch
        #[test]
        fn repository_reference_name_is_a_single_segment(
            url in "https://[a-z]{1,10}\\.com/[a-z]{1,10}/[a-z-]{1,20}(\\.git)?",
            branch in "[A-Za-z0-9/-]{1,20}",
        ) {
            let name = repository_reference_name(&url, &branch);
            prop_assert!(!name.contains('/'));
            prop_assert_eq!(name.to_lowercase(), name);
        }

        /// Property: validate_name accepts exactly the names within the limit
        #[test]
        fn validate_name_matches_length_limit(name in "[a-z-]{0,100}") {
            let ok = validate_name(&name).is_ok();
            prop_assert_eq!(ok, name.chars().count() <= MAX_NAME_LENGTH);
        }

        /// Property: filenames are lowercase-kind prefixed yaml files
        #[test]
        fn filename_for_shape(kind in "[A-Za-z]{1,20}", name in "[a-z0-9-]{1,30}") {
            let filename = filename_for(None, &kind, &name);
            let expected_prefix = format!("{}_", kind.to_lowercase());
            prop_assert!(filename.starts_with(&expected_prefix));
            prop_assert!(filename.ends_with(".yaml"));
        }
    }
}
