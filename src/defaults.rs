//! Default values for askja.
//!
//! This module provides centralized default values used by the pipeline
//! and the CLI, ensuring consistency and avoiding duplication.

/// File fetched from the root of a profile repository.
pub const PROFILE_FILENAME: &str = "profile.yaml";

/// Branch of the profile repository used when none is given.
pub const DEFAULT_PROFILE_BRANCH: &str = "main";

/// Permission bits for newly created manifest files.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Message of the publish commit when the caller does not supply one.
pub const DEFAULT_COMMIT_MESSAGE: &str = "Add profile installation manifests";

/// Returns the commit message describing the installation of `profile_name`.
///
/// Falls back to [`DEFAULT_COMMIT_MESSAGE`] when the profile has no name.
pub fn commit_message_for(profile_name: &str) -> String {
    if profile_name.is_empty() {
        DEFAULT_COMMIT_MESSAGE.to_string()
    } else {
        format!("Install profile {}", profile_name)
    }
}
