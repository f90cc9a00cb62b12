//! # Resource Naming
//!
//! Pure functions that derive the names of generated resources and the
//! files they are written to. Names only depend on their inputs, so the
//! same profile and options always produce the same manifests, and a
//! release can refer to its source repository by name without any lookup.
//!
//! - Repository references are named
//!   `subscription-<repository basename>-<branch>`.
//! - Release references are named `subscription-helm-release-<artifact>`.
//! - Branch and artifact segments are [`flatten`]ed, so `release/1.0`
//!   becomes `release-1.0`.
//! - Manifests are written to `<base>/<lowercase kind>_<name>.yaml`.
//!
//! Cluster object names are capped at [`MAX_NAME_LENGTH`] characters, so
//! [`validate_name`] rejects anything longer before it is written out.

use std::path::Path;

use crate::error::{Error, Result};
use crate::git::normalize_relative;

/// Prefix shared by every generated resource name.
pub const NAME_PREFIX: &str = "subscription";

/// Marker placed between the prefix and the artifact name of a release.
pub const RELEASE_MARKER: &str = "helm-release";

/// Longest name a generated resource may have.
pub const MAX_NAME_LENGTH: usize = 63;

/// Join name segments with `-`.
pub fn join<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join("-")
}

/// Lowercase `segment` and replace `/` with `-`, so it fits in an object
/// name and a single file name.
pub fn flatten(segment: &str) -> String {
    segment.to_lowercase().replace('/', "-")
}

/// Name of the repository reference pointing at `branch` of `profile_url`.
pub fn repository_reference_name(profile_url: &str, branch: &str) -> String {
    join(&[
        NAME_PREFIX.to_string(),
        flatten(repository_basename(profile_url)),
        flatten(branch),
    ])
}

/// Name of the release reference for the artifact called `artifact_name`.
pub fn release_reference_name(artifact_name: &str) -> String {
    join(&[
        NAME_PREFIX.to_string(),
        RELEASE_MARKER.to_string(),
        flatten(artifact_name),
    ])
}

/// Last path segment of a repository URL, without a `.git` suffix.
///
/// A trailing `/` is ignored, so `https://example.com/org/repo/` and
/// `https://example.com/org/repo.git` both yield `repo`.
pub fn repository_basename(profile_url: &str) -> &str {
    let trimmed = profile_url.trim_end_matches('/');
    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    last.strip_suffix(".git").unwrap_or(last)
}

/// Check that a generated name fits within [`MAX_NAME_LENGTH`].
pub fn validate_name(name: &str) -> Result<()> {
    let length = name.chars().count();
    if length > MAX_NAME_LENGTH {
        return Err(Error::NameTooLong {
            name: name.to_string(),
            length,
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(())
}

/// Check a manifest directory and return it in normal form, without `.`
/// components or a trailing `/`.
///
/// `None` and the empty string both mean the working tree root. A directory
/// that is absolute, escapes the working tree or lies inside `.git` fails
/// with [`Error::InvalidPath`].
pub fn normalize_base_dir(base: Option<&str>) -> Result<Option<String>> {
    match base {
        None | Some("") => Ok(None),
        Some(base) => {
            let normalized = normalize_relative(Path::new(base))?;
            Ok(Some(normalized.to_string_lossy().into_owned()))
        }
    }
}

/// File a resource of `kind` called `name` is written to, relative to the
/// working tree root.
pub fn filename_for(base: Option<&str>, kind: &str, name: &str) -> String {
    let filename = format!("{}_{}.yaml", kind.to_lowercase(), name);
    match base.map(|b| b.trim_end_matches('/')) {
        Some(base) if !base.is_empty() => format!("{base}/{filename}"),
        _ => filename,
    }
}
