//! # Resource Generation
//!
//! Maps a parsed [`Profile`] and the caller's [`InstallOptions`] to the
//! ordered list of resources that install it:
//!
//! 1. one `GitRepository` for the profile's source repository and branch,
//! 2. one `HelmRelease` per artifact, in document order, each referring to
//!    that `GitRepository` by name.
//!
//! The order matters: it is the order the manifests are written in, so the
//! source always comes before anything that depends on it.

use std::collections::HashSet;

use crate::defaults::DEFAULT_PROFILE_BRANCH;
use crate::error::{Error, Result};
use crate::naming;
use crate::profile::Profile;
use crate::resources::{GeneratedResource, GitRepository, HelmRelease};

/// Options supplied by the caller of an install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallOptions {
    /// URL of the repository holding the profile,
    /// e.g. `https://github.com/weaveworks/nginx-profile.git`.
    pub profile_url: String,
    /// Branch of the profile repository to fetch and to reference.
    pub profile_branch: String,
    /// Branch to create in the destination repository.
    pub new_branch: String,
    /// Directory within the destination working tree to write manifests to.
    pub base_dir: Option<String>,
    /// Namespace to place the generated resources in.
    pub namespace: Option<String>,
}

impl InstallOptions {
    /// Options for installing `profile_url` into `new_branch`, tracking the
    /// default profile branch.
    pub fn new(profile_url: impl Into<String>, new_branch: impl Into<String>) -> Self {
        Self {
            profile_url: profile_url.into(),
            profile_branch: DEFAULT_PROFILE_BRANCH.to_string(),
            new_branch: new_branch.into(),
            base_dir: None,
            namespace: None,
        }
    }

    pub fn with_profile_branch(mut self, branch: impl Into<String>) -> Self {
        self.profile_branch = branch.into();
        self
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<String>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

/// Generate the resources that install `profile`.
///
/// Fails with [`Error::InvalidPath`] if `base_dir` could not be written
/// to, with [`Error::NameTooLong`] if a generated name exceeds the
/// identifier limit, and with [`Error::DuplicateName`] if two artifacts share
/// a name and would therefore overwrite each other's release.
pub fn generate(profile: &Profile, options: &InstallOptions) -> Result<Vec<GeneratedResource>> {
    naming::normalize_base_dir(options.base_dir.as_deref())?;

    let source_name = naming::repository_reference_name(&options.profile_url, &options.profile_branch);
    naming::validate_name(&source_name)?;

    let mut resources = Vec::with_capacity(profile.artifacts().len() + 1);
    resources.push(GeneratedResource::RepositoryReference(GitRepository::new(
        source_name.clone(),
        options.profile_url.clone(),
        options.profile_branch.clone(),
    )));

    let mut seen = HashSet::new();
    seen.insert(source_name.clone());
    for artifact in profile.artifacts() {
        let name = naming::release_reference_name(&artifact.name);
        naming::validate_name(&name)?;
        if !seen.insert(name.clone()) {
            return Err(Error::DuplicateName { name });
        }
        resources.push(GeneratedResource::ReleaseReference(HelmRelease::new(
            name,
            artifact.path.clone(),
            source_name.clone(),
        )));
    }

    if let Some(namespace) = &options.namespace {
        for resource in &mut resources {
            resource.set_namespace(namespace);
        }
    }

    Ok(resources)
}
