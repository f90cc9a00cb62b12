//! # Profile Schema and Parsing
//!
//! This module defines the data structures for a profile document, the
//! declarative description of a set of artifacts to install, and the logic
//! for parsing it.
//!
//! A profile looks like this:
//!
//! ```yaml
//! apiVersion: profiles.fluxcd.io/v1alpha1
//! kind: Profile
//! metadata:
//!   name: nginx
//! spec:
//!   description: Profile for deploying nginx
//!   version: v0.0.1
//!   artifacts:
//!     - name: nginx-server
//!       path: nginx/chart
//! ```
//!
//! Parsing is lenient about missing fields, which default to empty values,
//! but a document that declares a `kind` other than `Profile` is rejected.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Kind discriminator of a profile document.
pub const PROFILE_KIND: &str = "Profile";

/// API version written by current profile tooling.
pub const PROFILE_API_VERSION: &str = "profiles.fluxcd.io/v1alpha1";

/// Object metadata shared by profiles and generated resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    /// Object name.
    #[serde(default)]
    pub name: String,
    /// Namespace the object lives in, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// A single installable unit within a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// The name of the artifact.
    #[serde(default)]
    pub name: String,
    /// The path to the artifact in the profile repository.
    #[serde(default)]
    pub path: String,
}

/// The desired state of a profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSpec {
    /// Text that lets a user identify what this profile installs.
    #[serde(default)]
    pub description: String,
    /// Profile version, carried through as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Artifacts in document order.
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

/// A parsed profile document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub api_version: String,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: ProfileSpec,
}

impl Profile {
    /// The profile's name.
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// The profile's artifacts in document order.
    pub fn artifacts(&self) -> &[Artifact] {
        &self.spec.artifacts
    }
}

/// Parses a YAML string into a [`Profile`].
pub fn parse(yaml_content: &str) -> Result<Profile> {
    let profile: Profile =
        serde_yaml::from_str(yaml_content).map_err(|e| Error::MalformedProfile {
            message: e.to_string(),
        })?;

    if !profile.kind.is_empty() && profile.kind != PROFILE_KIND {
        return Err(Error::MalformedProfile {
            message: format!(
                "expected kind {:?}, found {:?}",
                PROFILE_KIND, profile.kind
            ),
        });
    }

    Ok(profile)
}

/// Parses raw fetched bytes into a [`Profile`].
pub fn parse_bytes(bytes: &[u8]) -> Result<Profile> {
    let content = std::str::from_utf8(bytes).map_err(|e| Error::MalformedProfile {
        message: format!("profile is not valid UTF-8: {}", e),
    })?;
    parse(content)
}

/// Parse a profile from a YAML file path
pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Profile> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}
