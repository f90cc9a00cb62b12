//! # Askja
//!
//! This library turns a profile published in a git repository into the GitOps
//! manifests that install it, and commits those manifests to a new branch of
//! a destination repository. It backs the `askja` command-line tool.
//!
//! ## Quick Example
//!
//! ```
//! use askja::generator::{generate, InstallOptions};
//! use askja::profile;
//!
//! let profile = profile::parse(r#"
//! kind: Profile
//! metadata:
//!   name: nginx
//! spec:
//!   artifacts:
//!     - name: nginx-server
//!       path: nginx/chart
//! "#).unwrap();
//!
//! let options = InstallOptions::new("https://github.com/org/nginx-profile.git", "install-nginx");
//! let resources = generate(&profile, &options).unwrap();
//!
//! assert_eq!(resources.len(), 2);
//! assert_eq!(resources[0].name(), "subscription-nginx-profile-main");
//! assert_eq!(resources[1].name(), "subscription-helm-release-nginx-server");
//! ```
//!
//! ## Core Concepts
//!
//! - **Profiles (`profile`)**: The `profile.yaml` document listing the
//!   artifacts a profile installs.
//! - **Naming (`naming`)**: Deterministic names and file paths for generated
//!   resources.
//! - **Resources (`resources`, `generator`)**: The repository reference and
//!   release references derived from a profile.
//! - **Repositories (`git`, `client`)**: Reading the profile from its hosting
//!   service and writing to the destination repository.
//! - **Phases (`phases`)**: The staged publish operation and its error
//!   classification.
//!
//! The main entry point is [`phases::orchestrator::publish`].

pub mod client;
pub mod defaults;
pub mod error;
pub mod generator;
pub mod git;
pub mod naming;
pub mod phases;
pub mod profile;
pub mod resources;

#[cfg(test)]
mod naming_proptest;
