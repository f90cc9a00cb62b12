//! Shared test utilities for integration and E2E tests.
//!
//! This module provides profile fixtures, an in-memory content client and
//! helpers for building destination repositories.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = RepoFixture::new().with_initial_commit();
//!     let client = MemoryClient::new().with_profile(NGINX_REPO, "main", profiles::NGINX);
//!     // ... test code
//! }
//! ```

use assert_fs::prelude::*;
use std::cell::RefCell;
use std::collections::HashMap;
use std::env;
use std::path::Path;

use askja::client::{ContentClient, FetchError};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use predicates::prelude::*;

    pub use super::profiles;
    #[allow(unused_imports)]
    pub use super::should_skip_network_tests;
    pub use super::{MemoryClient, RepoFixture, NGINX_REPO, NGINX_URL};
}

/// URL of the profile repository used throughout the tests.
pub const NGINX_URL: &str = "https://github.com/weaveworks/nginx-profile.git";

/// Repository identifier the content client sees for [`NGINX_URL`].
pub const NGINX_REPO: &str = "weaveworks/nginx-profile";

/// Profile documents for testing.
#[allow(dead_code)]
pub mod profiles {
    /// A profile with a single artifact.
    pub const NGINX: &str = r#"apiVersion: profiles.fluxcd.io/v1alpha1
kind: Profile
metadata:
  name: nginx
spec:
  description: Profile for deploying nginx
  version: v0.0.1
  artifacts:
    - name: nginx-server
      path: nginx/chart
"#;

    /// A profile with several artifacts.
    pub const MULTI: &str = r#"kind: Profile
metadata:
  name: web-stack
spec:
  artifacts:
    - name: frontend
      path: charts/frontend
    - name: backend
      path: charts/backend
    - name: cache
      path: charts/cache
"#;

    /// Two artifacts sharing a name.
    pub const DUPLICATE: &str = r#"kind: Profile
metadata:
  name: twice
spec:
  artifacts:
    - name: server
      path: charts/a
    - name: server
      path: charts/b
"#;

    /// Not a profile document at all.
    pub const MALFORMED: &str = "spec: [unclosed";
}

/// Check if network tests should be skipped.
///
/// Returns `true` if the `SKIP_NETWORK_TESTS` environment variable is set.
#[allow(dead_code)]
pub fn should_skip_network_tests() -> bool {
    env::var("SKIP_NETWORK_TESTS").is_ok()
}

/// Content client serving files from memory.
///
/// Entries are keyed by `repo:path:ref`; anything else is
/// [`FetchError::NotFound`]. Every request is recorded.
#[derive(Default)]
pub struct MemoryClient {
    files: HashMap<String, Vec<u8>>,
    requests: RefCell<Vec<String>>,
}

#[allow(dead_code)]
impl MemoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `content` for `path` in `repo` at `git_ref`.
    pub fn with_file(mut self, repo: &str, path: &str, git_ref: &str, content: &str) -> Self {
        self.files
            .insert(key(repo, path, git_ref), content.as_bytes().to_vec());
        self
    }

    /// Serve `content` as the profile document of `repo` at `git_ref`.
    pub fn with_profile(self, repo: &str, git_ref: &str, content: &str) -> Self {
        self.with_file(repo, "profile.yaml", git_ref, content)
    }

    /// Keys of every request made so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl ContentClient for MemoryClient {
    fn file_contents(&self, repo: &str, path: &str, git_ref: &str) -> Result<Vec<u8>, FetchError> {
        let key = key(repo, path, git_ref);
        self.requests.borrow_mut().push(key.clone());
        self.files
            .get(&key)
            .cloned()
            .ok_or(FetchError::NotFound { url: key })
    }
}

fn key(repo: &str, path: &str, git_ref: &str) -> String {
    format!("{repo}:{path}:{git_ref}")
}

/// A temporary destination repository.
///
/// # Example
///
/// ```rust,ignore
/// let fixture = RepoFixture::new().with_initial_commit();
/// assert_eq!(fixture.branches(), vec!["main"]);
/// ```
pub struct RepoFixture {
    temp_dir: assert_fs::TempDir,
    repo: git2::Repository,
}

#[allow(dead_code)]
impl RepoFixture {
    /// An empty repository whose unborn HEAD points at `main`, with a
    /// committer identity configured.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        let mut opts = git2::RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = git2::Repository::init_opts(temp_dir.path(), &opts)
            .expect("Failed to init repository");
        {
            let mut config = repo.config().expect("Failed to open repository config");
            config.set_str("user.name", "Fixture").unwrap();
            config.set_str("user.email", "fixture@example.com").unwrap();
        }
        Self { temp_dir, repo }
    }

    /// Commit a README on `main`.
    pub fn with_initial_commit(self) -> Self {
        self.commit_file("README.md", "# Cluster\n", "Initial commit")
    }

    /// Write `path` and commit it on the current branch.
    pub fn commit_file(self, path: &str, content: &str, message: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        {
            let mut index = self.repo.index().unwrap();
            index.add_path(Path::new(path)).unwrap();
            index.write().unwrap();
            let tree_id = index.write_tree().unwrap();
            let tree = self.repo.find_tree(tree_id).unwrap();
            let sig = git2::Signature::now("Fixture", "fixture@example.com").unwrap();
            let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
            let parents: Vec<&git2::Commit> = parent.iter().collect();
            self.repo
                .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
                .unwrap();
        }
        self
    }

    /// Create `name` at HEAD without switching to it.
    pub fn with_branch(self, name: &str) -> Self {
        {
            let head = self.repo.head().unwrap().peel_to_commit().unwrap();
            self.repo.branch(name, &head, false).unwrap();
        }
        self
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn git(&self) -> &git2::Repository {
        &self.repo
    }

    /// Sorted names of the local branches.
    pub fn branches(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .repo
            .branches(Some(git2::BranchType::Local))
            .unwrap()
            .map(|b| b.unwrap().0.name().unwrap().unwrap().to_string())
            .collect();
        names.sort();
        names
    }

    /// Short name of the branch HEAD points at.
    pub fn head_branch(&self) -> String {
        let head = self.repo.find_reference("HEAD").unwrap();
        head.symbolic_target()
            .unwrap()
            .trim_start_matches("refs/heads/")
            .to_string()
    }

    /// Hash of the commit at the tip of `branch`.
    pub fn tip(&self, branch: &str) -> git2::Oid {
        self.repo
            .find_branch(branch, git2::BranchType::Local)
            .unwrap()
            .get()
            .peel_to_commit()
            .unwrap()
            .id()
    }

    /// Paths staged in the index.
    pub fn staged(&self) -> Vec<String> {
        let index = self.repo.index().unwrap();
        index
            .iter()
            .map(|e| String::from_utf8(e.path).unwrap())
            .collect()
    }
}

impl Default for RepoFixture {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_client_serves_registered_files() {
        let client = MemoryClient::new().with_profile(NGINX_REPO, "main", profiles::NGINX);
        assert!(client
            .file_contents(NGINX_REPO, "profile.yaml", "main")
            .is_ok());
        assert!(matches!(
            client.file_contents(NGINX_REPO, "profile.yaml", "dev"),
            Err(FetchError::NotFound { .. })
        ));
        assert_eq!(client.requests().len(), 2);
    }

    #[test]
    fn test_fixture_initial_commit() {
        let fixture = RepoFixture::new().with_initial_commit();
        assert_eq!(fixture.branches(), vec!["main"]);
        assert_eq!(fixture.head_branch(), "main");
    }
}
