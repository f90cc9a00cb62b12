//! # Profile Source Clients
//!
//! The publish pipeline needs exactly one thing from the host that stores a
//! profile: the raw bytes of a file at a given ref. This module defines that
//! seam as the [`ContentClient`] trait and ships one implementation,
//! [`RawGitHubClient`], which reads files through
//! `raw.githubusercontent.com` without authentication.
//!
//! Clients are always passed into the pipeline explicitly. [`client_for`] is a
//! plain factory the CLI uses to pick a client for a profile URL; nothing in
//! the library resolves a client from global state.

use std::sync::OnceLock;
use std::time::Duration;

use log::debug;
use url::Url;

/// Host of the only provider [`client_for`] currently supports.
const GITHUB_HOST: &str = "github.com";

/// Base URL for raw file access on GitHub.
const RAW_GITHUB_BASE: &str = "https://raw.githubusercontent.com";

/// Network timeout for fetching a single file.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors raised while fetching a file from a profile's source repository.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The requested file does not exist at that ref.
    #[error("file not found: {url}")]
    NotFound {
        /// The URL (or identifier) that was requested.
        url: String,
    },

    /// The request failed for any other reason.
    #[error("fetch failed for {url}: {reason}")]
    Transport {
        /// The URL that was requested.
        url: String,
        /// A human-readable description of the failure.
        reason: String,
    },

    /// No client exists for the profile's host.
    #[error("unsupported git provider {host:?}, only github.com is currently supported")]
    UnsupportedHost {
        /// The host of the profile URL.
        host: String,
    },

    /// The profile URL could not be parsed.
    #[error("invalid profile URL {url:?}: {reason}")]
    InvalidUrl {
        /// The URL as given.
        url: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Fetches raw file contents from a source repository.
pub trait ContentClient {
    /// Returns the contents of `path` in `repo` at `git_ref`.
    ///
    /// `repo` is a host-specific repository identifier such as
    /// `weaveworks/nginx-profile` (see [`repository_identifier`]).
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::NotFound`] if the file does not exist at that
    /// ref and [`FetchError::Transport`] for any other failure.
    fn file_contents(&self, repo: &str, path: &str, git_ref: &str) -> Result<Vec<u8>, FetchError>;
}

/// Unauthenticated client for files hosted on GitHub.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawGitHubClient;

impl RawGitHubClient {
    /// Construct the raw file URL for a file in a repository.
    pub fn file_url(repo: &str, path: &str, git_ref: &str) -> String {
        format!("{RAW_GITHUB_BASE}/{repo}/{git_ref}/{path}")
    }
}

impl ContentClient for RawGitHubClient {
    fn file_contents(&self, repo: &str, path: &str, git_ref: &str) -> Result<Vec<u8>, FetchError> {
        let url = Self::file_url(repo, path, git_ref);
        debug!("fetching {url}");
        let response = http_agent()
            .get(&url)
            .call()
            .map_err(|e| map_ureq_error(&url, &e))?;
        response
            .into_body()
            .read_to_vec()
            .map_err(|e| FetchError::Transport {
                url: url.clone(),
                reason: e.to_string(),
            })
    }
}

/// Shared `ureq` agent with request timeout configuration.
fn http_agent() -> &'static ureq::Agent {
    static AGENT: OnceLock<ureq::Agent> = OnceLock::new();
    AGENT.get_or_init(|| {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(FETCH_TIMEOUT))
            .build();
        ureq::Agent::new_with_config(config)
    })
}

/// Map a ureq error to a [`FetchError`].
fn map_ureq_error(url: &str, err: &ureq::Error) -> FetchError {
    match err {
        ureq::Error::StatusCode(404) => FetchError::NotFound {
            url: url.to_owned(),
        },
        other => FetchError::Transport {
            url: url.to_owned(),
            reason: other.to_string(),
        },
    }
}

/// Returns a client able to fetch files for `profile_url`.
///
/// Only `github.com` URLs are supported.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] if the URL does not parse and
/// [`FetchError::UnsupportedHost`] for any host other than GitHub.
pub fn client_for(profile_url: &str) -> Result<Box<dyn ContentClient>, FetchError> {
    let parsed = parse_url(profile_url)?;
    match parsed.host_str() {
        Some(GITHUB_HOST) => Ok(Box::new(RawGitHubClient)),
        host => Err(FetchError::UnsupportedHost {
            host: host.unwrap_or_default().to_string(),
        }),
    }
}

/// Derive the host-side repository identifier from a profile URL.
///
/// `https://github.com/weaveworks/nginx-profile.git` becomes
/// `weaveworks/nginx-profile`.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] if the URL does not parse or has no
/// repository path.
pub fn repository_identifier(profile_url: &str) -> Result<String, FetchError> {
    let parsed = parse_url(profile_url)?;
    let path = parsed.path().trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    if path.is_empty() {
        return Err(FetchError::InvalidUrl {
            url: profile_url.to_string(),
            reason: "URL has no repository path".to_string(),
        });
    }
    Ok(path.to_string())
}

fn parse_url(profile_url: &str) -> Result<Url, FetchError> {
    Url::parse(profile_url).map_err(|e| FetchError::InvalidUrl {
        url: profile_url.to_string(),
        reason: e.to_string(),
    })
}
