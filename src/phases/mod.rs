//! Implementation of the stages of the askja publish operation.
//!
//! ## Overview
//!
//! Publishing a profile runs these stages strictly in order, once:
//! 1. Fetch - Read `profile.yaml` from the profile repository
//! 2. Parse - Decode it into a [`Profile`](crate::profile::Profile)
//! 3. Generate - Derive the resources and render their manifests
//! 4. OpenRepo - Open the destination repository
//! 5. CreateBranch - Create the new branch and switch to it
//! 6. WriteAll - Write and stage every manifest in order
//! 7. Commit - Commit everything staged
//!
//! Stages 1-3 finish before the destination repository is touched, so a
//! failure there leaves it exactly as it was. A failure during WriteAll
//! leaves the manifests written so far in the working tree, staged but not
//! committed. Nothing is retried.
//!
//! Every failure is reported as a [`PublishError`] naming the stage.

use std::fmt;

use crate::error::Error;

pub mod fetch;
pub mod orchestrator;
pub mod write;

/// A stage of the publish operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Fetch,
    Parse,
    Generate,
    OpenRepo,
    CreateBranch,
    WriteAll,
    Commit,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::Parse => "parse",
            Stage::Generate => "generate",
            Stage::OpenRepo => "open-repo",
            Stage::CreateBranch => "create-branch",
            Stage::WriteAll => "write-all",
            Stage::Commit => "commit",
        }
    }

    /// Whether a failure in this stage can leave changes behind in the
    /// destination repository. A failed branch switch removes the branch it
    /// created, so only the stages after it qualify.
    pub fn leaves_partial_changes(self) -> bool {
        matches!(self, Stage::WriteAll | Stage::Commit)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error tagged with the stage that produced it.
#[derive(Debug, thiserror::Error)]
#[error("{stage} stage failed: {source}")]
pub struct PublishError {
    pub stage: Stage,
    #[source]
    pub source: Error,
}

impl PublishError {
    pub fn new(stage: Stage, source: Error) -> Self {
        Self { stage, source }
    }

    /// Adapter for `map_err` that tags an error with `stage`.
    pub fn at(stage: Stage) -> impl FnOnce(Error) -> PublishError {
        move |source| PublishError::new(stage, source)
    }
}
