//! Orchestrator for the complete publish operation
//!
//! This module chains the stages into the two operations the CLI offers:
//! [`render`], which stops after generating manifests, and [`publish`],
//! which goes on to commit them to a new branch of the destination
//! repository.

use std::path::Path;
use std::time::SystemTime;

use log::info;

use super::write::RenderedFile;
use super::{fetch, write, PublishError, Stage};
use crate::client::ContentClient;
use crate::defaults::commit_message_for;
use crate::error::Result;
use crate::generator::{generate, InstallOptions};
use crate::git::{Author, CommitId, Repository};
use crate::naming::{filename_for, normalize_base_dir};
use crate::profile::{self, Profile};
use crate::resources::GeneratedResource;

/// How the publish commit is made.
#[derive(Debug, Clone, Default)]
pub struct CommitOptions {
    /// Commit message. Defaults to one naming the installed profile.
    pub message: Option<String>,
    /// Commit author. Defaults to `user.name`/`user.email` from the
    /// destination repository's git config, stamped with the current time.
    pub author: Option<Author>,
}

/// The outcome of the fetch, parse and generate stages.
#[derive(Debug, Clone)]
pub struct Rendering {
    pub profile: Profile,
    pub resources: Vec<GeneratedResource>,
    /// One manifest per resource, in the same order.
    pub files: Vec<RenderedFile>,
}

/// Fetch, parse and generate, without touching any repository.
pub fn render(
    client: &dyn ContentClient,
    options: &InstallOptions,
) -> std::result::Result<Rendering, PublishError> {
    // Stage 1: Fetch
    let bytes = fetch::execute(client, options).map_err(PublishError::at(Stage::Fetch))?;

    // Stage 2: Parse
    let profile = profile::parse_bytes(&bytes).map_err(PublishError::at(Stage::Parse))?;
    info!(
        "parsed profile {:?} with {} artifacts",
        profile.name(),
        profile.artifacts().len()
    );

    // Stage 3: Generate
    let resources = generate(&profile, options).map_err(PublishError::at(Stage::Generate))?;
    let files = render_files(&resources, options.base_dir.as_deref())
        .map_err(PublishError::at(Stage::Generate))?;

    Ok(Rendering {
        profile,
        resources,
        files,
    })
}

/// Serialize each resource and work out where it is written.
pub fn render_files(
    resources: &[GeneratedResource],
    base_dir: Option<&str>,
) -> Result<Vec<RenderedFile>> {
    let base_dir = normalize_base_dir(base_dir)?;
    let base_dir = base_dir.as_deref();
    resources
        .iter()
        .map(|resource| {
            Ok(RenderedFile {
                path: filename_for(base_dir, resource.kind(), resource.name()),
                contents: resource.to_yaml()?,
            })
        })
        .collect()
}

/// Execute the complete publish operation.
///
/// Renders the profile, then opens the repository at `repo_path`, creates
/// and switches to `options.new_branch`, writes every manifest and commits
/// them as a single commit. Returns the identifier of that commit.
pub fn publish(
    client: &dyn ContentClient,
    repo_path: &Path,
    options: &InstallOptions,
    commit: &CommitOptions,
) -> std::result::Result<CommitId, PublishError> {
    let rendering = render(client, options)?;

    // Stage 4: OpenRepo
    let mut repo = Repository::open(repo_path).map_err(PublishError::at(Stage::OpenRepo))?;

    // Stage 5: CreateBranch
    repo.create_and_switch_branch(&options.new_branch)
        .map_err(PublishError::at(Stage::CreateBranch))?;

    // Stage 6: WriteAll
    let written =
        write::execute(&mut repo, &rendering.files).map_err(PublishError::at(Stage::WriteAll))?;

    // Stage 7: Commit
    let author = match &commit.author {
        Some(author) => author.clone(),
        None => repo
            .configured_author(SystemTime::now())
            .map_err(PublishError::at(Stage::Commit))?,
    };
    let message = commit
        .message
        .clone()
        .unwrap_or_else(|| commit_message_for(rendering.profile.name()));
    let id = repo
        .commit(&message, &author)
        .map_err(PublishError::at(Stage::Commit))?;

    info!(
        "committed {} files to {} as {}",
        written.len(),
        options.new_branch,
        id
    );
    Ok(id)
}
