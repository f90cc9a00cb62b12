//! Install command implementation
//!
//! Fetches a profile, generates the manifests that install it and commits
//! them to a new branch of the destination repository. With `--dry-run` the
//! manifests are printed instead and no repository is touched.

use anyhow::{Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};

use askja::client;
use askja::defaults::DEFAULT_PROFILE_BRANCH;
use askja::generator::InstallOptions;
use askja::git::Author;
use askja::phases::orchestrator::{self, CommitOptions};
use askja::phases::PublishError;

/// Arguments for the install command
#[derive(Args, Debug)]
pub struct InstallArgs {
    /// URL of the git repository holding the profile
    #[arg(long, value_name = "URL", env = "ASKJA_PROFILE_URL")]
    pub profile_url: String,

    /// Branch of the profile repository to install from
    #[arg(long, value_name = "BRANCH", default_value = DEFAULT_PROFILE_BRANCH)]
    pub profile_branch: String,

    /// Branch to create in the destination repository
    #[arg(short = 'b', long, value_name = "BRANCH")]
    pub new_branch: String,

    /// Destination repository (defaults to current directory)
    #[arg(short, long, value_name = "PATH", env = "ASKJA_REPOSITORY")]
    pub repository: Option<PathBuf>,

    /// Directory within the destination repository to write manifests to
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<String>,

    /// Namespace to set on every generated resource
    #[arg(long, value_name = "NAMESPACE")]
    pub namespace: Option<String>,

    /// Commit message (defaults to one naming the profile)
    #[arg(short, long, value_name = "MESSAGE")]
    pub message: Option<String>,

    /// Commit author name (defaults to user.name from git config)
    #[arg(long, value_name = "NAME", env = "GIT_AUTHOR_NAME")]
    pub author_name: Option<String>,

    /// Commit author email (defaults to user.email from git config)
    #[arg(long, value_name = "EMAIL", env = "GIT_AUTHOR_EMAIL")]
    pub author_email: Option<String>,

    /// Print the generated manifests without touching any repository
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl InstallArgs {
    fn install_options(&self) -> InstallOptions {
        let mut options = InstallOptions::new(&self.profile_url, &self.new_branch)
            .with_profile_branch(&self.profile_branch);
        if let Some(base_dir) = &self.base_dir {
            options = options.with_base_dir(base_dir);
        }
        if let Some(namespace) = &self.namespace {
            options = options.with_namespace(namespace);
        }
        options
    }

    /// Author given on the command line, if any. Name and email go together.
    fn author(&self) -> Result<Option<Author>> {
        match (&self.author_name, &self.author_email) {
            (Some(name), Some(email)) => Ok(Some(Author::new(name, email))),
            (None, None) => Ok(None),
            (Some(_), None) => anyhow::bail!("--author-name given without --author-email"),
            (None, Some(_)) => anyhow::bail!("--author-email given without --author-name"),
        }
    }
}

/// Execute the install command
pub fn execute(args: InstallArgs) -> Result<()> {
    let options = args.install_options();
    let client = client::client_for(&args.profile_url)
        .with_context(|| format!("Cannot fetch profile from {}", args.profile_url))?;

    if args.dry_run {
        let rendering = orchestrator::render(client.as_ref(), &options)
            .with_context(|| format!("Failed to render profile from {}", args.profile_url))?;
        if !args.quiet {
            for file in &rendering.files {
                println!("--- {}", file.path);
                print!("{}", file.contents);
            }
            println!(
                "Would commit {} files to branch {}",
                rendering.files.len(),
                options.new_branch
            );
        }
        return Ok(());
    }

    let repository = match &args.repository {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    let commit = CommitOptions {
        message: args.message.clone(),
        author: args.author()?,
    };

    let id = orchestrator::publish(client.as_ref(), &repository, &options, &commit)
        .inspect_err(|err| {
            if let Some(hint) = partial_changes_hint(err, &options.new_branch, &repository) {
                eprintln!("{}", hint);
            }
        })
        .with_context(|| {
            format!(
                "Failed to install profile from {} into {}",
                args.profile_url,
                repository.display()
            )
        })?;

    if !args.quiet {
        println!("Committed {} to branch {}", id, options.new_branch);
    }
    Ok(())
}

/// What to tell the user when a failure left changes behind in the
/// repository. `None` when the repository is as it was.
fn partial_changes_hint(err: &PublishError, new_branch: &str, repository: &Path) -> Option<String> {
    err.stage.leaves_partial_changes().then(|| {
        format!(
            "note: {} was left on branch {} with uncommitted changes; \
             clean it up before retrying",
            repository.display(),
            new_branch
        )
    })
}
