//! # Destination Repository
//!
//! [`Repository`] is the pipeline's view of the local git working copy that
//! manifests are published into. It wraps a `git2` repository and exposes
//! only what publishing needs:
//!
//! - [`Repository::open`] binds to an existing repository (it never
//!   initializes one),
//! - [`Repository::create_and_switch_branch`] creates a branch at `HEAD` and
//!   attaches `HEAD` to it,
//! - [`Repository::write_file`] writes a file into the working tree and
//!   stages it,
//! - [`Repository::commit`] turns everything staged into a single commit.
//!
//! Mutating operations take `&mut self`: the working tree and index are
//! shared mutable state, and one `Repository` serves one publish at a time.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use git2::{BranchType, ErrorCode, ObjectType, Oid, TreeWalkMode, TreeWalkResult};
use log::{debug, info, warn};

use crate::error::{Error, Result};

/// Identifier of a commit, the hex form of its hash.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommitId(String);

impl CommitId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn oid(&self) -> Result<Oid> {
        Ok(Oid::from_str(&self.0)?)
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Oid> for CommitId {
    fn from(oid: Oid) -> Self {
        Self(oid.to_string())
    }
}

/// Who authored a commit, and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
    pub time: SystemTime,
}

impl Author {
    /// An author stamped with the current time.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            time: SystemTime::now(),
        }
    }

    /// The same author at a different time.
    pub fn at(mut self, time: SystemTime) -> Self {
        self.time = time;
        self
    }

    fn signature(&self) -> Result<git2::Signature<'static>> {
        let seconds = self
            .time
            .duration_since(UNIX_EPOCH)
            .map_err(|e| Error::Identity {
                message: format!("commit time is before the epoch: {}", e),
            })?
            .as_secs();
        let seconds = i64::try_from(seconds).map_err(|e| Error::Identity {
            message: format!("commit time out of range: {}", e),
        })?;
        git2::Signature::new(&self.name, &self.email, &git2::Time::new(seconds, 0)).map_err(|e| {
            Error::Identity {
                message: e.message().to_string(),
            }
        })
    }
}

/// A commit as read back from the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    pub id: CommitId,
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    pub author_time: SystemTime,
    pub parents: Vec<CommitId>,
    /// Every file in the commit's tree, `/`-separated.
    pub files: Vec<String>,
}

/// A git repository with a working tree.
pub struct Repository {
    repo: git2::Repository,
    workdir: PathBuf,
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("workdir", &self.workdir)
            .finish()
    }
}

impl Repository {
    /// Open the existing repository at `path`.
    ///
    /// Fails with [`Error::NotARepository`] if `path` is not the root of a
    /// repository, or if the repository is bare.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let repo = git2::Repository::open(path).map_err(|e| Error::NotARepository {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;
        let workdir = repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| Error::NotARepository {
                path: path.to_path_buf(),
                message: "repository has no working tree".to_string(),
            })?;
        debug!("opened repository at {}", workdir.display());
        Ok(Self { repo, workdir })
    }

    /// Root of the working tree.
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Name of the branch `HEAD` is attached to, even if it has no commits
    /// yet. `None` when `HEAD` is detached.
    pub fn current_branch(&self) -> Result<Option<String>> {
        let head = self.repo.find_reference("HEAD")?;
        Ok(head
            .symbolic_target()
            .and_then(|target| target.strip_prefix("refs/heads/"))
            .map(str::to_string))
    }

    /// Whether a local branch called `name` exists.
    pub fn branch_exists(&self, name: &str) -> Result<bool> {
        match self.repo.find_branch(name, BranchType::Local) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// The commit `HEAD` resolves to, if any.
    pub fn head_commit(&self) -> Result<Option<CommitId>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?.id().into())),
            Err(e) if is_unborn(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Create the branch `name` at the current `HEAD` commit and attach
    /// `HEAD` to it.
    ///
    /// On a repository without commits, `HEAD` is pointed at the new branch
    /// and the branch comes into existence with the first commit.
    ///
    /// The working tree and index are left as they are, so the branch starts
    /// out with exactly the content of the commit it was created from.
    pub fn create_and_switch_branch(&mut self, name: &str) -> Result<()> {
        let refname = format!("refs/heads/{}", name);
        if !git2::Branch::name_is_valid(name)? {
            return Err(Error::Reference {
                reference: refname,
                message: "invalid branch name".to_string(),
            });
        }
        if self.branch_exists(name)? {
            return Err(Error::BranchAlreadyExists {
                branch: name.to_string(),
            });
        }

        match self.repo.head() {
            Ok(head) => {
                let commit = head.peel_to_commit()?;
                let mut branch = self
                    .repo
                    .branch(name, &commit, false)
                    .map_err(|e| reference_error(&refname, &e))?;
                if let Err(e) = self.repo.set_head(&refname) {
                    if let Err(delete_err) = branch.delete() {
                        warn!("failed to remove branch {} after switch failed: {}", name, delete_err);
                    }
                    return Err(reference_error(&refname, &e));
                }
                info!("created branch {} at {}", name, commit.id());
            }
            Err(e) if is_unborn(&e) => {
                self.repo
                    .set_head(&refname)
                    .map_err(|e| reference_error(&refname, &e))?;
                info!("pointed HEAD at unborn branch {}", name);
            }
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }

    /// Write `contents` to `relative_path` in the working tree and stage it.
    ///
    /// Parent directories are created as needed and an existing file is
    /// truncated. `mode` only applies when the file is created.
    pub fn write_file(
        &mut self,
        relative_path: impl AsRef<Path>,
        contents: &[u8],
        mode: u32,
    ) -> Result<()> {
        let relative_path = normalize_relative(relative_path.as_ref())?;

        let full_path = self.workdir.join(&relative_path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;

        {
            let mut file = options.open(&full_path)?;
            file.write_all(contents)?;
        }

        let mut index = self.repo.index()?;
        index.add_path(&relative_path)?;
        index.write()?;
        debug!("staged {}", relative_path.display());
        Ok(())
    }

    /// Commit everything staged, authored and committed by `author`.
    ///
    /// Fails with [`Error::NothingStaged`] rather than creating an empty
    /// commit.
    pub fn commit(&mut self, message: &str, author: &Author) -> Result<CommitId> {
        let mut index = self.repo.index()?;
        let tree_id = index.write_tree()?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit()?),
            Err(e) if is_unborn(&e) => None,
            Err(e) => return Err(e.into()),
        };
        let unchanged = match &parent {
            Some(parent) => parent.tree_id() == tree_id,
            None => index.is_empty(),
        };
        if unchanged {
            return Err(Error::NothingStaged);
        }

        let tree = self.repo.find_tree(tree_id)?;
        let signature = author.signature()?;
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;

        info!("created commit {}", oid);
        Ok(oid.into())
    }

    /// Look up a commit by the identifier [`Repository::commit`] returned.
    pub fn find_commit(&self, id: &CommitId) -> Result<CommitInfo> {
        let commit = self.repo.find_commit(id.oid()?)?;
        let author = commit.author();
        let seconds = u64::try_from(author.when().seconds()).unwrap_or_default();

        let mut files = Vec::new();
        commit.tree()?.walk(TreeWalkMode::PreOrder, |root, entry| {
            if entry.kind() == Some(ObjectType::Blob) {
                files.push(format!("{}{}", root, entry.name().unwrap_or_default()));
            }
            TreeWalkResult::Ok
        })?;

        Ok(CommitInfo {
            id: id.clone(),
            message: commit.message().unwrap_or_default().to_string(),
            author_name: author.name().unwrap_or_default().to_string(),
            author_email: author.email().unwrap_or_default().to_string(),
            author_time: UNIX_EPOCH + Duration::from_secs(seconds),
            parents: commit.parent_ids().map(CommitId::from).collect(),
            files,
        })
    }

    /// Contents of `relative_path` as recorded in commit `id`.
    pub fn committed_file(&self, id: &CommitId, relative_path: impl AsRef<Path>) -> Result<Vec<u8>> {
        let commit = self.repo.find_commit(id.oid()?)?;
        let entry = commit.tree()?.get_path(relative_path.as_ref())?;
        let blob = entry.to_object(&self.repo)?.peel_to_blob()?;
        Ok(blob.content().to_vec())
    }

    /// Whether commit `id` is reachable from the tip of local branch `branch`.
    pub fn branch_contains(&self, branch: &str, id: &CommitId) -> Result<bool> {
        let oid = id.oid()?;
        let branch = match self.repo.find_branch(branch, BranchType::Local) {
            Ok(branch) => branch,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(false),
            Err(e) => return Err(e.into()),
        };
        let Some(tip) = branch.get().target() else {
            return Ok(false);
        };
        Ok(tip == oid || self.repo.graph_descendant_of(tip, oid)?)
    }

    /// The author configured for this repository (`user.name` and
    /// `user.email`, with the usual local/global/system precedence), stamped
    /// with `time`.
    pub fn configured_author(&self, time: SystemTime) -> Result<Author> {
        let config = self.repo.config()?;
        let name = config_value(&config, "user.name")?;
        let email = config_value(&config, "user.email")?;
        Ok(Author { name, email, time })
    }
}

fn config_value(config: &git2::Config, key: &str) -> Result<String> {
    match config.get_string(key) {
        Ok(value) => Ok(value),
        Err(e) if e.code() == ErrorCode::NotFound => Err(Error::Identity {
            message: format!("{} is not set in git config", key),
        }),
        Err(e) => Err(e.into()),
    }
}

fn is_unborn(err: &git2::Error) -> bool {
    matches!(err.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound)
}

fn reference_error(reference: &str, err: &git2::Error) -> Error {
    Error::Reference {
        reference: reference.to_string(),
        message: err.message().to_string(),
    }
}

/// Normalize a path relative to the working tree root, dropping `.`
/// components.
///
/// Fails with [`Error::InvalidPath`] for paths that are empty, absolute,
/// escape the working tree, or land inside `.git`.
pub fn normalize_relative(path: &Path) -> Result<PathBuf> {
    let invalid = |message: &str| Error::InvalidPath {
        path: path.to_path_buf(),
        message: message.to_string(),
    };

    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) if normalized.as_os_str().is_empty() && part == ".git" => {
                return Err(invalid("path is inside the .git directory"))
            }
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir => return Err(invalid("path escapes the working tree")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("path must be relative"))
            }
        }
    }
    if normalized.as_os_str().is_empty() {
        return Err(invalid("path is empty"));
    }
    Ok(normalized)
}
