//! Stage 6: Writing Manifests
//!
//! Writes every rendered manifest into the destination working tree and
//! stages it, in the order the generator produced them.
//!
//! ## Failure policy
//!
//! The first failed write aborts the stage. Files written before it stay in
//! the working tree and in the index; they are not rolled back. The caller
//! has to clean up (or check out afresh) before trying again.

use log::{debug, warn};

use crate::defaults::DEFAULT_FILE_MODE;
use crate::error::Result;
use crate::git::Repository;

/// A manifest ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    /// Path relative to the working tree root.
    pub path: String,
    /// Serialized manifest.
    pub contents: String,
}

/// Execute the write stage. Returns the paths written, in order.
pub fn execute(repo: &mut Repository, files: &[RenderedFile]) -> Result<Vec<String>> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        if let Err(e) = repo.write_file(&file.path, file.contents.as_bytes(), DEFAULT_FILE_MODE) {
            warn!(
                "failed to write {} after {} of {} files; those remain staged in {}",
                file.path,
                written.len(),
                files.len(),
                repo.workdir().display()
            );
            return Err(e);
        }
        debug!("wrote {}", file.path);
        written.push(file.path.clone());
    }
    Ok(written)
}
