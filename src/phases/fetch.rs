//! Stage 1: Fetching the Profile
//!
//! Reads `profile.yaml` from the root of the profile repository, at the
//! branch named in the install options, through whichever
//! [`ContentClient`] the caller supplied.

use log::info;

use crate::client::{repository_identifier, ContentClient};
use crate::defaults::PROFILE_FILENAME;
use crate::error::Result;
use crate::generator::InstallOptions;

/// Execute the fetch stage: return the raw bytes of the profile document.
pub fn execute(client: &dyn ContentClient, options: &InstallOptions) -> Result<Vec<u8>> {
    let repo = repository_identifier(&options.profile_url)?;
    info!(
        "fetching {} from {}@{}",
        PROFILE_FILENAME, repo, options.profile_branch
    );
    let contents = client.file_contents(&repo, PROFILE_FILENAME, &options.profile_branch)?;
    Ok(contents)
}
