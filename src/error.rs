//! # Error Handling
//!
//! This module defines the centralized error type for the `askja` library.
//! It uses the `thiserror` library to create an `Error` enum that covers
//! every failure the publish pipeline can run into, with messages that carry
//! enough context to be logged meaningfully.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur within the library. The variants fall into a few groups:
//!   - fetching the profile document (`Fetch`),
//!   - decoding it or a generated manifest (`MalformedProfile`, `UnknownKind`),
//!   - naming policy violations (`NameTooLong`, `DuplicateName`),
//!   - version-control failures (`NotARepository`, `BranchAlreadyExists`,
//!     `Reference`, `NothingStaged`, `InvalidPath`, `Identity`, `Git`),
//!   - and wrapped library errors (`Io`, `Yaml`).
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! Errors raised by the pipeline are additionally tagged with the stage
//! that failed; see [`crate::phases::PublishError`].

use std::path::PathBuf;

use thiserror::Error;

use crate::client::FetchError;

/// Main error type for askja operations
#[derive(Error, Debug)]
pub enum Error {
    /// The profile document could not be fetched from its source repository.
    #[error("Failed to fetch profile: {0}")]
    Fetch(#[from] FetchError),

    /// The fetched bytes could not be decoded into a profile.
    #[error("Malformed profile: {message}")]
    MalformedProfile { message: String },

    /// A manifest declares a kind that is not one of the generated kinds.
    #[error("Unknown resource kind {kind:?}")]
    UnknownKind { kind: String },

    /// A generated resource name exceeds the identifier limit.
    #[error("Generated name {name:?} is {length} characters long, the maximum is {max}")]
    NameTooLong {
        name: String,
        length: usize,
        max: usize,
    },

    /// Two generated resources ended up with the same name.
    #[error("Duplicate generated name {name:?}")]
    DuplicateName { name: String },

    /// The destination path does not hold a git repository with a working tree.
    #[error("{} is not a git repository: {message}", path.display())]
    NotARepository { path: PathBuf, message: String },

    /// The branch to create already exists in the destination repository.
    #[error("Branch {branch:?} already exists")]
    BranchAlreadyExists { branch: String },

    /// A reference could not be created, validated or updated.
    #[error("Reference error for {reference:?}: {message}")]
    Reference { reference: String, message: String },

    /// A commit was requested but no change is staged.
    #[error("Nothing staged to commit")]
    NothingStaged,

    /// A file path would land outside of the working tree.
    #[error("Invalid path {}: {message}", path.display())]
    InvalidPath { path: PathBuf, message: String },

    /// The commit author could not be determined.
    #[error("Author identity error: {message}")]
    Identity { message: String },

    /// An error from the underlying git library.
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML (de)serialization error, wrapped from `serde_yaml::Error`.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
