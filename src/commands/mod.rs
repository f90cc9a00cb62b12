//! # CLI Command Implementations
//!
//! Each subcommand of the `askja` tool lives in its own file, with an `Args`
//! struct derived using `clap` and an `execute` function that calls into the
//! `askja` library.

pub mod install;
