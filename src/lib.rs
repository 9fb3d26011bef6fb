//! # recommit
//!
//! Rewrites the history of a branch onto a new `recommited/<branch>` branch,
//! reassigning each commit to an author drawn from a role-classified pool.
//!
//! ## Features
//!
//! - Role inference from the paths each commit touches
//! - Optional six-month forward shift of author and committer times
//! - Content trees are reused unchanged, so every rewritten commit has the
//!   same files as its original
//! - Commits that fail to rewrite are dropped and reported; the run continues
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use recommit::data::AuthorPool;
//! use recommit::git::GitRepository;
//! use recommit::rewrite::{HistoryRewriter, RandomPicker, RewriteOptions};
//!
//! # fn main() -> anyhow::Result<()> {
//! let pool = AuthorPool::load_from_file("authors.yaml")?;
//! let mut repo = GitRepository::open_at(".")?;
//! let mut picker = RandomPicker;
//! let outcome =
//!     HistoryRewriter::new(&mut repo, &pool, &mut picker, RewriteOptions::default())
//!         .run("master")?;
//! println!("{} commits on {}", outcome.records.len(), outcome.branch);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod data;
pub mod error;
pub mod git;
pub mod rewrite;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

pub use crate::cli::Cli;

/// The current version of recommit.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
