//! Git operations and repository management.

pub mod backend;
pub mod branch;
pub mod commit;
pub mod repository;

pub use backend::HistoryBackend;
pub use branch::{destination_branch_name, materialize_branch, resolve_source};
pub use commit::{CommitMessage, CommitSnapshot, Stamp};
pub use repository::GitRepository;

/// Number of hex characters to show in abbreviated commit hashes.
pub const SHORT_HASH_LEN: usize = 8;

/// Abbreviates a commit id for display.
pub fn short_id(id: &impl std::fmt::Display) -> String {
    let full = id.to_string();
    full.chars().take(SHORT_HASH_LEN).collect()
}
