//! The version-control operations the rewriter depends on.

use std::fmt;

use crate::error::GitError;
use crate::git::commit::{CommitMessage, CommitSnapshot, Stamp};

/// Port to the object store holding the history being rewritten.
///
/// Every call is blocking. Implementations are driven by a single rewriter
/// at a time and never called concurrently.
pub trait HistoryBackend {
    /// Object id type for commits and trees.
    type Id: Clone + Eq + fmt::Display + fmt::Debug;

    /// Resolves a branch or reference name to a commit id.
    fn resolve_reference(&self, name: &str) -> Result<Self::Id, GitError>;

    /// Lists commits reachable from `tip` along first parents, oldest first.
    fn walk_from(&self, tip: &Self::Id) -> Result<Vec<Self::Id>, GitError>;

    /// Reads signatures, raw message and tree of a commit.
    fn load_commit(&self, id: &Self::Id) -> Result<CommitSnapshot<Self::Id>, GitError>;

    /// Lists the paths touched by a commit relative to its first parent.
    fn changed_paths(&self, id: &Self::Id) -> Result<Vec<String>, GitError>;

    /// Returns true when the working directory has no uncommitted changes.
    fn is_clean(&self) -> Result<bool, GitError>;

    /// Returns the commit a local branch points at.
    fn branch_tip(&self, name: &str) -> Result<Self::Id, GitError>;

    /// Creates a local branch at `target`, failing with [`GitError::BranchExists`]
    /// when one already exists.
    fn create_branch(&mut self, name: &str, target: &Self::Id) -> Result<(), GitError>;

    /// Deletes a local branch, detaching HEAD first if it is checked out.
    fn delete_branch(&mut self, name: &str) -> Result<(), GitError>;

    /// Points HEAD at a local branch and force-checks out its tip.
    ///
    /// Uncommitted changes to tracked files are overwritten, so callers check
    /// [`HistoryBackend::is_clean`] first.
    fn checkout_branch(&mut self, name: &str) -> Result<(), GitError>;

    /// Replaces the signatures of the branch tip, keeping its tree, raw message,
    /// encoding and parents, and moves the branch to the amended commit.
    fn amend_tip(
        &mut self,
        branch: &str,
        author: &Stamp,
        committer: &Stamp,
    ) -> Result<Self::Id, GitError>;

    /// Writes a commit with a single parent and advances `branch` to it.
    ///
    /// Fails without moving the branch unless `parent` is its current tip.
    fn commit_on(
        &mut self,
        branch: &str,
        parent: &Self::Id,
        tree: &Self::Id,
        author: &Stamp,
        committer: &Stamp,
        message: &CommitMessage,
    ) -> Result<Self::Id, GitError>;
}
