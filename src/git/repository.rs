//! Git repository operations

use std::path::Path;

use git2::build::CheckoutBuilder;
use git2::{BranchType, ErrorCode, ObjectType, Oid, Repository, Sort, Status, StatusOptions};
use tracing::debug;

use crate::error::GitError;
use crate::git::backend::HistoryBackend;
use crate::git::commit::{changed_paths, encode_commit, CommitMessage, CommitSnapshot, Stamp};

/// Git repository wrapper
pub struct GitRepository {
    repo: Repository,
}

/// Working directory status
#[derive(Debug)]
pub struct WorkingDirectoryStatus {
    /// Whether the working directory has no changes
    pub clean: bool,
    /// List of files with uncommitted changes
    pub changes: Vec<FileStatus>,
}

/// File status information
#[derive(Debug)]
pub struct FileStatus {
    /// Git status flags (e.g., "AM", "??", "M ")
    pub status: String,
    /// Path to the file relative to repository root
    pub file: String,
}

impl GitRepository {
    /// Open repository at specified path
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self, GitError> {
        let path = path.as_ref();
        let repo = Repository::open(path).map_err(|err| GitError::RepositoryNotFound {
            path: path.display().to_string(),
            detail: err.message().to_string(),
        })?;

        Ok(Self { repo })
    }

    /// Get working directory status, ignoring ignored files
    pub fn get_working_directory_status(&self) -> Result<WorkingDirectoryStatus, GitError> {
        let mut options = StatusOptions::new();
        options.include_untracked(true).include_ignored(false);
        let statuses = self.repo.statuses(Some(&mut options))?;

        let mut changes = Vec::new();
        for entry in statuses.iter() {
            if let Some(path) = entry.path() {
                changes.push(FileStatus {
                    status: format_status_flags(entry.status()),
                    file: path.to_string(),
                });
            }
        }

        Ok(WorkingDirectoryStatus {
            clean: changes.is_empty(),
            changes,
        })
    }

    fn find_local_branch(&self, name: &str) -> Result<git2::Branch<'_>, GitError> {
        self.repo
            .find_branch(name, BranchType::Local)
            .map_err(|err| match err.code() {
                ErrorCode::NotFound => GitError::ReferenceNotFound(name.to_string()),
                _ => GitError::from(err),
            })
    }

    fn find_commit(&self, id: Oid) -> Result<git2::Commit<'_>, GitError> {
        self.repo
            .find_commit(id)
            .map_err(|_| GitError::CommitNotFound(id.to_string()))
    }

    /// Writes a commit object byte for byte from its parts.
    fn write_commit(
        &self,
        tree: Oid,
        parents: &[Oid],
        author: &Stamp,
        committer: &Stamp,
        message: &CommitMessage,
    ) -> Result<Oid, GitError> {
        self.repo.find_tree(tree).map_err(creation_failed)?;
        let body = encode_commit(tree, parents, author, committer, message)?;
        self.repo
            .odb()
            .and_then(|odb| odb.write(ObjectType::Commit, &body))
            .map_err(creation_failed)
    }

    /// Moves `branch` from `from` to `to`, failing if it no longer points at `from`.
    fn advance_branch(&self, branch: &str, from: Oid, to: Oid, log: &str) -> Result<(), GitError> {
        self.repo
            .reference_matching(&format!("refs/heads/{branch}"), to, true, from, log)
            .map_err(creation_failed)?;
        Ok(())
    }
}

fn creation_failed(err: git2::Error) -> GitError {
    GitError::CommitCreation(err.message().to_string())
}

impl HistoryBackend for GitRepository {
    type Id = Oid;

    fn resolve_reference(&self, name: &str) -> Result<Oid, GitError> {
        let object = self
            .repo
            .revparse_single(name)
            .map_err(|_| GitError::ReferenceNotFound(name.to_string()))?;
        let commit = object
            .peel_to_commit()
            .map_err(|_| GitError::ReferenceNotFound(name.to_string()))?;
        Ok(commit.id())
    }

    fn walk_from(&self, tip: &Oid) -> Result<Vec<Oid>, GitError> {
        let mut walker = self.repo.revwalk()?;
        walker.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;
        walker.simplify_first_parent()?;
        walker.push(*tip)?;

        walker
            .map(|oid| oid.map_err(GitError::from))
            .collect::<Result<Vec<_>, _>>()
    }

    fn load_commit(&self, id: &Oid) -> Result<CommitSnapshot<Oid>, GitError> {
        let commit = self.find_commit(*id)?;
        CommitSnapshot::from_git_commit(&commit)
    }

    fn changed_paths(&self, id: &Oid) -> Result<Vec<String>, GitError> {
        let commit = self.find_commit(*id)?;
        changed_paths(&self.repo, &commit)
    }

    fn is_clean(&self) -> Result<bool, GitError> {
        Ok(self.get_working_directory_status()?.clean)
    }

    fn branch_tip(&self, name: &str) -> Result<Oid, GitError> {
        let branch = self.find_local_branch(name)?;
        branch
            .get()
            .target()
            .ok_or_else(|| GitError::ReferenceNotFound(name.to_string()))
    }

    fn create_branch(&mut self, name: &str, target: &Oid) -> Result<(), GitError> {
        let commit = self.find_commit(*target)?;
        match self.repo.branch(name, &commit, false) {
            Ok(_) => Ok(()),
            Err(err) if err.code() == ErrorCode::Exists => {
                Err(GitError::BranchExists(name.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn delete_branch(&mut self, name: &str) -> Result<(), GitError> {
        let mut branch = self.find_local_branch(name)?;
        if branch.is_head() {
            let target = branch
                .get()
                .target()
                .ok_or_else(|| GitError::ReferenceNotFound(name.to_string()))?;
            debug!("Detaching HEAD from {name} before deleting it");
            self.repo.set_head_detached(target)?;
        }
        branch.delete()?;
        Ok(())
    }

    fn checkout_branch(&mut self, name: &str) -> Result<(), GitError> {
        let branch = self.find_local_branch(name)?;
        let refname = branch
            .get()
            .name()
            .ok_or_else(|| GitError::Backend(format!("Branch {name} has a non-UTF-8 name")))?
            .to_string();

        self.repo.set_head(&refname)?;
        self.repo.checkout_head(Some(CheckoutBuilder::new().force()))?;
        Ok(())
    }

    fn amend_tip(
        &mut self,
        branch: &str,
        author: &Stamp,
        committer: &Stamp,
    ) -> Result<Oid, GitError> {
        let tip_id = self.branch_tip(branch)?;
        let tip = self.find_commit(tip_id)?;
        let parents: Vec<Oid> = tip.parent_ids().collect();
        let message = CommitMessage::from_git_commit(&tip);

        let amended = self.write_commit(tip.tree_id(), &parents, author, committer, &message)?;
        self.advance_branch(branch, tip_id, amended, "recommit: amend seed")?;
        Ok(amended)
    }

    fn commit_on(
        &mut self,
        branch: &str,
        parent: &Oid,
        tree: &Oid,
        author: &Stamp,
        committer: &Stamp,
        message: &CommitMessage,
    ) -> Result<Oid, GitError> {
        self.find_commit(*parent)?;
        let id = self.write_commit(*tree, &[*parent], author, committer, message)?;
        self.advance_branch(branch, *parent, id, "recommit: rewrite")?;
        Ok(id)
    }
}

/// Format git status flags into string representation
fn format_status_flags(flags: Status) -> String {
    let mut status = String::new();

    if flags.contains(Status::INDEX_NEW) {
        status.push('A');
    } else if flags.contains(Status::INDEX_MODIFIED) {
        status.push('M');
    } else if flags.contains(Status::INDEX_DELETED) {
        status.push('D');
    } else if flags.contains(Status::INDEX_RENAMED) {
        status.push('R');
    } else if flags.contains(Status::INDEX_TYPECHANGE) {
        status.push('T');
    } else {
        status.push(' ');
    }

    if flags.contains(Status::WT_NEW) {
        status.push('?');
    } else if flags.contains(Status::WT_MODIFIED) {
        status.push('M');
    } else if flags.contains(Status::WT_DELETED) {
        status.push('D');
    } else if flags.contains(Status::WT_TYPECHANGE) {
        status.push('T');
    } else if flags.contains(Status::WT_RENAMED) {
        status.push('R');
    } else {
        status.push(' ');
    }

    status
}
