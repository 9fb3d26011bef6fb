//! Error types for history rewriting.

use thiserror::Error;

/// Errors raised by a history backend.
#[derive(Error, Debug)]
pub enum GitError {
    /// The repository location is absent or not a valid repository.
    #[error("Repository not found at {path}: {detail}")]
    RepositoryNotFound {
        /// Location that was opened.
        path: String,
        /// Backend error detail.
        detail: String,
    },

    /// A reference could not be resolved to a commit.
    #[error("Reference not found: {0}")]
    ReferenceNotFound(String),

    /// A branch with the requested name already exists.
    #[error("Branch already exists: {0}")]
    BranchExists(String),

    /// The diff between a commit and its parent could not be computed.
    #[error("Diff unavailable for commit {commit}: {detail}")]
    DiffUnavailable {
        /// Commit whose diff failed.
        commit: String,
        /// Backend error detail.
        detail: String,
    },

    /// A commit could not be read from the object store.
    #[error("Commit not found: {0}")]
    CommitNotFound(String),

    /// Writing a commit object failed.
    #[error("Failed to create commit: {0}")]
    CommitCreation(String),

    /// A signature carried a timestamp or offset outside the representable range.
    #[error("Invalid timestamp {seconds} (offset {offset_minutes} minutes)")]
    InvalidTimestamp {
        /// Seconds since the epoch.
        seconds: i64,
        /// UTC offset in minutes.
        offset_minutes: i32,
    },

    /// Any other backend failure.
    #[error("Git backend error: {0}")]
    Backend(String),
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        Self::Backend(err.message().to_string())
    }
}

/// Errors that abort a rewrite run.
#[derive(Error, Debug)]
pub enum RewriteError {
    /// Neither the branch nor its `origin/` counterpart resolved.
    #[error("Branch not found: {branch} (also tried origin/{branch})")]
    BranchNotFound {
        /// Source branch name.
        branch: String,
    },

    /// The source branch has no reachable commits.
    #[error("Branch {0} has no commits to rewrite")]
    EmptyHistory(String),

    /// The working directory has uncommitted changes.
    #[error("Working directory is not clean. Please commit or stash changes before rewriting history.")]
    WorkingDirectoryDirty,

    /// The destination branch could not be created or checked out.
    #[error("Failed to materialize branch {branch}")]
    BranchMaterialization {
        /// Destination branch name.
        branch: String,
        /// Underlying backend failure.
        #[source]
        source: GitError,
    },

    /// The seed commit could not be amended.
    #[error("Failed to amend seed commit {commit}")]
    SeedAmend {
        /// Original seed commit id.
        commit: String,
        /// What failed while rewriting the seed.
        #[source]
        source: Box<RewriteError>,
    },

    /// The author pool cannot supply an author.
    #[error("Invalid author pool")]
    Pool(#[from] PoolError),

    /// A backend call outside the per-commit steps failed.
    #[error(transparent)]
    Git(#[from] GitError),
}

/// Author pool configuration errors.
#[derive(Error, Debug)]
pub enum PoolError {
    /// The pool contains no authors.
    #[error("Author pool is empty")]
    Empty,

    /// An entry has an empty name or email.
    #[error("Invalid author at index {index}: {reason}")]
    InvalidEntry {
        /// Position in the pool file.
        index: usize,
        /// What is wrong with the entry.
        reason: String,
    },

    /// The pool file could not be read.
    #[error("Failed to read author pool {path}")]
    Read {
        /// Pool file path.
        path: String,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The pool file is not valid YAML for the pool schema.
    #[error("Failed to parse author pool {path}")]
    Parse {
        /// Pool file path.
        path: String,
        /// Parser failure.
        #[source]
        source: serde_yaml::Error,
    },
}

/// Report aggregation errors.
#[derive(Error, Debug)]
pub enum ReportError {
    /// A record is missing data needed for aggregation.
    #[error("Malformed rewrite record for commit {commit}: {reason}")]
    MalformedRecord {
        /// Rewritten commit id.
        commit: String,
        /// What is missing.
        reason: String,
    },
}
