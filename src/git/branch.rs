//! Destination branch materialization.

use tracing::{debug, info};

use crate::error::{GitError, RewriteError};
use crate::git::backend::HistoryBackend;

/// Prefix of every branch the rewriter writes to.
pub const DESTINATION_PREFIX: &str = "recommited/";

/// Returns the destination branch name for a source branch.
pub fn destination_branch_name(source: &str) -> String {
    format!("{DESTINATION_PREFIX}{source}")
}

/// Resolves the source branch, trying `origin/<name>` when the local name fails.
pub fn resolve_source<B: HistoryBackend>(
    backend: &B,
    branch: &str,
) -> Result<B::Id, RewriteError> {
    match backend.resolve_reference(branch) {
        Ok(id) => Ok(id),
        Err(err) => {
            debug!("Failed to resolve {branch}: {err}; trying origin/{branch}");
            backend
                .resolve_reference(&format!("origin/{branch}"))
                .map_err(|_| RewriteError::BranchNotFound {
                    branch: branch.to_string(),
                })
        }
    }
}

/// Creates `name` at `start` and checks it out.
///
/// A branch left over from an earlier run is deleted and creation retried
/// once, so running the rewriter twice against the same repository succeeds.
pub fn materialize_branch<B: HistoryBackend>(
    backend: &mut B,
    name: &str,
    start: &B::Id,
) -> Result<(), RewriteError> {
    let failed = |source: GitError| RewriteError::BranchMaterialization {
        branch: name.to_string(),
        source,
    };

    match backend.create_branch(name, start) {
        Ok(()) => {}
        Err(GitError::BranchExists(_)) => {
            info!("Replacing stale branch {name}");
            backend.delete_branch(name).map_err(failed)?;
            backend.create_branch(name, start).map_err(failed)?;
        }
        Err(err) => return Err(failed(err)),
    }

    backend.checkout_branch(name).map_err(failed)?;
    debug!("Checked out {name} at {start}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MemoryBackend;

    #[test]
    fn destination_name() {
        assert_eq!(destination_branch_name("master"), "recommited/master");
        assert_eq!(destination_branch_name("feature/x"), "recommited/feature/x");
    }

    #[test]
    fn resolve_falls_back_to_origin() {
        let mut backend = MemoryBackend::new();
        let tip = backend.push_commit("c0", &["a.txt"]);
        backend.add_reference("origin/main", &tip);

        assert_eq!(resolve_source(&backend, "main").unwrap(), tip);
    }

    #[test]
    fn resolve_fails_when_neither_resolves() {
        let backend = MemoryBackend::new();
        let err = resolve_source(&backend, "main").unwrap_err();
        assert!(matches!(err, RewriteError::BranchNotFound { branch } if branch == "main"));
    }

    #[test]
    fn materialize_is_idempotent() {
        let mut backend = MemoryBackend::new();
        let c0 = backend.push_commit("c0", &["a.txt"]);
        let c1 = backend.push_commit("c1", &["b.txt"]);

        materialize_branch(&mut backend, "recommited/master", &c1).unwrap();
        materialize_branch(&mut backend, "recommited/master", &c0).unwrap();

        assert_eq!(backend.branch_names(), vec!["recommited/master".to_string()]);
        assert_eq!(backend.branch_tip("recommited/master").unwrap(), c0);
        assert_eq!(backend.head(), Some("recommited/master"));
    }

    #[test]
    fn materialize_fails_when_retry_fails() {
        let mut backend = MemoryBackend::new();
        let c0 = backend.push_commit("c0", &["a.txt"]);
        materialize_branch(&mut backend, "recommited/master", &c0).unwrap();
        backend.fail_branch_deletion();

        let err = materialize_branch(&mut backend, "recommited/master", &c0).unwrap_err();
        assert!(matches!(err, RewriteError::BranchMaterialization { .. }));
    }
}
