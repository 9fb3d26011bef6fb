//! The sequential history rewrite.
//!
//! The oldest commit of the source branch seeds a new branch and is amended in
//! place. Every later commit is recreated on top of the most recent commit that
//! was rewritten successfully, so a commit that fails is dropped from the new
//! history without stopping the run.

use tracing::{debug, info, warn};

use crate::data::AuthorPool;
use crate::error::RewriteError;
use crate::git::branch::{destination_branch_name, materialize_branch, resolve_source};
use crate::git::{short_id, CommitSnapshot, HistoryBackend};
use crate::rewrite::metadata::{transform, MetadataOptions, NewSignatures};
use crate::rewrite::report::{AuthorSnapshot, RewriteFailure, RewriteRecord};
use crate::rewrite::role::{choose_author, infer_role, Picker};

/// Options for a rewrite run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Signature rewriting flags.
    pub metadata: MetadataOptions,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RewriteOutcome {
    /// Destination branch.
    pub branch: String,
    /// Records for every rewritten commit, oldest first.
    pub records: Vec<RewriteRecord>,
    /// Commits dropped from the new history.
    pub failures: Vec<RewriteFailure>,
}

/// State threaded through the chain fold.
struct ChainState<Id> {
    parent: Id,
    records: Vec<RewriteRecord>,
    failures: Vec<RewriteFailure>,
}

/// Rewrites a branch's history onto `recommited/<branch>`.
pub struct HistoryRewriter<'a, B: HistoryBackend> {
    backend: &'a mut B,
    pool: &'a AuthorPool,
    picker: &'a mut dyn Picker,
    options: RewriteOptions,
}

impl<'a, B: HistoryBackend> HistoryRewriter<'a, B> {
    /// Creates a rewriter over `backend`.
    pub fn new(
        backend: &'a mut B,
        pool: &'a AuthorPool,
        picker: &'a mut dyn Picker,
        options: RewriteOptions,
    ) -> Self {
        Self {
            backend,
            pool,
            picker,
            options,
        }
    }

    /// Rewrites every commit reachable from `source_branch`.
    ///
    /// Fails without touching the repository when the pool is empty, the
    /// working directory has uncommitted changes or the source branch cannot
    /// be resolved. Fails after materialization only if the seed commit cannot
    /// be amended.
    pub fn run(&mut self, source_branch: &str) -> Result<RewriteOutcome, RewriteError> {
        self.pool.validate()?;
        // materialization force-checks out the seed
        if !self.backend.is_clean()? {
            return Err(RewriteError::WorkingDirectoryDirty);
        }

        let tip = resolve_source(&*self.backend, source_branch)?;
        let history = self.backend.walk_from(&tip)?;
        let Some((seed, rest)) = history.split_first() else {
            return Err(RewriteError::EmptyHistory(source_branch.to_string()));
        };

        let branch = destination_branch_name(source_branch);
        println!(
            "Rewriting {} commits from {source_branch} onto {branch}",
            history.len()
        );
        materialize_branch(&mut *self.backend, &branch, seed)?;

        let (seed_id, seed_record) = self
            .rewrite_seed(&branch, seed)
            .map_err(|source| RewriteError::SeedAmend {
                commit: seed.to_string(),
                source: Box::new(source),
            })?;
        println!("✅ Amended seed {} -> {}", short_id(seed), short_id(&seed_id));

        let initial = ChainState {
            parent: seed_id,
            records: vec![seed_record],
            failures: Vec::new(),
        };
        let state = rest.iter().fold(initial, |state, original| {
            self.chain_step(&branch, state, original)
        });

        if let Err(err) = self.backend.checkout_branch(&branch) {
            warn!("Failed to refresh working tree for {branch}: {err}");
        }

        Ok(RewriteOutcome {
            branch,
            records: state.records,
            failures: state.failures,
        })
    }

    /// Amends the branch tip, which is the seed commit itself.
    fn rewrite_seed(
        &mut self,
        branch: &str,
        seed: &B::Id,
    ) -> Result<(B::Id, RewriteRecord), RewriteError> {
        let original = self.backend.load_commit(seed)?;
        let signatures = self.new_signatures(&original)?;
        let new_id = self
            .backend
            .amend_tip(branch, &signatures.author, &signatures.committer)?;
        Ok((new_id.clone(), record(&new_id, &original, &signatures)))
    }

    /// Recreates one commit on top of the last successful rewrite.
    fn chain_step(
        &mut self,
        branch: &str,
        mut state: ChainState<B::Id>,
        original: &B::Id,
    ) -> ChainState<B::Id> {
        match self.rewrite_commit(branch, &state.parent, original) {
            Ok((new_id, rewritten)) => {
                debug!("Rewrote {original} as {new_id}");
                println!("✅ {} -> {}", short_id(original), short_id(&new_id));
                state.records.push(rewritten);
                state.parent = new_id;
            }
            Err(err) => {
                warn!("Dropping commit {original}: {err}");
                println!("⚠️  Dropped {}: {err}", short_id(original));
                state.failures.push(RewriteFailure {
                    commit: original.to_string(),
                    reason: err.to_string(),
                });
            }
        }
        state
    }

    fn rewrite_commit(
        &mut self,
        branch: &str,
        parent: &B::Id,
        id: &B::Id,
    ) -> Result<(B::Id, RewriteRecord), RewriteError> {
        let original = self.backend.load_commit(id)?;
        let signatures = self.new_signatures(&original)?;
        let message = original.message.substitute(&self.pool.message);

        let new_id = self.backend.commit_on(
            branch,
            parent,
            &original.tree,
            &signatures.author,
            &signatures.committer,
            &message,
        )?;
        Ok((new_id.clone(), record(&new_id, &original, &signatures)))
    }

    fn new_signatures(
        &mut self,
        original: &CommitSnapshot<B::Id>,
    ) -> Result<NewSignatures, RewriteError> {
        let paths = self.backend.changed_paths(&original.id)?;
        let role = infer_role(&paths, &self.pool.labels);
        let identity = choose_author(self.pool, role, self.picker)?;
        info!(
            "{}: {} paths, role {}, author {identity}",
            short_id(&original.id),
            paths.len(),
            role.map_or_else(|| "any".to_string(), |r| r.to_string()),
        );
        Ok(transform(original, identity, self.options.metadata))
    }
}

fn record<Id: std::fmt::Display>(
    new_id: &Id,
    original: &CommitSnapshot<Id>,
    signatures: &NewSignatures,
) -> RewriteRecord {
    RewriteRecord {
        new_id: new_id.to_string(),
        old: AuthorSnapshot {
            author_name: original.author.display_name(),
            author_time: original.author.when,
        },
        new: AuthorSnapshot {
            author_name: signatures.author.display_name(),
            author_time: signatures.author.when,
        },
    }
}
