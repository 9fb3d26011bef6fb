//! Shared test utilities: an in-memory history backend and a scripted picker.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{Duration, FixedOffset, TimeZone};

use crate::data::Identity;
use crate::error::GitError;
use crate::git::{CommitMessage, CommitSnapshot, HistoryBackend, Stamp};
use crate::rewrite::Picker;

/// Picker that replays a fixed sequence of choices.
///
/// Each call takes the next value (cycling) modulo the candidate count and
/// records the candidate count it was asked about.
pub(crate) struct SequencePicker {
    values: Vec<usize>,
    next: usize,
    requested: Vec<usize>,
}

impl SequencePicker {
    /// Creates a picker replaying `values`.
    pub(crate) fn new(values: Vec<usize>) -> Self {
        Self {
            values,
            next: 0,
            requested: Vec::new(),
        }
    }

    /// Candidate counts seen so far, in call order.
    pub(crate) fn requested(&self) -> Vec<usize> {
        self.requested.clone()
    }
}

impl Picker for SequencePicker {
    fn pick(&mut self, n: usize) -> usize {
        self.requested.push(n);
        if self.values.is_empty() {
            return 0;
        }
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value % n
    }
}

struct StoredCommit {
    snapshot: CommitSnapshot<String>,
    parent: Option<String>,
    paths: Vec<String>,
}

/// History backend holding commits and branches in memory.
///
/// Mirrors the git adapter's contract: branch creation refuses existing names,
/// and committing onto a branch requires the parent to be its current tip.
pub(crate) struct MemoryBackend {
    commits: HashMap<String, StoredCommit>,
    last_pushed: Option<String>,
    branches: BTreeMap<String, String>,
    references: HashMap<String, String>,
    head: Option<String>,
    dirty: bool,
    failing_trees: HashSet<String>,
    failing_diffs: HashSet<String>,
    fail_deletion: bool,
    next_id: usize,
}

impl MemoryBackend {
    pub(crate) fn new() -> Self {
        Self {
            commits: HashMap::new(),
            last_pushed: None,
            branches: BTreeMap::new(),
            references: HashMap::new(),
            head: None,
            dirty: false,
            failing_trees: HashSet::new(),
            failing_diffs: HashSet::new(),
            fail_deletion: false,
            next_id: 0,
        }
    }

    fn allocate_id(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}{:04}", self.next_id);
        self.next_id += 1;
        id
    }

    /// Appends an original commit on top of the previously pushed one.
    ///
    /// Author and committer are fixed; each commit is one day after the last,
    /// starting at 2023-01-15T10:00:00Z. Every commit gets its own tree.
    pub(crate) fn push_commit(&mut self, message: &str, paths: &[&str]) -> String {
        self.push_raw_commit(CommitMessage::new(message), paths)
    }

    /// Appends an original commit carrying `message` verbatim.
    pub(crate) fn push_raw_commit(&mut self, message: CommitMessage, paths: &[&str]) -> String {
        let id = self.allocate_id("orig");
        let day = i64::try_from(self.commits.len()).unwrap_or_default();
        let when = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2023, 1, 15, 10, 0, 0)
            .unwrap()
            + Duration::days(day);

        let snapshot = CommitSnapshot {
            id: id.clone(),
            author: Stamp::new(Identity::new("Orig Author", "author@old.example"), when),
            committer: Stamp::new(
                Identity::new("Orig Committer", "committer@old.example"),
                when,
            ),
            message,
            tree: format!("tree-{id}"),
        };
        self.commits.insert(
            id.clone(),
            StoredCommit {
                snapshot,
                parent: self.last_pushed.clone(),
                paths: paths.iter().map(ToString::to_string).collect(),
            },
        );
        self.last_pushed = Some(id.clone());
        id
    }

    /// Points `name` at the last pushed commit and checks it out.
    pub(crate) fn set_branch(&mut self, name: &str) {
        if let Some(tip) = self.last_pushed.clone() {
            self.branches.insert(name.to_string(), tip);
            self.head = Some(name.to_string());
        }
    }

    /// Adds a non-branch reference such as `origin/main`.
    pub(crate) fn add_reference(&mut self, name: &str, target: &str) {
        self.references.insert(name.to_string(), target.to_string());
    }

    pub(crate) fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    /// Makes creating a commit from `original`'s tree fail.
    pub(crate) fn fail_commit_for(&mut self, original: &str) {
        if let Some(stored) = self.commits.get(original) {
            self.failing_trees.insert(stored.snapshot.tree.clone());
        }
    }

    /// Makes the diff of `original` unavailable.
    pub(crate) fn fail_diff_for(&mut self, original: &str) {
        self.failing_diffs.insert(original.to_string());
    }

    pub(crate) fn fail_branch_deletion(&mut self) {
        self.fail_deletion = true;
    }

    pub(crate) fn parent_of(&self, id: &str) -> Option<String> {
        self.commits.get(id).and_then(|c| c.parent.clone())
    }

    pub(crate) fn message_of(&self, id: &str) -> String {
        self.commits
            .get(id)
            .map(|c| c.snapshot.message.to_string_lossy())
            .unwrap_or_default()
    }

    pub(crate) fn branch_names(&self) -> Vec<String> {
        self.branches.keys().cloned().collect()
    }

    pub(crate) fn head(&self) -> Option<&str> {
        self.head.as_deref()
    }

    fn store_new(
        &mut self,
        parent: Option<String>,
        tree: String,
        author: &Stamp,
        committer: &Stamp,
        message: CommitMessage,
    ) -> String {
        let id = self.allocate_id("new");
        let snapshot = CommitSnapshot {
            id: id.clone(),
            author: author.clone(),
            committer: committer.clone(),
            message,
            tree,
        };
        self.commits.insert(
            id.clone(),
            StoredCommit {
                snapshot,
                parent,
                paths: Vec::new(),
            },
        );
        id
    }
}

impl HistoryBackend for MemoryBackend {
    type Id = String;

    fn resolve_reference(&self, name: &str) -> Result<String, GitError> {
        self.branches
            .get(name)
            .or_else(|| self.references.get(name))
            .cloned()
            .ok_or_else(|| GitError::ReferenceNotFound(name.to_string()))
    }

    fn walk_from(&self, tip: &String) -> Result<Vec<String>, GitError> {
        let mut chain = Vec::new();
        let mut current = Some(tip.clone());
        while let Some(id) = current {
            let stored = self
                .commits
                .get(&id)
                .ok_or_else(|| GitError::CommitNotFound(id.clone()))?;
            current = stored.parent.clone();
            chain.push(id);
        }
        chain.reverse();
        Ok(chain)
    }

    fn load_commit(&self, id: &String) -> Result<CommitSnapshot<String>, GitError> {
        self.commits
            .get(id)
            .map(|c| c.snapshot.clone())
            .ok_or_else(|| GitError::CommitNotFound(id.clone()))
    }

    fn changed_paths(&self, id: &String) -> Result<Vec<String>, GitError> {
        if self.failing_diffs.contains(id) {
            return Err(GitError::DiffUnavailable {
                commit: id.clone(),
                detail: "scripted failure".to_string(),
            });
        }
        self.commits
            .get(id)
            .map(|c| c.paths.clone())
            .ok_or_else(|| GitError::CommitNotFound(id.clone()))
    }

    fn is_clean(&self) -> Result<bool, GitError> {
        Ok(!self.dirty)
    }

    fn branch_tip(&self, name: &str) -> Result<String, GitError> {
        self.branches
            .get(name)
            .cloned()
            .ok_or_else(|| GitError::ReferenceNotFound(name.to_string()))
    }

    fn create_branch(&mut self, name: &str, target: &String) -> Result<(), GitError> {
        if self.branches.contains_key(name) {
            return Err(GitError::BranchExists(name.to_string()));
        }
        if !self.commits.contains_key(target) {
            return Err(GitError::CommitNotFound(target.clone()));
        }
        self.branches.insert(name.to_string(), target.clone());
        Ok(())
    }

    fn delete_branch(&mut self, name: &str) -> Result<(), GitError> {
        if self.fail_deletion {
            return Err(GitError::Backend(format!("cannot delete {name}")));
        }
        if self.branches.remove(name).is_none() {
            return Err(GitError::ReferenceNotFound(name.to_string()));
        }
        if self.head.as_deref() == Some(name) {
            self.head = None;
        }
        Ok(())
    }

    fn checkout_branch(&mut self, name: &str) -> Result<(), GitError> {
        if !self.branches.contains_key(name) {
            return Err(GitError::ReferenceNotFound(name.to_string()));
        }
        self.head = Some(name.to_string());
        Ok(())
    }

    fn amend_tip(
        &mut self,
        branch: &str,
        author: &Stamp,
        committer: &Stamp,
    ) -> Result<String, GitError> {
        let tip = self.branch_tip(branch)?;
        let (parent, tree, message) = {
            let stored = self
                .commits
                .get(&tip)
                .ok_or_else(|| GitError::CommitNotFound(tip.clone()))?;
            (
                stored.parent.clone(),
                stored.snapshot.tree.clone(),
                stored.snapshot.message.clone(),
            )
        };
        let id = self.store_new(parent, tree, author, committer, message);
        self.branches.insert(branch.to_string(), id.clone());
        Ok(id)
    }

    fn commit_on(
        &mut self,
        branch: &str,
        parent: &String,
        tree: &String,
        author: &Stamp,
        committer: &Stamp,
        message: &CommitMessage,
    ) -> Result<String, GitError> {
        if self.failing_trees.contains(tree) {
            return Err(GitError::CommitCreation(format!("cannot write {tree}")));
        }
        if self.branch_tip(branch)? != *parent {
            return Err(GitError::CommitCreation(format!(
                "{parent} is not the tip of {branch}"
            )));
        }
        let id = self.store_new(
            Some(parent.clone()),
            tree.clone(),
            author,
            committer,
            message.clone(),
        );
        self.branches.insert(branch.to_string(), id.clone());
        Ok(id)
    }
}
