//! Before/after authorship reporting.

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::ReportError;

/// Author name and time of one side of a rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSnapshot {
    /// Author display name.
    pub author_name: String,
    /// Author instant.
    pub author_time: DateTime<FixedOffset>,
}

/// One successfully rewritten commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRecord {
    /// Id of the commit written to the destination branch.
    pub new_id: String,
    /// Authorship before the rewrite.
    pub old: AuthorSnapshot,
    /// Authorship after the rewrite.
    pub new: AuthorSnapshot,
}

/// A commit dropped from the rewritten history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteFailure {
    /// Id of the original commit.
    pub commit: String,
    /// What went wrong.
    pub reason: String,
}

/// Aggregated view of a rewrite run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteReport {
    /// Destination branch.
    pub branch: String,
    /// Number of commits written to the destination branch.
    pub total: usize,
    /// Commits per author name before the rewrite.
    pub old_authors: BTreeMap<String, usize>,
    /// Commits per author name after the rewrite.
    pub new_authors: BTreeMap<String, usize>,
    /// Commits dropped from the rewritten history.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dropped: Vec<RewriteFailure>,
}

impl RewriteReport {
    /// Aggregates per-author commit counts over the records of a run.
    pub fn summarize(
        branch: &str,
        records: &[RewriteRecord],
        failures: &[RewriteFailure],
    ) -> Result<Self, ReportError> {
        let mut old_authors = BTreeMap::new();
        let mut new_authors = BTreeMap::new();

        for record in records {
            for (side, snapshot) in [("old", &record.old), ("new", &record.new)] {
                if snapshot.author_name.is_empty() {
                    return Err(ReportError::MalformedRecord {
                        commit: record.new_id.clone(),
                        reason: format!("{side} author name is empty"),
                    });
                }
            }
            *old_authors.entry(record.old.author_name.clone()).or_insert(0) += 1;
            *new_authors.entry(record.new.author_name.clone()).or_insert(0) += 1;
        }

        Ok(Self {
            branch: branch.to_string(),
            total: records.len(),
            old_authors,
            new_authors,
            dropped: failures.to_vec(),
        })
    }

    /// Renders the report as human-readable text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Rewritten branch: {}\n", self.branch));
        out.push_str(&format!("Modified commits: {}\n", self.total));

        for (title, counts) in [("Before", &self.old_authors), ("After", &self.new_authors)] {
            out.push_str(&format!("{title}:\n"));
            for (name, count) in counts {
                out.push_str(&format!("  {name}: {count}\n"));
            }
        }

        if !self.dropped.is_empty() {
            out.push_str(&format!("Dropped commits: {}\n", self.dropped.len()));
            for failure in &self.dropped {
                out.push_str(&format!("  {}: {}\n", failure.commit, failure.reason));
            }
        }

        out
    }
}
