//! Commit snapshots, signature conversion and commit object encoding.
//!
//! Names, emails and messages are kept as the raw bytes found in the commit
//! header, so commits written in a legacy encoding are reproduced exactly.

use chrono::{DateTime, FixedOffset};
use git2::{Commit, Oid, Repository, Signature, Time};
use tracing::warn;

use crate::data::{Identity, MessageSubstitution};
use crate::error::GitError;

/// Identity plus the instant and UTC offset of an authorship or committal event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    /// Name bytes as stored in the commit header.
    pub name: Vec<u8>,
    /// Email bytes as stored in the commit header.
    pub email: Vec<u8>,
    /// When, in the signer's own UTC offset.
    pub when: DateTime<FixedOffset>,
}

impl Stamp {
    /// Creates a stamp for a pool identity.
    pub fn new(identity: Identity, when: DateTime<FixedOffset>) -> Self {
        Self {
            name: identity.name.into_bytes(),
            email: identity.email.into_bytes(),
            when,
        }
    }

    /// Converts a git signature, keeping its bytes and offset.
    pub fn from_signature(signature: &Signature<'_>) -> Result<Self, GitError> {
        Ok(Self {
            name: signature.name_bytes().to_vec(),
            email: signature.email_bytes().to_vec(),
            when: time_to_datetime(signature.when())?,
        })
    }

    /// Name for display, with invalid UTF-8 replaced.
    pub fn display_name(&self) -> String {
        String::from_utf8_lossy(&self.name).into_owned()
    }

    /// Identity for display, with invalid UTF-8 replaced.
    pub fn identity(&self) -> Identity {
        Identity::new(
            String::from_utf8_lossy(&self.name),
            String::from_utf8_lossy(&self.email),
        )
    }

    /// Appends a `<kind> name <email> seconds +hhmm` header line.
    fn write_header(&self, kind: &str, out: &mut Vec<u8>) -> Result<(), GitError> {
        let malformed = |field: &[u8]| field.iter().any(|b| matches!(b, b'<' | b'>' | b'\n'));
        if malformed(&self.name) || malformed(&self.email) {
            return Err(GitError::CommitCreation(format!(
                "Invalid {kind} signature: {}",
                self.identity()
            )));
        }

        let minutes = self.when.offset().local_minus_utc() / 60;
        let sign = if minutes < 0 { '-' } else { '+' };
        let minutes = minutes.unsigned_abs();

        out.extend_from_slice(kind.as_bytes());
        out.push(b' ');
        out.extend_from_slice(&self.name);
        out.extend_from_slice(b" <");
        out.extend_from_slice(&self.email);
        out.extend_from_slice(
            format!(
                "> {} {sign}{:02}{:02}\n",
                self.when.timestamp(),
                minutes / 60,
                minutes % 60
            )
            .as_bytes(),
        );
        Ok(())
    }
}

/// Converts a git timestamp into a chrono datetime in the same offset.
pub fn time_to_datetime(time: Time) -> Result<DateTime<FixedOffset>, GitError> {
    let invalid = || GitError::InvalidTimestamp {
        seconds: time.seconds(),
        offset_minutes: time.offset_minutes(),
    };
    let offset = FixedOffset::east_opt(time.offset_minutes() * 60).ok_or_else(invalid)?;
    let utc = DateTime::from_timestamp(time.seconds(), 0).ok_or_else(invalid)?;
    Ok(utc.with_timezone(&offset))
}

/// Raw commit message and the encoding its header declares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitMessage {
    /// Message bytes following the header.
    pub bytes: Vec<u8>,
    /// Value of the `encoding` header; `None` means UTF-8.
    pub encoding: Option<String>,
}

impl CommitMessage {
    /// Creates a UTF-8 message.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            bytes: text.into().into_bytes(),
            encoding: None,
        }
    }

    /// Reads the raw message of a `git2::Commit`.
    pub fn from_git_commit(commit: &Commit<'_>) -> Self {
        Self {
            bytes: commit.message_raw_bytes().to_vec(),
            encoding: commit.message_encoding().map(str::to_string),
        }
    }

    /// Returns true when the message declares no encoding or UTF-8.
    pub fn is_utf8_encoded(&self) -> bool {
        match self.encoding.as_deref() {
            None => true,
            Some(encoding) => {
                encoding.eq_ignore_ascii_case("utf-8") || encoding.eq_ignore_ascii_case("utf8")
            }
        }
    }

    /// Applies `substitution` to the message bytes, keeping the encoding.
    ///
    /// Messages in another encoding are only rewritten when marker and
    /// replacement are plain ASCII.
    pub fn substitute(&self, substitution: &MessageSubstitution) -> Self {
        if !self.is_utf8_encoded() && !substitution.is_ascii() {
            warn!(
                "Skipping marker substitution in a {} message",
                self.encoding.as_deref().unwrap_or_default()
            );
            return self.clone();
        }
        Self {
            bytes: substitution.apply(&self.bytes),
            encoding: self.encoding.clone(),
        }
    }

    /// Message for display, with invalid UTF-8 replaced.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Everything the rewriter needs to know about an original commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSnapshot<Id> {
    /// Commit id.
    pub id: Id,
    /// Author signature.
    pub author: Stamp,
    /// Committer signature.
    pub committer: Stamp,
    /// Full commit message.
    pub message: CommitMessage,
    /// Content tree id.
    pub tree: Id,
}

impl CommitSnapshot<Oid> {
    /// Creates a snapshot from a `git2::Commit`.
    pub fn from_git_commit(commit: &Commit<'_>) -> Result<Self, GitError> {
        Ok(Self {
            id: commit.id(),
            author: Stamp::from_signature(&commit.author())?,
            committer: Stamp::from_signature(&commit.committer())?,
            message: CommitMessage::from_git_commit(commit),
            tree: commit.tree_id(),
        })
    }
}

/// Serializes a commit object body in git's canonical header layout.
///
/// Headers beyond tree, parents, signatures and encoding (such as `gpgsig`)
/// are not written.
pub fn encode_commit(
    tree: Oid,
    parents: &[Oid],
    author: &Stamp,
    committer: &Stamp,
    message: &CommitMessage,
) -> Result<Vec<u8>, GitError> {
    let mut out = Vec::with_capacity(256 + message.bytes.len());
    out.extend_from_slice(format!("tree {tree}\n").as_bytes());
    for parent in parents {
        out.extend_from_slice(format!("parent {parent}\n").as_bytes());
    }
    author.write_header("author", &mut out)?;
    committer.write_header("committer", &mut out)?;
    if let Some(encoding) = &message.encoding {
        out.extend_from_slice(format!("encoding {encoding}\n").as_bytes());
    }
    out.push(b'\n');
    out.extend_from_slice(&message.bytes);
    Ok(out)
}

/// Lists the paths a commit touches, taken from the new side of each delta.
///
/// Root commits are diffed against the empty tree, so every file they add is listed.
pub fn changed_paths(repo: &Repository, commit: &Commit<'_>) -> Result<Vec<String>, GitError> {
    let unavailable = |err: git2::Error| GitError::DiffUnavailable {
        commit: commit.id().to_string(),
        detail: err.message().to_string(),
    };

    let commit_tree = commit.tree().map_err(unavailable)?;
    let parent_tree = if commit.parent_count() > 0 {
        Some(
            commit
                .parent(0)
                .and_then(|parent| parent.tree())
                .map_err(unavailable)?,
        )
    } else {
        None
    };

    let diff = repo
        .diff_tree_to_tree(parent_tree.as_ref(), Some(&commit_tree), None)
        .map_err(unavailable)?;

    let mut paths = Vec::new();
    for delta in diff.deltas() {
        if let Some(path) = delta.new_file().path() {
            paths.push(path.to_string_lossy().into_owned());
        }
    }

    Ok(paths)
}
