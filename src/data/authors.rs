//! Author pool data structures and validation.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PoolError;

/// Authorship role used to bias author selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Server-side work.
    Backend,
    /// Client-side work.
    Frontend,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend => write!(f, "backend"),
            Self::Frontend => write!(f, "frontend"),
        }
    }
}

/// A name and email pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

impl Identity {
    /// Creates a new identity.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// Author pool entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorEntry {
    /// Identity to attribute commits to.
    #[serde(flatten)]
    pub identity: Identity,
    /// Role this author is picked for.
    pub role: Role,
}

impl AuthorEntry {
    /// Creates a new pool entry.
    pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            identity: Identity::new(name, email),
            role,
        }
    }
}

/// Substrings that mark a file path as belonging to a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleLabels {
    /// Label counted towards the backend role.
    #[serde(default = "default_backend_label")]
    pub backend: String,
    /// Label counted towards the frontend role.
    #[serde(default = "default_frontend_label")]
    pub frontend: String,
}

fn default_backend_label() -> String {
    "backend".to_string()
}

fn default_frontend_label() -> String {
    "frontend".to_string()
}

impl Default for RoleLabels {
    fn default() -> Self {
        Self {
            backend: default_backend_label(),
            frontend: default_frontend_label(),
        }
    }
}

/// Project-marker substitution applied to rewritten commit messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSubstitution {
    /// Token to replace. An empty marker disables substitution.
    #[serde(default)]
    pub marker: String,
    /// Token written in place of every marker occurrence.
    #[serde(default)]
    pub replacement: String,
}

impl MessageSubstitution {
    /// Creates a substitution of `marker` by `replacement`.
    pub fn new(marker: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            replacement: replacement.into(),
        }
    }

    /// Replaces every non-overlapping occurrence of the marker, left to right.
    ///
    /// Works on raw bytes so the rest of the message is copied untouched
    /// whatever its encoding.
    pub fn apply(&self, message: &[u8]) -> Vec<u8> {
        let marker = self.marker.as_bytes();
        if marker.is_empty() {
            return message.to_vec();
        }

        let mut out = Vec::with_capacity(message.len());
        let mut rest = message;
        while let Some(at) = rest.windows(marker.len()).position(|w| w == marker) {
            out.extend_from_slice(&rest[..at]);
            out.extend_from_slice(self.replacement.as_bytes());
            rest = &rest[at + marker.len()..];
        }
        out.extend_from_slice(rest);
        out
    }

    /// Returns true when marker and replacement are both plain ASCII.
    pub fn is_ascii(&self) -> bool {
        self.marker.is_ascii() && self.replacement.is_ascii()
    }
}

/// Author pool file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorPool {
    /// Identities available for attribution.
    pub authors: Vec<AuthorEntry>,
    /// Path labels used for role inference.
    #[serde(default)]
    pub labels: RoleLabels,
    /// Message substitution for rewritten commits.
    #[serde(default)]
    pub message: MessageSubstitution,
}

impl AuthorPool {
    /// Creates a pool with default labels and no message substitution.
    pub fn new(authors: Vec<AuthorEntry>) -> Result<Self, PoolError> {
        let pool = Self {
            authors,
            labels: RoleLabels::default(),
            message: MessageSubstitution::default(),
        };
        pool.validate()?;
        Ok(pool)
    }

    /// Loads the pool from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, PoolError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| PoolError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_yaml_str(&content).map_err(|err| match err {
            PoolError::Parse { source, .. } => PoolError::Parse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    /// Parses and validates a pool from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self, PoolError> {
        let pool: Self = serde_yaml::from_str(content).map_err(|source| PoolError::Parse {
            path: "<inline>".to_string(),
            source,
        })?;
        pool.validate()?;
        Ok(pool)
    }

    /// Validates that the pool is non-empty and every entry is complete.
    pub fn validate(&self) -> Result<(), PoolError> {
        if self.authors.is_empty() {
            return Err(PoolError::Empty);
        }

        for (index, entry) in self.authors.iter().enumerate() {
            if entry.identity.name.trim().is_empty() {
                return Err(PoolError::InvalidEntry {
                    index,
                    reason: "name cannot be empty".to_string(),
                });
            }
            if entry.identity.email.trim().is_empty() {
                return Err(PoolError::InvalidEntry {
                    index,
                    reason: "email cannot be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Returns all entries tagged with `role`.
    pub fn with_role(&self, role: Role) -> Vec<&AuthorEntry> {
        self.authors.iter().filter(|a| a.role == role).collect()
    }

    /// Returns every entry regardless of role.
    pub fn all(&self) -> Vec<&AuthorEntry> {
        self.authors.iter().collect()
    }
}
