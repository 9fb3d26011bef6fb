//! Role inference and author selection.

use std::cmp::Ordering;

use rand::Rng;

use crate::data::{AuthorEntry, AuthorPool, Identity, Role, RoleLabels};
use crate::error::PoolError;

/// Chooses one of `n` candidates.
pub trait Picker {
    /// Returns an index in `0..n`. Never called with `n == 0`.
    fn pick(&mut self, n: usize) -> usize;
}

/// Uniformly random selection backed by the thread-local generator.
#[derive(Debug, Default)]
pub struct RandomPicker;

impl Picker for RandomPicker {
    fn pick(&mut self, n: usize) -> usize {
        rand::rng().random_range(0..n)
    }
}

/// Path counts per role label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleCounts {
    /// Paths containing the backend label.
    pub backend: usize,
    /// Paths containing the frontend label.
    pub frontend: usize,
}

impl RoleCounts {
    /// Counts paths that contain each label anywhere in their text.
    pub fn tally<S: AsRef<str>>(paths: &[S], labels: &RoleLabels) -> Self {
        let contains = |path: &str, label: &str| !label.is_empty() && path.contains(label);
        paths.iter().fold(Self::default(), |mut counts, path| {
            let path = path.as_ref();
            if contains(path, &labels.backend) {
                counts.backend += 1;
            }
            if contains(path, &labels.frontend) {
                counts.frontend += 1;
            }
            counts
        })
    }

    /// Returns the majority role, or `None` on a tie.
    pub fn majority(&self) -> Option<Role> {
        match self.backend.cmp(&self.frontend) {
            Ordering::Greater => Some(Role::Backend),
            Ordering::Less => Some(Role::Frontend),
            Ordering::Equal => None,
        }
    }
}

/// Infers the authorship role of a commit from the paths it touches.
pub fn infer_role<S: AsRef<str>>(paths: &[S], labels: &RoleLabels) -> Option<Role> {
    RoleCounts::tally(paths, labels).majority()
}

/// Picks an author for `role`, or from the whole pool when `role` is `None`.
///
/// A role with no authors falls back to the whole pool. Fails only when the
/// pool itself is empty.
pub fn choose_author<'a>(
    pool: &'a AuthorPool,
    role: Option<Role>,
    picker: &mut dyn Picker,
) -> Result<&'a Identity, PoolError> {
    let candidates: Vec<&AuthorEntry> = match role {
        Some(role) => {
            let matching = pool.with_role(role);
            if matching.is_empty() {
                tracing::debug!("No {role} authors in pool, picking from all authors");
                pool.all()
            } else {
                matching
            }
        }
        None => pool.all(),
    };

    let last = candidates.len().checked_sub(1).ok_or(PoolError::Empty)?;
    let index = picker.pick(candidates.len()).min(last);
    Ok(&candidates[index].identity)
}
