//! New signatures for a rewritten commit.

use chrono::{DateTime, FixedOffset, Months};
use tracing::warn;

use crate::data::Identity;
use crate::git::{CommitSnapshot, Stamp};

/// Calendar months added to timestamps when time shifting is enabled.
pub const TIME_SHIFT_MONTHS: u32 = 6;

/// Flags controlling how signatures are rewritten.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetadataOptions {
    /// Shift author and committer instants forward by [`TIME_SHIFT_MONTHS`].
    pub change_time: bool,
    /// Keep the original signatures untouched.
    pub keep_author: bool,
}

/// Author and committer signatures for a rewritten commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSignatures {
    /// Author signature.
    pub author: Stamp,
    /// Committer signature.
    pub committer: Stamp,
}

/// Shifts an instant forward by [`TIME_SHIFT_MONTHS`] calendar months in its own offset.
///
/// Days past the end of the target month clamp to its last day. An instant that
/// cannot be shifted is returned unchanged.
pub fn shift_time(when: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    when.checked_add_months(Months::new(TIME_SHIFT_MONTHS))
        .unwrap_or_else(|| {
            warn!("Cannot shift {when} by {TIME_SHIFT_MONTHS} months, keeping it");
            when
        })
}

/// Computes the signatures for a rewritten commit.
///
/// With `keep_author` the original signatures are returned byte for byte and
/// `change_time` has no effect. Otherwise both signatures carry `identity`,
/// the (optionally shifted) original instant and the original UTC offset.
pub fn transform<Id>(
    original: &CommitSnapshot<Id>,
    identity: &Identity,
    options: MetadataOptions,
) -> NewSignatures {
    if options.keep_author {
        return NewSignatures {
            author: original.author.clone(),
            committer: original.committer.clone(),
        };
    }

    let restamp = |stamp: &Stamp| {
        let when = if options.change_time {
            shift_time(stamp.when)
        } else {
            stamp.when
        };
        Stamp::new(identity.clone(), when)
    };

    NewSignatures {
        author: restamp(&original.author),
        committer: restamp(&original.committer),
    }
}
