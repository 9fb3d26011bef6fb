//! History rewriting: role inference, signature transformation, the rewrite
//! engine and its report.

pub mod engine;
pub mod metadata;
pub mod report;
pub mod role;

pub use engine::{HistoryRewriter, RewriteOptions, RewriteOutcome};
pub use metadata::{shift_time, transform, MetadataOptions, NewSignatures, TIME_SHIFT_MONTHS};
pub use report::{AuthorSnapshot, RewriteFailure, RewriteRecord, RewriteReport};
pub use role::{choose_author, infer_role, Picker, RandomPicker, RoleCounts};
