//! Canonical data model shared by every stage of the review pipeline.
//!
//! `review-types` has no knowledge of diffs, tools, or LLMs — it only
//! defines the shapes other crates produce and consume, plus the
//! validation rules an `Issue` must satisfy before it is allowed into a
//! `ReviewOutput`.

pub mod diff;
pub mod issue;
pub mod job;
pub mod output;

pub use diff::{Chunk, DiffFile, DiffHunk, DiffLine, FileChangeKind, ParsedDiff};
pub use issue::{Category, Confidence, Issue, IssueBuilder, Severity, ValidationError};
pub use job::{ReviewJob, WebhookAction};
pub use output::{CategoryBreakdown, CategoryEntry, ReviewEvent, ReviewOutput, ReviewStats, RiskLevel};
