//! Error hierarchy for `review-orchestrator`.
//!
//! Per spec §7, only diff-fetch and post failures are fatal to a job —
//! every other evidence source degrades to an empty result instead of an
//! `Err`. This type exists for those two fatal paths plus sandbox I/O.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to fetch diff: {0}")]
    DiffFetch(#[source] forge_client::Error),

    #[error("failed to parse diff: {0}")]
    DiffParse(#[from] diff_core::Error),

    #[error("failed to post review: {0}")]
    Post(#[source] forge_client::Error),

    #[error("sandbox I/O error: {0}")]
    Sandbox(#[from] std::io::Error),
}
