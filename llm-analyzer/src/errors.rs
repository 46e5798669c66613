//! Error hierarchy for `llm-analyzer`.
//!
//! A provider transport or parse failure is reported as an `Err` here, but
//! per spec §4.6/§7 the orchestrator treats it as zero issues from that
//! chunk, never a fatal review error.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("llm http transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("llm returned non-success status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("llm response contained no usable JSON")]
    NoJson,

    #[error("llm response JSON did not match the issues schema: {0}")]
    Schema(#[from] serde_json::Error),
}
