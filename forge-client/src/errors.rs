//! Error hierarchy for `forge-client`.
//!
//! Transient upstream failures against the source-control REST API are
//! the orchestrator's to degrade around (spec §7); this type distinguishes
//! the narrow set of failures that *are* fatal to a review — diff fetch
//! and post — from everything else, which callers see as a plain `Err`
//! they choose how to handle.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("forge returned status {status} for {endpoint}: {body}")]
    Status {
        status: u16,
        endpoint: String,
        body: String,
    },

    #[error("failed to sign app jwt: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("failed to decode private key: {0}")]
    InvalidPrivateKey(String),

    #[error("unexpected response shape from {endpoint}: {detail}")]
    InvalidResponse { endpoint: String, detail: String },
}
