//! Error hierarchy for `job-queue`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("queue is closed")]
    Closed,

    #[error("broker connection error: {0}")]
    Broker(#[from] redis::RedisError),

    #[error("failed to (de)serialize job: {0}")]
    Serde(#[from] serde_json::Error),
}
