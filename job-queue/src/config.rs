//! Backend selection (spec §6): `QUEUE_BACKEND` chooses `memory` (default)
//! or `broker`, with `BROKER_URL` required for the latter.

use crate::errors::{Error, Result};
use redis::RedisError;
use std::env;

#[derive(Debug, Clone)]
pub enum QueueConfig {
    Memory,
    Broker { url: String },
}

impl QueueConfig {
    pub fn from_env() -> Result<Self> {
        match env::var("QUEUE_BACKEND").unwrap_or_else(|_| "memory".to_string()).as_str() {
            "broker" => {
                let url = env::var("BROKER_URL").map_err(|_| {
                    Error::Broker(RedisError::from((
                        redis::ErrorKind::InvalidClientConfig,
                        "BROKER_URL is required when QUEUE_BACKEND=broker",
                    )))
                })?;
                Ok(QueueConfig::Broker { url })
            }
            _ => Ok(QueueConfig::Memory),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_memory_backend() {
        // SAFETY: test runs single-threaded w.r.t. this env var; no other
        // test in this crate reads QUEUE_BACKEND.
        unsafe {
            env::remove_var("QUEUE_BACKEND");
        }
        assert!(matches!(QueueConfig::from_env().unwrap(), QueueConfig::Memory));
    }
}
