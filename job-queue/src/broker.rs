//! Redis-backed durable broker queue (spec §4.11): durable, at-least-once,
//! `attempts=3` with exponential backoff starting at 1s,
//! `removeOnComplete=100`, `removeOnFail=1000`.

use crate::errors::Result;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use review_types::ReviewJob;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

const QUEUE_KEY: &str = "revguard:queue:jobs";
const COMPLETED_KEY: &str = "revguard:queue:completed";
const FAILED_KEY: &str = "revguard:queue:failed";

pub const MAX_ATTEMPTS: u32 = 3;
pub const REMOVE_ON_COMPLETE: isize = 100;
pub const REMOVE_ON_FAIL: isize = 1000;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Envelope {
    job: ReviewJob,
    attempts: u32,
}

/// Exponential backoff starting at 1s: 1s, 2s, 4s, ...
pub fn backoff_for_attempt(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.min(10))
}

#[derive(Clone)]
pub struct BrokerQueue {
    conn: ConnectionManager,
}

impl BrokerQueue {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }

    pub async fn enqueue(&self, job: ReviewJob) -> Result<()> {
        let envelope = Envelope { job, attempts: 0 };
        let payload = serde_json::to_string(&envelope)?;
        let mut conn = self.conn.clone();
        let _: () = conn.lpush(QUEUE_KEY, payload).await?;
        Ok(())
    }

    /// Blocks (with a poll timeout) until a job is available.
    pub async fn dequeue(&self, timeout: Duration) -> Result<Option<ReviewJob>> {
        let mut conn = self.conn.clone();
        let popped: Option<(String, String)> = conn
            .brpop(QUEUE_KEY, timeout.as_secs_f64())
            .await?;
        let Some((_, payload)) = popped else {
            return Ok(None);
        };
        let envelope: Envelope = serde_json::from_str(&payload)?;
        // The handler's job struct is handed back; attempt bookkeeping
        // lives in `nack` so callers that only ever succeed never touch it.
        self.pending_attempts(&envelope.job.id, envelope.attempts)
            .await;
        Ok(Some(envelope.job))
    }

    async fn pending_attempts(&self, job_id: &str, attempts: u32) {
        let mut conn = self.conn.clone();
        let key = format!("revguard:queue:attempts:{job_id}");
        let _ = conn.set_ex::<_, _, ()>(&key, attempts, 3600).await;
    }

    async fn attempts_for(&self, job_id: &str) -> u32 {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<u32>>(format!("revguard:queue:attempts:{job_id}"))
            .await
            .ok()
            .flatten()
            .unwrap_or(0)
    }

    /// Number of jobs currently pending dequeue (used for `/health`).
    pub async fn depth(&self) -> u64 {
        let mut conn = self.conn.clone();
        conn.llen(QUEUE_KEY).await.unwrap_or(0)
    }

    /// Marks a job as completed; trims the completed log to
    /// `REMOVE_ON_COMPLETE` entries (spec §4.11).
    pub async fn ack(&self, job: &ReviewJob) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.lpush(COMPLETED_KEY, &job.id).await?;
        let _: () = conn.ltrim(COMPLETED_KEY, 0, REMOVE_ON_COMPLETE - 1).await?;
        Ok(())
    }

    /// Re-enqueues with backoff if attempts remain, else moves the job to
    /// the failed log (trimmed to `REMOVE_ON_FAIL`) — at-least-once
    /// redelivery means handlers must be idempotent (spec §4.11).
    pub async fn nack(&self, job: ReviewJob) -> Result<()> {
        let attempts = self.attempts_for(&job.id).await + 1;
        if attempts >= MAX_ATTEMPTS {
            warn!(job_id = %job.id, attempts, "job exhausted retries, moving to failed log");
            let mut conn = self.conn.clone();
            let payload = serde_json::to_string(&job)?;
            let _: () = conn.lpush(FAILED_KEY, payload).await?;
            let _: () = conn.ltrim(FAILED_KEY, 0, REMOVE_ON_FAIL - 1).await?;
            return Ok(());
        }

        tokio::time::sleep(backoff_for_attempt(attempts)).await;
        let envelope = Envelope {
            job,
            attempts,
        };
        let mut conn = self.conn.clone();
        let payload = serde_json::to_string(&envelope)?;
        let _: () = conn.lpush(QUEUE_KEY, payload).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_from_one_second() {
        assert_eq!(backoff_for_attempt(0), Duration::from_secs(1));
        assert_eq!(backoff_for_attempt(1), Duration::from_secs(2));
        assert_eq!(backoff_for_attempt(2), Duration::from_secs(4));
    }
}
