//! Job queue (C12): hands [`review_types::ReviewJob`]s from webhook ingress
//! (C11) to the review orchestrator (C10). Two backends behind one enum —
//! an in-memory channel for local development and a Redis-backed broker for
//! production — with identical enqueue/dequeue semantics modulo durability
//! (spec §4.11).

mod broker;
mod config;
mod errors;
mod memory;

pub use broker::{BrokerQueue, MAX_ATTEMPTS, REMOVE_ON_COMPLETE, REMOVE_ON_FAIL};
pub use config::QueueConfig;
pub use errors::{Error, Result};
pub use memory::MemoryQueue;

use review_types::ReviewJob;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Worker pool size for the broker backend (spec §4.11 `concurrency=3`).
/// The memory backend runs a single worker; a second consumer would just
/// race the first for every job with no benefit.
pub const WORKER_CONCURRENCY: usize = 3;

const BROKER_POLL_TIMEOUT: Duration = Duration::from_secs(5);

pub enum JobQueue {
    Memory(MemoryQueue),
    Broker(BrokerQueue),
}

impl JobQueue {
    pub async fn from_config(config: QueueConfig) -> Result<Self> {
        match config {
            QueueConfig::Memory => Ok(JobQueue::Memory(MemoryQueue::new())),
            QueueConfig::Broker { url } => {
                Ok(JobQueue::Broker(BrokerQueue::connect(&url).await?))
            }
        }
    }

    pub async fn enqueue(&self, job: ReviewJob) -> Result<()> {
        match self {
            JobQueue::Memory(q) => q.enqueue(job),
            JobQueue::Broker(q) => q.enqueue(job).await,
        }
    }

    /// Spawns [`WORKER_CONCURRENCY`] workers (one, for the memory backend)
    /// each looping `handler` over jobs until the queue closes. Handlers
    /// must be idempotent: the broker backend redelivers on failure.
    pub fn spawn_workers<F, Fut>(self: Arc<Self>, handler: F)
    where
        F: Fn(ReviewJob) -> Fut + Send + Sync + Clone + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let concurrency = match self.as_ref() {
            JobQueue::Memory(_) => 1,
            JobQueue::Broker(_) => WORKER_CONCURRENCY,
        };
        for worker_id in 0..concurrency {
            let queue = Arc::clone(&self);
            let handler = handler.clone();
            tokio::spawn(async move {
                queue.run_worker_loop(worker_id, handler).await;
            });
        }
    }

    async fn run_worker_loop<F, Fut>(&self, worker_id: usize, handler: F)
    where
        F: Fn(ReviewJob) -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        loop {
            match self {
                JobQueue::Memory(q) => {
                    let Some(job) = q.dequeue().await else {
                        info!(worker_id, "memory queue closed, worker exiting");
                        return;
                    };
                    let job_id = job.id.clone();
                    if let Err(err) = handler(job).await {
                        error!(worker_id, job_id, %err, "job failed (at-most-once, not retried)");
                    }
                }
                JobQueue::Broker(q) => {
                    let job = match q.dequeue(BROKER_POLL_TIMEOUT).await {
                        Ok(Some(job)) => job,
                        Ok(None) => continue,
                        Err(err) => {
                            error!(worker_id, %err, "broker dequeue failed, retrying after backoff");
                            tokio::time::sleep(Duration::from_secs(1)).await;
                            continue;
                        }
                    };
                    let job_id = job.id.clone();
                    match handler(job.clone()).await {
                        Ok(()) => {
                            if let Err(err) = q.ack(&job).await {
                                error!(worker_id, job_id, %err, "failed to record job completion");
                            }
                        }
                        Err(err) => {
                            error!(worker_id, job_id, %err, "job failed, nacking for redelivery");
                            if let Err(err) = q.nack(job).await {
                                error!(worker_id, job_id, %err, "failed to nack job");
                            }
                        }
                    }
                }
            }
        }
    }

    pub fn close(&self) {
        if let JobQueue::Memory(q) = self {
            q.close();
        }
    }

    /// Jobs currently pending dequeue, for `GET /health` (SPEC_FULL.md's
    /// supplemented health reporting).
    pub async fn depth(&self) -> u64 {
        match self {
            JobQueue::Memory(q) => q.depth() as u64,
            JobQueue::Broker(q) => q.depth().await,
        }
    }
}
