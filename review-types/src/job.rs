//! `ReviewJob`: the unit of work handed from webhook ingress (C11) to the
//! job queue (C12) and picked up by the orchestrator (C10).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Webhook event that triggered a review, per spec §4.10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookAction {
    Opened,
    Synchronize,
    Reopened,
    ReadyForReview,
    /// Explicit re-review request (e.g. a `/review` comment trigger).
    Requested,
}

/// One pull-request review job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewJob {
    pub id: String,
    pub owner: String,
    pub repo: String,
    pub pr_number: u64,
    pub sha: String,
    pub installation_id: u64,
    pub action: WebhookAction,
    pub created_at: DateTime<Utc>,
    pub request_id: Option<String>,
}

impl ReviewJob {
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        pr_number: u64,
        sha: impl Into<String>,
        installation_id: u64,
        action: WebhookAction,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner: owner.into(),
            repo: repo.into(),
            pr_number,
            sha: sha.into(),
            installation_id,
            action,
            created_at: Utc::now(),
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// `owner/repo#pr_number`, used as the dedup/superseding key (spec §5:
    /// a newer job for the same PR supersedes an older queued one).
    pub fn dedup_key(&self) -> String {
        format!("{}/{}#{}", self.owner, self.repo, self.pr_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_key_ignores_sha_and_action() {
        let a = ReviewJob::new("acme", "widgets", 7, "sha1", 1, WebhookAction::Opened);
        let b = ReviewJob::new("acme", "widgets", 7, "sha2", 1, WebhookAction::Synchronize);
        assert_eq!(a.dedup_key(), b.dedup_key());
    }

    #[test]
    fn new_jobs_get_distinct_ids() {
        let a = ReviewJob::new("acme", "widgets", 1, "sha", 1, WebhookAction::Opened);
        let b = ReviewJob::new("acme", "widgets", 1, "sha", 1, WebhookAction::Opened);
        assert_ne!(a.id, b.id);
    }
}
