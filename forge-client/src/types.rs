//! GitHub REST shapes this client consumes/produces (spec §6).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestInfo {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub draft: bool,
    pub head: PullRequestRef,
    pub base: PullRequestRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequestRef {
    pub sha: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewComment {
    pub path: String,
    pub line: u32,
    pub side: &'static str,
    pub body: String,
}

impl ReviewComment {
    pub fn new(path: impl Into<String>, line: u32, body: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            line,
            side: "RIGHT",
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostReviewRequest {
    pub commit_id: String,
    pub body: String,
    pub event: &'static str,
    pub comments: Vec<ReviewComment>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InstallationTokenResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateCheckRunRequest {
    pub name: String,
    pub head_sha: String,
    pub status: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckRun {
    pub id: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateCheckRunRequest {
    pub status: &'static str,
    pub conclusion: Option<&'static str>,
}
