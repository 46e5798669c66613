//! `ForgeClient`: the source-control REST capability (spec §6, §9).
//!
//! A single concrete client — the forge surface this system consumes is
//! GitHub's REST API, unlike the multi-provider `ProviderClient` facade
//! the teacher's `mr-reviewer` crate exposes for GitLab/GitHub/Bitbucket.
//! Grounded in that crate's enum-free single-impl posture for a closed,
//! one-provider capability plus its `reqwest::Client` wiring
//! (`git_providers::github::GitHubClient`).

use crate::errors::{Error, Result};
use crate::jwt::{load_private_key, mint_app_jwt};
use crate::token_cache::InstallationTokenCache;
use crate::types::*;
use chrono::Utc;
use jsonwebtoken::EncodingKey;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct ForgeClient {
    http: reqwest::Client,
    base_api: String,
    app_id: String,
    private_key: Arc<EncodingKey>,
    token_cache: Arc<InstallationTokenCache>,
}

impl std::fmt::Debug for ForgeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForgeClient")
            .field("base_api", &self.base_api)
            .field("app_id", &self.app_id)
            .finish_non_exhaustive()
    }
}

impl ForgeClient {
    pub fn new(base_api: impl Into<String>, app_id: impl Into<String>, private_key_raw: &str) -> Result<Self> {
        let private_key = load_private_key(private_key_raw)?;
        Ok(Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .user_agent("revguard/0.1")
                .build()?,
            base_api: base_api.into(),
            app_id: app_id.into(),
            private_key: Arc::new(private_key),
            token_cache: Arc::new(InstallationTokenCache::new()),
        })
    }

    /// Returns a valid installation access token, minting a fresh one via
    /// the app JWT if the cache has none with sufficient remaining life
    /// (spec §3/§5/§6).
    pub async fn installation_token(&self, installation_id: u64) -> Result<String> {
        let now = Utc::now();
        if let Some(token) = self.token_cache.get(installation_id, now) {
            return Ok(token);
        }

        let jwt = mint_app_jwt(&self.private_key, &self.app_id, now.timestamp())?;
        let url = format!(
            "{}/app/installations/{installation_id}/access_tokens",
            self.base_api
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(jwt)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                status,
                endpoint: url,
                body,
            });
        }

        let parsed: InstallationTokenResponse = response.json().await?;
        self.token_cache
            .put(installation_id, parsed.token.clone(), parsed.expires_at);
        Ok(parsed.token)
    }

    /// Cached installation-token count, for `GET /health`.
    pub fn token_cache_size(&self) -> usize {
        self.token_cache.len()
    }

    async fn authed(
        &self,
        installation_id: u64,
        method: reqwest::Method,
        url: &str,
    ) -> Result<reqwest::RequestBuilder> {
        let token = self.installation_token(installation_id).await?;
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(token)
            .header("Accept", "application/vnd.github+json"))
    }

    /// `GET /repos/{o}/{r}/pulls/{n}` — JSON metadata.
    pub async fn get_pull_request(
        &self,
        installation_id: u64,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequestInfo> {
        let url = format!("{}/repos/{owner}/{repo}/pulls/{number}", self.base_api);
        let response = self
            .authed(installation_id, reqwest::Method::GET, &url)
            .await?
            .send()
            .await?;
        self.parse_json(response, &url).await
    }

    /// `GET /repos/{o}/{r}/pulls/{n}` with the `diff` media type — the raw
    /// unified diff text `diff-core` parses.
    pub async fn get_pull_request_diff(
        &self,
        installation_id: u64,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<String> {
        let url = format!("{}/repos/{owner}/{repo}/pulls/{number}", self.base_api);
        let response = self
            .authed(installation_id, reqwest::Method::GET, &url)
            .await?
            .header("Accept", "application/vnd.github.diff")
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                status,
                endpoint: url,
                body,
            });
        }
        Ok(response.text().await?)
    }

    /// `GET /repos/{o}/{r}/contents/{path}?ref=…` — returns `None` on 404.
    pub async fn get_file_contents(
        &self,
        installation_id: u64,
        owner: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<Option<String>> {
        let url = format!(
            "{}/repos/{owner}/{repo}/contents/{path}?ref={git_ref}",
            self.base_api
        );
        let response = self
            .authed(installation_id, reqwest::Method::GET, &url)
            .await?
            .header("Accept", "application/vnd.github.raw")
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                status,
                endpoint: url,
                body,
            });
        }
        Ok(Some(response.text().await?))
    }

    /// `POST /repos/{o}/{r}/pulls/{n}/reviews` — posts the final review.
    pub async fn post_review(
        &self,
        installation_id: u64,
        owner: &str,
        repo: &str,
        number: u64,
        request: &PostReviewRequest,
    ) -> Result<()> {
        let url = format!("{}/repos/{owner}/{repo}/pulls/{number}/reviews", self.base_api);
        let response = self
            .authed(installation_id, reqwest::Method::POST, &url)
            .await?
            .json(request)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                status,
                endpoint: url,
                body,
            });
        }
        debug!(owner, repo, number, "review posted");
        Ok(())
    }

    /// `POST /repos/{o}/{r}/check-runs` — best-effort; a failure here is
    /// logged but never blocks the review from being posted (spec §4.9).
    pub async fn create_check_run(
        &self,
        installation_id: u64,
        owner: &str,
        repo: &str,
        head_sha: &str,
    ) -> Option<CheckRun> {
        let url = format!("{}/repos/{owner}/{repo}/check-runs", self.base_api);
        let body = CreateCheckRunRequest {
            name: "revguard".to_string(),
            head_sha: head_sha.to_string(),
            status: "in_progress",
        };
        match self.authed(installation_id, reqwest::Method::POST, &url).await {
            Ok(req) => match req.json(&body).send().await {
                Ok(resp) if resp.status().is_success() => resp.json().await.ok(),
                Ok(resp) => {
                    warn!(status = %resp.status(), "check-run creation failed");
                    None
                }
                Err(e) => {
                    warn!(error = %e, "check-run creation request failed");
                    None
                }
            },
            Err(e) => {
                warn!(error = %e, "could not authenticate check-run creation");
                None
            }
        }
    }

    /// `PATCH /repos/{o}/{r}/check-runs/{id}` — best-effort, same as creation.
    pub async fn update_check_run(
        &self,
        installation_id: u64,
        owner: &str,
        repo: &str,
        check_run_id: u64,
        conclusion: &'static str,
    ) {
        let url = format!(
            "{}/repos/{owner}/{repo}/check-runs/{check_run_id}",
            self.base_api
        );
        let body = UpdateCheckRunRequest {
            status: "completed",
            conclusion: Some(conclusion),
        };
        match self.authed(installation_id, reqwest::Method::PATCH, &url).await {
            Ok(req) => {
                if let Err(e) = req.json(&body).send().await {
                    warn!(error = %e, "check-run update failed");
                }
            }
            Err(e) => warn!(error = %e, "could not authenticate check-run update"),
        }
    }

    async fn parse_json<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
        endpoint: &str,
    ) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                status,
                endpoint: endpoint.to_string(),
                body,
            });
        }
        response.json().await.map_err(|e| Error::InvalidResponse {
            endpoint: endpoint.to_string(),
            detail: e.to_string(),
        })
    }
}
