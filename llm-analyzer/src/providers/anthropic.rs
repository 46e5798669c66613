//! Anthropic messages-endpoint client (spec §4.6/§6):
//! `POST {base}/v1/messages` with `anthropic-version: 2023-06-01`.

use crate::errors::{Error, Result};
use crate::prompt::{build_user_prompt, RagContext, SYSTEM_PROMPT};
use crate::providers::AnalyzeResponse;
use crate::response::parse_issues;
use review_types::Chunk;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

#[derive(Debug, Clone)]
pub struct AnthropicClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    system: &'a str,
    max_tokens: u32,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize, Default)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

impl AnthropicClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, max_tokens: u32) -> Self {
        Self::with_base_url(DEFAULT_BASE_URL, api_key, model, max_tokens)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens,
        }
    }

    pub async fn analyze(
        &self,
        chunk: &Chunk,
        context: &RagContext,
        pr_title: &str,
        pr_body: &str,
    ) -> Result<AnalyzeResponse> {
        let user_prompt = build_user_prompt(chunk, context, pr_title, pr_body);
        let body = MessagesRequest {
            model: &self.model,
            system: SYSTEM_PROMPT,
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user",
                content: &user_prompt,
            }],
        };

        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        let response = self
            .http
            .post(url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Status { status, body: text });
        }

        let parsed: MessagesResponse = response.json().await?;
        let raw_content = parsed
            .content
            .first()
            .map(|b| b.text.clone())
            .unwrap_or_default();
        let issues = parse_issues(&raw_content, "anthropic", &chunk.file_paths);
        let usage = parsed.usage.unwrap_or_default();

        Ok(AnalyzeResponse {
            issues,
            model: self.model.clone(),
            tokens_used: usage.input_tokens + usage.output_tokens,
        })
    }
}
