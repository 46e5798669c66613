//! OpenAI-compatible chat-completions client (spec §4.6/§6).
//!
//! One client shape serves three deployments: the official OpenAI API,
//! an Azure OpenAI deployment URL, and a local OpenAI-compatible server —
//! they differ only in `base_url` and optional `api-version` query
//! string, grounded in `ai-llm-service::services::open_ai_service`'s
//! endpoint-from-config approach.

use crate::errors::{Error, Result};
use crate::prompt::{build_user_prompt, RagContext, SYSTEM_PROMPT};
use crate::providers::AnalyzeResponse;
use crate::response::parse_issues;
use review_types::Chunk;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAiFlavor {
    OpenAi,
    Azure,
    Local,
}

#[derive(Debug, Clone)]
pub struct OpenAiCompatibleClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    flavor: OpenAiFlavor,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Debug, Deserialize, Default)]
struct ChatUsage {
    #[serde(default)]
    total_tokens: u32,
}

impl OpenAiCompatibleClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        max_tokens: u32,
        flavor: OpenAiFlavor,
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
            flavor,
        }
    }

    pub fn provider_tag(&self) -> &'static str {
        match self.flavor {
            OpenAiFlavor::OpenAi => "openai",
            OpenAiFlavor::Azure => "azure-openai",
            OpenAiFlavor::Local => "local",
        }
    }

    fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        match self.flavor {
            OpenAiFlavor::Azure => format!(
                "{base}/openai/deployments/{}/chat/completions?api-version=2024-02-01",
                self.model
            ),
            _ => format!("{base}/v1/chat/completions"),
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
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            max_tokens: self.max_tokens,
            temperature: 0.0,
        };

        let mut request = self.http.post(self.endpoint()).json(&body);
        request = match self.flavor {
            OpenAiFlavor::Azure => request.header("api-key", &self.api_key),
            _ => request.bearer_auth(&self.api_key),
        };

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Status { status, body: text });
        }

        let parsed: ChatResponse = response.json().await?;
        let raw_content = parsed
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default();
        let issues = parse_issues(&raw_content, self.provider_tag(), &chunk.file_paths);

        Ok(AnalyzeResponse {
            issues,
            model: self.model.clone(),
            tokens_used: parsed.usage.unwrap_or_default().total_tokens,
        })
    }
}
