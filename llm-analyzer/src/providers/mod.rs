//! Concrete `LLMProvider` capability implementations (spec §4.6/§6).
//!
//! Enum-dispatched rather than boxed-trait-object, following the
//! teacher's `ProviderClient` facade: the set of providers is closed and
//! known at startup, so there is no need for dynamic dispatch.

pub mod anthropic;
pub mod openai;

use crate::errors::Result;
use crate::prompt::RagContext;
use review_types::{Chunk, Issue};

/// Result of one LLM analysis call (spec §4.6: `{issues, model, tokensUsed}`).
#[derive(Debug, Clone)]
pub struct AnalyzeResponse {
    pub issues: Vec<Issue>,
    pub model: String,
    pub tokens_used: u32,
}

/// The `LLMProvider` capability (spec §4.6): one method, `analyze`.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    /// Covers the OpenAI chat-completions endpoint, its Azure deployment
    /// URL convention, and any OpenAI-compatible gateway (including a
    /// local server) reachable via a custom base URL.
    OpenAiCompatible(openai::OpenAiCompatibleClient),
    Anthropic(anthropic::AnthropicClient),
}

impl LlmProvider {
    pub async fn analyze(
        &self,
        chunk: &Chunk,
        context: &RagContext,
        pr_title: &str,
        pr_body: &str,
    ) -> Result<AnalyzeResponse> {
        match self {
            LlmProvider::OpenAiCompatible(c) => c.analyze(chunk, context, pr_title, pr_body).await,
            LlmProvider::Anthropic(c) => c.analyze(chunk, context, pr_title, pr_body).await,
        }
    }

    pub fn provider_tag(&self) -> &'static str {
        match self {
            LlmProvider::OpenAiCompatible(c) => c.provider_tag(),
            LlmProvider::Anthropic(_) => "anthropic",
        }
    }
}
