//! LLM analyzer (C8): deterministic prompt assembly with injection
//! defenses, a pluggable `LLMProvider` capability, and schema-validating
//! response parsing.

pub mod errors;
pub mod prompt;
pub mod providers;
pub mod response;
pub mod sanitize;

pub use errors::{Error, Result};
pub use prompt::{RagContext, SYSTEM_PROMPT};
pub use providers::anthropic::AnthropicClient;
pub use providers::openai::{OpenAiCompatibleClient, OpenAiFlavor};
pub use providers::{AnalyzeResponse, LlmProvider};
