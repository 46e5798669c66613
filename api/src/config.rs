//! Application boot configuration, loaded strictly from the environment
//! (spec §6 "Configuration (environment)"). Follows the same fail-fast
//! `ConfigError` + `must_env`/typed-fallback shape as
//! `ai-llm-service::config::default_config`, widened to cover forge
//! identity, queue backend selection, and LLM provider selection rather
//! than just one provider's model config.

use llm_analyzer::{AnthropicClient, LlmProvider, OpenAiCompatibleClient, OpenAiFlavor};
use std::env;
use thiserror::Error;
use vuln_scan::OsvClient;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("failed to read private key file {path}: {source}")]
    PrivateKeyFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Forge(#[from] forge_client::Error),

    #[error(transparent)]
    Queue(#[from] job_queue::Error),
}

fn must_env(name: &'static str) -> Result<String> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_u32(name: &'static str, default: u32) -> Result<u32> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => v.parse().map_err(|_| ConfigError::Invalid {
            var: name,
            reason: "expected u32".into(),
        }),
        _ => Ok(default),
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .map(|v| v != "false" && v != "0")
        .unwrap_or(default)
}

/// Resolves `PRIVATE_KEY` or `PRIVATE_KEY_PATH` to the raw key material.
/// `ForgeClient::new` (via `jwt::load_private_key`) handles the
/// base64-or-literal decoding itself (spec §6: "loader tries
/// base64-decode first, falls back to literal").
fn private_key_material() -> Result<String> {
    if let Ok(inline) = env::var("PRIVATE_KEY") {
        if !inline.trim().is_empty() {
            return Ok(inline);
        }
    }
    let path = must_env("PRIVATE_KEY_PATH")?;
    std::fs::read_to_string(&path).map_err(|source| ConfigError::PrivateKeyFile { path, source })
}

fn llm_provider_from_env() -> Result<LlmProvider> {
    let kind = env_or("LLM_PROVIDER", "openai").to_lowercase();
    match kind.as_str() {
        "anthropic" => {
            let api_key = must_env("ANTHROPIC_API_KEY")?;
            let model = env_or("ANTHROPIC_MODEL", "claude-3-5-sonnet-latest");
            let max_tokens = env_u32("OPENAI_MAX_TOKENS", 4096)?;
            let client = match env::var("ANTHROPIC_BASE_URL") {
                Ok(base) if !base.trim().is_empty() => {
                    AnthropicClient::with_base_url(base, api_key, model, max_tokens)
                }
                _ => AnthropicClient::new(api_key, model, max_tokens),
            };
            Ok(LlmProvider::Anthropic(client))
        }
        "azure" => {
            let api_key = must_env("OPENAI_API_KEY")?;
            let base_url = must_env("OPENAI_BASE_URL")?;
            let model = must_env("OPENAI_MODEL")?;
            let max_tokens = env_u32("OPENAI_MAX_TOKENS", 4096)?;
            Ok(LlmProvider::OpenAiCompatible(OpenAiCompatibleClient::new(
                base_url,
                api_key,
                model,
                max_tokens,
                OpenAiFlavor::Azure,
            )))
        }
        "local" => {
            let base_url = must_env("OPENAI_BASE_URL")?;
            let api_key = env_or("OPENAI_API_KEY", "");
            let model = env_or("OPENAI_MODEL", "local");
            let max_tokens = env_u32("OPENAI_MAX_TOKENS", 4096)?;
            Ok(LlmProvider::OpenAiCompatible(OpenAiCompatibleClient::new(
                base_url,
                api_key,
                model,
                max_tokens,
                OpenAiFlavor::Local,
            )))
        }
        "openai" => {
            let api_key = must_env("OPENAI_API_KEY")?;
            let base_url = env_or("OPENAI_BASE_URL", "https://api.openai.com/v1");
            let model = env_or("OPENAI_MODEL", "gpt-4o-mini");
            let max_tokens = env_u32("OPENAI_MAX_TOKENS", 4096)?;
            Ok(LlmProvider::OpenAiCompatible(OpenAiCompatibleClient::new(
                base_url,
                api_key,
                model,
                max_tokens,
                OpenAiFlavor::OpenAi,
            )))
        }
        other => Err(ConfigError::Invalid {
            var: "LLM_PROVIDER",
            reason: format!("unknown provider {other:?} (expected openai, azure, local, or anthropic)"),
        }),
    }
}

pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub webhook_secret: String,
    pub forge: forge_client::ForgeClient,
    pub llm: LlmProvider,
    pub osv_client: Option<OsvClient>,
    pub queue: job_queue::QueueConfig,
    pub orchestrator: review_orchestrator::OrchestratorConfig,
    pub log_json: bool,
    pub log_level: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let app_id = must_env("APP_ID")?;
        let private_key = private_key_material()?;
        let webhook_secret = must_env("WEBHOOK_SECRET")?;
        let base_api = env_or("FORGE_API_BASE", "https://api.github.com");
        let forge = forge_client::ForgeClient::new(base_api, app_id, &private_key)?;

        let llm = llm_provider_from_env()?;

        let orchestrator = review_orchestrator::OrchestratorConfig::from_env();
        let osv_client = if orchestrator.enable_osv_scan {
            Some(match &orchestrator.osv_api_url {
                Some(url) => OsvClient::new(url.clone()),
                None => OsvClient::default_client(),
            })
        } else {
            None
        };

        let port = env_u32("PORT", 3000)? as u16;
        let host = env_or("HOST", "0.0.0.0");

        Ok(Self {
            host,
            port,
            webhook_secret,
            forge,
            llm,
            osv_client,
            queue: job_queue::QueueConfig::from_env()?,
            orchestrator,
            log_json: env_bool("LOG_JSON", true),
            log_level: env_or("LOG_LEVEL", "info"),
        })
    }
}
