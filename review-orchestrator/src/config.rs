//! Orchestrator-level configuration (spec §6 "Review shaping"/"Semgrep
//! tuning"/"Vulnerability DB" rows), assembled from the environment the
//! same way `ai-llm-service/src/config/default_config.rs` reads its own
//! settings — plain `env::var` with typed fallbacks, no fail-fast here
//! since every one of these has a safe default.

use diff_core::{ChunkConfig, FilterConfig};
use risk_score::ScoreConfig;
use static_tools::{ToolConfig, ToolToggles};
use std::env;
use std::path::PathBuf;

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|v| v != "false" && v != "0")
        .unwrap_or(default)
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub filter: FilterConfig,
    pub chunk: ChunkConfig,
    pub score: ScoreConfig,
    pub tool_config: ToolConfig,
    pub tool_toggles: ToolToggles,
    pub confidence_threshold: f64,
    pub max_inline_comments: usize,
    pub enable_osv_scan: bool,
    pub osv_api_url: Option<String>,
}

impl OrchestratorConfig {
    pub fn from_env() -> Self {
        let score = ScoreConfig {
            risk_threshold: env_f64("RISK_THRESHOLD", 85.0),
            ..ScoreConfig::default()
        };

        let tool_config = ToolConfig {
            workdir: PathBuf::from("."),
            semgrep_rules: env::var("SEMGREP_RULES").unwrap_or_else(|_| "auto".to_string()),
            timeout: std::time::Duration::from_secs(env_usize("SEMGREP_TIMEOUT", 300) as u64),
        };

        Self {
            filter: FilterConfig::default(),
            chunk: ChunkConfig::default(),
            score,
            tool_config,
            tool_toggles: ToolToggles::from_env(),
            confidence_threshold: env_f64("CONFIDENCE_THRESHOLD", 0.5),
            max_inline_comments: env_usize("MAX_INLINE_COMMENTS", 10),
            enable_osv_scan: env_bool("ENABLE_OSV_SCAN", true),
            osv_api_url: env::var("OSV_API_URL").ok(),
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            chunk: ChunkConfig::default(),
            score: ScoreConfig::default(),
            tool_config: ToolConfig::default(),
            tool_toggles: ToolToggles::default(),
            confidence_threshold: 0.5,
            max_inline_comments: 10,
            enable_osv_scan: true,
            osv_api_url: None,
        }
    }
}
