//! Shared types and helpers for every tool runner.

use review_types::Issue;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

/// Default per-tool timeout (spec §4.4): 300s unless the tool overrides it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Outcome of running one analyzer over one batch of files.
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub tool: String,
    pub success: bool,
    pub issues: Vec<Issue>,
    pub error: Option<String>,
    pub duration: Duration,
}

impl ToolResult {
    pub fn unavailable(tool: &str) -> Self {
        Self {
            tool: tool.to_string(),
            success: false,
            issues: Vec::new(),
            error: Some(format!("{tool} not installed")),
            duration: Duration::ZERO,
        }
    }

    pub fn timed_out(tool: &str, after: Duration) -> Self {
        Self {
            tool: tool.to_string(),
            success: false,
            issues: Vec::new(),
            error: Some(format!("{tool} timed out after {after:?}")),
            duration: after,
        }
    }
}

/// Per-run configuration. `workdir` is the review sandbox every tool is
/// invoked from; `enabled` is read from `ENABLE_<TOOL>` config toggles
/// (spec §6).
#[derive(Debug, Clone)]
pub struct ToolConfig {
    pub workdir: std::path::PathBuf,
    pub timeout: Duration,
    pub semgrep_rules: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            workdir: std::path::PathBuf::from("."),
            timeout: DEFAULT_TIMEOUT,
            semgrep_rules: "auto".to_string(),
        }
    }
}

/// Checks whether `binary` resolves on `PATH` — the availability check
/// every runner performs before invoking a tool (spec §4.4: "absence of
/// the binary produces `success=false` ... and zero issues").
pub async fn binary_available(binary: &str) -> bool {
    let probe = if cfg!(windows) { "where" } else { "which" };
    Command::new(probe)
        .arg(binary)
        .kill_on_drop(true)
        .status()
        .await
        .map(|status| status.success())
        .unwrap_or(false)
}

pub fn relative_to(workdir: &Path, absolute_or_relative: &str) -> String {
    Path::new(absolute_or_relative)
        .strip_prefix(workdir)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| absolute_or_relative.to_string())
}
