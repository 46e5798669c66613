//! Static-tool harness (C6, spec §4.4): a uniform `run(files, workdir,
//! config) -> ToolResult` contract over external analyzers invoked as
//! child processes. The orchestrator awaits every tool concurrently;
//! partial failure (tool missing, timed out, or erroring) is expected and
//! never aborts the review.

pub mod bandit;
pub mod common;
pub mod errors;
pub mod eslint;
pub mod gosec;
pub mod govet;
pub mod ruff;
pub mod semgrep;
pub mod staticcheck;

pub use common::{ToolConfig, ToolResult, DEFAULT_TIMEOUT};
pub use errors::{Error, Result};

use std::env;

/// `ENABLE_<TOOL>` toggles (spec §6), defaulting to on. `go vet` has no
/// toggle of its own in the config table — it rides along with
/// `ENABLE_STATICCHECK` since both only apply to Go sources.
#[derive(Debug, Clone, Copy)]
pub struct ToolToggles {
    pub eslint: bool,
    pub semgrep: bool,
    pub ruff: bool,
    pub bandit: bool,
    pub gosec: bool,
    pub staticcheck: bool,
}

fn enabled(name: &str) -> bool {
    env::var(format!("ENABLE_{name}"))
        .map(|v| v != "false" && v != "0")
        .unwrap_or(true)
}

impl ToolToggles {
    pub fn from_env() -> Self {
        Self {
            eslint: enabled("ESLINT"),
            semgrep: enabled("SEMGREP"),
            ruff: enabled("RUFF"),
            bandit: enabled("BANDIT"),
            gosec: enabled("GOSEC"),
            staticcheck: enabled("STATICCHECK"),
        }
    }
}

impl Default for ToolToggles {
    fn default() -> Self {
        Self {
            eslint: true,
            semgrep: true,
            ruff: true,
            bandit: true,
            gosec: true,
            staticcheck: true,
        }
    }
}

fn by_extension<'a>(files: &'a [String], extensions: &[&str]) -> Vec<String> {
    files
        .iter()
        .filter(|f| extensions.iter().any(|ext| f.ends_with(ext)))
        .cloned()
        .collect()
}

/// Runs every enabled, applicable tool over `files` concurrently and
/// returns one [`ToolResult`] per tool invoked. Tools with no matching
/// files are skipped entirely rather than invoked with an empty file list.
pub async fn run_all(files: &[String], config: &ToolConfig, toggles: ToolToggles) -> Vec<ToolResult> {
    let js_ts = by_extension(files, &[".js", ".jsx", ".ts", ".tsx"]);
    let py = by_extension(files, &[".py"]);
    let go = by_extension(files, &[".go"]);

    let mut tasks: Vec<std::pin::Pin<Box<dyn std::future::Future<Output = ToolResult> + Send + '_>>> =
        Vec::new();

    if toggles.eslint && !js_ts.is_empty() {
        tasks.push(Box::pin(eslint::run(&js_ts, config)));
    }
    if toggles.semgrep && !files.is_empty() {
        tasks.push(Box::pin(semgrep::run(files, config)));
    }
    if toggles.ruff && !py.is_empty() {
        tasks.push(Box::pin(ruff::run(&py, config)));
    }
    if toggles.bandit && !py.is_empty() {
        tasks.push(Box::pin(bandit::run(&py, config)));
    }
    if toggles.gosec && !go.is_empty() {
        tasks.push(Box::pin(gosec::run(&go, config)));
    }
    if toggles.staticcheck && !go.is_empty() {
        tasks.push(Box::pin(staticcheck::run(&go, config)));
        tasks.push(Box::pin(govet::run(&go, config)));
    }

    futures::future::join_all(tasks).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_filter_matches_expected_files() {
        let files = vec![
            "a.ts".to_string(),
            "b.py".to_string(),
            "c.go".to_string(),
            "README.md".to_string(),
        ];
        assert_eq!(by_extension(&files, &[".ts"]), vec!["a.ts".to_string()]);
        assert_eq!(by_extension(&files, &[".py"]), vec!["b.py".to_string()]);
        assert_eq!(by_extension(&files, &[".go"]), vec!["c.go".to_string()]);
    }

    #[tokio::test]
    async fn run_all_skips_tools_with_no_matching_files() {
        let config = ToolConfig::default();
        let results = run_all(&["README.md".to_string()], &config, ToolToggles::default()).await;
        // semgrep runs over all files regardless of extension; the rest
        // only apply to js/py/go, none of which README.md matches.
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].tool, "semgrep");
    }
}
