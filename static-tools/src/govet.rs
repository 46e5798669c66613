//! go vet runner, spec §4.4: JSON emitted on stderr, fixed category
//! `correctness`, fixed severity `medium`, fixed confidence `0.9`.

use crate::common::{binary_available, relative_to, ToolConfig, ToolResult};
use review_types::{Category, IssueBuilder, Severity};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Instant;
use tokio::process::Command;
use tokio::time::timeout;

#[derive(Debug, Deserialize)]
struct GovetDiagnostic {
    posn: String,
    message: String,
}

/// `go vet -json` groups diagnostics as `{package: {analyzer: [diag...]}}`.
type GovetOutput = HashMap<String, HashMap<String, Vec<GovetDiagnostic>>>;

fn parse_posn(posn: &str) -> (String, u32) {
    let mut parts = posn.splitn(3, ':');
    let file = parts.next().unwrap_or("").to_string();
    let line = parts.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    (file, line)
}

pub async fn run(files: &[String], config: &ToolConfig) -> ToolResult {
    let started = Instant::now();
    if !binary_available("go").await {
        return ToolResult::unavailable("go vet");
    }

    let mut cmd = Command::new("go");
    cmd.args(["vet", "-json"])
        .args(files)
        .current_dir(&config.workdir)
        .kill_on_drop(true);

    let output = match timeout(config.timeout, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return ToolResult {
                tool: "go vet".into(),
                success: false,
                issues: Vec::new(),
                error: Some(e.to_string()),
                duration: started.elapsed(),
            }
        }
        Err(_) => return ToolResult::timed_out("go vet", config.timeout),
    };

    let stderr = String::from_utf8_lossy(&output.stderr);
    let parsed: GovetOutput = match serde_json::from_str(&stderr) {
        Ok(v) => v,
        Err(e) => {
            return ToolResult {
                tool: "go vet".into(),
                success: false,
                issues: Vec::new(),
                error: Some(format!("failed to parse go vet output: {e}")),
                duration: started.elapsed(),
            }
        }
    };

    let mut issues = Vec::new();
    for analyzers in parsed.into_values() {
        for (analyzer, diags) in analyzers {
            for diag in diags {
                let (file, line) = parse_posn(&diag.posn);
                let path = relative_to(&config.workdir, &file);
                let issue = IssueBuilder::new(
                    Category::Correctness,
                    Severity::Medium,
                    path,
                    line,
                    line,
                    diag.message,
                    "go vet",
                )
                .subtype(analyzer.clone())
                .confidence(0.9)
                .build();
                if let Ok(issue) = issue {
                    issues.push(issue);
                }
            }
        }
    }

    ToolResult {
        tool: "go vet".into(),
        success: true,
        issues,
        error: None,
        duration: started.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn posn_splits_file_and_line() {
        assert_eq!(parse_posn("main.go:10:2"), ("main.go".to_string(), 10));
        assert_eq!(parse_posn("main.go"), ("main.go".to_string(), 1));
    }
}
