//! Ruff runner (Python lint), spec §4.4.
//!
//! Only runs when a Ruff config is present — `ruff.toml`, `.ruff.toml`, or
//! a `[tool.ruff]` table in `pyproject.toml`.

use crate::common::{binary_available, relative_to, ToolConfig, ToolResult};
use review_types::{Category, IssueBuilder, Severity};
use serde::Deserialize;
use std::time::Instant;
use tokio::process::Command;
use tokio::time::timeout;

#[derive(Debug, Deserialize)]
struct RuffMessage {
    code: Option<String>,
    message: String,
    filename: String,
    location: RuffLocation,
    end_location: Option<RuffLocation>,
}

#[derive(Debug, Deserialize)]
struct RuffLocation {
    row: u32,
}

fn category_for_code(code: &str) -> Category {
    match code.chars().next() {
        Some('S') => Category::Security,
        Some('E') | Some('W') => Category::Correctness,
        Some('C') => Category::Maintainability,
        _ => Category::Style,
    }
}

pub async fn config_present(workdir: &std::path::Path) -> bool {
    for name in ["ruff.toml", ".ruff.toml"] {
        if tokio::fs::metadata(workdir.join(name)).await.is_ok() {
            return true;
        }
    }
    if let Ok(contents) = tokio::fs::read_to_string(workdir.join("pyproject.toml")).await {
        return contents.contains("[tool.ruff]");
    }
    false
}

pub async fn run(files: &[String], config: &ToolConfig) -> ToolResult {
    let started = Instant::now();
    if !binary_available("ruff").await || !config_present(&config.workdir).await {
        return ToolResult::unavailable("ruff");
    }

    let mut cmd = Command::new("ruff");
    cmd.args(["check", "--output-format", "json"])
        .args(files)
        .current_dir(&config.workdir)
        .kill_on_drop(true);

    let output = match timeout(config.timeout, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return ToolResult {
                tool: "ruff".into(),
                success: false,
                issues: Vec::new(),
                error: Some(e.to_string()),
                duration: started.elapsed(),
            }
        }
        Err(_) => return ToolResult::timed_out("ruff", config.timeout),
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: Vec<RuffMessage> = match serde_json::from_str(&stdout) {
        Ok(v) => v,
        Err(e) => {
            return ToolResult {
                tool: "ruff".into(),
                success: false,
                issues: Vec::new(),
                error: Some(format!("failed to parse ruff output: {e}")),
                duration: started.elapsed(),
            }
        }
    };

    let mut issues = Vec::new();
    for msg in parsed {
        let Some(code) = msg.code else { continue };
        let path = relative_to(&config.workdir, &msg.filename);
        let end_row = msg.end_location.map(|l| l.row).unwrap_or(msg.location.row).max(msg.location.row);
        let issue = IssueBuilder::new(
            category_for_code(&code),
            Severity::Low,
            path,
            msg.location.row.max(1),
            end_row.max(1),
            msg.message,
            "ruff",
        )
        .subtype(code)
        .confidence(0.9)
        .build();
        if let Ok(issue) = issue {
            issues.push(issue);
        }
    }

    ToolResult {
        tool: "ruff".into(),
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
    fn category_inference() {
        assert_eq!(category_for_code("S101"), Category::Security);
        assert_eq!(category_for_code("E501"), Category::Correctness);
        assert_eq!(category_for_code("C901"), Category::Maintainability);
        assert_eq!(category_for_code("D100"), Category::Style);
    }
}
