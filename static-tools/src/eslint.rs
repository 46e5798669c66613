//! ESLint runner (JS/TS), spec §4.4.

use crate::common::{binary_available, relative_to, ToolConfig, ToolResult};
use review_types::{Category, IssueBuilder, Severity};
use serde::Deserialize;
use std::time::Instant;
use tokio::process::Command;
use tokio::time::timeout;

const CONFIG_CANDIDATES: &[&str] = &[
    ".eslintrc",
    ".eslintrc.json",
    ".eslintrc.js",
    ".eslintrc.cjs",
    ".eslintrc.yaml",
    ".eslintrc.yml",
    "eslint.config.js",
    "eslint.config.mjs",
];

#[derive(Debug, Deserialize)]
struct EslintFile {
    #[serde(rename = "filePath")]
    file_path: String,
    messages: Vec<EslintMessage>,
}

#[derive(Debug, Deserialize)]
struct EslintMessage {
    #[serde(rename = "ruleId")]
    rule_id: Option<String>,
    severity: u8,
    message: String,
    line: u32,
    #[serde(rename = "endLine")]
    end_line: Option<u32>,
}

fn category_for_rule(rule_id: &str) -> Category {
    if rule_id.contains("security") || rule_id.contains("no-eval") {
        Category::Security
    } else if rule_id.contains("no-unused") || rule_id.contains("no-undef") || rule_id.contains("prefer-const") {
        Category::Correctness
    } else if rule_id.contains("complexity") || rule_id.starts_with("max-") {
        Category::Maintainability
    } else {
        Category::Style
    }
}

/// Only invoked if a recognized ESLint config is present in `workdir`,
/// or `package.json` declares an `eslintConfig` key (spec §4.4).
pub async fn config_present(workdir: &std::path::Path) -> bool {
    for name in CONFIG_CANDIDATES {
        if tokio::fs::metadata(workdir.join(name)).await.is_ok() {
            return true;
        }
    }
    if let Ok(contents) = tokio::fs::read_to_string(workdir.join("package.json")).await {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(&contents) {
            return value.get("eslintConfig").is_some();
        }
    }
    false
}

pub async fn run(files: &[String], config: &ToolConfig) -> ToolResult {
    let started = Instant::now();
    if !binary_available("eslint").await || !config_present(&config.workdir).await {
        return ToolResult::unavailable("eslint");
    }

    let mut cmd = Command::new("eslint");
    cmd.args(["--format", "json"])
        .args(files)
        .current_dir(&config.workdir)
        .kill_on_drop(true);

    let output = match timeout(config.timeout, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return ToolResult {
                tool: "eslint".into(),
                success: false,
                issues: Vec::new(),
                error: Some(e.to_string()),
                duration: started.elapsed(),
            }
        }
        Err(_) => return ToolResult::timed_out("eslint", config.timeout),
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: Vec<EslintFile> = match serde_json::from_str(&stdout) {
        Ok(v) => v,
        Err(e) => {
            return ToolResult {
                tool: "eslint".into(),
                success: false,
                issues: Vec::new(),
                error: Some(format!("failed to parse eslint output: {e}")),
                duration: started.elapsed(),
            }
        }
    };

    let mut issues = Vec::new();
    for file in parsed {
        let path = relative_to(&config.workdir, &file.file_path);
        for msg in file.messages {
            let Some(rule_id) = msg.rule_id else { continue };
            let severity = if msg.severity >= 2 { Severity::Medium } else { Severity::Low };
            let end_line = msg.end_line.unwrap_or(msg.line).max(msg.line);
            let issue = IssueBuilder::new(
                category_for_rule(&rule_id),
                severity,
                path.clone(),
                msg.line.max(1),
                end_line.max(1),
                msg.message,
                "eslint",
            )
            .subtype(rule_id)
            .confidence(0.9)
            .build();
            if let Ok(issue) = issue {
                issues.push(issue);
            }
        }
    }

    ToolResult {
        tool: "eslint".into(),
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
        assert_eq!(category_for_rule("security/detect-eval"), Category::Security);
        assert_eq!(category_for_rule("no-unused-vars"), Category::Correctness);
        assert_eq!(category_for_rule("complexity"), Category::Maintainability);
        assert_eq!(category_for_rule("quotes"), Category::Style);
    }
}
