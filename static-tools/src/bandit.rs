//! Bandit runner (Python security), spec §4.4.

use crate::common::{binary_available, relative_to, ToolConfig, ToolResult};
use review_types::{Category, IssueBuilder, Severity};
use serde::Deserialize;
use std::time::Instant;
use tokio::process::Command;
use tokio::time::timeout;

#[derive(Debug, Deserialize)]
struct BanditOutput {
    results: Vec<BanditResult>,
}

#[derive(Debug, Deserialize)]
struct BanditResult {
    filename: String,
    issue_severity: String,
    issue_confidence: String,
    issue_text: String,
    test_id: String,
    line_number: u32,
    line_range: Option<Vec<u32>>,
    #[serde(default)]
    issue_cwe: Option<BanditCwe>,
}

#[derive(Debug, Deserialize)]
struct BanditCwe {
    id: u32,
}

fn severity_from(s: &str) -> Severity {
    match s.to_uppercase().as_str() {
        "HIGH" => Severity::High,
        "MEDIUM" => Severity::Medium,
        _ => Severity::Low,
    }
}

fn confidence_from(s: &str) -> f64 {
    match s.to_uppercase().as_str() {
        "HIGH" => 0.9,
        "MEDIUM" => 0.7,
        _ => 0.5,
    }
}

pub async fn run(files: &[String], config: &ToolConfig) -> ToolResult {
    let started = Instant::now();
    if !binary_available("bandit").await {
        return ToolResult::unavailable("bandit");
    }

    let mut cmd = Command::new("bandit");
    cmd.args(["-f", "json"])
        .args(files)
        .current_dir(&config.workdir)
        .kill_on_drop(true);

    let output = match timeout(config.timeout, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return ToolResult {
                tool: "bandit".into(),
                success: false,
                issues: Vec::new(),
                error: Some(e.to_string()),
                duration: started.elapsed(),
            }
        }
        Err(_) => return ToolResult::timed_out("bandit", config.timeout),
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: BanditOutput = match serde_json::from_str(&stdout) {
        Ok(v) => v,
        Err(e) => {
            return ToolResult {
                tool: "bandit".into(),
                success: false,
                issues: Vec::new(),
                error: Some(format!("failed to parse bandit output: {e}")),
                duration: started.elapsed(),
            }
        }
    };

    let mut issues = Vec::new();
    for result in parsed.results {
        let path = relative_to(&config.workdir, &result.filename);
        let end_line = result
            .line_range
            .as_ref()
            .and_then(|r| r.last().copied())
            .unwrap_or(result.line_number)
            .max(result.line_number);
        let mut builder = IssueBuilder::new(
            Category::Security,
            severity_from(&result.issue_severity),
            path,
            result.line_number.max(1),
            end_line.max(1),
            result.issue_text,
            "bandit",
        )
        .subtype(result.test_id)
        .confidence(confidence_from(&result.issue_confidence));
        if let Some(cwe) = result.issue_cwe {
            builder = builder.cwe(format!("CWE-{}", cwe.id));
        }
        if let Ok(issue) = builder.build() {
            issues.push(issue);
        }
    }

    ToolResult {
        tool: "bandit".into(),
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
    fn severity_mapping() {
        assert_eq!(severity_from("HIGH"), Severity::High);
        assert_eq!(severity_from("MEDIUM"), Severity::Medium);
        assert_eq!(severity_from("LOW"), Severity::Low);
    }

    #[test]
    fn confidence_mapping() {
        assert_eq!(confidence_from("HIGH"), 0.9);
        assert_eq!(confidence_from("MEDIUM"), 0.7);
        assert_eq!(confidence_from("LOW"), 0.5);
    }
}
