//! gosec runner (Go security), spec §4.4. Same severity/confidence/CWE
//! shape as bandit — both tools report HIGH/MEDIUM/LOW.

use crate::common::{binary_available, relative_to, ToolConfig, ToolResult};
use review_types::{Category, IssueBuilder, Severity};
use serde::Deserialize;
use std::time::Instant;
use tokio::process::Command;
use tokio::time::timeout;

#[derive(Debug, Deserialize)]
struct GosecOutput {
    #[serde(rename = "Issues")]
    issues: Vec<GosecIssue>,
}

#[derive(Debug, Deserialize)]
struct GosecIssue {
    severity: String,
    confidence: String,
    rule_id: String,
    details: String,
    file: String,
    line: String,
    cwe: Option<GosecCwe>,
}

#[derive(Debug, Deserialize)]
struct GosecCwe {
    #[serde(rename = "ID")]
    id: String,
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

fn parse_line(raw: &str) -> u32 {
    raw.split('-').next().unwrap_or("1").parse().unwrap_or(1)
}

pub async fn run(files: &[String], config: &ToolConfig) -> ToolResult {
    let started = Instant::now();
    if !binary_available("gosec").await {
        return ToolResult::unavailable("gosec");
    }

    let mut cmd = Command::new("gosec");
    cmd.args(["-fmt", "json"])
        .args(files)
        .current_dir(&config.workdir)
        .kill_on_drop(true);

    let output = match timeout(config.timeout, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return ToolResult {
                tool: "gosec".into(),
                success: false,
                issues: Vec::new(),
                error: Some(e.to_string()),
                duration: started.elapsed(),
            }
        }
        Err(_) => return ToolResult::timed_out("gosec", config.timeout),
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: GosecOutput = match serde_json::from_str(&stdout) {
        Ok(v) => v,
        Err(e) => {
            return ToolResult {
                tool: "gosec".into(),
                success: false,
                issues: Vec::new(),
                error: Some(format!("failed to parse gosec output: {e}")),
                duration: started.elapsed(),
            }
        }
    };

    let mut issues = Vec::new();
    for issue in parsed.issues {
        let path = relative_to(&config.workdir, &issue.file);
        let line = parse_line(&issue.line);
        let mut builder = IssueBuilder::new(
            Category::Security,
            severity_from(&issue.severity),
            path,
            line,
            line,
            issue.details,
            "gosec",
        )
        .subtype(issue.rule_id)
        .confidence(confidence_from(&issue.confidence));
        if let Some(cwe) = issue.cwe {
            builder = builder.cwe(format!("CWE-{}", cwe.id));
        }
        if let Ok(issue) = builder.build() {
            issues.push(issue);
        }
    }

    ToolResult {
        tool: "gosec".into(),
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
    fn line_range_parsed() {
        assert_eq!(parse_line("42-44"), 42);
        assert_eq!(parse_line("7"), 7);
    }
}
