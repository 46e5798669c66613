//! Semgrep runner, spec §4.4.

use crate::common::{binary_available, relative_to, ToolConfig, ToolResult};
use review_types::{Category, IssueBuilder, Severity};
use serde::Deserialize;
use std::time::Instant;
use tokio::process::Command;
use tokio::time::timeout;

#[derive(Debug, Deserialize)]
struct Sarif {
    runs: Vec<SarifRun>,
}

#[derive(Debug, Deserialize)]
struct SarifRun {
    results: Vec<SarifResult>,
}

#[derive(Debug, Deserialize)]
struct SarifResult {
    #[serde(rename = "ruleId")]
    rule_id: String,
    level: Option<String>,
    message: SarifMessage,
    locations: Vec<SarifLocation>,
}

#[derive(Debug, Deserialize)]
struct SarifMessage {
    text: String,
}

#[derive(Debug, Deserialize)]
struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    physical_location: SarifPhysicalLocation,
}

#[derive(Debug, Deserialize)]
struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    artifact_location: SarifArtifact,
    region: SarifRegion,
}

#[derive(Debug, Deserialize)]
struct SarifArtifact {
    uri: String,
}

#[derive(Debug, Deserialize)]
struct SarifRegion {
    #[serde(rename = "startLine")]
    start_line: u32,
    #[serde(rename = "endLine")]
    end_line: Option<u32>,
}

fn category_for_rule(rule_id: &str) -> Category {
    let lower = rule_id.to_lowercase();
    if lower.contains("injection") || lower.contains("xss") || lower.contains("sqli") || lower.contains("crypto") {
        Category::Security
    } else if lower.contains("bug") || lower.contains("correctness") {
        Category::Correctness
    } else if lower.contains("perf") {
        Category::Performance
    } else {
        // Semgrep's default ruleset skews toward security findings.
        Category::Security
    }
}

fn severity_for_level(level: Option<&str>) -> Severity {
    match level {
        Some("error") => Severity::High,
        Some("warning") => Severity::Medium,
        _ => Severity::Low,
    }
}

pub async fn run(files: &[String], config: &ToolConfig) -> ToolResult {
    let started = Instant::now();
    if !binary_available("semgrep").await {
        return ToolResult::unavailable("semgrep");
    }

    let timeout_secs = config.timeout.as_secs().to_string();
    let mut cmd = Command::new("semgrep");
    cmd.arg("--sarif")
        .args(["--config", &config.semgrep_rules])
        .args(["--timeout", &timeout_secs])
        .args(["--max-target-bytes", "1000000"])
        .arg("--no-git-ignore")
        .args(files)
        .current_dir(&config.workdir)
        .kill_on_drop(true);

    let output = match timeout(config.timeout, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return ToolResult {
                tool: "semgrep".into(),
                success: false,
                issues: Vec::new(),
                error: Some(e.to_string()),
                duration: started.elapsed(),
            }
        }
        Err(_) => return ToolResult::timed_out("semgrep", config.timeout),
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let sarif: Sarif = match serde_json::from_str(&stdout) {
        Ok(v) => v,
        Err(e) => {
            return ToolResult {
                tool: "semgrep".into(),
                success: false,
                issues: Vec::new(),
                error: Some(format!("failed to parse semgrep sarif: {e}")),
                duration: started.elapsed(),
            }
        }
    };

    let mut issues = Vec::new();
    for run in sarif.runs {
        for result in run.results {
            let Some(location) = result.locations.first() else { continue };
            let region = &location.physical_location.region;
            let path = relative_to(&config.workdir, &location.physical_location.artifact_location.uri);
            let issue = IssueBuilder::new(
                category_for_rule(&result.rule_id),
                severity_for_level(result.level.as_deref()),
                path,
                region.start_line.max(1),
                region.end_line.unwrap_or(region.start_line).max(region.start_line).max(1),
                result.message.text,
                "semgrep",
            )
            .subtype(result.rule_id)
            .confidence(0.8)
            .build();
            if let Ok(issue) = issue {
                issues.push(issue);
            }
        }
    }

    ToolResult {
        tool: "semgrep".into(),
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
        assert_eq!(category_for_rule("javascript.xss.rule"), Category::Security);
        assert_eq!(category_for_rule("correctness.bug.unreachable"), Category::Correctness);
        assert_eq!(category_for_rule("perf.slow-loop"), Category::Performance);
    }

    #[test]
    fn level_to_severity() {
        assert_eq!(severity_for_level(Some("error")), Severity::High);
        assert_eq!(severity_for_level(Some("warning")), Severity::Medium);
        assert_eq!(severity_for_level(Some("note")), Severity::Low);
    }
}
