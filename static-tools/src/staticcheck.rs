//! staticcheck runner (Go), spec §4.4: newline-delimited JSON on stdout,
//! category by code-prefix, severity from `error`/`warning`/`note`.

use crate::common::{binary_available, relative_to, ToolConfig, ToolResult};
use review_types::{Category, IssueBuilder, Severity};
use serde::Deserialize;
use std::time::Instant;
use tokio::process::Command;
use tokio::time::timeout;

#[derive(Debug, Deserialize)]
struct StaticcheckDiagnostic {
    code: String,
    severity: Option<String>,
    location: StaticcheckLocation,
    message: String,
}

#[derive(Debug, Deserialize)]
struct StaticcheckLocation {
    file: String,
    line: u32,
}

fn category_for_code(code: &str) -> Category {
    if code.starts_with("SA") {
        Category::Security
    } else if code.starts_with("ST") {
        Category::Style
    } else if code.starts_with('S') {
        Category::Correctness
    } else {
        Category::Maintainability
    }
}

fn severity_from(s: Option<&str>) -> Severity {
    match s {
        Some("error") => Severity::High,
        Some("note") => Severity::Low,
        _ => Severity::Medium,
    }
}

pub async fn run(files: &[String], config: &ToolConfig) -> ToolResult {
    let started = Instant::now();
    if !binary_available("staticcheck").await {
        return ToolResult::unavailable("staticcheck");
    }

    let mut cmd = Command::new("staticcheck");
    cmd.args(["-f", "json"])
        .args(files)
        .current_dir(&config.workdir)
        .kill_on_drop(true);

    let output = match timeout(config.timeout, cmd.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return ToolResult {
                tool: "staticcheck".into(),
                success: false,
                issues: Vec::new(),
                error: Some(e.to_string()),
                duration: started.elapsed(),
            }
        }
        Err(_) => return ToolResult::timed_out("staticcheck", config.timeout),
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut issues = Vec::new();
    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Ok(diag) = serde_json::from_str::<StaticcheckDiagnostic>(line) else {
            continue;
        };
        let path = relative_to(&config.workdir, &diag.location.file);
        let line_no = diag.location.line.max(1);
        let issue = IssueBuilder::new(
            category_for_code(&diag.code),
            severity_from(diag.severity.as_deref()),
            path,
            line_no,
            line_no,
            diag.message,
            "staticcheck",
        )
        .subtype(diag.code)
        .confidence(0.9)
        .build();
        if let Ok(issue) = issue {
            issues.push(issue);
        }
    }

    ToolResult {
        tool: "staticcheck".into(),
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
        assert_eq!(category_for_code("SA4006"), Category::Security);
        assert_eq!(category_for_code("ST1003"), Category::Style);
        assert_eq!(category_for_code("S1002"), Category::Correctness);
        assert_eq!(category_for_code("U1000"), Category::Maintainability);
    }

    #[test]
    fn severity_mapping() {
        assert_eq!(severity_from(Some("error")), Severity::High);
        assert_eq!(severity_from(Some("warning")), Severity::Medium);
        assert_eq!(severity_from(Some("note")), Severity::Low);
        assert_eq!(severity_from(None), Severity::Medium);
    }
}
