//! Vulnerability scanner (C7): parses dependency manifests, queries an
//! OSV-style vulnerability DB, and maps results into [`review_types::Issue`]s.

pub mod errors;
pub mod manifest;
pub mod osv;

pub use errors::{Error, Result};
pub use manifest::{clean_version, parse_manifest, Dependency, Ecosystem};
pub use osv::{OsvClient, OsvVuln};

use review_types::{Category, IssueBuilder, Issue, Severity};

/// First-50 bound on packages queried per scan — a fixed cost cap, not a
/// config toggle (spec §4.5).
pub const MAX_PACKAGES_PER_SCAN: usize = 50;

fn severity_from_cvss(score: Option<f64>) -> Severity {
    match score {
        Some(s) if s >= 9.0 => Severity::Critical,
        Some(s) if s >= 7.0 => Severity::High,
        Some(s) if s >= 4.0 => Severity::Medium,
        Some(_) => Severity::Low,
        None => Severity::Medium,
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Builds one [`Issue`] per returned vulnerability (spec §4.5): category
/// `dependency`, confidence 0.95, `line_start = line_end = 1`.
fn vuln_to_issue(dep: &Dependency, manifest_path: &str, vuln: &OsvVuln) -> Option<Issue> {
    let severity = severity_from_cvss(vuln.cvss_score());
    let summary = vuln
        .summary
        .clone()
        .or_else(|| vuln.details.clone())
        .unwrap_or_else(|| "no summary provided".to_string());
    let message = format!(
        "{}: {} ({}@{})",
        vuln.id, summary, dep.name, dep.cleaned_version
    );
    let evidence = vuln
        .details
        .as_deref()
        .map(|d| truncate_chars(d, 200))
        .unwrap_or_default();

    IssueBuilder::new(
        Category::Dependency,
        severity,
        manifest_path,
        1,
        1,
        truncate_chars(&message, 900),
        "osv",
    )
    .subtype(truncate_chars(&vuln.id, 50))
    .confidence(0.95)
    .evidence(evidence)
    .build()
    .ok()
}

/// Scans one manifest file's dependencies against the vulnerability DB,
/// bounded to the first [`MAX_PACKAGES_PER_SCAN`] packages (spec §4.5).
pub async fn scan_manifest(
    client: &OsvClient,
    manifest_path: &str,
    file_name: &str,
    contents: &str,
) -> Vec<Issue> {
    let deps = parse_manifest(file_name, contents);
    let mut issues = Vec::new();
    for dep in deps.into_iter().take(MAX_PACKAGES_PER_SCAN) {
        let ecosystem = dep.ecosystem.as_osv_str();
        let vulns = client.query(&dep, ecosystem).await;
        for vuln in &vulns {
            if let Some(issue) = vuln_to_issue(&dep, manifest_path, vuln) {
                issues.push(issue);
            }
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use manifest::Ecosystem;

    fn dep() -> Dependency {
        Dependency {
            name: "lodash".into(),
            ecosystem: Ecosystem::Npm,
            cleaned_version: "4.17.11".into(),
        }
    }

    #[test]
    fn severity_mapping_by_cvss_bucket() {
        assert_eq!(severity_from_cvss(Some(9.8)), Severity::Critical);
        assert_eq!(severity_from_cvss(Some(7.5)), Severity::High);
        assert_eq!(severity_from_cvss(Some(4.0)), Severity::Medium);
        assert_eq!(severity_from_cvss(Some(1.0)), Severity::Low);
        assert_eq!(severity_from_cvss(None), Severity::Medium);
    }

    #[test]
    fn vuln_maps_to_dependency_issue_with_fixed_confidence() {
        let vuln = OsvVuln {
            id: "GHSA-jf85-cpcp-j695".into(),
            summary: Some("Prototype Pollution in lodash".into()),
            details: Some("details go here".into()),
            severity: vec![osv::OsvSeverity {
                score: Some("9.1".into()),
            }],
        };
        let issue = vuln_to_issue(&dep(), "package.json", &vuln).unwrap();
        assert_eq!(issue.category, Category::Dependency);
        assert_eq!(issue.severity, Severity::Critical);
        assert_eq!(issue.confidence(), 0.95);
        assert_eq!(issue.line_start, 1);
        assert_eq!(issue.line_end, 1);
        assert!(issue.message.contains("lodash@4.17.11"));
    }
}
