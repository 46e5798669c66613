//! Review pipeline output: [`ReviewOutput`], [`ReviewStats`], [`RiskLevel`],
//! and the [`ReviewEvent`] log/notification shape (C9/C10, spec §4.7-4.9).

use crate::issue::{Category, Issue, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Overall risk classification derived from the aggregate score (spec §4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Classifies a score in `[0,100]` into one of four half-open
    /// intervals at 30/60/85 (spec §4.8, §8).
    pub fn from_score(score: f64) -> Self {
        if score >= 85.0 {
            RiskLevel::Critical
        } else if score >= 60.0 {
            RiskLevel::High
        } else if score >= 30.0 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// One category's contribution to the aggregate risk score, derived from
/// an issue set — never independently mutable (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub category: Category,
    pub count: u32,
    pub max_severity: Severity,
    pub score_contribution: f64,
}

/// Per-category issue breakdown, ordered by [`Category`] for a stable
/// display order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryBreakdown(pub BTreeMap<Category, CategoryEntry>);

impl CategoryBreakdown {
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut map: BTreeMap<Category, CategoryEntry> = BTreeMap::new();
        for issue in issues {
            let contribution =
                issue.severity.weight() * issue.confidence() * issue.category.weight();
            map.entry(issue.category)
                .and_modify(|entry| {
                    entry.count += 1;
                    entry.score_contribution += contribution;
                    if issue.severity > entry.max_severity {
                        entry.max_severity = issue.severity;
                    }
                })
                .or_insert(CategoryEntry {
                    category: issue.category,
                    count: 1,
                    max_severity: issue.severity,
                    score_contribution: contribution,
                });
        }
        Self(map)
    }
}

/// Summary counters attached to a [`ReviewOutput`], surfaced in the job
/// completion log line (spec §3 supplemented per SPEC_FULL.md §4).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewStats {
    pub files_changed: u32,
    pub files_reviewed: u32,
    pub chunks_analyzed: u32,
    pub tools_run: Vec<String>,
    pub tools_failed: Vec<String>,
    pub issues_total: u32,
    pub issues_by_category: CategoryBreakdown,
    pub latency_ms: u64,
}

/// The final result of reviewing one PR revision: findings, score, and the
/// stats needed to render the summary comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewOutput {
    pub job_id: String,
    pub owner: String,
    pub repo: String,
    pub pr_number: u64,
    pub sha: String,
    pub issues: Vec<Issue>,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub stats: ReviewStats,
}

/// State-machine transitions the orchestrator (C10) emits as structured log
/// events, mirroring the teacher's staged `step1:`/`step2:` debug logging
/// but as a typed enum instead of free-form strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum ReviewEvent {
    Received { job_id: String },
    DiffFetched { job_id: String, files: u32 },
    Chunked { job_id: String, chunks: u32 },
    AnalysisStarted { job_id: String, source: String },
    AnalysisFinished { job_id: String, source: String, issues: u32 },
    Aggregated { job_id: String, issues: u32 },
    Scored { job_id: String, score: f64, level: RiskLevel },
    Posted { job_id: String },
    Failed { job_id: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issue::{IssueBuilder, Severity};

    #[test]
    fn risk_level_boundaries() {
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(29.99), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(30.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(59.99), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(60.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(84.99), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(85.0), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(100.0), RiskLevel::Critical);
    }

    #[test]
    fn category_breakdown_counts_and_tracks_max_severity() {
        let issues = vec![
            IssueBuilder::new(Category::Security, Severity::High, "a.rs", 1, 1, "m", "t")
                .confidence(0.9)
                .build()
                .unwrap(),
            IssueBuilder::new(Category::Security, Severity::Low, "b.rs", 2, 2, "m", "t")
                .confidence(0.5)
                .build()
                .unwrap(),
            IssueBuilder::new(Category::Style, Severity::Low, "c.rs", 3, 3, "m", "t")
                .confidence(0.5)
                .build()
                .unwrap(),
        ];
        let breakdown = CategoryBreakdown::from_issues(&issues);
        let security = breakdown.0.get(&Category::Security).unwrap();
        assert_eq!(security.count, 2);
        assert_eq!(security.max_severity, Severity::High);
        let style = breakdown.0.get(&Category::Style).unwrap();
        assert_eq!(style.count, 1);
        assert_eq!(style.max_severity, Severity::Low);
    }
}
