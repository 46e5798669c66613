//! Deterministic risk scorer (C5).
//!
//! Turns a filtered `Issue` set into a `[0,100]` score, a [`RiskLevel`],
//! a per-category breakdown, and a pass/fail gate — the same four
//! numbers every time for the same issue set, per spec §4.8.

use review_types::{CategoryBreakdown, Issue, RiskLevel};
use serde::{Deserialize, Serialize};

/// Default used in the normalization denominator: `maxExpectedIssues * 15 * 4.0`.
///
/// Calibrated so ten maximum-weight issues (critical/security/confidence
/// 1.0, the worst case this model recognizes) saturate the normalized
/// score at 100 before amplification.
const DEFAULT_MAX_EXPECTED_ISSUES: f64 = 10.0;
/// `severity(critical) * category(security)`, the per-issue ceiling the
/// denominator is built from.
const MAX_SEVERITY_WEIGHT: f64 = 15.0;
const MAX_CATEGORY_WEIGHT: f64 = 4.0;
/// Final-score amplification that widens mid-range separation (spec §4.8).
const AMPLIFICATION: f64 = 1.1;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreConfig {
    pub max_expected_issues: f64,
    pub risk_threshold: f64,
    pub fail_on_critical_security: bool,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            max_expected_issues: DEFAULT_MAX_EXPECTED_ISSUES,
            risk_threshold: 85.0,
            fail_on_critical_security: true,
        }
    }
}

impl ScoreConfig {
    fn denominator(&self) -> f64 {
        self.max_expected_issues * MAX_SEVERITY_WEIGHT * MAX_CATEGORY_WEIGHT
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    pub raw_score: f64,
    pub normalized_score: f64,
    pub final_score: f64,
    pub level: RiskLevel,
    pub breakdown: CategoryBreakdown,
    /// `true` if the review should be blocked.
    pub gate_failed: bool,
}

fn issue_contribution(issue: &Issue) -> f64 {
    issue.severity.weight() * issue.confidence() * issue.category.weight()
}

/// Scores a filtered issue set. Per spec §4.7, this must run on the full
/// filtered set, not a capped inline-comment selection, so issues hidden
/// from the diff view still influence the headline score.
pub fn score(issues: &[Issue], config: &ScoreConfig) -> RiskReport {
    let raw_score: f64 = issues.iter().map(issue_contribution).sum();
    let normalized = (raw_score / config.denominator() * 100.0).min(100.0);
    // Amplified but not rounded to a whole number: a single low-severity
    // issue produces a fractional score well under 1.0, and rounding that
    // to the nearest integer would collapse it to zero.
    let final_score = (normalized * AMPLIFICATION).min(100.0);
    let level = RiskLevel::from_score(final_score);
    let breakdown = CategoryBreakdown::from_issues(issues);

    let gate_failed = final_score >= config.risk_threshold
        || (config.fail_on_critical_security
            && issues.iter().any(|i| {
                i.category == review_types::Category::Security
                    && i.severity == review_types::Severity::Critical
            }));

    RiskReport {
        raw_score,
        normalized_score: normalized,
        final_score,
        level,
        breakdown,
        gate_failed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_types::{Category, IssueBuilder, Severity};

    fn issue(category: Category, severity: Severity, confidence: f64) -> Issue {
        IssueBuilder::new(category, severity, "a.rs", 1, 1, "m", "tool")
            .confidence(confidence)
            .build()
            .unwrap()
    }

    #[test]
    fn empty_issue_set_scores_zero() {
        let report = score(&[], &ScoreConfig::default());
        assert_eq!(report.final_score, 0.0);
        assert_eq!(report.level, RiskLevel::Low);
        assert!(!report.gate_failed);
    }

    #[test]
    fn ten_critical_security_issues_max_score_and_gate_fails() {
        let issues: Vec<Issue> = (0..10)
            .map(|_| issue(Category::Security, Severity::Critical, 1.0))
            .collect();
        let report = score(&issues, &ScoreConfig::default());
        assert_eq!(report.final_score, 100.0);
        assert_eq!(report.level, RiskLevel::Critical);
        assert!(report.gate_failed);
    }

    #[test]
    fn one_low_style_issue_is_low_risk_and_gate_passes() {
        let issues = vec![issue(Category::Style, Severity::Low, 0.5)];
        let report = score(&issues, &ScoreConfig::default());
        assert!(report.final_score > 0.0);
        assert!(report.final_score < 30.0);
        assert_eq!(report.level, RiskLevel::Low);
        assert!(!report.gate_failed);
    }

    #[test]
    fn score_is_monotonic_in_issue_set() {
        let mut issues = vec![issue(Category::Correctness, Severity::Medium, 0.7)];
        let before = score(&issues, &ScoreConfig::default()).final_score;
        issues.push(issue(Category::Style, Severity::Low, 0.3));
        let after = score(&issues, &ScoreConfig::default()).final_score;
        assert!(after >= before);
    }

    #[test]
    fn gate_fails_on_threshold_even_without_critical_security() {
        let config = ScoreConfig {
            risk_threshold: 0.05,
            fail_on_critical_security: false,
            ..ScoreConfig::default()
        };
        let issues = vec![issue(Category::Style, Severity::Low, 0.5)];
        let report = score(&issues, &config);
        assert!(report.gate_failed);
    }

    #[test]
    fn single_critical_security_issue_fails_gate_regardless_of_score() {
        let config = ScoreConfig {
            risk_threshold: 100.0,
            ..ScoreConfig::default()
        };
        let issues = vec![issue(Category::Security, Severity::Critical, 1.0)];
        let report = score(&issues, &config);
        assert!(report.final_score < 100.0);
        assert!(report.gate_failed);
    }
}
