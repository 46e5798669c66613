//! Aggregator (C9): merge, deduplicate, confidence-filter, priority-sort,
//! and cap the issue set from every evidence source (spec §4.7).
//!
//! Risk scoring (in the `risk-score` crate) runs on the full filtered set
//! this module produces via [`deduplicate`] + [`filter_by_confidence`],
//! not on the capped selection [`select_inline`] returns — hidden issues
//! still influence the headline score.

use review_types::Issue;
use std::collections::HashMap;

/// Dedup key: `filePath:lineStart-lineEnd:category:subtype[0:20]` (spec §4.7).
fn dedup_key(issue: &Issue) -> String {
    let subtype_prefix: String = issue.subtype.chars().take(20).collect();
    format!(
        "{}:{}-{}:{:?}:{}",
        issue.file_path, issue.line_start, issue.line_end, issue.category, subtype_prefix
    )
}

/// Keeps the higher-severity issue on key collision, breaking ties by
/// higher confidence. Idempotent: `deduplicate(deduplicate(x)) == deduplicate(x)`.
pub fn deduplicate(issues: Vec<Issue>) -> Vec<Issue> {
    let mut by_key: HashMap<String, Issue> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for issue in issues {
        let key = dedup_key(&issue);
        match by_key.get(&key) {
            Some(existing) => {
                let replace = (issue.severity, ordered_float(issue.confidence()))
                    > (existing.severity, ordered_float(existing.confidence()));
                if replace {
                    by_key.insert(key, issue);
                }
            }
            None => {
                order.push(key.clone());
                by_key.insert(key, issue);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|key| by_key.remove(&key))
        .collect()
}

/// Comparable wrapper so `(Severity, f64)` tuples can be ordered — `f64`
/// has no total order, but confidence here is always a finite `[0,1]`.
fn ordered_float(v: f64) -> u64 {
    (v.clamp(0.0, 1.0) * 1_000_000.0) as u64
}

/// Drops any issue below `threshold` (spec §4.7 step 2).
pub fn filter_by_confidence(issues: Vec<Issue>, threshold: f64) -> Vec<Issue> {
    issues
        .into_iter()
        .filter(|issue| issue.confidence() >= threshold)
        .collect()
}

const CATEGORY_PRIORITY_WEIGHT: fn(review_types::Category) -> f64 = |c| c.weight();

fn priority(issue: &Issue) -> f64 {
    issue.severity.weight() * issue.confidence() * CATEGORY_PRIORITY_WEIGHT(issue.category)
}

/// Sorts descending by `severityWeight × confidence × categoryWeight`
/// (spec §4.7 step 3). Stable, so equal-priority issues keep their
/// relative input order.
pub fn priority_sort(mut issues: Vec<Issue>) -> Vec<Issue> {
    issues.sort_by(|a, b| {
        priority(b)
            .partial_cmp(&priority(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    issues
}

/// Selects the top `max` issues as inline comments (spec §4.7 step 4).
/// Callers must compute the risk score on the full set *before* calling
/// this, not on its return value.
pub fn select_inline(issues: &[Issue], max: usize) -> Vec<Issue> {
    issues.iter().take(max).cloned().collect()
}

/// Runs the full pipeline: dedup → confidence filter → priority sort.
/// The caller scores this result, then calls [`select_inline`] on it
/// separately to get the capped comment set.
pub fn aggregate(issues: Vec<Issue>, confidence_threshold: f64) -> Vec<Issue> {
    let deduped = deduplicate(issues);
    let filtered = filter_by_confidence(deduped, confidence_threshold);
    priority_sort(filtered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_types::{Category, IssueBuilder, Severity};

    fn issue(
        category: Category,
        severity: Severity,
        confidence: f64,
        path: &str,
        line: u32,
        subtype: &str,
    ) -> Issue {
        IssueBuilder::new(category, severity, path, line, line, "m", "tool")
            .subtype(subtype)
            .confidence(confidence)
            .build()
            .unwrap()
    }

    #[test]
    fn dedup_keeps_higher_severity_on_collision() {
        let low = issue(Category::Security, Severity::Low, 0.6, "a.rs", 1, "xss");
        let high = issue(Category::Security, Severity::High, 0.6, "a.rs", 1, "xss");
        let deduped = deduplicate(vec![low, high.clone()]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].severity, Severity::High);
    }

    #[test]
    fn dedup_breaks_ties_by_confidence() {
        let low_conf = issue(Category::Security, Severity::High, 0.5, "a.rs", 1, "xss");
        let high_conf = issue(Category::Security, Severity::High, 0.9, "a.rs", 1, "xss");
        let deduped = deduplicate(vec![low_conf, high_conf]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].confidence(), 0.9);
    }

    #[test]
    fn dedup_is_idempotent() {
        let issues = vec![
            issue(Category::Security, Severity::High, 0.8, "a.rs", 1, "xss"),
            issue(Category::Style, Severity::Low, 0.5, "b.rs", 2, "quotes"),
        ];
        let once = deduplicate(issues);
        let twice = deduplicate(once.clone());
        assert_eq!(once.len(), twice.len());
    }

    #[test]
    fn confidence_filter_drops_below_threshold() {
        let issues = vec![
            issue(Category::Style, Severity::Low, 0.3, "a.rs", 1, "x"),
            issue(Category::Style, Severity::Low, 0.6, "b.rs", 2, "y"),
        ];
        let filtered = filter_by_confidence(issues, 0.5);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].file_path, "b.rs");
    }

    #[test]
    fn priority_sort_orders_by_weighted_score() {
        let low = issue(Category::Style, Severity::Low, 0.9, "a.rs", 1, "x");
        let high = issue(Category::Security, Severity::Critical, 0.9, "b.rs", 2, "y");
        let sorted = priority_sort(vec![low, high]);
        assert_eq!(sorted[0].file_path, "b.rs");
    }

    #[test]
    fn select_inline_caps_at_max() {
        let issues: Vec<Issue> = (0..5)
            .map(|i| issue(Category::Style, Severity::Low, 0.9, "a.rs", i + 1, "x"))
            .collect();
        let selected = select_inline(&issues, 3);
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn full_set_size_can_exceed_inline_cap() {
        let issues: Vec<Issue> = (0..5)
            .map(|i| issue(Category::Security, Severity::High, 0.9, "a.rs", i + 1, "x"))
            .collect();
        let aggregated = aggregate(issues, 0.5);
        assert_eq!(aggregated.len(), 5);
        assert_eq!(select_inline(&aggregated, 2).len(), 2);
    }
}
