//! Response JSON extraction and validation (spec §4.6).

use review_types::{Category, Issue, IssueBuilder, Severity};
use serde::Deserialize;
use uuid::Uuid;

/// Locates the JSON payload in a raw LLM response: a fenced code block
/// first, else the first balanced `{...}` substring, else the whole
/// response as a last resort.
pub fn locate_json(raw: &str) -> Option<&str> {
    if let Some(fenced) = extract_fenced(raw) {
        return Some(fenced);
    }
    if let Some(braces) = extract_first_braces(raw) {
        return Some(braces);
    }
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn extract_fenced(raw: &str) -> Option<&str> {
    let start_marker = raw.find("```")?;
    let after_marker = start_marker + 3;
    let rest = &raw[after_marker..];
    // Skip an optional language tag (e.g. "json") up to the newline.
    let body_start = rest.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &rest[body_start..];
    let end = body.find("```")?;
    let candidate = body[..end].trim();
    if candidate.is_empty() {
        None
    } else {
        Some(candidate)
    }
}

fn extract_first_braces(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let mut depth = 0i32;
    for (offset, ch) in raw[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

#[derive(Debug, Deserialize)]
struct RawIssues {
    issues: Vec<RawIssue>,
}

#[derive(Debug, Deserialize)]
struct RawIssue {
    category: Category,
    #[serde(default)]
    subtype: String,
    severity: Severity,
    confidence: f64,
    file_path: String,
    line_start: u32,
    line_end: u32,
    message: String,
    #[serde(default)]
    evidence: String,
    #[serde(default)]
    suggested_fix: Option<String>,
    #[serde(default)]
    patch: Option<String>,
    #[serde(default)]
    cwe: Option<String>,
    #[serde(default)]
    owasp_tag: Option<String>,
}

/// Parses the located JSON into validated [`Issue`]s, assigning a fresh
/// id and `source_tool = "llm[-<provider>]"` to each (spec §4.6). Any
/// issue failing `Issue` validation, or whose `file_path` does not
/// substring-match (either direction) any path in `chunk_paths`, is
/// dropped silently rather than surfaced as an error.
pub fn parse_issues(raw: &str, provider: &str, chunk_paths: &[String]) -> Vec<Issue> {
    let Some(json) = locate_json(raw) else {
        return Vec::new();
    };
    let Ok(parsed) = serde_json::from_str::<RawIssues>(json) else {
        return Vec::new();
    };

    let source_tool = format!("llm-{provider}");
    parsed
        .issues
        .into_iter()
        .filter(|issue| path_matches_any(&issue.file_path, chunk_paths))
        .filter_map(|issue| {
            IssueBuilder::new(
                issue.category,
                issue.severity,
                issue.file_path,
                issue.line_start.max(1),
                issue.line_end.max(1),
                issue.message,
                source_tool.clone(),
            )
            .id(Uuid::new_v4().to_string())
            .subtype(issue.subtype)
            .confidence(issue.confidence.clamp(0.0, 1.0))
            .evidence(issue.evidence)
            .is_llm_generated(true)
            .maybe(issue.suggested_fix, |b, v| b.suggested_fix(v))
            .maybe(issue.patch, |b, v| b.patch(v))
            .maybe(issue.cwe, |b, v| b.cwe(v))
            .maybe(issue.owasp_tag, |b, v| b.owasp_tag(v))
            .build()
            .ok()
        })
        .collect()
}

fn path_matches_any(file_path: &str, chunk_paths: &[String]) -> bool {
    chunk_paths
        .iter()
        .any(|p| p.contains(file_path.as_str()) || file_path.contains(p.as_str()))
}

/// Small builder-chaining helper so optional fields can be applied inline
/// without breaking the fluent `IssueBuilder` chain above.
trait MaybeApply: Sized {
    fn maybe<T>(self, value: Option<T>, apply: impl FnOnce(Self, T) -> Self) -> Self {
        match value {
            Some(v) => apply(self, v),
            None => self,
        }
    }
}

impl MaybeApply for review_types::IssueBuilder {}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{"issues":[{"category":"security","subtype":"sqli","severity":"high","confidence":0.9,"file_path":"src/db.rs","line_start":10,"line_end":12,"message":"possible SQL injection","evidence":"format!"}]}"#;

    #[test]
    fn extracts_fenced_json() {
        let raw = format!("Here you go:\n```json\n{VALID}\n```\nthanks");
        assert_eq!(locate_json(&raw).unwrap().trim(), VALID);
    }

    #[test]
    fn extracts_first_braces_when_no_fence() {
        let raw = format!("preamble {VALID} trailing junk {{}}");
        let located = locate_json(&raw).unwrap();
        assert!(located.starts_with('{'));
        assert!(located.contains("issues"));
    }

    #[test]
    fn whole_response_used_as_last_resort() {
        assert_eq!(locate_json(VALID).unwrap(), VALID);
    }

    #[test]
    fn empty_response_yields_no_json() {
        assert!(locate_json("   ").is_none());
    }

    #[test]
    fn parses_and_tags_llm_issues() {
        let issues = parse_issues(VALID, "openai", &["src/db.rs".to_string()]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].source_tool, "llm-openai");
        assert!(issues[0].is_llm_generated);
    }

    #[test]
    fn drops_issue_with_file_path_outside_chunk() {
        let issues = parse_issues(VALID, "openai", &["other/file.rs".to_string()]);
        assert!(issues.is_empty());
    }

    #[test]
    fn substring_match_is_bidirectional() {
        let narrower = r#"{"issues":[{"category":"style","subtype":"x","severity":"low","confidence":0.6,"file_path":"db.rs","line_start":1,"line_end":1,"message":"m"}]}"#;
        let issues = parse_issues(narrower, "openai", &["src/db.rs".to_string()]);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn malformed_json_yields_zero_issues_not_an_error() {
        let issues = parse_issues("not json at all", "openai", &[]);
        assert!(issues.is_empty());
    }
}
