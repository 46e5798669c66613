//! Canonical `Issue` record (C4) and its validation rules.
//!
//! Every analyzer (static tool, vulnerability scanner, LLM) produces
//! `Issue`s through [`IssueBuilder::build`], which is the single place
//! the bounds from spec §3 are enforced. A rejected `Issue` never reaches
//! the aggregator.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Security,
    Correctness,
    Performance,
    Maintainability,
    Style,
    Dependency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Fixed weight used by the risk scorer (spec §4.8).
    pub fn weight(self) -> f64 {
        match self {
            Severity::Low => 1.0,
            Severity::Medium => 3.0,
            Severity::High => 7.0,
            Severity::Critical => 15.0,
        }
    }
}

impl Category {
    /// Fixed weight used by the risk scorer (spec §4.8).
    pub fn weight(self) -> f64 {
        match self {
            Category::Security => 4.0,
            Category::Correctness => 3.0,
            Category::Dependency => 2.5,
            Category::Performance => 2.0,
            Category::Maintainability => 1.5,
            Category::Style => 1.0,
        }
    }
}

/// Confidence in `[0.0, 1.0]`. A thin newtype so an out-of-range value
/// can never silently enter an `Issue`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Confidence(f64);

impl Confidence {
    pub fn new(v: f64) -> Result<Self, ValidationError> {
        if (0.0..=1.0).contains(&v) {
            Ok(Self(v))
        } else {
            Err(ValidationError::OutOfBounds {
                field: "confidence",
                detail: "must be in [0,1]",
            })
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("{field} exceeds max length of {max} chars")]
    TooLong { field: &'static str, max: usize },
    #[error("{field} is out of bounds: {detail}")]
    OutOfBounds {
        field: &'static str,
        detail: &'static str,
    },
    #[error("line_end ({line_end}) must be >= line_start ({line_start})")]
    LineOrder { line_start: u32, line_end: u32 },
    #[error("cwe '{0}' does not match CWE-\\d+")]
    InvalidCwe(String),
}

fn cwe_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^CWE-\d+$").unwrap())
}

/// Canonical, validated issue record. Construct via [`IssueBuilder`] — the
/// struct itself has no public constructor so a validation bypass is a
/// compile error, not a runtime one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub category: Category,
    pub subtype: String,
    pub severity: Severity,
    confidence: Confidence,
    pub file_path: String,
    pub line_start: u32,
    pub line_end: u32,
    pub message: String,
    pub evidence: String,
    pub suggested_fix: Option<String>,
    pub patch: Option<String>,
    pub cwe: Option<String>,
    pub owasp_tag: Option<String>,
    pub source_tool: String,
    #[serde(default)]
    pub is_llm_generated: bool,
}

impl Issue {
    pub fn confidence(&self) -> f64 {
        self.confidence.value()
    }
}

/// Builder enforcing every bound spec §3 lists for `Issue`.
pub struct IssueBuilder {
    id: Option<String>,
    category: Category,
    subtype: String,
    severity: Severity,
    confidence: f64,
    file_path: String,
    line_start: u32,
    line_end: u32,
    message: String,
    evidence: String,
    suggested_fix: Option<String>,
    patch: Option<String>,
    cwe: Option<String>,
    owasp_tag: Option<String>,
    source_tool: String,
    is_llm_generated: bool,
}

impl IssueBuilder {
    pub fn new(
        category: Category,
        severity: Severity,
        file_path: impl Into<String>,
        line_start: u32,
        line_end: u32,
        message: impl Into<String>,
        source_tool: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            category,
            subtype: String::new(),
            severity,
            confidence: 0.5,
            file_path: file_path.into(),
            line_start,
            line_end,
            message: message.into(),
            evidence: String::new(),
            suggested_fix: None,
            patch: None,
            cwe: None,
            owasp_tag: None,
            source_tool: source_tool.into(),
            is_llm_generated: false,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn subtype(mut self, s: impl Into<String>) -> Self {
        self.subtype = s.into();
        self
    }

    pub fn confidence(mut self, c: f64) -> Self {
        self.confidence = c;
        self
    }

    pub fn evidence(mut self, e: impl Into<String>) -> Self {
        self.evidence = e.into();
        self
    }

    pub fn suggested_fix(mut self, s: impl Into<String>) -> Self {
        self.suggested_fix = Some(s.into());
        self
    }

    pub fn patch(mut self, p: impl Into<String>) -> Self {
        self.patch = Some(p.into());
        self
    }

    pub fn cwe(mut self, c: impl Into<String>) -> Self {
        self.cwe = Some(c.into());
        self
    }

    pub fn owasp_tag(mut self, o: impl Into<String>) -> Self {
        self.owasp_tag = Some(o.into());
        self
    }

    pub fn is_llm_generated(mut self, v: bool) -> Self {
        self.is_llm_generated = v;
        self
    }

    pub fn build(self) -> Result<Issue, ValidationError> {
        if self.subtype.chars().count() > 50 {
            return Err(ValidationError::TooLong {
                field: "subtype",
                max: 50,
            });
        }
        if self.file_path.trim().is_empty() {
            return Err(ValidationError::Empty { field: "file_path" });
        }
        if self.line_end < self.line_start {
            return Err(ValidationError::LineOrder {
                line_start: self.line_start,
                line_end: self.line_end,
            });
        }
        if self.line_start == 0 || self.line_end == 0 {
            return Err(ValidationError::OutOfBounds {
                field: "line_start/line_end",
                detail: "must be positive",
            });
        }
        let message_len = self.message.chars().count();
        if message_len == 0 || message_len > 900 {
            return Err(ValidationError::TooLong {
                field: "message",
                max: 900,
            });
        }
        if self.evidence.chars().count() > 500 {
            return Err(ValidationError::TooLong {
                field: "evidence",
                max: 500,
            });
        }
        if let Some(ref f) = self.suggested_fix {
            if f.chars().count() > 500 {
                return Err(ValidationError::TooLong {
                    field: "suggested_fix",
                    max: 500,
                });
            }
        }
        if let Some(ref p) = self.patch {
            if p.chars().count() > 2000 {
                return Err(ValidationError::TooLong {
                    field: "patch",
                    max: 2000,
                });
            }
        }
        if let Some(ref cwe) = self.cwe {
            if !cwe_regex().is_match(cwe) {
                return Err(ValidationError::InvalidCwe(cwe.clone()));
            }
        }
        if let Some(ref tag) = self.owasp_tag {
            if tag.chars().count() > 20 {
                return Err(ValidationError::TooLong {
                    field: "owasp_tag",
                    max: 20,
                });
            }
        }
        let confidence = Confidence::new(self.confidence)?;

        Ok(Issue {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            category: self.category,
            subtype: self.subtype,
            severity: self.severity,
            confidence,
            file_path: self.file_path,
            line_start: self.line_start,
            line_end: self.line_end,
            message: self.message,
            evidence: self.evidence,
            suggested_fix: self.suggested_fix,
            patch: self.patch,
            cwe: self.cwe,
            owasp_tag: self.owasp_tag,
            source_tool: self.source_tool,
            is_llm_generated: self.is_llm_generated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> IssueBuilder {
        IssueBuilder::new(
            Category::Style,
            Severity::Low,
            "src/lib.rs",
            10,
            12,
            "message",
            "eslint",
        )
    }

    #[test]
    fn message_exactly_900_chars_accepted() {
        let msg = "a".repeat(900);
        let issue = base().confidence(0.5).evidence("e").build();
        assert!(issue.is_ok());
        let _ = msg;
        let long_ok = IssueBuilder::new(
            Category::Style,
            Severity::Low,
            "src/lib.rs",
            1,
            1,
            "a".repeat(900),
            "eslint",
        )
        .confidence(0.5)
        .build();
        assert!(long_ok.is_ok());
    }

    #[test]
    fn message_901_chars_rejected() {
        let issue = IssueBuilder::new(
            Category::Style,
            Severity::Low,
            "src/lib.rs",
            1,
            1,
            "a".repeat(901),
            "eslint",
        )
        .confidence(0.5)
        .build();
        assert!(issue.is_err());
    }

    #[test]
    fn line_end_before_line_start_rejected() {
        let issue = IssueBuilder::new(
            Category::Style,
            Severity::Low,
            "src/lib.rs",
            10,
            5,
            "msg",
            "eslint",
        )
        .build();
        assert_eq!(
            issue.unwrap_err(),
            ValidationError::LineOrder {
                line_start: 10,
                line_end: 5
            }
        );
    }

    #[test]
    fn confidence_out_of_range_rejected() {
        let issue = base().confidence(1.5).build();
        assert!(issue.is_err());
    }

    #[test]
    fn malformed_cwe_rejected() {
        let issue = base().confidence(0.5).cwe("not-a-cwe").build();
        assert!(matches!(issue, Err(ValidationError::InvalidCwe(_))));
    }

    #[test]
    fn well_formed_cwe_accepted() {
        let issue = base().confidence(0.5).cwe("CWE-79").build();
        assert!(issue.is_ok());
    }

    #[test]
    fn empty_file_path_rejected() {
        let issue = IssueBuilder::new(Category::Style, Severity::Low, "", 1, 1, "msg", "eslint")
            .confidence(0.5)
            .build();
        assert!(matches!(issue, Err(ValidationError::Empty { .. })));
    }
}
