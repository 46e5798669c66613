//! Diff model (C1/C3 shapes): [`DiffHunk`], [`DiffFile`], [`ParsedDiff`], [`Chunk`].
//!
//! These types are produced by `diff-core` and consumed by every analyzer.
//! They carry no parsing logic themselves — just the invariants spelled out
//! in spec §3.

use serde::{Deserialize, Serialize};

/// One added or removed line inside a hunk, paired with its line number in
/// the file it belongs to (new-file numbering for additions, old-file
/// numbering for removals).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub line_number: u32,
    pub content: String,
}

/// A contiguous region of a unified diff, `@@ -old_start,old_count +new_start,new_count @@`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffHunk {
    pub old_start: u32,
    pub old_count: u32,
    pub new_start: u32,
    pub new_count: u32,
    /// Raw hunk text, header included, used for re-display and caching.
    pub raw: String,
    pub added_lines: Vec<DiffLine>,
    pub removed_lines: Vec<DiffLine>,
}

impl DiffHunk {
    /// True if `added_lines`/`removed_lines` line numbers are strictly
    /// increasing and fall within the ranges declared by the header.
    pub fn is_well_formed(&self) -> bool {
        let increasing = |lines: &[DiffLine]| {
            lines
                .windows(2)
                .all(|w| w[1].line_number > w[0].line_number)
        };
        let in_range = |lines: &[DiffLine], start: u32, count: u32| {
            lines
                .iter()
                .all(|l| l.line_number >= start && l.line_number < start.saturating_add(count.max(1)))
        };
        increasing(&self.added_lines)
            && increasing(&self.removed_lines)
            && in_range(&self.added_lines, self.new_start, self.new_count.max(1))
            && in_range(&self.removed_lines, self.old_start, self.old_count.max(1))
    }
}

/// Kind of change a [`DiffFile`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileChangeKind {
    Add,
    Delete,
    Modify,
    Rename,
}

impl Default for FileChangeKind {
    /// A file block with no explicit add/delete/rename marker is a plain
    /// modification — the common case the parser falls back to.
    fn default() -> Self {
        FileChangeKind::Modify
    }
}

/// Optional `old mode`/`new mode` pair from a diff header.
pub type ModeChange = (String, String);

/// A single file's diff: paths, change kind, hunks, and derived totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiffFile {
    pub old_path: Option<String>,
    pub new_path: Option<String>,
    pub kind: FileChangeKind,
    pub is_binary: bool,
    /// Rename similarity percentage in `[0,100]`, present only for renames.
    pub similarity: Option<u8>,
    pub mode_change: Option<ModeChange>,
    pub hunks: Vec<DiffHunk>,
    pub lines_added: u32,
    pub lines_removed: u32,
}

impl DiffFile {
    /// The path reviewers should see: `new_path` unless this is a delete.
    pub fn effective_path(&self) -> &str {
        self.new_path
            .as_deref()
            .or(self.old_path.as_deref())
            .unwrap_or("")
    }

    /// Validates the cross-field invariants spec §3 lists for `DiffFile`.
    pub fn check_invariants(&self) -> Result<(), &'static str> {
        match self.kind {
            FileChangeKind::Add if self.old_path.is_some() => {
                return Err("add: old_path must be absent");
            }
            FileChangeKind::Delete if self.new_path.is_some() => {
                return Err("delete: new_path must be absent");
            }
            FileChangeKind::Rename => {
                if self.old_path.is_none() || self.new_path.is_none() {
                    return Err("rename: both paths must be present");
                }
                if self.old_path == self.new_path {
                    return Err("rename: old_path and new_path must differ");
                }
            }
            _ => {}
        }
        if self.is_binary && !self.hunks.is_empty() {
            return Err("binary file must have empty hunks");
        }
        Ok(())
    }
}

/// An ordered, whole-diff parse result, in input order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedDiff {
    pub files: Vec<DiffFile>,
}

impl ParsedDiff {
    pub fn total_lines_added(&self) -> u64 {
        self.files.iter().map(|f| f.lines_added as u64).sum()
    }

    pub fn total_lines_removed(&self) -> u64 {
        self.files.iter().map(|f| f.lines_removed as u64).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// An LLM-sized bundle of one or more whole diff files (C3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub index: usize,
    pub total_chunks: usize,
    pub files: Vec<DiffFile>,
    pub file_paths: Vec<String>,
    pub content: String,
    pub estimated_tokens: usize,
    pub languages: Vec<String>,
}
