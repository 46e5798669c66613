//! Unified diff parser (C1).
//!
//! Lenient by design: only a hunk appearing before any file header is
//! treated as fatal. Everything else upstream producers get wrong or omit
//! (missing `---`/`+++`, stray prelude lines, unknown mode lines) is
//! skipped rather than rejected, following the teacher's
//! `parse_unified_diff_advanced` posture of tolerating provider variance.

use crate::errors::{Error, Result};
use review_types::{DiffFile, DiffHunk, DiffLine, FileChangeKind, ModeChange, ParsedDiff};

#[derive(Default)]
struct FileBuilder {
    old_path: Option<String>,
    new_path: Option<String>,
    kind: FileChangeKind,
    is_binary: bool,
    similarity: Option<u8>,
    old_mode: Option<String>,
    new_mode: Option<String>,
    hunks: Vec<DiffHunk>,
    lines_added: u32,
    lines_removed: u32,
}

struct HunkBuilder {
    old_start: u32,
    old_count: u32,
    new_start: u32,
    new_count: u32,
    raw: String,
    added_lines: Vec<DiffLine>,
    removed_lines: Vec<DiffLine>,
    old_line: u32,
    new_line: u32,
}

impl HunkBuilder {
    fn finish(self) -> DiffHunk {
        DiffHunk {
            old_start: self.old_start,
            old_count: self.old_count,
            new_start: self.new_start,
            new_count: self.new_count,
            raw: self.raw,
            added_lines: self.added_lines,
            removed_lines: self.removed_lines,
        }
    }
}

impl FileBuilder {
    fn finish(self) -> DiffFile {
        let mode_change: Option<ModeChange> = match (self.old_mode, self.new_mode) {
            (Some(o), Some(n)) => Some((o, n)),
            _ => None,
        };
        DiffFile {
            old_path: self.old_path,
            new_path: self.new_path,
            kind: self.kind,
            is_binary: self.is_binary,
            similarity: self.similarity,
            mode_change,
            hunks: self.hunks,
            lines_added: self.lines_added,
            lines_removed: self.lines_removed,
        }
    }
}

/// Strips a leading `a/` or `b/` prefix from a diff path, and maps
/// `/dev/null` to `None`.
fn clean_path(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw == "/dev/null" {
        return None;
    }
    let stripped = raw.strip_prefix("a/").or_else(|| raw.strip_prefix("b/")).unwrap_or(raw);
    Some(stripped.to_string())
}

/// Splits `"12,7"` or `"12"` into `(start, count)`, defaulting an absent
/// count to 1 per spec §4.1 ("b and d default to 1").
fn split_range(s: &str) -> (u32, u32) {
    let s = s.trim();
    if let Some((a, b)) = s.split_once(',') {
        (a.parse().unwrap_or(0), b.parse().unwrap_or(1))
    } else {
        (s.parse().unwrap_or(0), 1)
    }
}

fn parse_hunk_header(line: &str) -> Option<(u32, u32, u32, u32)> {
    let body = line.trim_start_matches('@').trim();
    let body = body.trim_end_matches('@').trim_end_matches("@@").trim();
    let (left, right) = body.split_once('+')?;
    let left = left.trim().trim_start_matches('-').trim();
    let right = right.trim();
    let right = right.split(" @@").next().unwrap_or(right).trim();
    let (old_start, old_count) = split_range(left);
    let (new_start, new_count) = split_range(right);
    Some((old_start, old_count, new_start, new_count))
}

/// Parses a unified diff into a [`ParsedDiff`], in input order.
pub fn parse_unified_diff(input: &str) -> Result<ParsedDiff> {
    let mut files = Vec::new();
    let mut current: Option<FileBuilder> = None;
    let mut current_hunk: Option<HunkBuilder> = None;
    let mut any_file_header_seen = false;

    let flush_hunk = |current: &mut Option<FileBuilder>, hunk: Option<HunkBuilder>| {
        if let (Some(file), Some(hunk)) = (current.as_mut(), hunk) {
            file.hunks.push(hunk.finish());
        }
    };

    for (idx, line) in input.lines().enumerate() {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            flush_hunk(&mut current, current_hunk.take());
            if let Some(file) = current.take() {
                files.push(file.finish());
            }
            any_file_header_seen = true;
            let mut builder = FileBuilder::default();
            // "a/X b/Y" — best-effort default; overridden by ---/+++ below.
            if let Some((a, b)) = rest.split_once(" b/") {
                builder.old_path = clean_path(a);
                builder.new_path = Some(b.trim().to_string());
            }
            current = Some(builder);
            continue;
        }

        if line.starts_with("--- ") {
            if let Some(file) = current.as_mut() {
                file.old_path = clean_path(&line[4..]);
            }
            continue;
        }
        if line.starts_with("+++ ") {
            if let Some(file) = current.as_mut() {
                file.new_path = clean_path(&line[4..]);
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix("rename from ") {
            if let Some(file) = current.as_mut() {
                file.old_path = Some(rest.trim().to_string());
                file.kind = FileChangeKind::Rename;
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix("rename to ") {
            if let Some(file) = current.as_mut() {
                file.new_path = Some(rest.trim().to_string());
                file.kind = FileChangeKind::Rename;
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix("similarity index ") {
            if let Some(file) = current.as_mut() {
                let pct = rest.trim().trim_end_matches('%').parse::<u8>().ok();
                file.similarity = pct;
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix("new file mode ") {
            if let Some(file) = current.as_mut() {
                file.kind = FileChangeKind::Add;
                file.new_mode = Some(rest.trim().to_string());
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix("deleted file mode ") {
            if let Some(file) = current.as_mut() {
                file.kind = FileChangeKind::Delete;
                file.old_mode = Some(rest.trim().to_string());
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix("old mode ") {
            if let Some(file) = current.as_mut() {
                file.old_mode = Some(rest.trim().to_string());
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix("new mode ") {
            if let Some(file) = current.as_mut() {
                file.new_mode = Some(rest.trim().to_string());
            }
            continue;
        }
        if line.starts_with("Binary files ") && line.contains(" differ") {
            if let Some(file) = current.as_mut() {
                file.is_binary = true;
            }
            continue;
        }

        if line.starts_with("@@") {
            if current.is_none() || !any_file_header_seen {
                return Err(Error::MalformedDiff { line: idx + 1 });
            }
            flush_hunk(&mut current, current_hunk.take());
            if let Some((old_start, old_count, new_start, new_count)) = parse_hunk_header(line) {
                current_hunk = Some(HunkBuilder {
                    old_start,
                    old_count,
                    new_start,
                    new_count,
                    raw: line.to_string(),
                    added_lines: Vec::new(),
                    removed_lines: Vec::new(),
                    old_line: old_start,
                    new_line: new_start,
                });
            }
            continue;
        }

        // Content lines only mean something inside an open hunk.
        if let Some(hunk) = current_hunk.as_mut() {
            hunk.raw.push('\n');
            hunk.raw.push_str(line);
            if let Some(content) = line.strip_prefix('+') {
                hunk.added_lines.push(DiffLine {
                    line_number: hunk.new_line,
                    content: content.to_string(),
                });
                hunk.new_line += 1;
                if let Some(file) = current.as_mut() {
                    file.lines_added += 1;
                }
            } else if let Some(content) = line.strip_prefix('-') {
                hunk.removed_lines.push(DiffLine {
                    line_number: hunk.old_line,
                    content: content.to_string(),
                });
                hunk.old_line += 1;
                if let Some(file) = current.as_mut() {
                    file.lines_removed += 1;
                }
            } else if line.starts_with('\\') {
                // "\ No newline at end of file" — not content.
            } else {
                // Context line: space-prefixed, or empty (a blank context line).
                hunk.old_line += 1;
                hunk.new_line += 1;
            }
        }
        // Otherwise: prelude line (index, mode headers not recognized, etc.) — skipped.
    }

    flush_hunk(&mut current, current_hunk.take());
    if let Some(file) = current.take() {
        files.push(file.finish());
    }

    Ok(ParsedDiff { files })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_DIFF: &str = "diff --git a/src/app.ts b/src/app.ts\n\
index e69de29..4b825dc 100644\n\
--- a/src/app.ts\n\
+++ b/src/app.ts\n\
@@ -10,3 +10,4 @@ function handler() {\n\
 const x = 1;\n\
 const y = 2;\n\
-const z = 3;\n\
+const z = 4;\n\
+const w = 5;\n";

    #[test]
    fn sample_diff_shape() {
        let parsed = parse_unified_diff(SAMPLE_DIFF).unwrap();
        assert_eq!(parsed.files.len(), 1);
        let file = &parsed.files[0];
        assert_eq!(file.kind, FileChangeKind::Modify);
        assert_eq!(file.lines_added, 2);
        assert_eq!(file.lines_removed, 1);
        assert_eq!(file.hunks.len(), 1);
        let hunk = &file.hunks[0];
        assert_eq!(hunk.old_start, 10);
        assert_eq!(hunk.new_start, 10);
        let added: Vec<u32> = hunk.added_lines.iter().map(|l| l.line_number).collect();
        assert_eq!(added, vec![12, 13]);
    }

    #[test]
    fn hunk_before_file_header_is_malformed() {
        let input = "@@ -1,1 +1,1 @@\n-a\n+b\n";
        let err = parse_unified_diff(input).unwrap_err();
        assert!(matches!(err, Error::MalformedDiff { line: 1 }));
    }

    #[test]
    fn add_file_has_no_old_path() {
        let input = "diff --git a/new.rs b/new.rs\n\
new file mode 100644\n\
--- /dev/null\n\
+++ b/new.rs\n\
@@ -0,0 +1,1 @@\n\
+hello\n";
        let parsed = parse_unified_diff(input).unwrap();
        let file = &parsed.files[0];
        assert_eq!(file.kind, FileChangeKind::Add);
        assert_eq!(file.old_path, None);
        assert_eq!(file.new_path.as_deref(), Some("new.rs"));
    }

    #[test]
    fn delete_file_has_no_new_path() {
        let input = "diff --git a/old.rs b/old.rs\n\
deleted file mode 100644\n\
--- a/old.rs\n\
+++ /dev/null\n\
@@ -1,1 +0,0 @@\n\
-bye\n";
        let parsed = parse_unified_diff(input).unwrap();
        let file = &parsed.files[0];
        assert_eq!(file.kind, FileChangeKind::Delete);
        assert_eq!(file.new_path, None);
    }

    #[test]
    fn rename_keeps_both_distinct_paths() {
        let input = "diff --git a/old_name.rs b/new_name.rs\n\
similarity index 100%\n\
rename from old_name.rs\n\
rename to new_name.rs\n";
        let parsed = parse_unified_diff(input).unwrap();
        let file = &parsed.files[0];
        assert_eq!(file.kind, FileChangeKind::Rename);
        assert_eq!(file.old_path.as_deref(), Some("old_name.rs"));
        assert_eq!(file.new_path.as_deref(), Some("new_name.rs"));
        assert_eq!(file.similarity, Some(100));
        assert!(file.check_invariants().is_ok());
    }

    #[test]
    fn binary_file_has_empty_hunks() {
        let input = "diff --git a/image.png b/image.png\n\
index 1111111..2222222 100644\n\
Binary files a/image.png and b/image.png differ\n";
        let parsed = parse_unified_diff(input).unwrap();
        let file = &parsed.files[0];
        assert!(file.is_binary);
        assert!(file.hunks.is_empty());
        assert!(file.check_invariants().is_ok());
    }

    #[test]
    fn multi_file_diff_preserves_order() {
        let input = "diff --git a/a.rs b/a.rs\n\
--- a/a.rs\n\
+++ b/a.rs\n\
@@ -1,1 +1,2 @@\n\
 a\n\
+b\n\
diff --git a/b.rs b/b.rs\n\
--- a/b.rs\n\
+++ b/b.rs\n\
@@ -1,1 +1,2 @@\n\
 a\n\
+b\n";
        let parsed = parse_unified_diff(input).unwrap();
        assert_eq!(parsed.files.len(), 2);
        assert_eq!(parsed.files[0].effective_path(), "a.rs");
        assert_eq!(parsed.files[1].effective_path(), "b.rs");
    }

    #[test]
    fn totals_match_sum_of_files() {
        let parsed = parse_unified_diff(SAMPLE_DIFF).unwrap();
        assert_eq!(
            parsed.total_lines_added(),
            parsed.files.iter().map(|f| f.lines_added as u64).sum::<u64>()
        );
        assert_eq!(
            parsed.total_lines_removed(),
            parsed.files.iter().map(|f| f.lines_removed as u64).sum::<u64>()
        );
    }

    #[test]
    fn empty_diff_is_empty() {
        let parsed = parse_unified_diff("").unwrap();
        assert!(parsed.is_empty());
    }
}
