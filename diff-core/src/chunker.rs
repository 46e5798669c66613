//! Chunker (C3): splits a set of diff files into LLM-sized chunks.

use review_types::{Chunk, DiffFile};

#[derive(Debug, Clone)]
pub struct ChunkConfig {
    pub max_tokens: usize,
    pub overlap_tokens: usize,
    pub max_files_per_chunk: usize,
    pub keep_files_together: bool,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_tokens: 6000,
            overlap_tokens: 0,
            max_files_per_chunk: 15,
            keep_files_together: true,
        }
    }
}

/// `ceil(chars/4)`, the spec's fixed token estimator.
fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(4)
}

fn render_file(file: &DiffFile) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "--- {}\n+++ {}\n",
        file.old_path.as_deref().unwrap_or("/dev/null"),
        file.new_path.as_deref().unwrap_or("/dev/null"),
    ));
    for hunk in &file.hunks {
        out.push_str(&hunk.raw);
        out.push('\n');
    }
    out
}

fn language_for(path: &str) -> Option<&'static str> {
    let ext = path.rsplit('.').next()?;
    Some(match ext {
        "rs" => "rust",
        "ts" | "tsx" => "typescript",
        "js" | "jsx" | "mjs" | "cjs" => "javascript",
        "py" => "python",
        "go" => "go",
        "java" => "java",
        "rb" => "ruby",
        "c" | "h" => "c",
        "cpp" | "cc" | "hpp" => "cpp",
        "cs" => "csharp",
        "php" => "php",
        "kt" | "kts" => "kotlin",
        "swift" => "swift",
        _ => return None,
    })
}

fn languages_of(files: &[DiffFile]) -> Vec<String> {
    let mut seen = Vec::new();
    for file in files {
        if let Some(lang) = language_for(file.effective_path()) {
            if !seen.iter().any(|l: &String| l == lang) {
                seen.push(lang.to_string());
            }
        }
    }
    seen
}

fn build_chunk(files: Vec<DiffFile>, estimated_tokens: usize) -> Chunk {
    let file_paths = files
        .iter()
        .map(|f| f.effective_path().to_string())
        .collect();
    let languages = languages_of(&files);
    let content = files
        .iter()
        .map(render_file)
        .collect::<Vec<_>>()
        .join("\n");
    Chunk {
        index: 0,
        total_chunks: 0,
        files,
        file_paths,
        content,
        estimated_tokens,
        languages,
    }
}

/// Splits `files` (already filtered to reviewable source) into chunks per
/// spec §4.3. File order is preserved and no file is ever split across
/// chunks, regardless of `keep_files_together` (the spec's current design
/// never splits a file either way).
pub fn chunk_files(files: Vec<DiffFile>, config: &ChunkConfig) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut batch: Vec<DiffFile> = Vec::new();
    let mut batch_tokens = 0usize;

    for file in files {
        let tokens = estimate_tokens(&render_file(&file));

        if tokens > config.max_tokens && !batch.is_empty() {
            chunks.push(build_chunk(std::mem::take(&mut batch), batch_tokens));
            batch_tokens = 0;
            // Oversized file gets its own chunk even though it exceeds the
            // budget — single-file overflow is permitted, not truncated.
            chunks.push(build_chunk(vec![file], tokens));
            continue;
        }

        let would_overflow_tokens = batch_tokens + tokens > config.max_tokens;
        let would_overflow_files = batch.len() + 1 > config.max_files_per_chunk;
        if !batch.is_empty() && (would_overflow_tokens || would_overflow_files) {
            chunks.push(build_chunk(std::mem::take(&mut batch), batch_tokens));
            batch_tokens = 0;
        }

        batch_tokens += tokens;
        batch.push(file);
    }

    if !batch.is_empty() {
        chunks.push(build_chunk(batch, batch_tokens));
    }

    let total = chunks.len();
    for (i, chunk) in chunks.iter_mut().enumerate() {
        chunk.index = i;
        chunk.total_chunks = total;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_unified_diff;

    fn file_with_body(path: &str, body_lines: usize) -> DiffFile {
        let mut added = String::new();
        for i in 0..body_lines {
            added.push_str(&format!("+line {i} of padding to fill tokens up nicely\n"));
        }
        let diff = format!(
            "diff --git a/{path} b/{path}\n--- a/{path}\n+++ b/{path}\n@@ -1,1 +1,{n} @@\n a\n{added}",
            n = body_lines + 1
        );
        parse_unified_diff(&diff).unwrap().files.remove(0)
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        let chunks = chunk_files(Vec::new(), &ChunkConfig::default());
        assert!(chunks.is_empty());
    }

    #[test]
    fn small_files_batch_into_one_chunk() {
        let files = vec![file_with_body("a.rs", 2), file_with_body("b.rs", 2)];
        let chunks = chunk_files(files, &ChunkConfig::default());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].file_paths, vec!["a.rs", "b.rs"]);
        assert_eq!(chunks[0].total_chunks, 1);
    }

    #[test]
    fn oversized_single_file_gets_its_own_chunk() {
        let config = ChunkConfig {
            max_tokens: 50,
            ..ChunkConfig::default()
        };
        let files = vec![file_with_body("small.rs", 1), file_with_body("huge.rs", 200)];
        let chunks = chunk_files(files, &config);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].file_paths, vec!["small.rs"]);
        assert_eq!(chunks[1].file_paths, vec!["huge.rs"]);
        assert!(chunks[1].estimated_tokens > config.max_tokens);
    }

    #[test]
    fn max_files_per_chunk_is_respected() {
        let config = ChunkConfig {
            max_files_per_chunk: 2,
            ..ChunkConfig::default()
        };
        let files = vec![
            file_with_body("a.rs", 1),
            file_with_body("b.rs", 1),
            file_with_body("c.rs", 1),
        ];
        let chunks = chunk_files(files, &config);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].files.len(), 2);
        assert_eq!(chunks[1].files.len(), 1);
    }

    #[test]
    fn chunk_set_partitions_file_order_exactly() {
        let config = ChunkConfig {
            max_files_per_chunk: 1,
            ..ChunkConfig::default()
        };
        let paths = vec!["a.rs", "b.rs", "c.rs"];
        let files = paths.iter().map(|p| file_with_body(p, 1)).collect();
        let chunks = chunk_files(files, &config);
        let flattened: Vec<String> = chunks
            .iter()
            .flat_map(|c| c.file_paths.clone())
            .collect();
        assert_eq!(flattened, paths);
    }

    #[test]
    fn indices_are_in_range_and_total_matches() {
        let config = ChunkConfig {
            max_files_per_chunk: 1,
            ..ChunkConfig::default()
        };
        let files = vec![file_with_body("a.rs", 1), file_with_body("b.rs", 1)];
        let chunks = chunk_files(files, &config);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert_eq!(chunk.total_chunks, chunks.len());
        }
    }
}
