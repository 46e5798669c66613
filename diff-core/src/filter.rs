//! File filter & categorizer (C2).
//!
//! Partitions diff files into {reviewable source, dependency manifest
//! (lockfile), excluded}, using glob matching for configurable and
//! built-in exclude/include rules.

use crate::errors::{Error, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use review_types::DiffFile;

/// Lockfiles are routed to their own partition rather than excluded, so
/// they remain available to the vulnerability scanner (spec §4.2).
const LOCKFILES: &[&str] = &[
    "package-lock.json",
    "pnpm-lock.yaml",
    "yarn.lock",
    "poetry.lock",
    "Pipfile.lock",
    "go.sum",
    "Cargo.lock",
    "Gemfile.lock",
    "composer.lock",
];

const BUILTIN_EXCLUDES: &[&str] = &[
    "**/node_modules/**",
    "**/vendor/**",
    "**/third_party/**",
    "**/dist/**",
    "**/build/**",
    "**/target/**",
    "**/.git/**",
    "**/.idea/**",
    "**/.vscode/**",
    "**/*.min.js",
    "**/*.min.css",
    "**/*.generated.*",
    "**/*.pb.go",
    "**/*.g.dart",
    "**/CHANGELOG*",
    "**/*.png",
    "**/*.jpg",
    "**/*.jpeg",
    "**/*.gif",
    "**/*.ico",
    "**/*.svg",
    "**/*.woff",
    "**/*.woff2",
    "**/*.ttf",
    "**/*.eot",
    "**/*.pdf",
    "**/*.zip",
    "**/*.tar.gz",
];

/// Why a file was excluded from review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExcludeReason {
    Pattern(String),
    Binary,
    TooLarge,
}

/// Partition a [`DiffFile`] is routed into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileCategory {
    /// Reviewable source, eligible for static analysis, chunking, and the LLM.
    Source,
    /// A dependency manifest/lockfile, eligible only for vulnerability scanning.
    Lockfile,
    /// Excluded from every downstream stage.
    Excluded(ExcludeReason),
}

#[derive(Debug, Clone)]
pub struct FilterConfig {
    pub include_patterns: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub skip_binary: bool,
    pub max_lines: u32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
            skip_binary: true,
            max_lines: 2000,
        }
    }
}

pub struct DiffFilter {
    include_set: Option<GlobSet>,
    exclude_set: GlobSet,
    skip_binary: bool,
    max_lines: u32,
}

/// A pattern not anchored with a leading `**` or `/` may match at any path
/// segment boundary (spec §4.2) — rewritten here as an implicit `**/`
/// prefix so e.g. `*.min.js` matches both `a.min.js` and `dir/a.min.js`.
/// Built-in excludes already carry an explicit `**/` prefix, so this is a
/// no-op for them.
fn anchor_pattern(pattern: &str) -> String {
    if pattern.starts_with("**") || pattern.starts_with('/') {
        pattern.to_string()
    } else {
        format!("**/{pattern}")
    }
}

fn build_set(patterns: impl Iterator<Item = impl AsRef<str>>) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let anchored = anchor_pattern(pattern);
        // `*` must not cross `/` (spec §4.2: "`*` matches any non-`/` run;
        // `**` matches any run including `/`") — only `literal_separator`
        // keeps those distinct in globset.
        let glob = GlobBuilder::new(&anchored)
            .case_insensitive(true)
            .literal_separator(true)
            .build()
            .map_err(|source| Error::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| Error::InvalidPattern {
        pattern: "<set>".to_string(),
        source,
    })
}

impl DiffFilter {
    pub fn new(config: &FilterConfig) -> Result<Self> {
        let include_set = if config.include_patterns.is_empty() {
            None
        } else {
            Some(build_set(config.include_patterns.iter())?)
        };
        let exclude_set = build_set(
            BUILTIN_EXCLUDES
                .iter()
                .map(|s| s.to_string())
                .chain(config.exclude_patterns.iter().cloned()),
        )?;
        Ok(Self {
            include_set,
            exclude_set,
            skip_binary: config.skip_binary,
            max_lines: config.max_lines,
        })
    }

    pub fn default_filter() -> Self {
        Self::new(&FilterConfig::default()).expect("built-in patterns are always valid")
    }

    pub fn categorize(&self, file: &DiffFile) -> FileCategory {
        let path = file.effective_path();
        let file_name = path.rsplit('/').next().unwrap_or(path);

        if LOCKFILES.contains(&file_name) {
            return FileCategory::Lockfile;
        }

        if let Some(includes) = &self.include_set {
            if includes.is_match(path) {
                return FileCategory::Source;
            }
        }

        if self.skip_binary && file.is_binary {
            return FileCategory::Excluded(ExcludeReason::Binary);
        }

        let changed = file.lines_added + file.lines_removed;
        if changed > self.max_lines {
            return FileCategory::Excluded(ExcludeReason::TooLarge);
        }

        if self.exclude_set.is_match(path) {
            return FileCategory::Excluded(ExcludeReason::Pattern(path.to_string()));
        }

        FileCategory::Source
    }

    /// Splits a whole diff into its three partitions, preserving order
    /// within each.
    pub fn partition(&self, files: Vec<DiffFile>) -> Partitioned {
        let mut source = Vec::new();
        let mut lockfiles = Vec::new();
        let mut excluded = Vec::new();

        for file in files {
            match self.categorize(&file) {
                FileCategory::Source => source.push(file),
                FileCategory::Lockfile => lockfiles.push(file),
                FileCategory::Excluded(reason) => excluded.push((file, reason)),
            }
        }

        Partitioned {
            source,
            lockfiles,
            excluded,
        }
    }
}

pub struct Partitioned {
    pub source: Vec<DiffFile>,
    pub lockfiles: Vec<DiffFile>,
    pub excluded: Vec<(DiffFile, ExcludeReason)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_unified_diff;

    fn diff_for(path: &str) -> DiffFile {
        let diff = format!(
            "diff --git a/{path} b/{path}\n--- a/{path}\n+++ b/{path}\n@@ -1,1 +1,2 @@\n a\n+b\n"
        );
        parse_unified_diff(&diff).unwrap().files.remove(0)
    }

    #[test]
    fn lockfiles_routed_to_lockfile_partition() {
        let filter = DiffFilter::default_filter();
        for name in LOCKFILES {
            assert_eq!(
                filter.categorize(&diff_for(name)),
                FileCategory::Lockfile,
                "{name} should be a lockfile"
            );
        }
    }

    #[test]
    fn node_modules_excluded() {
        let filter = DiffFilter::default_filter();
        assert!(matches!(
            filter.categorize(&diff_for("node_modules/pkg/index.js")),
            FileCategory::Excluded(ExcludeReason::Pattern(_))
        ));
    }

    #[test]
    fn normal_source_kept() {
        let filter = DiffFilter::default_filter();
        assert_eq!(
            filter.categorize(&diff_for("src/main.rs")),
            FileCategory::Source
        );
    }

    #[test]
    fn include_overrides_exclude() {
        let config = FilterConfig {
            include_patterns: vec!["**/vendor/keep.rs".into()],
            ..FilterConfig::default()
        };
        let filter = DiffFilter::new(&config).unwrap();
        assert_eq!(
            filter.categorize(&diff_for("vendor/keep.rs")),
            FileCategory::Source
        );
        // A sibling vendor file without an include match stays excluded.
        assert!(matches!(
            filter.categorize(&diff_for("vendor/other.rs")),
            FileCategory::Excluded(_)
        ));
    }

    #[test]
    fn too_large_file_excluded() {
        let config = FilterConfig {
            max_lines: 1,
            ..FilterConfig::default()
        };
        let filter = DiffFilter::new(&config).unwrap();
        assert!(matches!(
            filter.categorize(&diff_for("src/big.rs")),
            FileCategory::Excluded(ExcludeReason::TooLarge)
        ));
    }

    #[test]
    fn case_insensitive_matching() {
        let filter = DiffFilter::default_filter();
        assert!(matches!(
            filter.categorize(&diff_for("NODE_MODULES/pkg/index.js")),
            FileCategory::Excluded(_)
        ));
    }

    #[test]
    fn single_star_does_not_cross_path_separator() {
        let config = FilterConfig {
            exclude_patterns: vec!["src/*.rs".into()],
            ..FilterConfig::default()
        };
        let filter = DiffFilter::new(&config).unwrap();
        // `*` must not match across `/`, so `src/*.rs` excludes `src/a.rs`...
        assert!(matches!(
            filter.categorize(&diff_for("src/a.rs")),
            FileCategory::Excluded(ExcludeReason::Pattern(_))
        ));
        // ...but not `src/a/b.rs`, which would require `**`.
        assert_eq!(
            filter.categorize(&diff_for("src/a/b.rs")),
            FileCategory::Source
        );
    }

    #[test]
    fn unanchored_exclude_matches_at_any_path_depth() {
        let config = FilterConfig {
            exclude_patterns: vec!["*.min.js".into()],
            ..FilterConfig::default()
        };
        let filter = DiffFilter::new(&config).unwrap();
        assert!(matches!(
            filter.categorize(&diff_for("a.min.js")),
            FileCategory::Excluded(_)
        ));
        assert!(matches!(
            filter.categorize(&diff_for("dir/nested/a.min.js")),
            FileCategory::Excluded(_)
        ));
    }
}
