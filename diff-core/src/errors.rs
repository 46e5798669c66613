//! Error hierarchy for `diff-core`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A hunk header (`@@ ... @@`) appeared before any file header. This is
    /// the only diff malformation the parser refuses to tolerate.
    #[error("malformed diff: hunk appeared before any file header (line {line})")]
    MalformedDiff { line: usize },

    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },
}
