//! Error hierarchy for `vuln-scan`.
//!
//! Network failures against the vulnerability DB are never fatal (spec
//! §4.5/§7): callers see an empty result, not an `Err`. This type covers
//! only the manifest-parsing failures that are worth distinguishing.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse {manifest} as JSON: {source}")]
    Json {
        manifest: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
