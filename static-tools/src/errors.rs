//! Error hierarchy for `static-tools`.
//!
//! Per spec §4.4/§7, a tool that fails to run (missing binary, timeout,
//! unparseable output) is never fatal to the orchestrator — callers
//! observe these as a `ToolResult{success:false}`, not an `Err`. This
//! `Error` type exists only for the narrow internal plumbing (spawning,
//! I/O) that genuinely has nowhere better to go.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error spawning {tool}: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },
}
