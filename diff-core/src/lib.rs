//! Diff parsing, filtering, and chunking (C1–C3).
//!
//! This crate turns raw unified-diff text into the LLM-sized, categorized
//! work plan the rest of the review pipeline consumes. It owns no network
//! or process I/O — just text in, structured [`review_types`] out.

pub mod chunker;
pub mod errors;
pub mod filter;
pub mod parser;

pub use chunker::{chunk_files, ChunkConfig};
pub use errors::{Error, Result};
pub use filter::{DiffFilter, ExcludeReason, FileCategory, FilterConfig, Partitioned};
pub use parser::parse_unified_diff;
