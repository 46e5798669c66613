//! The `ForgeClient` capability (spec §6 "Source-control REST (consumed)"):
//! GitHub REST API access, app-JWT installation-token minting, and the
//! process-wide token cache (spec §3/§5/§9).

pub mod client;
pub mod errors;
pub mod jwt;
pub mod token_cache;
pub mod types;

pub use client::ForgeClient;
pub use errors::{Error, Result};
pub use token_cache::InstallationTokenCache;
pub use types::*;
