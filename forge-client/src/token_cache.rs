//! Process-wide installation-token cache (spec §5/§9): the only
//! cross-job shared mutable state in the system. A single mapping keyed
//! by installation id, safe under concurrent access, with entries
//! replaceable atomically.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// A concurrency-safe mapping primitive, per spec §9's recommendation —
/// reads vastly outnumber writes (one mint per ~hour per installation),
/// so a `RwLock` over a plain map is the idiomatic choice over a channel
/// or actor.
#[derive(Debug, Default)]
pub struct InstallationTokenCache {
    entries: RwLock<HashMap<u64, CachedToken>>,
}

impl InstallationTokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a cached token only if it has at least 60s of remaining
    /// life (spec §5: "expiry >= now + 60s are returned").
    pub fn get(&self, installation_id: u64, now: DateTime<Utc>) -> Option<String> {
        let entries = self.entries.read().unwrap();
        entries.get(&installation_id).and_then(|cached| {
            if cached.expires_at >= now + chrono::Duration::seconds(60) {
                Some(cached.token.clone())
            } else {
                None
            }
        })
    }

    /// Replaces (or inserts) the cached token for an installation.
    pub fn put(&self, installation_id: u64, token: String, expires_at: DateTime<Utc>) {
        let mut entries = self.entries.write().unwrap();
        entries.insert(installation_id, CachedToken { token, expires_at });
    }

    /// Number of installations with a cached entry (including stale ones
    /// not yet evicted), for `GET /health`.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_is_returned() {
        let cache = InstallationTokenCache::new();
        let now = Utc::now();
        cache.put(1, "tok".into(), now + chrono::Duration::seconds(600));
        assert_eq!(cache.get(1, now), Some("tok".to_string()));
    }

    #[test]
    fn token_expiring_within_60s_is_not_returned() {
        let cache = InstallationTokenCache::new();
        let now = Utc::now();
        cache.put(1, "tok".into(), now + chrono::Duration::seconds(30));
        assert_eq!(cache.get(1, now), None);
    }

    #[test]
    fn unknown_installation_returns_none() {
        let cache = InstallationTokenCache::new();
        assert_eq!(cache.get(42, Utc::now()), None);
    }

    #[test]
    fn put_replaces_existing_entry_atomically() {
        let cache = InstallationTokenCache::new();
        let now = Utc::now();
        cache.put(1, "old".into(), now + chrono::Duration::seconds(600));
        cache.put(1, "new".into(), now + chrono::Duration::seconds(600));
        assert_eq!(cache.get(1, now), Some("new".to_string()));
    }
}
