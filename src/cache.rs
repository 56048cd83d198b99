//! Cache adapter for translation snapshots.
//!
//! Entries are keyed by `{table}_{lang}[_{scope}]` and expire after a TTL
//! given in minutes. There is no invalidation protocol beyond TTL expiry:
//! a newly auto-saved key will not appear in a warm cache until the TTL
//! lapses. `forget` exists for deploy-time busting only.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Translation snapshot: key → value for one (locale, scope) pair.
pub type Snapshot = HashMap<String, String>;

/// Build the cache key for a (table, lang, scope) triple.
pub fn cache_key(table: &str, lang: &str, scope: Option<&str>) -> String {
    match scope {
        Some(scope) => format!("{}_{}_{}", table, lang, scope),
        None => format!("{}_{}", table, lang),
    }
}

/// Keyed snapshot cache with minute-granularity TTL.
///
/// Implementations are shared, externally concurrent resources; duplicate
/// population from concurrent requests is tolerated (values are
/// deterministic, last writer wins).
pub trait TextCache: Send + Sync {
    /// Whether a live (non-expired) entry exists for the key.
    fn has(&self, key: &str) -> bool;

    /// Get the snapshot for the key, if present and not expired.
    fn get(&self, key: &str) -> Option<Snapshot>;

    /// Store a snapshot under the key with the given TTL in minutes.
    fn put(&self, key: &str, texts: Snapshot, ttl_minutes: u64);

    /// Drop the entry for the key, if any.
    fn forget(&self, key: &str);
}

/// In-process `TextCache` backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (Instant, Snapshot)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TextCache for MemoryCache {
    fn has(&self, key: &str) -> bool {
        let entries = self.entries.lock().unwrap();
        entries
            .get(key)
            .map(|(deadline, _)| Instant::now() < *deadline)
            .unwrap_or(false)
    }

    fn get(&self, key: &str) -> Option<Snapshot> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some((deadline, texts)) if Instant::now() < *deadline => Some(texts.clone()),
            Some(_) => {
                // Expired: drop lazily on access
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn put(&self, key: &str, texts: Snapshot, ttl_minutes: u64) {
        let deadline = Instant::now() + Duration::from_secs(ttl_minutes * 60);
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key.to_string(), (deadline, texts));
    }

    fn forget(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap();
        entries.remove(key);
    }
}
