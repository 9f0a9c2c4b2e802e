use crate::domain::pulse::PulseResult;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Default freshness window for a cached result.
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

/// Time-bounded memo keyed by normalized ticker. Implementations decide their
/// own freshness rules; callers only see hit or miss.
#[async_trait::async_trait]
pub trait PulseCache: Send + Sync {
    async fn lookup(&self, key: &str) -> Option<PulseResult>;
    async fn store(&self, key: &str, value: PulseResult);
}

#[derive(Debug)]
struct CacheEntry {
    computed_at: Instant,
    value: PulseResult,
}

/// Process-wide in-memory cache. Stale entries are ignored on lookup rather
/// than purged, and there is no capacity bound; concurrent writers to the
/// same key are a benign last-write-wins race.
#[derive(Debug)]
pub struct InMemoryPulseCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl InMemoryPulseCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryPulseCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PulseCache for InMemoryPulseCache {
    async fn lookup(&self, key: &str) -> Option<PulseResult> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.computed_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.value.clone())
    }

    async fn store(&self, key: &str, value: PulseResult) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                computed_at: Instant::now(),
                value,
            },
        );
    }
}
