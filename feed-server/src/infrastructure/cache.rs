use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::infrastructure::clock::Clock;

/// Rendered-output cache with per-entry time to live.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn put(&self, key: &str, value: String, ttl: Duration);
    /// Drops every entry regardless of age.
    async fn clear(&self);
}

/// Returns the cached value for `key`, or runs `compute`, stores its output
/// for `ttl` and returns it. Failed computations are not cached.
pub async fn get_or_compute<F, Fut, E>(
    cache: &dyn ResponseCache,
    key: &str,
    ttl: Duration,
    compute: F,
) -> Result<String, E>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<String, E>>,
{
    if let Some(hit) = cache.get(key).await {
        debug!(cache_key = key, "response cache hit");
        return Ok(hit);
    }

    debug!(cache_key = key, "response cache miss");
    let value = compute().await?;
    cache.put(key, value.clone(), ttl).await;
    Ok(value)
}

struct CachedEntry {
    value: String,
    expires_at: DateTime<Utc>,
}

pub struct TtlCache {
    entries: RwLock<HashMap<String, CachedEntry>>,
    clock: Arc<dyn Clock>,
}

impl TtlCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl ResponseCache for TtlCache {
    async fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now();
        {
            let guard = self.entries.read().await;
            match guard.get(key) {
                None => return None,
                Some(entry) if entry.expires_at > now => return Some(entry.value.clone()),
                Some(_) => {}
            }
        }

        let mut guard = self.entries.write().await;
        // another request may have refreshed it between the two locks
        if guard.get(key).is_some_and(|entry| entry.expires_at <= now) {
            guard.remove(key);
            debug!(cache_key = key, "response cache entry expired");
            return None;
        }
        guard.get(key).map(|entry| entry.value.clone())
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) {
        let expires_at = self.clock.now() + ttl;
        let mut guard = self.entries.write().await;
        guard.insert(key.to_string(), CachedEntry { value, expires_at });
    }

    async fn clear(&self) {
        let mut guard = self.entries.write().await;
        guard.clear();
        debug!("response cache cleared");
    }
}
