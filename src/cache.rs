use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// In-memory key-value cache with per-entry TTL.
///
/// Expiry is lazy: an expired entry is removed by the next `get` that finds
/// it. There is no eviction beyond TTL; the cache lives as long as the
/// process and is shared via `Arc`.
#[derive(Clone)]
pub struct Cache<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<HashMap<K, CacheEntry<V>>>>,
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let mut cache = self.inner.lock().await;
        match cache.get(key) {
            Some(entry) if entry.expires_at <= Instant::now() => {
                debug!("Cache EXPIRED");
                cache.remove(key);
                None
            }
            Some(entry) => {
                debug!("Cache HIT");
                Some(entry.value.clone())
            }
            None => {
                debug!("Cache MISS");
                None
            }
        }
    }

    /// Inserts a value, replacing any existing entry and restarting its TTL.
    pub async fn put(&self, key: K, value: V, ttl: Duration) {
        let mut cache = self.inner.lock().await;
        debug!("Cache PUT");
        cache.insert(
            key,
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    pub async fn clear(&self) {
        let mut cache = self.inner.lock().await;
        debug!("Cache CLEAR");
        cache.clear();
    }
}

impl<K, V> Default for Cache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}
