use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

pub struct Cache<K, V> {
    inner: LruCache<K, V>,
}

impl<K: std::hash::Hash + Eq, V> Cache<K, V> {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Cache {
            inner: LruCache::new(capacity),
        }
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        self.inner.get(key)
    }

    pub fn insert(&mut self, key: K, value: V) {
        self.inner.put(key, value);
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.inner.pop(key)
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// A rendered page kept by the page cache
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPage {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone)]
struct CacheEntry {
    page: CachedPage,
    inserted_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self) -> bool {
        self.inserted_at.elapsed() >= self.ttl
    }
}

/// Whole-page cache: entries expire after their TTL and the least recently
/// used entry is evicted once capacity is reached.
pub struct PageCache {
    entries: Mutex<Cache<String, CacheEntry>>,
}

impl PageCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Cache::new(capacity)),
        }
    }

    pub async fn get(&self, key: &str) -> Option<CachedPage> {
        let mut entries = self.entries.lock().await;
        let key = key.to_string();
        let expired = match entries.get(&key) {
            Some(entry) if !entry.is_expired() => return Some(entry.page.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            debug!("Page cache entry {} expired", key);
            entries.remove(&key);
        }
        None
    }

    pub async fn insert(&self, key: impl Into<String>, page: CachedPage, ttl: Duration) {
        let entry = CacheEntry {
            page,
            inserted_at: Instant::now(),
            ttl,
        };
        self.entries.lock().await.insert(key.into(), entry);
    }

    /// Drop every cached page
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}
