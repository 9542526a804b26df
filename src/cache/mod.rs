//! In-process TTL cache for fully materialized responses.
//!
//! Values are stored behind `Arc` and handed back as-is on a hit, so a
//! cached response is shared frozen between requests and must never be
//! mutated. Expired entries are dropped lazily on probe; when the map grows
//! past its capacity the least-recently-used entry is evicted.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

struct CacheEntry<V> {
    value: Arc<V>,
    expires_at: Instant,
    last_access: u64,
}

/// TTL + LRU-capped map. All operations take the internal lock briefly;
/// no I/O or user code runs under it.
pub struct ResponseCache<K, V> {
    ttl: Duration,
    capacity: usize,
    inner: Mutex<CacheInner<K, V>>,
}

struct CacheInner<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    access_counter: u64,
}

impl<K: Eq + Hash + Clone, V> ResponseCache<K, V> {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                access_counter: 0,
            }),
        }
    }

    /// Look up a live entry. An expired entry is removed and reported as a
    /// miss.
    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        let mut inner = self.inner.lock().unwrap();
        let now = Instant::now();

        let expired = match inner.entries.get(key) {
            Some(entry) => entry.expires_at <= now,
            None => return None,
        };
        if expired {
            inner.entries.remove(key);
            return None;
        }

        inner.access_counter += 1;
        let counter = inner.access_counter;
        let entry = inner.entries.get_mut(key).unwrap();
        entry.last_access = counter;
        Some(entry.value.clone())
    }

    /// Insert a value, resetting the TTL for an existing key. Evicts the
    /// least-recently-used entry when over capacity.
    pub fn put(&self, key: K, value: Arc<V>) {
        let mut inner = self.inner.lock().unwrap();
        let now = Instant::now();

        inner.access_counter += 1;
        let counter = inner.access_counter;
        let expires_at = now + self.ttl;
        inner.entries.insert(
            key,
            CacheEntry {
                value,
                expires_at,
                last_access: counter,
            },
        );

        if inner.entries.len() > self.capacity {
            // Drop expired entries first; fall back to LRU.
            inner.entries.retain(|_, e| e.expires_at > now);
            while inner.entries.len() > self.capacity {
                let oldest = inner
                    .entries
                    .iter()
                    .min_by_key(|(_, e)| e.last_access)
                    .map(|(k, _)| k.clone());
                match oldest {
                    Some(k) => inner.entries.remove(&k),
                    None => break,
                };
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
