//! Process-local TTL caches for read-heavy catalogue lookups.
//!
//! Instances are created at startup and carried in `AppState`; tests build
//! them with [`CatalogueCache::disabled`] to read straight through.

use std::{
    hash::Hash,
    sync::Arc,
    time::{Duration, Instant},
};

use dashmap::DashMap;
use uuid::Uuid;

use crate::models::{Branch, Client, Fabric, ItemMaster};

pub struct TtlCache<K, V> {
    entries: DashMap<K, (Instant, V)>,
    ttl: Option<Duration>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Some(ttl),
        }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self {
            entries: DashMap::new(),
            ttl: None,
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let ttl = self.ttl?;
        let hit = self.entries.get(key).and_then(|entry| {
            let (stored_at, value) = entry.value();
            (stored_at.elapsed() < ttl).then(|| value.clone())
        });
        if hit.is_none() {
            self.evict_expired(key, ttl);
        }
        hit
    }

    // Re-checks the age under the shard lock so a concurrent fresh insert survives.
    fn evict_expired(&self, key: &K, ttl: Duration) {
        self.entries
            .remove_if(key, |_, (stored_at, _)| stored_at.elapsed() >= ttl);
    }

    pub fn insert(&self, key: K, value: V) {
        if self.ttl.is_some() {
            self.entries.insert(key, (Instant::now(), value));
        }
    }

    pub fn invalidate(&self, key: &K) {
        self.entries.remove(key);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct CatalogueCaches {
    items: TtlCache<Uuid, ItemMaster>,
    fabrics: TtlCache<Uuid, Fabric>,
    branches: TtlCache<Uuid, Branch>,
    clients: TtlCache<Uuid, Client>,
}

#[derive(Clone)]
pub struct CatalogueCache {
    inner: Arc<CatalogueCaches>,
}

impl CatalogueCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(CatalogueCaches {
                items: TtlCache::new(ttl),
                fabrics: TtlCache::new(ttl),
                branches: TtlCache::new(ttl),
                clients: TtlCache::new(ttl),
            }),
        }
    }

    pub fn disabled() -> Self {
        Self {
            inner: Arc::new(CatalogueCaches {
                items: TtlCache::disabled(),
                fabrics: TtlCache::disabled(),
                branches: TtlCache::disabled(),
                clients: TtlCache::disabled(),
            }),
        }
    }

    pub fn items(&self) -> &TtlCache<Uuid, ItemMaster> {
        &self.inner.items
    }

    pub fn fabrics(&self) -> &TtlCache<Uuid, Fabric> {
        &self.inner.fabrics
    }

    pub fn branches(&self) -> &TtlCache<Uuid, Branch> {
        &self.inner.branches
    }

    pub fn clients(&self) -> &TtlCache<Uuid, Client> {
        &self.inner.clients
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eviction_spares_an_entry_refreshed_after_the_miss() {
        let cache = TtlCache::new(Duration::from_millis(20));
        cache.insert(1u32, "stale");
        std::thread::sleep(Duration::from_millis(30));

        // Another task stores a fresh value between the miss and the eviction.
        cache.insert(1u32, "fresh");
        cache.evict_expired(&1, Duration::from_millis(20));
        assert_eq!(cache.get(&1), Some("fresh"));

        std::thread::sleep(Duration::from_millis(30));
        assert_eq!(cache.get(&1), None);
        assert!(cache.is_empty());
    }
}
