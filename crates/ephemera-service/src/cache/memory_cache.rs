//! In-process image cache.

use super::ImageCache;
use async_trait::async_trait;
use ephemera_core::{EphemeraResult, ImageRecord};
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};
use tracing::debug;

struct CachedImage {
    record: ImageRecord,
    inserted_at: Instant,
}

#[derive(Default)]
struct Entries {
    map: HashMap<String, CachedImage>,
    /// Insertion order, oldest first. Holds exactly the keys of `map`.
    order: VecDeque<String>,
}

impl Entries {
    fn remove(&mut self, id: &str) -> bool {
        if self.map.remove(id).is_some() {
            self.order.retain(|k| k != id);
            true
        } else {
            false
        }
    }
}

/// Bounded in-process cache.
///
/// Evicts the oldest insertion once `max_entries` is reached and drops
/// entries older than the optional entry TTL on access. Contents are lost
/// when the process exits.
pub struct MemoryImageCache {
    entries: RwLock<Entries>,
    max_entries: usize,
    entry_ttl: Option<Duration>,
}

impl MemoryImageCache {
    /// Create a cache holding at most `max_entries` images.
    #[must_use]
    pub fn new(max_entries: usize, entry_ttl: Option<Duration>) -> Self {
        Self {
            entries: RwLock::new(Entries::default()),
            max_entries: max_entries.max(1),
            entry_ttl,
        }
    }

    /// Number of cached images.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_stale(&self, entry: &CachedImage) -> bool {
        self.entry_ttl
            .is_some_and(|ttl| entry.inserted_at.elapsed() >= ttl)
    }
}

#[async_trait]
impl ImageCache for MemoryImageCache {
    async fn get(&self, id: &str) -> EphemeraResult<Option<ImageRecord>> {
        {
            let entries = self.entries.read();
            match entries.map.get(id) {
                Some(entry) if !self.is_stale(entry) => return Ok(Some(entry.record.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Stale entry: evict it as the tier would on its own.
        self.entries.write().remove(id);
        debug!(id = %id, "Evicted stale in-memory cache entry");
        Ok(None)
    }

    async fn set(&self, id: &str, record: &ImageRecord) -> EphemeraResult<()> {
        let mut entries = self.entries.write();

        if let Some(existing) = entries.map.get_mut(id) {
            existing.record = record.clone();
            existing.inserted_at = Instant::now();
            return Ok(());
        }

        while entries.map.len() >= self.max_entries {
            let Some(oldest) = entries.order.pop_front() else {
                break;
            };
            entries.map.remove(&oldest);
            debug!(id = %oldest, "Evicted oldest in-memory cache entry");
        }

        entries.map.insert(
            id.to_string(),
            CachedImage {
                record: record.clone(),
                inserted_at: Instant::now(),
            },
        );
        entries.order.push_back(id.to_string());
        Ok(())
    }

    async fn delete(&self, id: &str) -> EphemeraResult<bool> {
        Ok(self.entries.write().remove(id))
    }

    fn is_enabled(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};

    fn record(id: &str) -> ImageRecord {
        ImageRecord::new(id, id.as_bytes().to_vec(), Utc::now(), ChronoDuration::minutes(5))
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = MemoryImageCache::new(8, None);
        cache.set("a", &record("a")).await.unwrap();

        let found = cache.get("a").await.unwrap().unwrap();
        assert_eq!(found.payload, b"a");
        assert!(cache.get("b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_reports_presence() {
        let cache = MemoryImageCache::new(8, None);
        cache.set("a", &record("a")).await.unwrap();

        assert!(cache.delete("a").await.unwrap());
        assert!(!cache.delete("a").await.unwrap());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_evicts_oldest_when_full() {
        let cache = MemoryImageCache::new(2, None);
        cache.set("first", &record("first")).await.unwrap();
        cache.set("second", &record("second")).await.unwrap();
        cache.set("third", &record("third")).await.unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.get("first").await.unwrap().is_none());
        assert!(cache.get("second").await.unwrap().is_some());
        assert!(cache.get("third").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_overwrite_does_not_evict() {
        let cache = MemoryImageCache::new(2, None);
        cache.set("a", &record("a")).await.unwrap();
        cache.set("b", &record("b")).await.unwrap();
        cache.set("a", &record("b")).await.unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a").await.unwrap().unwrap().payload, b"b");
    }

    #[tokio::test]
    async fn test_delete_then_fill_keeps_order_consistent() {
        let cache = MemoryImageCache::new(2, None);
        cache.set("a", &record("a")).await.unwrap();
        cache.delete("a").await.unwrap();
        cache.set("b", &record("b")).await.unwrap();
        cache.set("c", &record("c")).await.unwrap();

        assert_eq!(cache.len(), 2);
        assert!(cache.get("b").await.unwrap().is_some());
        assert!(cache.get("c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_entry_ttl_drops_stale_entries() {
        let cache = MemoryImageCache::new(8, Some(Duration::ZERO));
        cache.set("a", &record("a")).await.unwrap();

        assert!(cache.get("a").await.unwrap().is_none());
        assert!(cache.is_empty());
    }
}
