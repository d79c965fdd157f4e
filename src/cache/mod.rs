//! Bounded in-memory tile metadata cache.
//!
//! Associative store from [`TileKey`] to decoded entity lists with LRU
//! eviction under an explicit entry capacity. At most one entry exists per
//! key. Only Ready entries are evictable: a Pending entry marks an
//! in-flight fetch and a Failed entry marks a tile that must never be
//! refetched without explicit invalidation, so cache pressure can neither
//! break request coalescing nor turn into an automatic retry.

mod stats;
mod types;

pub use stats::CacheStats;
pub use types::TileState;

use crate::coord::TileKey;
use crate::feature::Entity;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::debug;

/// Entry in the tile cache.
#[derive(Debug, Clone)]
struct CacheSlot {
    /// Tile lifecycle state
    state: TileState,
    /// Last access time for LRU eviction
    last_accessed: Instant,
    /// Number of times accessed
    access_count: u64,
}

impl CacheSlot {
    fn new(state: TileState) -> Self {
        Self {
            state,
            last_accessed: Instant::now(),
            access_count: 0,
        }
    }

    /// Update access time and increment access count.
    fn touch(&mut self) {
        self.last_accessed = Instant::now();
        self.access_count += 1;
    }
}

/// Tile metadata cache with LRU eviction.
///
/// Owned exclusively by the data origin; no other component mutates it.
pub struct MetaCache {
    /// Cache storage
    slots: Mutex<HashMap<TileKey, CacheSlot>>,
    /// Maximum number of resolved entries kept
    capacity: usize,
    /// Statistics
    stats: Mutex<CacheStats>,
}

impl MetaCache {
    /// Create a new cache with the given entry capacity.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of Ready tiles retained (Pending and
    ///   Failed entries do not count against it)
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            capacity,
            stats: Mutex::new(CacheStats::new()),
        }
    }

    /// Look up a tile's state, updating recency and statistics.
    ///
    /// Returns `None` when no entry exists for the key.
    pub fn get(&self, key: &TileKey) -> Option<TileState> {
        let mut slots = self.slots.lock().unwrap();
        let mut stats = self.stats.lock().unwrap();

        if let Some(slot) = slots.get_mut(key) {
            slot.touch();
            match &slot.state {
                TileState::Ready(_) => stats.record_hit(),
                TileState::Pending | TileState::Failed => stats.record_pending_hit(),
            }
            Some(slot.state.clone())
        } else {
            stats.record_miss();
            None
        }
    }

    /// Register a Pending entry for the key unless one already exists.
    ///
    /// Returns `true` if this call created the entry, meaning the caller now
    /// owns the single in-flight fetch for this tile. Returns `false` when
    /// any entry (Pending, Ready or Failed) is already present.
    pub fn try_insert_pending(&self, key: TileKey) -> bool {
        let mut slots = self.slots.lock().unwrap();
        if slots.contains_key(&key) {
            return false;
        }
        slots.insert(key, CacheSlot::new(TileState::Pending));
        self.stats.lock().unwrap().update_entry_count(slots.len());
        true
    }

    /// Transition the key's entry to Ready with the decoded entities.
    ///
    /// Replaces whatever entry exists (normally the Pending guard). Evicts
    /// least-recently-used resolved entries if the capacity is exceeded.
    pub fn complete(&self, key: TileKey, entities: Arc<Vec<Entity>>) {
        self.resolve(key, TileState::Ready(entities));
    }

    /// Transition the key's entry to Failed.
    ///
    /// The entry stays Failed until explicitly invalidated; lookups keep
    /// treating it as "no entities yet".
    pub fn fail(&self, key: TileKey) {
        self.resolve(key, TileState::Failed);
    }

    /// Remove the entry for a key, if any.
    ///
    /// The next request for the tile will start a fresh fetch. This is the
    /// only recovery path for a Failed tile.
    pub fn invalidate(&self, key: &TileKey) {
        let mut slots = self.slots.lock().unwrap();
        if slots.remove(key).is_some() {
            debug!(tile = %key, "Invalidated cache entry");
        }
        self.stats.lock().unwrap().update_entry_count(slots.len());
    }

    /// Remove every entry.
    pub fn clear(&self) {
        let mut slots = self.slots.lock().unwrap();
        slots.clear();
        self.stats.lock().unwrap().update_entry_count(0);
    }

    /// Current number of entries, Pending included.
    pub fn entry_count(&self) -> usize {
        self.slots.lock().unwrap().len()
    }

    /// Snapshot of the cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.stats.lock().unwrap().clone()
    }

    fn resolve(&self, key: TileKey, state: TileState) {
        let mut slots = self.slots.lock().unwrap();
        slots.insert(key, CacheSlot::new(state));
        let evicted = Self::evict_over_capacity(&mut slots, self.capacity);

        let mut stats = self.stats.lock().unwrap();
        if evicted > 0 {
            stats.record_evictions(evicted, slots.len());
        } else {
            stats.update_entry_count(slots.len());
        }
    }

    /// Evict least-recently-used Ready entries until their number fits the
    /// capacity. Pending entries are the in-flight coalescing guard and
    /// Failed entries are the no-retry marker; evicting either would let a
    /// later lookup start a fetch that must not happen, so only Ready
    /// entries are candidates.
    fn evict_over_capacity(slots: &mut HashMap<TileKey, CacheSlot>, capacity: usize) -> u64 {
        let ready = slots.values().filter(|s| s.state.is_ready()).count();
        if ready <= capacity {
            return 0;
        }

        let mut candidates: Vec<(TileKey, Instant)> = slots
            .iter()
            .filter(|(_, slot)| slot.state.is_ready())
            .map(|(key, slot)| (*key, slot.last_accessed))
            .collect();
        candidates.sort_by_key(|(_, accessed)| *accessed);

        let mut evicted = 0u64;
        for (key, _) in candidates.into_iter().take(ready - capacity) {
            slots.remove(&key);
            evicted += 1;
            debug!(tile = %key, "Evicted least-recently-used tile");
        }
        evicted
    }
}
