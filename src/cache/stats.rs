//! Cache statistics tracking.

/// Counters for monitoring tile cache behavior.
///
/// Snapshot semantics: [`crate::cache::MetaCache::stats`] returns a clone of
/// the live counters.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Lookups that found a Ready entry
    pub hits: u64,
    /// Lookups that found no entry
    pub misses: u64,
    /// Lookups that found a Pending or Failed entry
    pub pending_hits: u64,
    /// Entries evicted under capacity pressure
    pub evictions: u64,
    /// Current number of entries
    pub entry_count: usize,
}

impl CacheStats {
    /// Create zeroed statistics.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_pending_hit(&mut self) {
        self.pending_hits += 1;
    }

    pub(crate) fn record_evictions(&mut self, count: u64, entry_count: usize) {
        self.evictions += count;
        self.entry_count = entry_count;
    }

    pub(crate) fn update_entry_count(&mut self, entry_count: usize) {
        self.entry_count = entry_count;
    }

    /// Hit ratio over resolved lookups (0.0 when none yet).
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
