//! Tile data origin: fetch + decode + cache.
//!
//! The single authority translating a tile coordinate into decoded
//! entities. Lookups never block: a Ready tile answers synchronously with
//! the shared entity list, an unknown tile registers a Pending entry,
//! spawns exactly one fetch task and answers with the Pending sentinel.
//! Callers re-test on a later pointer event or subscribe to the ready
//! broadcast and re-test when the tile lands.
//!
//! Coalescing: the Pending cache entry is the in-flight guard — a second
//! lookup for the same key before resolution attaches to it instead of
//! issuing a duplicate fetch. A failed fetch parks the entry in Failed,
//! which keeps answering like Pending forever; explicit invalidation is the
//! only retry path, so hover interaction degrades to "no entities" rather
//! than surfacing transport errors.

use crate::cache::{CacheStats, MetaCache, TileState};
use crate::config::MetaConfig;
use crate::coord::{self, TileCoord, TileError, TileKey};
use crate::feature::{self, Entity};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Capacity of the ready-notification channel. Lagging subscribers miss
/// notifications, not data; the next pointer event re-tests anyway.
const READY_CHANNEL_CAPACITY: usize = 64;

/// Errors from the network collaborator.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// Transport-level failure (connection, timeout, HTTP status)
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Network collaborator delivering raw tile payloads.
///
/// Implementations wrap whatever transport the embedding uses; the origin
/// only needs the raw bytes for one tile.
#[async_trait]
pub trait TileFetcher: Send + Sync {
    /// Fetches the raw metadata payload for one tile.
    ///
    /// The coordinate is already normalized (wrapped and validated).
    async fn fetch_tile(&self, coord: TileCoord) -> Result<Vec<u8>, FetchError>;

    /// Returns the fetcher's name for logging and identification.
    fn name(&self) -> &str;
}

/// Outcome of a non-blocking tile lookup.
#[derive(Debug, Clone)]
pub enum TileLookup {
    /// Decoded entities, shared with every caller for this entry.
    Ready(Arc<Vec<Entity>>),
    /// No entities available yet (absent, in flight, or failed).
    Pending,
}

impl TileLookup {
    /// Whether this lookup resolved to entities.
    pub fn is_ready(&self) -> bool {
        matches!(self, TileLookup::Ready(_))
    }
}

/// Fetch + decode + cache authority for tile metadata.
///
/// Must be used from within a tokio runtime; fetches run on spawned tasks.
pub struct Origin {
    cache: Arc<MetaCache>,
    fetcher: Arc<dyn TileFetcher>,
    config: MetaConfig,
    ready_tx: broadcast::Sender<TileKey>,
}

impl Origin {
    /// Create a new origin over the given fetcher.
    pub fn new(fetcher: Arc<dyn TileFetcher>, config: MetaConfig) -> Self {
        let (ready_tx, _) = broadcast::channel(READY_CHANNEL_CAPACITY);
        Self {
            cache: Arc::new(MetaCache::new(config.cache_capacity)),
            fetcher,
            config,
            ready_tx,
        }
    }

    /// Canonical cache key for a coordinate (wrapped and validated).
    pub fn tile_key(&self, coord: TileCoord) -> Result<TileKey, TileError> {
        coord::key_of(coord, self.config.min_zoom, self.config.max_zoom)
    }

    /// Non-blocking tile lookup.
    ///
    /// * Ready entry: returns the decoded entities synchronously — repeated
    ///   calls return the identical `Arc` without re-fetching.
    /// * No entry: registers Pending, spawns the single fetch for this key
    ///   and returns [`TileLookup::Pending`] immediately.
    /// * Pending or Failed entry: returns [`TileLookup::Pending`]; no
    ///   duplicate fetch, no automatic retry.
    ///
    /// # Errors
    ///
    /// `TileError` when the coordinate is outside the configured zoom
    /// bounds or the tile grid; rejected before any cache interaction.
    pub fn get_tile_data(&self, coord: TileCoord) -> Result<TileLookup, TileError> {
        let normalized = coord::normalize(coord, self.config.min_zoom, self.config.max_zoom)?;
        let key = coord::key_of(normalized, self.config.min_zoom, self.config.max_zoom)?;

        match self.cache.get(&key) {
            Some(TileState::Ready(entities)) => Ok(TileLookup::Ready(entities)),
            Some(TileState::Pending) | Some(TileState::Failed) => Ok(TileLookup::Pending),
            None => {
                if self.cache.try_insert_pending(key) {
                    self.spawn_fetch(normalized, key);
                }
                Ok(TileLookup::Pending)
            }
        }
    }

    /// Drop the cache entry for a coordinate, if any.
    ///
    /// The next lookup starts a fresh fetch; this is the only recovery path
    /// for a Failed tile.
    pub fn invalidate(&self, coord: TileCoord) -> Result<(), TileError> {
        let key = self.tile_key(coord)?;
        self.cache.invalidate(&key);
        Ok(())
    }

    /// Subscribe to ready notifications.
    ///
    /// One key is broadcast per tile that transitions to Ready; failed
    /// tiles stay silent. Subscribers re-run their hit test for the
    /// last-known pointer position when an awaited key arrives.
    pub fn subscribe_ready(&self) -> broadcast::Receiver<TileKey> {
        self.ready_tx.subscribe()
    }

    /// Snapshot of the cache statistics.
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn spawn_fetch(&self, coord: TileCoord, key: TileKey) {
        let fetcher = Arc::clone(&self.fetcher);
        let cache = Arc::clone(&self.cache);
        let ready_tx = self.ready_tx.clone();

        tokio::spawn(async move {
            match fetcher.fetch_tile(coord).await {
                Ok(raw) => match feature::parse_payload(&raw) {
                    Ok(records) => {
                        let entities = feature::decode_records(records);
                        debug!(
                            tile = %key,
                            entities = entities.len(),
                            fetcher = fetcher.name(),
                            "Tile metadata ready"
                        );
                        cache.complete(key, Arc::new(entities));
                        // No receivers is fine; the next pointer event re-tests
                        let _ = ready_tx.send(key);
                    }
                    Err(err) => {
                        warn!(tile = %key, error = %err, "Tile payload decode failed");
                        cache.fail(key);
                    }
                },
                Err(err) => {
                    warn!(
                        tile = %key,
                        fetcher = fetcher.name(),
                        error = %err,
                        "Tile fetch failed"
                    );
                    cache.fail(key);
                }
            }
        });
    }
}
