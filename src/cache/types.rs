//! Core types for the tile metadata cache.

use crate::feature::Entity;
use std::sync::Arc;

/// Lifecycle state of a cached tile.
///
/// Created Pending when first requested, transitions exactly once to Ready
/// or Failed, and is never patched afterwards; the only further changes are
/// wholesale replacement via invalidation and re-fetch.
#[derive(Debug, Clone)]
pub enum TileState {
    /// A fetch is in flight for this tile. The Pending entry doubles as the
    /// coalescing guard: while it exists no second fetch may be issued.
    Pending,
    /// Decoded entities, shared immutably with all readers.
    Ready(Arc<Vec<Entity>>),
    /// Fetch or payload decode failed. Surfaces to callers exactly like
    /// Pending (no entities, no error) and is never retried automatically;
    /// explicit invalidation is the only way out.
    Failed,
}

impl TileState {
    /// Whether this entry still counts as unresolved to callers.
    #[inline]
    pub fn is_pending(&self) -> bool {
        matches!(self, TileState::Pending)
    }

    /// Whether this entry holds decoded entities.
    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self, TileState::Ready(_))
    }
}
