//! Tile coordinate type definitions

use std::fmt;
use thiserror::Error;

/// Hard ceiling on zoom levels the key packing supports.
///
/// Configured bounds (`MetaConfig`) are always within this range.
pub const MAX_SUPPORTED_ZOOM: u8 = 24;

/// Tile coordinates in the slippy-map grid.
///
/// `x` and `y` are raw grid indices as derived from continuous map state,
/// before antimeridian wrapping; `x` may be negative or beyond `2^zoom`
/// when the viewport crosses the date line. Equality is structural on the
/// raw values; use [`TileCoord::normalize`](crate::coord::normalize) before
/// comparing tiles for physical identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// Zoom level
    pub zoom: u8,
    /// X coordinate (east-west), 0 at the antimeridian
    pub x: i64,
    /// Y coordinate (north-south), 0 at north
    pub y: i64,
}

impl TileCoord {
    /// Create a new tile coordinate.
    #[inline]
    pub fn new(zoom: u8, x: i64, y: i64) -> Self {
        Self { zoom, x, y }
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// Canonical cache key for a tile.
///
/// Packs (zoom, wrapped x, y) into a single `u64`: 14 bits of zoom headroom,
/// then 25 bits each for x and y. Collision-free for zoom levels up to
/// [`MAX_SUPPORTED_ZOOM`]; zoom participates in the packing so the same
/// (x, y) at different zooms never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey(u64);

impl TileKey {
    const COORD_BITS: u64 = 25;

    /// Packs an already-normalized coordinate into a key.
    ///
    /// Callers must wrap and validate first; this is an internal invariant,
    /// enforced by `coord::normalize` being the only public path here.
    #[inline]
    pub(crate) fn pack(zoom: u8, x: u32, y: u32) -> Self {
        let z = zoom as u64;
        let key = (z << (2 * Self::COORD_BITS)) | ((x as u64) << Self::COORD_BITS) | y as u64;
        Self(key)
    }

    /// Unpacks the key back into (zoom, x, y).
    #[inline]
    pub fn unpack(self) -> (u8, u32, u32) {
        let mask = (1u64 << Self::COORD_BITS) - 1;
        let zoom = (self.0 >> (2 * Self::COORD_BITS)) as u8;
        let x = ((self.0 >> Self::COORD_BITS) & mask) as u32;
        let y = (self.0 & mask) as u32;
        (zoom, x, y)
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (zoom, x, y) = self.unpack();
        write!(f, "{}/{}/{}", zoom, x, y)
    }
}

/// Errors raised when a tile coordinate cannot enter the cache.
///
/// Raised before any cache lookup; no entry is ever created for a rejected
/// coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileError {
    /// Zoom level outside the configured bounds
    #[error("Invalid zoom level: {zoom} (must be between {min} and {max})")]
    InvalidZoom { zoom: u8, min: u8, max: u8 },

    /// Y coordinate outside the grid for this zoom level
    #[error("Tile {coord} outside the tile grid for its zoom level")]
    OutOfRange { coord: TileCoord },
}
