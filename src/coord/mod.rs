//! Tile coordinate math
//!
//! Shared grid arithmetic for the whole crate: deriving tile coordinates
//! from continuous map-plane positions, antimeridian wrapping, zoom/range
//! validation, and canonical cache-key derivation. Both the data origin and
//! the interaction layer call into this module rather than carrying their
//! own copies of the math.

mod types;

pub use types::{TileCoord, TileError, TileKey, MAX_SUPPORTED_ZOOM};

use crate::geometry::PixelPoint;

/// A continuous position on the projected map plane, in pixels at the
/// current zoom level. Supplied by the host engine's projection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldPixel {
    pub x: f64,
    pub y: f64,
}

impl WorldPixel {
    /// Create a new world-plane pixel position.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Normalizes a raw tile coordinate for cache identity.
///
/// Applies the horizontal antimeridian wrap (`x mod 2^zoom`) so a tile
/// reached via a wrapped or unwrapped x lands on the same cache entry, and
/// rejects coordinates the cache must never see:
///
/// * zoom outside `[min_zoom, max_zoom]`
/// * y outside `[0, 2^zoom)` (there is no vertical wrap)
///
/// # Returns
///
/// The wrapped coordinate, or `TileError` for rejected input.
pub fn normalize(coord: TileCoord, min_zoom: u8, max_zoom: u8) -> Result<TileCoord, TileError> {
    if coord.zoom < min_zoom || coord.zoom > max_zoom || coord.zoom > MAX_SUPPORTED_ZOOM {
        return Err(TileError::InvalidZoom {
            zoom: coord.zoom,
            min: min_zoom,
            max: max_zoom.min(MAX_SUPPORTED_ZOOM),
        });
    }

    let n = 1i64 << coord.zoom;
    if coord.y < 0 || coord.y >= n {
        return Err(TileError::OutOfRange { coord });
    }

    Ok(TileCoord {
        zoom: coord.zoom,
        x: coord.x.rem_euclid(n),
        y: coord.y,
    })
}

/// Derives the canonical cache key for a coordinate.
///
/// Wraps and validates via [`normalize`] first, so two coordinates that
/// denote the same physical tile always produce the same key.
pub fn key_of(coord: TileCoord, min_zoom: u8, max_zoom: u8) -> Result<TileKey, TileError> {
    let normalized = normalize(coord, min_zoom, max_zoom)?;
    Ok(TileKey::pack(
        normalized.zoom,
        normalized.x as u32,
        normalized.y as u32,
    ))
}

/// Converts a map-plane position into the containing tile plus the local
/// pixel offset within that tile.
///
/// # Arguments
///
/// * `point` - Position on the projected map plane
/// * `zoom` - Current zoom level
/// * `tile_size` - Tile edge length in pixels (host engine constant)
pub fn tile_at(point: WorldPixel, zoom: u8, tile_size: u32) -> (TileCoord, PixelPoint) {
    let size = tile_size as f64;
    let tx = (point.x / size).floor();
    let ty = (point.y / size).floor();
    let coord = TileCoord::new(zoom, tx as i64, ty as i64);
    let local = PixelPoint::new(
        (point.x - tx * size).floor() as i32,
        (point.y - ty * size).floor() as i32,
    );
    (coord, local)
}
