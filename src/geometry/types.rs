//! Geometry type definitions

use thiserror::Error;

/// A point in tile-local pixel space.
///
/// Coordinates are integers relative to the tile's northwest origin.
/// Backends emit fixed-precision pixel values; nothing in the containment
/// math needs floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelPoint {
    /// X offset from the tile origin (east-positive)
    pub x: i32,
    /// Y offset from the tile origin (south-positive)
    pub y: i32,
}

impl PixelPoint {
    /// Create a new pixel point.
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A closed polygon ring in tile-local pixel space.
///
/// The first and last vertex may or may not coincide; the containment test
/// treats the ring as implicitly closed either way.
pub type Ring = Vec<PixelPoint>;

/// Axis-aligned bounding box of a ring, used as a cheap pre-check before
/// the per-edge containment test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl BoundingBox {
    /// Computes the bounding box of a ring.
    ///
    /// Returns `None` for an empty ring.
    pub fn of_ring(ring: &[PixelPoint]) -> Option<Self> {
        let first = ring.first()?;
        let mut bbox = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in &ring[1..] {
            bbox.min_x = bbox.min_x.min(p.x);
            bbox.min_y = bbox.min_y.min(p.y);
            bbox.max_x = bbox.max_x.max(p.x);
            bbox.max_y = bbox.max_y.max(p.y);
        }
        Some(bbox)
    }

    /// Whether the point lies inside or on the box.
    #[inline]
    pub fn contains(&self, point: PixelPoint) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }
}

/// Errors that can occur while decoding an encoded geometry string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    /// The input does not parse as a supported geometry
    #[error("Malformed geometry: {0}")]
    Malformed(String),
}
