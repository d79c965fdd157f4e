//! Point-in-polygon hit-testing.
//!
//! The per-pointer-move hot path: given a tile's decoded entities and a
//! tile-local point, find the topmost entity whose polygon contains it.
//! Entities are scanned in reverse insertion order so the last-added
//! (topmost-drawn) feature wins for overlapping geometry. Containment is
//! the standard even-odd ray cast against each entity's outer ring only;
//! hole rings are deliberately not honored.
//!
//! Cost is O(entities) with a bounding-box pre-check per entity; per-tile
//! entity counts are bounded, so no intra-tile spatial index is kept.

use crate::feature::Entity;
use crate::geometry::PixelPoint;

/// Returns the topmost entity containing `point`, or `None`.
///
/// Deterministic for a fixed entity list and point. The bounding-box
/// pre-check is a pure optimization with no observable behavior change.
pub fn locate<'a>(entities: &'a [Entity], point: PixelPoint) -> Option<&'a Entity> {
    entities
        .iter()
        .rev()
        .find(|entity| entity.bbox.contains(point) && ring_contains(&entity.rings[0], point))
}

/// Even-odd (ray casting) containment test against one ring.
///
/// The ring is treated as implicitly closed. Points exactly on an edge may
/// fall on either side; hover accuracy at one-pixel precision does not
/// warrant an exact-boundary rule.
pub fn ring_contains(ring: &[PixelPoint], point: PixelPoint) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let (px, py) = (point.x as f64, point.y as f64);
    let mut inside = false;
    let mut j = ring.len() - 1;

    for i in 0..ring.len() {
        let (xi, yi) = (ring[i].x as f64, ring[i].y as f64);
        let (xj, yj) = (ring[j].x as f64, ring[j].y as f64);

        let crosses = (yi > py) != (yj > py);
        if crosses && px < (xj - xi) * (py - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }

    inside
}
