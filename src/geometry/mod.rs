//! Encoded geometry codec
//!
//! Decodes the backend's WKT-style polygon strings into rings of tile-local
//! pixel coordinates. The backend emits `POLYGON((x y, x y, ...), (...))`
//! with integer coordinates already projected into the owning tile's pixel
//! space; the outer ring comes first, any further rings are holes.
//!
//! Decode failures are per-entity: callers drop the offending feature and
//! keep the rest of the tile.

mod types;

pub use types::{BoundingBox, GeometryError, PixelPoint, Ring};

/// Decodes a WKT-style `POLYGON` string into its rings.
///
/// # Arguments
///
/// * `raw` - Encoded geometry, e.g. `POLYGON((0 0,50 0,50 50,0 50,0 0))`
///
/// # Returns
///
/// The polygon's rings (outer first) or `GeometryError::Malformed` if the
/// input cannot be parsed. A ring needs at least three vertices.
pub fn decode_polygon(raw: &str) -> Result<Vec<Ring>, GeometryError> {
    let trimmed = raw.trim();
    let body = trimmed
        .strip_prefix("POLYGON")
        .ok_or_else(|| GeometryError::Malformed(format!("not a POLYGON: '{}'", clip(trimmed))))?
        .trim();

    let inner = body
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| {
            GeometryError::Malformed(format!("missing outer parentheses: '{}'", clip(trimmed)))
        })?;

    let mut rings = Vec::new();
    for ring_text in split_rings(inner)? {
        rings.push(decode_ring(ring_text)?);
    }

    if rings.is_empty() {
        return Err(GeometryError::Malformed("polygon has no rings".to_string()));
    }

    Ok(rings)
}

/// Splits the inside of a POLYGON body into per-ring substrings.
///
/// Rings are parenthesized groups separated by commas:
/// `(0 0,1 0,1 1), (2 2,3 2,3 3)`.
fn split_rings(inner: &str) -> Result<Vec<&str>, GeometryError> {
    let mut rings = Vec::new();
    let mut rest = inner.trim();

    while !rest.is_empty() {
        let open = rest
            .strip_prefix('(')
            .ok_or_else(|| GeometryError::Malformed(format!("expected '(': '{}'", clip(rest))))?;
        let close = open
            .find(')')
            .ok_or_else(|| GeometryError::Malformed("unterminated ring".to_string()))?;
        rings.push(&open[..close]);

        rest = open[close + 1..].trim_start();
        if let Some(after_comma) = rest.strip_prefix(',') {
            rest = after_comma.trim_start();
            if rest.is_empty() {
                return Err(GeometryError::Malformed("trailing comma".to_string()));
            }
        } else if !rest.is_empty() {
            return Err(GeometryError::Malformed(format!(
                "unexpected trailing input: '{}'",
                clip(rest)
            )));
        }
    }

    Ok(rings)
}

/// Decodes one ring: comma-separated `x y` vertex pairs.
fn decode_ring(text: &str) -> Result<Ring, GeometryError> {
    let mut ring = Ring::new();
    for pair in text.split(',') {
        let mut parts = pair.split_whitespace();
        let x = parse_coord(parts.next(), pair)?;
        let y = parse_coord(parts.next(), pair)?;
        if parts.next().is_some() {
            return Err(GeometryError::Malformed(format!(
                "vertex has more than two coordinates: '{}'",
                clip(pair)
            )));
        }
        ring.push(PixelPoint::new(x, y));
    }

    if ring.len() < 3 {
        return Err(GeometryError::Malformed(format!(
            "ring has {} vertices, need at least 3",
            ring.len()
        )));
    }

    Ok(ring)
}

fn parse_coord(part: Option<&str>, pair: &str) -> Result<i32, GeometryError> {
    part.ok_or_else(|| GeometryError::Malformed(format!("incomplete vertex: '{}'", clip(pair))))?
        .parse::<i32>()
        .map_err(|_| GeometryError::Malformed(format!("non-integer coordinate in '{}'", clip(pair))))
}

/// Clips a string for error messages so a malformed megabyte payload does
/// not end up in the logs verbatim.
fn clip(s: &str) -> &str {
    let limit = 48;
    if s.len() <= limit {
        s
    } else {
        // Back off to a char boundary
        let mut end = limit;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        &s[..end]
    }
}
