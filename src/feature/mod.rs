//! Tile feature decoding
//!
//! Turns raw tile payloads into decoded [`Entity`] lists: JSON parsing of
//! the wire records, geometry decoding, bounding-box precomputation, and
//! selection of the linked attribute summary.
//!
//! Geometry failures are per-entity: the offending record is dropped with a
//! warning and the rest of the tile survives. A payload that does not parse
//! at all fails the whole tile.

mod types;

pub use types::{Attributes, Entity, FeatureRecord, PayloadError};

use crate::geometry::{self, BoundingBox};
use rand::seq::SliceRandom;
use tracing::warn;

/// Parses a raw tile payload into wire records.
///
/// # Errors
///
/// `PayloadError::Malformed` if the payload is not a JSON array of feature
/// records; the caller marks the tile Failed.
pub fn parse_payload(raw: &[u8]) -> Result<Vec<FeatureRecord>, PayloadError> {
    Ok(serde_json::from_slice(raw)?)
}

/// Decodes wire records into entities.
///
/// Records with malformed geometry are dropped and logged; decode order is
/// preserved so the hit tester's last-added-wins scan matches the source's
/// draw order. When a record carries candidate summary variants, one is
/// chosen uniformly at random here and stays fixed for the lifetime of the
/// cache entry; a re-fetch of the tile may choose differently.
pub fn decode_records(records: Vec<FeatureRecord>) -> Vec<Entity> {
    let mut entities = Vec::with_capacity(records.len());

    for record in records {
        match decode_record(record) {
            Ok(entity) => entities.push(entity),
            Err((id, err)) => {
                warn!(feature_id = %id, error = %err, "Dropping feature with malformed geometry");
            }
        }
    }

    entities
}

fn decode_record(record: FeatureRecord) -> Result<Entity, (String, geometry::GeometryError)> {
    let rings = match geometry::decode_polygon(&record.geometry) {
        Ok(rings) => rings,
        Err(err) => return Err((record.id, err)),
    };

    // decode_polygon guarantees a non-empty outer ring
    let bbox = BoundingBox::of_ring(&rings[0]).ok_or_else(|| {
        (
            record.id.clone(),
            geometry::GeometryError::Malformed("empty outer ring".to_string()),
        )
    })?;

    let linked_summary = record.links.choose(&mut rand::thread_rng()).cloned();

    Ok(Entity {
        id: record.id,
        kind: record.kind,
        subtype: record.subtype,
        rings,
        bbox,
        attributes: record.attributes,
        linked_summary,
    })
}
