//! Wire and entity type definitions

use crate::geometry::{BoundingBox, Ring};
use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Free-form attribute bundle attached to a feature.
///
/// Backends send arbitrary string-keyed properties; consumers interpret
/// them by feature kind.
pub type Attributes = Map<String, Value>;

/// One feature record as delivered on the wire.
///
/// Produced by the backend, consumed by the decode step. POI-style records
/// carry a `links` array of candidate attribute-summary variants; exactly
/// one is selected at decode time.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureRecord {
    /// Stable feature identifier, unique within the source
    pub id: String,
    /// Feature kind tag, e.g. "poi", "building", "traffic"
    #[serde(rename = "type")]
    pub kind: String,
    /// Optional refinement of the kind, e.g. "cafe"
    #[serde(default)]
    pub subtype: Option<String>,
    /// Encoded polygon geometry in tile-local pixels
    pub geometry: String,
    /// Feature properties
    #[serde(default)]
    pub attributes: Attributes,
    /// Candidate attribute-summary variants
    #[serde(default)]
    pub links: Vec<Attributes>,
}

/// A decoded real-world feature within a tile.
///
/// Immutable after decode; owned by the cache entry for its tile and
/// dropped with it.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Stable feature identifier
    pub id: String,
    /// Feature kind tag
    pub kind: String,
    /// Optional refinement of the kind
    pub subtype: Option<String>,
    /// Polygon rings in tile-local pixels, outer ring first
    pub rings: Vec<Ring>,
    /// Bounding box of the outer ring, for the hit-test pre-check
    pub bbox: BoundingBox,
    /// Feature properties
    pub attributes: Attributes,
    /// The attribute-summary variant chosen at decode time, if the record
    /// carried any. Fixed for the lifetime of the cache entry.
    pub linked_summary: Option<Attributes>,
}

/// Errors for a tile payload that cannot be decoded at all.
///
/// Unlike a single malformed geometry (which drops one entity), a payload
/// error fails the whole tile.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Payload is not valid JSON or not a record array
    #[error("Malformed tile payload: {0}")]
    Malformed(#[from] serde_json::Error),
}
