//! Semantic events emitted to UI consumers.

use crate::feature::Entity;

/// A geographic coordinate, as produced by the host engine's unprojection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    /// Latitude in degrees
    pub lat: f64,
    /// Longitude in degrees
    pub lng: f64,
}

impl LatLng {
    /// Create a new geographic coordinate.
    #[inline]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// The click-style input kinds forwarded to consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    Click,
    DoubleClick,
    ContextMenu,
}

/// Semantic interaction events.
///
/// Hover events diff the currently hovered entity against the previous
/// pointer event; click-style events fire only while an entity is hovered.
/// Each variant carrying an entity also carries the geographic coordinate
/// of the triggering input.
#[derive(Debug, Clone)]
pub enum MetaEvent {
    /// The pointer entered an entity's polygon
    HoverEnter { entity: Entity, latlng: LatLng },
    /// The pointer moved within the same entity's polygon
    HoverMove { entity: Entity, latlng: LatLng },
    /// The pointer left the previously hovered entity
    HoverLeave,
    /// Click-style input landed on the hovered entity
    Click { entity: Entity, latlng: LatLng },
    /// Double click on the hovered entity
    DoubleClick { entity: Entity, latlng: LatLng },
    /// Context-menu input on the hovered entity
    ContextMenu { entity: Entity, latlng: LatLng },
}

impl MetaEvent {
    /// The entity carried by this event, if any.
    pub fn entity(&self) -> Option<&Entity> {
        match self {
            MetaEvent::HoverEnter { entity, .. }
            | MetaEvent::HoverMove { entity, .. }
            | MetaEvent::Click { entity, .. }
            | MetaEvent::DoubleClick { entity, .. }
            | MetaEvent::ContextMenu { entity, .. } => Some(entity),
            MetaEvent::HoverLeave => None,
        }
    }
}
