//! Pointer interaction layer.
//!
//! The integration point over the data origin: derives the active tile and
//! tile-local offset from host-engine pointer events, drives the cache and
//! hit tester, diffs the result against the previous hover state and emits
//! semantic events to consumers.
//!
//! Pointer handling is synchronous; when the hovered tile is still in
//! flight the layer simply does nothing for that event and re-tests either
//! on the next pointer move or, via [`MetaLayer::on_tile_ready`], as soon
//! as the origin reports the tile decoded.

mod events;

pub use events::{ClickKind, LatLng, MetaEvent};

use crate::config::MetaConfig;
use crate::coord::{self, TileKey, WorldPixel};
use crate::feature::Entity;
use crate::hittest;
use crate::origin::{Origin, TileLookup};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::trace;

/// Capacity of the consumer event channel.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Host map-engine projection interface.
///
/// Supplies the pieces of engine state the layer needs: the current zoom,
/// the tile size constant and pixel-to-geographic unprojection.
pub trait Projection: Send + Sync {
    /// Current integer zoom level.
    fn zoom(&self) -> u8;

    /// Tile edge length in pixels.
    fn tile_size(&self) -> u32;

    /// Converts a map-plane pixel position to geographic coordinates.
    fn unproject(&self, point: WorldPixel) -> LatLng;
}

/// A pointer event in map-plane pixel coordinates.
///
/// The embedding converts the engine-native event's client position into
/// the projected map plane before handing it over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Pointer position on the projected map plane
    pub position: WorldPixel,
}

impl PointerEvent {
    /// Create a pointer event at the given map-plane position.
    pub fn new(position: WorldPixel) -> Self {
        Self { position }
    }
}

/// Transient hover state, reset whenever the resolved tile changes or the
/// pointer leaves the interactive area.
#[derive(Debug, Default)]
struct HoverState {
    /// Key of the tile under the pointer, if it resolved to a valid tile
    current_key: Option<TileKey>,
    /// Entity currently hovered, if any
    hovered: Option<Entity>,
}

/// Pointer state machine emitting semantic metadata events.
pub struct MetaLayer {
    origin: Arc<Origin>,
    projection: Arc<dyn Projection>,
    config: MetaConfig,
    enabled: bool,
    hover: HoverState,
    last_pointer: Option<PointerEvent>,
    events_tx: broadcast::Sender<MetaEvent>,
}

impl MetaLayer {
    /// Create a new layer over the given origin and projection.
    pub fn new(origin: Arc<Origin>, projection: Arc<dyn Projection>, config: MetaConfig) -> Self {
        let (events_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            origin,
            projection,
            config,
            enabled: true,
            hover: HoverState::default(),
            last_pointer: None,
            events_tx,
        }
    }

    /// Subscribe to the semantic event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<MetaEvent> {
        self.events_tx.subscribe()
    }

    /// Whether pointer interaction is currently enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable pointer interaction.
    ///
    /// Disabling clears the hover state immediately, emitting hover-leave
    /// if an entity was hovered — used when another interaction mode (e.g.
    /// a measurement tool) takes over the pointer.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled && !enabled {
            self.reset_hover();
            self.last_pointer = None;
        }
        self.enabled = enabled;
    }

    /// Handle a pointer-move event from the host engine.
    pub fn pointer_move(&mut self, event: PointerEvent) {
        if !self.enabled {
            return;
        }
        self.last_pointer = Some(event);

        let (tile, local) = coord::tile_at(
            event.position,
            self.projection.zoom(),
            self.projection.tile_size(),
        );

        // A coordinate outside zoom bounds or the tile grid is a leave
        let key = match self.origin.tile_key(tile) {
            Ok(key) => key,
            Err(err) => {
                trace!(tile = %tile, error = %err, "Pointer over invalid tile");
                self.reset_hover();
                return;
            }
        };

        if self.hover.current_key != Some(key) {
            // Crossed a tile boundary: any hovered entity is gone
            self.emit_leave_if_hovered();
            self.hover.current_key = Some(key);
        }

        let lookup = match self.origin.get_tile_data(tile) {
            Ok(lookup) => lookup,
            Err(_) => {
                self.reset_hover();
                return;
            }
        };

        match lookup {
            // Tile still in flight; on_tile_ready or the next move re-tests
            TileLookup::Pending => {}
            TileLookup::Ready(entities) => {
                let hit = hittest::locate(&entities, local).cloned();
                self.apply_hit(hit, event);
            }
        }
    }

    /// Handle the engine-level pointer-leave event.
    ///
    /// Clears the hover state immediately, emitting hover-leave if needed.
    pub fn pointer_leave(&mut self) {
        self.reset_hover();
        self.last_pointer = None;
    }

    /// Handle a click-style event from the host engine.
    ///
    /// Emits the corresponding semantic event if an entity is hovered.
    /// Returns `true` when the embedding should stop the underlying input
    /// event from propagating to the host engine (an entity consumed the
    /// click and the layer is configured to suppress bubbling).
    pub fn pointer_click(&mut self, event: PointerEvent, kind: ClickKind) -> bool {
        if !self.enabled {
            return false;
        }
        let entity = match &self.hover.hovered {
            Some(entity) => entity.clone(),
            None => return false,
        };

        let latlng = self.projection.unproject(event.position);
        let event = match kind {
            ClickKind::Click => MetaEvent::Click { entity, latlng },
            ClickKind::DoubleClick => MetaEvent::DoubleClick { entity, latlng },
            ClickKind::ContextMenu => MetaEvent::ContextMenu { entity, latlng },
        };
        self.emit(event);

        self.config.stop_propagation
    }

    /// Re-test the last pointer position after a tile decodes.
    ///
    /// Wire the origin's ready notifications here so the first hover over
    /// an uncached tile resolves as soon as the fetch lands instead of
    /// waiting for the next pointer move.
    pub fn on_tile_ready(&mut self, key: TileKey) {
        if !self.enabled || self.hover.current_key != Some(key) {
            return;
        }
        if let Some(event) = self.last_pointer {
            self.pointer_move(event);
        }
    }

    /// Diff the hit-test result against the hovered entity and emit events.
    fn apply_hit(&mut self, hit: Option<Entity>, event: PointerEvent) {
        let latlng = self.projection.unproject(event.position);

        let same_entity = match (&self.hover.hovered, &hit) {
            (Some(prev), Some(next)) => prev.id == next.id,
            _ => false,
        };

        if same_entity {
            if let Some(next) = &hit {
                self.emit(MetaEvent::HoverMove {
                    entity: next.clone(),
                    latlng,
                });
            }
        } else if let Some(next) = hit.clone() {
            // Covers entering from nothing and switching entities; a stale
            // hover (id no longer decoded) lands here too
            self.emit_leave_if_hovered();
            self.emit(MetaEvent::HoverEnter {
                entity: next,
                latlng,
            });
        } else {
            self.emit_leave_if_hovered();
        }

        self.hover.hovered = hit;
    }

    /// Clear the whole hover state, emitting hover-leave if applicable.
    fn reset_hover(&mut self) {
        self.emit_leave_if_hovered();
        self.hover.current_key = None;
    }

    fn emit_leave_if_hovered(&mut self) {
        if self.hover.hovered.take().is_some() {
            self.emit(MetaEvent::HoverLeave);
        }
    }

    fn emit(&self, event: MetaEvent) {
        // No subscribers is fine; events are fire-and-forget
        let _ = self.events_tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::TileCoord;
    use crate::origin::{FetchError, TileFetcher};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{timeout, Duration};

    /// Fetcher serving canned payloads per tile coordinate.
    struct CannedFetcher {
        payloads: HashMap<(u8, i64, i64), Vec<u8>>,
        fetch_count: AtomicUsize,
        fail_all: bool,
    }

    impl CannedFetcher {
        fn new() -> Self {
            Self {
                payloads: HashMap::new(),
                fetch_count: AtomicUsize::new(0),
                fail_all: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail_all: true,
                ..Self::new()
            }
        }

        fn with_tile(mut self, coord: TileCoord, payload: &[u8]) -> Self {
            self.payloads
                .insert((coord.zoom, coord.x, coord.y), payload.to_vec());
            self
        }
    }

    #[async_trait]
    impl TileFetcher for CannedFetcher {
        async fn fetch_tile(&self, coord: TileCoord) -> Result<Vec<u8>, FetchError> {
            self.fetch_count.fetch_add(1, Ordering::SeqCst);
            if self.fail_all {
                return Err(FetchError::Transport("unreachable".to_string()));
            }
            self.payloads
                .get(&(coord.zoom, coord.x, coord.y))
                .cloned()
                .ok_or_else(|| FetchError::Transport("no such tile".to_string()))
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    /// Fixed-state projection: zoom 14, 256px tiles, linear unprojection.
    struct FixedProjection;

    impl Projection for FixedProjection {
        fn zoom(&self) -> u8 {
            14
        }

        fn tile_size(&self) -> u32 {
            256
        }

        fn unproject(&self, point: WorldPixel) -> LatLng {
            LatLng::new(point.y / 1000.0, point.x / 1000.0)
        }
    }

    const SQUARE_POI: &[u8] = br#"[{
        "id": "poi-1",
        "type": "poi",
        "geometry": "POLYGON((0 0,50 0,50 50,0 50,0 0))"
    }]"#;

    const EMPTY_TILE: &[u8] = b"[]";

    /// Tile (14, 100, 200): its origin on the map plane.
    const TILE_A_X: f64 = 100.0 * 256.0;
    const TILE_A_Y: f64 = 200.0 * 256.0;

    fn setup(fetcher: CannedFetcher, config: MetaConfig) -> (MetaLayer, Arc<Origin>) {
        let origin = Arc::new(Origin::new(Arc::new(fetcher), config.clone()));
        let layer = MetaLayer::new(Arc::clone(&origin), Arc::new(FixedProjection), config);
        (layer, origin)
    }

    fn config() -> MetaConfig {
        MetaConfig {
            max_zoom: 18,
            ..MetaConfig::default()
        }
    }

    fn move_to(layer: &mut MetaLayer, x: f64, y: f64) {
        layer.pointer_move(PointerEvent::new(WorldPixel::new(x, y)));
    }

    /// Drive one tile through fetch completion and the ready re-test.
    async fn resolve_tile(layer: &mut MetaLayer, origin: &Origin, coord: TileCoord) {
        let mut rx = origin.subscribe_ready();
        let key = origin.tile_key(coord).unwrap();
        loop {
            let got = timeout(Duration::from_secs(1), rx.recv())
                .await
                .expect("timed out waiting for tile")
                .expect("ready channel closed");
            if got == key {
                break;
            }
        }
        layer.on_tile_ready(key);
    }

    fn drain(rx: &mut broadcast::Receiver<MetaEvent>) -> Vec<MetaEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn test_hover_enter_after_tile_resolves() {
        let fetcher = CannedFetcher::new().with_tile(TileCoord::new(14, 100, 200), SQUARE_POI);
        let (mut layer, origin) = setup(fetcher, config());
        let mut rx = layer.subscribe();

        // First move over an uncached tile: no hit test yet
        move_to(&mut layer, TILE_A_X + 25.0, TILE_A_Y + 25.0);
        assert!(drain(&mut rx).is_empty(), "no events while tile in flight");

        // Fetch lands; the layer re-tests the stored pointer position
        resolve_tile(&mut layer, &origin, TileCoord::new(14, 100, 200)).await;

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        match &events[0] {
            MetaEvent::HoverEnter { entity, latlng } => {
                assert_eq!(entity.id, "poi-1");
                assert!((latlng.lng - (TILE_A_X + 25.0) / 1000.0).abs() < 1e-9);
            }
            other => panic!("expected HoverEnter, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_hover_move_and_leave_within_tile() {
        let fetcher = CannedFetcher::new().with_tile(TileCoord::new(14, 100, 200), SQUARE_POI);
        let (mut layer, origin) = setup(fetcher, config());
        let mut rx = layer.subscribe();

        move_to(&mut layer, TILE_A_X + 25.0, TILE_A_Y + 25.0);
        resolve_tile(&mut layer, &origin, TileCoord::new(14, 100, 200)).await;
        drain(&mut rx);

        // Move within the same entity
        move_to(&mut layer, TILE_A_X + 30.0, TILE_A_Y + 30.0);
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], MetaEvent::HoverMove { .. }));

        // Move off the entity but stay on the tile
        move_to(&mut layer, TILE_A_X + 100.0, TILE_A_Y + 100.0);
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], MetaEvent::HoverLeave));
    }

    #[tokio::test]
    async fn test_tile_change_emits_leave_then_enter() {
        // Scenario: hovered entity on tile A, pointer crosses to tile B
        let tile_a = TileCoord::new(14, 100, 200);
        let tile_b = TileCoord::new(14, 101, 200);
        let fetcher = CannedFetcher::new()
            .with_tile(tile_a, SQUARE_POI)
            .with_tile(tile_b, SQUARE_POI);
        let (mut layer, origin) = setup(fetcher, config());
        let mut rx = layer.subscribe();

        move_to(&mut layer, TILE_A_X + 25.0, TILE_A_Y + 25.0);
        resolve_tile(&mut layer, &origin, tile_a).await;
        drain(&mut rx);

        // Cross into tile B, over its entity's local (25, 25)
        move_to(&mut layer, TILE_A_X + 256.0 + 25.0, TILE_A_Y + 25.0);
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1, "leave fires immediately on tile change");
        assert!(matches!(events[0], MetaEvent::HoverLeave));

        resolve_tile(&mut layer, &origin, tile_b).await;
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1, "enter fires once tile B resolves");
        assert!(matches!(events[0], MetaEvent::HoverEnter { .. }));
    }

    #[tokio::test]
    async fn test_failed_tile_never_emits() {
        let (mut layer, origin) = setup(CannedFetcher::failing(), config());
        let mut rx = layer.subscribe();

        move_to(&mut layer, TILE_A_X + 25.0, TILE_A_Y + 25.0);
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Repeated moves over the failed tile stay silent
        for offset in [10.0, 20.0, 30.0] {
            move_to(&mut layer, TILE_A_X + offset, TILE_A_Y + offset);
        }
        assert!(drain(&mut rx).is_empty());
        assert_eq!(origin.cache_stats().entry_count, 1);
    }

    #[tokio::test]
    async fn test_invalid_tile_treated_as_leave() {
        let fetcher = CannedFetcher::new().with_tile(TileCoord::new(14, 100, 200), SQUARE_POI);
        let (mut layer, origin) = setup(fetcher, config());
        let mut rx = layer.subscribe();

        move_to(&mut layer, TILE_A_X + 25.0, TILE_A_Y + 25.0);
        resolve_tile(&mut layer, &origin, TileCoord::new(14, 100, 200)).await;
        drain(&mut rx);

        // Negative y is outside the grid at any zoom
        move_to(&mut layer, TILE_A_X, -10.0);
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], MetaEvent::HoverLeave));
    }

    #[tokio::test]
    async fn test_pointer_leave_clears_hover() {
        let fetcher = CannedFetcher::new().with_tile(TileCoord::new(14, 100, 200), SQUARE_POI);
        let (mut layer, origin) = setup(fetcher, config());
        let mut rx = layer.subscribe();

        move_to(&mut layer, TILE_A_X + 25.0, TILE_A_Y + 25.0);
        resolve_tile(&mut layer, &origin, TileCoord::new(14, 100, 200)).await;
        drain(&mut rx);

        layer.pointer_leave();
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], MetaEvent::HoverLeave));

        // Leaving again is a no-op
        layer.pointer_leave();
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_disable_clears_hover_immediately() {
        let fetcher = CannedFetcher::new().with_tile(TileCoord::new(14, 100, 200), SQUARE_POI);
        let (mut layer, origin) = setup(fetcher, config());
        let mut rx = layer.subscribe();

        move_to(&mut layer, TILE_A_X + 25.0, TILE_A_Y + 25.0);
        resolve_tile(&mut layer, &origin, TileCoord::new(14, 100, 200)).await;
        drain(&mut rx);

        layer.set_enabled(false);
        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], MetaEvent::HoverLeave));

        // Pointer input while disabled does nothing
        move_to(&mut layer, TILE_A_X + 25.0, TILE_A_Y + 25.0);
        assert!(!layer.pointer_click(
            PointerEvent::new(WorldPixel::new(TILE_A_X + 25.0, TILE_A_Y + 25.0)),
            ClickKind::Click,
        ));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_click_on_hovered_entity() {
        let fetcher = CannedFetcher::new().with_tile(TileCoord::new(14, 100, 200), SQUARE_POI);
        let (mut layer, origin) = setup(fetcher, config());
        let mut rx = layer.subscribe();

        move_to(&mut layer, TILE_A_X + 25.0, TILE_A_Y + 25.0);
        resolve_tile(&mut layer, &origin, TileCoord::new(14, 100, 200)).await;
        drain(&mut rx);

        let event = PointerEvent::new(WorldPixel::new(TILE_A_X + 25.0, TILE_A_Y + 25.0));
        let stop = layer.pointer_click(event, ClickKind::Click);
        assert!(!stop, "propagation not suppressed by default");

        let events = drain(&mut rx);
        assert_eq!(events.len(), 1);
        match &events[0] {
            MetaEvent::Click { entity, .. } => assert_eq!(entity.id, "poi-1"),
            other => panic!("expected Click, got {:?}", other),
        }

        // Other click kinds map to their own events
        layer.pointer_click(event, ClickKind::DoubleClick);
        layer.pointer_click(event, ClickKind::ContextMenu);
        let events = drain(&mut rx);
        assert!(matches!(events[0], MetaEvent::DoubleClick { .. }));
        assert!(matches!(events[1], MetaEvent::ContextMenu { .. }));
    }

    #[tokio::test]
    async fn test_click_without_hover_is_ignored() {
        let fetcher = CannedFetcher::new().with_tile(TileCoord::new(14, 100, 200), EMPTY_TILE);
        let (mut layer, origin) = setup(fetcher, config());
        let mut rx = layer.subscribe();

        move_to(&mut layer, TILE_A_X + 25.0, TILE_A_Y + 25.0);
        resolve_tile(&mut layer, &origin, TileCoord::new(14, 100, 200)).await;

        let event = PointerEvent::new(WorldPixel::new(TILE_A_X + 25.0, TILE_A_Y + 25.0));
        assert!(!layer.pointer_click(event, ClickKind::Click));
        assert!(drain(&mut rx).is_empty());
    }

    #[tokio::test]
    async fn test_stop_propagation_when_configured() {
        let fetcher = CannedFetcher::new().with_tile(TileCoord::new(14, 100, 200), SQUARE_POI);
        let (mut layer, origin) = setup(
            fetcher,
            MetaConfig {
                stop_propagation: true,
                ..config()
            },
        );
        let mut rx = layer.subscribe();

        move_to(&mut layer, TILE_A_X + 25.0, TILE_A_Y + 25.0);
        resolve_tile(&mut layer, &origin, TileCoord::new(14, 100, 200)).await;
        drain(&mut rx);

        let event = PointerEvent::new(WorldPixel::new(TILE_A_X + 25.0, TILE_A_Y + 25.0));
        assert!(layer.pointer_click(event, ClickKind::Click));
    }

    #[tokio::test]
    async fn test_on_tile_ready_ignores_other_tiles() {
        let tile_a = TileCoord::new(14, 100, 200);
        let tile_b = TileCoord::new(14, 105, 205);
        let fetcher = CannedFetcher::new()
            .with_tile(tile_a, SQUARE_POI)
            .with_tile(tile_b, SQUARE_POI);
        let (mut layer, origin) = setup(fetcher, config());
        let mut rx = layer.subscribe();

        move_to(&mut layer, TILE_A_X + 25.0, TILE_A_Y + 25.0);

        // A ready signal for a tile the pointer is not on must not re-test
        let other_key = origin.tile_key(tile_b).unwrap();
        layer.on_tile_ready(other_key);
        assert!(drain(&mut rx).is_empty());
    }
}
