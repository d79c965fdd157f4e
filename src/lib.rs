//! MetaTile - tile-indexed spatial metadata with real-time hit-testing
//!
//! This library provides the metadata layer of a slippy-map stack: it fetches
//! per-tile vector metadata describing real-world entities (points of
//! interest, buildings, traffic segments), keeps decoded entities in a
//! bounded in-memory cache keyed by tile coordinate, and hit-tests the
//! hovered tile's polygons on every pointer move to drive hover and click
//! interaction.
//!
//! # High-Level API
//!
//! ```ignore
//! use metatile::config::MetaConfig;
//! use metatile::layer::MetaLayer;
//! use metatile::origin::Origin;
//! use std::sync::Arc;
//!
//! let config = MetaConfig::default();
//! let origin = Arc::new(Origin::new(fetcher, config.clone()));
//! let mut layer = MetaLayer::new(origin, projection, config);
//!
//! // Feed host-engine pointer events; consume semantic events.
//! let mut events = layer.subscribe();
//! layer.pointer_move(pointer_event);
//! ```

pub mod cache;
pub mod config;
pub mod coord;
pub mod feature;
pub mod geometry;
pub mod hittest;
pub mod layer;
pub mod logging;
pub mod origin;

/// Version of the MetaTile library.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
