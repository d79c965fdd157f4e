//! Configuration for the metadata layer.

/// Tunable parameters shared by the data origin and the interaction layer.
#[derive(Debug, Clone)]
pub struct MetaConfig {
    /// Lowest zoom level at which metadata is requested (default: 0)
    pub min_zoom: u8,
    /// Highest zoom level at which metadata is requested (default: 19)
    pub max_zoom: u8,
    /// Tile edge length in pixels, matching the host engine (default: 256)
    pub tile_size: u32,
    /// Maximum number of decoded tiles kept in memory (default: 512)
    pub cache_capacity: usize,
    /// Whether click-style events consumed by a hovered entity should stop
    /// propagating to the host engine (default: false)
    pub stop_propagation: bool,
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0,
            max_zoom: 19,
            tile_size: 256,
            cache_capacity: 512,
            stop_propagation: false,
        }
    }
}
