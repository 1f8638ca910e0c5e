use serde::{Deserialize, Serialize};
use tilemap_types::geo::GeoPoint2d;
use tilemap_types::tile::MAX_ZOOM;

use crate::error::TilemapError;

const DEFAULT_TILE_URL: &str = "https://tilecache.irias.nl/tiles/{layer}/{z}/{x}/{y}.png";
const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search.php?format=json";
const DEFAULT_LAYERS: [&str; 5] = [
    "osm-bright",
    "osm-liberty",
    "klokantech-basic",
    "positron",
    "dark-matter",
];

/// What happens to a tile whose loading or decoding failed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailedTilePolicy {
    /// The tile is requested again the next time it is visible.
    #[default]
    Retry,
    /// The tile is never requested again during the session.
    GiveUp,
}

/// Configuration of a [`MapController`](super::MapController).
///
/// Every field has a default value, so a configuration file only needs to list the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    zoom_min: u32,
    zoom_max: u32,
    zoom: i32,
    center: GeoPoint2d,
    tile_url: String,
    layers: Vec<String>,
    layer: Option<String>,
    hidpi_suffix: String,
    hidpi: bool,
    tile_size: u32,
    geocoder_url: String,
    search_zoom: i32,
    key_pan_step: f64,
    failed_tiles: FailedTilePolicy,
    user_agent: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom_min: 1,
            zoom_max: 17,
            zoom: 8,
            center: GeoPoint2d::lonlat(5.5, 52.2),
            tile_url: DEFAULT_TILE_URL.to_string(),
            layers: DEFAULT_LAYERS.iter().map(|l| l.to_string()).collect(),
            layer: None,
            hidpi_suffix: "@2x".to_string(),
            hidpi: false,
            tile_size: 256,
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
            search_zoom: 16,
            key_pan_step: 50.0,
            failed_tiles: FailedTilePolicy::default(),
            user_agent: concat!("tilemap/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl MapConfig {
    /// Smallest zoom level the map can be zoomed out to.
    pub fn zoom_min(&self) -> u32 {
        self.zoom_min
    }

    /// Sets the zoom level limits.
    pub fn with_zoom_limits(mut self, zoom_min: u32, zoom_max: u32) -> Self {
        self.zoom_min = zoom_min;
        self.zoom_max = zoom_max;
        self
    }

    /// Largest zoom level the map can be zoomed in to.
    pub fn zoom_max(&self) -> u32 {
        self.zoom_max
    }

    /// Initial zoom level.
    pub fn zoom(&self) -> i32 {
        self.zoom
    }

    /// Sets the initial zoom level.
    pub fn with_zoom(mut self, zoom: i32) -> Self {
        self.zoom = zoom;
        self
    }

    /// Initial center of the map.
    pub fn center(&self) -> GeoPoint2d {
        self.center
    }

    /// Sets the initial center of the map.
    pub fn with_center(mut self, center: GeoPoint2d) -> Self {
        self.center = center;
        self
    }

    /// Tile server URL. Besides the `{x}`, `{y}` and `{z}` placeholders it can contain a
    /// `{layer}` placeholder that is replaced with the active layer name.
    pub fn tile_url(&self) -> &str {
        &self.tile_url
    }

    /// Sets the tile server URL.
    pub fn with_tile_url(mut self, url: impl Into<String>) -> Self {
        self.tile_url = url.into();
        self
    }

    /// Layers (tilesets) offered by the tile server.
    pub fn layers(&self) -> &[String] {
        &self.layers
    }

    /// Sets the available layers.
    pub fn with_layers(mut self, layers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.layers = layers.into_iter().map(Into::into).collect();
        self
    }

    /// The layer shown initially. Defaults to the first of [`MapConfig::layers`].
    pub fn layer(&self) -> Option<&str> {
        self.layer
            .as_deref()
            .or_else(|| self.layers.first().map(String::as_str))
    }

    /// Sets the layer shown initially.
    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = Some(layer.into());
        self
    }

    /// Suffix added to the layer name (or to the tile file name) to get high density tiles.
    pub fn hidpi_suffix(&self) -> &str {
        &self.hidpi_suffix
    }

    /// Sets the high density suffix.
    pub fn with_hidpi_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.hidpi_suffix = suffix.into();
        self
    }

    /// If true, the map starts with high density tiles.
    pub fn hidpi(&self) -> bool {
        self.hidpi
    }

    /// Sets whether the map starts with high density tiles.
    pub fn with_hidpi(mut self, hidpi: bool) -> Self {
        self.hidpi = hidpi;
        self
    }

    /// Size of standard tiles in pixels. High density tiles are twice as large.
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Sets the size of standard tiles in pixels.
    pub fn with_tile_size(mut self, size: u32) -> Self {
        self.tile_size = size;
        self
    }

    /// Search endpoint of the Nominatim geocoder. The query is added as the `q` parameter.
    pub fn geocoder_url(&self) -> &str {
        &self.geocoder_url
    }

    /// Sets the geocoder endpoint.
    pub fn with_geocoder_url(mut self, url: impl Into<String>) -> Self {
        self.geocoder_url = url.into();
        self
    }

    /// Zoom level set after the map was centered on a search result.
    pub fn search_zoom(&self) -> i32 {
        self.search_zoom
    }

    /// Sets the zoom level used for search results.
    pub fn with_search_zoom(mut self, zoom: i32) -> Self {
        self.search_zoom = zoom;
        self
    }

    /// Distance in pixels the arrow keys move the map by.
    pub fn key_pan_step(&self) -> f64 {
        self.key_pan_step
    }

    /// Sets the distance the arrow keys move the map by.
    pub fn with_key_pan_step(mut self, step: f64) -> Self {
        self.key_pan_step = step;
        self
    }

    /// What to do with tiles that failed to load.
    pub fn failed_tiles(&self) -> FailedTilePolicy {
        self.failed_tiles
    }

    /// Sets the policy for tiles that failed to load.
    pub fn with_failed_tiles(mut self, policy: FailedTilePolicy) -> Self {
        self.failed_tiles = policy;
        self
    }

    /// User agent sent with HTTP requests.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Sets the user agent sent with HTTP requests.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Checks that the zoom limits and the search zoom are tile grid levels, `0..=MAX_ZOOM`.
    ///
    /// The initial zoom is not checked, it is clamped into the limits like any other zoom.
    pub fn validate(&self) -> Result<(), TilemapError> {
        let levels = [
            ("zoom_min", i64::from(self.zoom_min)),
            ("zoom_max", i64::from(self.zoom_max)),
            ("search_zoom", i64::from(self.search_zoom)),
        ];
        for (name, zoom) in levels {
            if !(0..=i64::from(MAX_ZOOM)).contains(&zoom) {
                return Err(TilemapError::Config(format!(
                    "{name} {zoom} is outside of 0..={MAX_ZOOM}"
                )));
            }
        }

        Ok(())
    }
}
