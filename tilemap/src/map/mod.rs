//! The map controller: the owner of the view and of the tile cache.

use std::sync::Arc;

use tilemap_types::cartesian::{Point2d, Size, Vector2d};
use tilemap_types::geo::{to_geographic, GeoPoint2d, WebMercator};

use crate::control::UserEvent;
use crate::error::TilemapError;
use crate::fetch::{Completion, FetchPipeline, FetchResult};
use crate::geocoding::{parse_lonlat, Geocoder, NominatimGeocoder};
use crate::messenger::Messenger;
use crate::platform::{NativePlatformService, PlatformService};
use crate::tile_cache::TileCache;
use crate::tile_source::TileSource;
use crate::view::ViewState;
use crate::viewport::{plan_tiles, PlannedTile};

mod config;

pub use config::{FailedTilePolicy, MapConfig};

/// Slippy map: keeps the view state and the loaded tiles, and reacts to user input.
///
/// The controller is the only place where the view and the cache are changed. Tile loading and
/// geocoding run in background tasks, whose results are installed when the application calls
/// [`MapController::process_completions`] (usually before drawing a frame) or awaits
/// [`MapController::next_completion`].
///
/// A frame is drawn in three steps:
/// 1. [`MapController::process_completions`] installs whatever was loaded since the last frame.
/// 2. [`MapController::request_tiles`] starts loading the visible tiles that are not cached.
/// 3. The application draws the tiles of [`MapController::plan`] that are in the
///    [cache](MapController::cache).
///
/// [`MapController::frame`] does the first two steps and returns the plan.
pub struct MapController {
    config: MapConfig,
    view: ViewState,
    viewport_size: Size<u32>,
    hidpi: bool,
    source: TileSource,
    cache: TileCache,
    pipeline: FetchPipeline,
    geocoder: Arc<dyn Geocoder>,
    messenger: Option<Box<dyn Messenger>>,
}

impl MapController {
    /// Creates a map that loads tiles over HTTP and searches places with Nominatim.
    pub fn new(config: MapConfig) -> Result<Self, TilemapError> {
        let platform: Arc<dyn PlatformService> =
            Arc::new(NativePlatformService::new(config.user_agent())?);
        let geocoder = Arc::new(NominatimGeocoder::new(
            config.geocoder_url(),
            platform.clone(),
        )?);

        Self::with_services(config, platform, geocoder)
    }

    /// Creates a map with custom platform service and geocoder.
    pub fn with_services(
        config: MapConfig,
        platform: Arc<dyn PlatformService>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Result<Self, TilemapError> {
        config.validate()?;
        let source = Self::tile_source(&config, config.layer())?;
        let view = ViewState::from_geo(
            &config.center(),
            config.zoom(),
            config.zoom_min(),
            config.zoom_max(),
        );

        Ok(Self {
            hidpi: config.hidpi(),
            config,
            view,
            viewport_size: Size::default(),
            source,
            cache: TileCache::new(),
            pipeline: FetchPipeline::new(platform),
            geocoder,
            messenger: None,
        })
    }

    fn tile_source(config: &MapConfig, layer: Option<&str>) -> Result<TileSource, TilemapError> {
        let Some(layer) = layer else {
            return Err(TilemapError::Template("no layers configured".into()));
        };

        TileSource::new(
            config.tile_url(),
            layer,
            config.hidpi_suffix(),
            config.tile_size(),
        )
    }

    /// Sets the messenger that is notified every time the map needs to be redrawn.
    pub fn with_messenger(mut self, messenger: impl Messenger + 'static) -> Self {
        self.set_messenger(messenger);
        self
    }

    /// Sets the messenger that is notified every time the map needs to be redrawn.
    pub fn set_messenger(&mut self, messenger: impl Messenger + 'static) {
        self.messenger = Some(Box::new(messenger));
    }

    fn redraw(&self) {
        if let Some(messenger) = &self.messenger {
            messenger.request_redraw();
        }
    }

    /// Configuration the map was created with.
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Current view.
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Loaded tiles.
    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    /// Size of the viewport in pixels.
    pub fn viewport_size(&self) -> Size<u32> {
        self.viewport_size
    }

    /// Sets the size of the viewport in pixels.
    pub fn set_viewport_size(&mut self, size: Size<u32>) {
        if self.viewport_size != size {
            self.viewport_size = size;
            self.redraw();
        }
    }

    /// True if high density tiles are used.
    pub fn hidpi(&self) -> bool {
        self.hidpi
    }

    /// Switches between standard and high density tiles.
    pub fn set_hidpi(&mut self, hidpi: bool) {
        if self.hidpi != hidpi {
            self.hidpi = hidpi;
            self.redraw();
        }
    }

    /// Size of the drawn tiles in pixels.
    pub fn tile_size(&self) -> u32 {
        self.source.template(self.hidpi).1
    }

    /// Name of the active layer.
    pub fn layer(&self) -> &str {
        self.source.layer()
    }

    /// Switches to another layer of the tile server.
    ///
    /// Tiles of the previous layer stay in the cache and are shown again without loading when
    /// the layer is selected again.
    pub fn set_layer(&mut self, layer: &str) -> Result<(), TilemapError> {
        if !self.config.layers().iter().any(|l| l == layer) {
            return Err(TilemapError::Template(format!("unknown layer '{layer}'")));
        }

        self.source = Self::tile_source(&self.config, Some(layer))?;
        log::info!("Switched to layer {layer}");
        self.redraw();
        Ok(())
    }

    /// Tiles visible in the current view and where to draw them.
    pub fn plan(&self) -> Vec<PlannedTile> {
        let (template, tile_size) = self.source.template(self.hidpi);
        plan_tiles(&self.view, self.viewport_size, tile_size, template)
    }

    /// Starts loading of the visible tiles that are neither cached nor being loaded. Returns the
    /// number of started tasks.
    pub fn request_tiles(&mut self) -> usize {
        let plan = self.plan();
        self.request_planned(&plan)
    }

    fn request_planned(&mut self, plan: &[PlannedTile]) -> usize {
        let mut requested = 0;
        for tile in plan {
            if self.pipeline.request(&mut self.cache, &tile.link).is_some() {
                requested += 1;
            }
        }

        if requested > 0 {
            log::debug!(
                "Requested {requested} tiles, {} tasks outstanding",
                self.pipeline.outstanding()
            );
        }

        requested
    }

    /// Installs the finished results and requests the missing tiles of the current view.
    /// Returns the tiles to draw.
    pub fn frame(&mut self) -> Vec<PlannedTile> {
        self.process_completions();
        let plan = self.plan();
        self.request_planned(&plan);
        plan
    }

    /// Installs the results of all finished tasks without waiting. Returns the number of
    /// processed results.
    pub fn process_completions(&mut self) -> usize {
        let mut processed = 0;
        while let Some(completion) = self.pipeline.try_next() {
            self.apply(completion);
            processed += 1;
        }

        processed
    }

    /// Waits for the next background task to finish and installs its result. Returns `false`
    /// if no task is running.
    pub async fn next_completion(&mut self) -> bool {
        match self.pipeline.next().await {
            Some(completion) => {
                self.apply(completion);
                true
            }
            None => false,
        }
    }

    /// Waits until all background tasks finish.
    pub async fn wait_idle(&mut self) {
        while self.next_completion().await {}
    }

    /// Loads all the tiles of the current view.
    ///
    /// Pending searches are finished first, so the tiles are loaded for the view they lead to.
    /// Tiles that fail to load are not retried.
    pub async fn load_visible_tiles(&mut self) {
        self.wait_idle().await;
        self.request_tiles();
        self.wait_idle().await;
    }

    /// Number of background tasks whose results were not installed yet.
    pub fn outstanding(&self) -> usize {
        self.pipeline.outstanding()
    }

    fn apply(&mut self, completion: Completion) {
        match completion {
            Completion::Tile(FetchResult { link, outcome }) => match outcome {
                Ok(tile) => {
                    log::debug!("Loaded {}", link.url);
                    self.cache.clear_in_flight(&link);
                    self.cache.store(link, tile.raw, tile.image);
                    self.redraw();
                }
                Err(err) => {
                    log::warn!("Failed to load {}: {err}", link.url);
                    match self.config.failed_tiles() {
                        FailedTilePolicy::Retry => self.cache.clear_in_flight(&link),
                        FailedTilePolicy::GiveUp => self.cache.mark_failed(link),
                    }
                }
            },
            Completion::Located { query, result } => match result {
                Ok(position) => {
                    let Some(center) = project(&position) else {
                        log::warn!("Search for '{query}' gave invalid position {position}");
                        return;
                    };

                    log::info!("Found '{query}' at {position}");
                    self.view = self
                        .view
                        .with_center(center)
                        .with_zoom(self.config.search_zoom());
                    self.redraw();
                }
                Err(err) => log::warn!("Search for '{query}' failed: {err}"),
            },
        }
    }

    /// Handles user input.
    pub fn handle(&mut self, event: UserEvent) {
        match event {
            UserEvent::Drag(delta) => self.move_by(-delta),
            UserEvent::Move(delta) => self.move_by(delta),
            UserEvent::ZoomIn => self.zoom_by(1),
            UserEvent::ZoomOut => self.zoom_by(-1),
            UserEvent::DoubleClick(position) => self.zoom_in_at(position),
            UserEvent::CenterOn(position) => self.center_on(&position),
            UserEvent::Search(text) => self.search(&text),
            UserEvent::Key(key) => self.handle(key.to_event(self.key_pan_step())),
            UserEvent::Resize(size) => self.set_viewport_size(size),
            UserEvent::SetHiDpi(hidpi) => self.set_hidpi(hidpi),
        }
    }

    /// Arrow key step in pixels, scaled with the tile size so that hiDPI tiles move as far.
    fn key_pan_step(&self) -> f64 {
        let scale = self.tile_size() as f64 / self.config.tile_size().max(1) as f64;
        self.config.key_pan_step() * scale
    }

    fn move_by(&mut self, delta_px: Vector2d) {
        self.view = self.view.moved_by_pixels(delta_px, self.tile_size());
        self.redraw();
    }

    fn zoom_by(&mut self, delta: i32) {
        self.view = self.view.zoomed_by(delta);
        log::debug!("Zoom level {}", self.view.effective_zoom());
        self.redraw();
    }

    fn zoom_in_at(&mut self, position: Point2d) {
        let from_center = position - self.viewport_center();
        self.view = self.view.moved_by_pixels(from_center, self.tile_size());
        self.view = self.view.zoomed_by(1);
        self.view = self.view.moved_by_pixels(-from_center, self.tile_size());
        self.redraw();
    }

    /// Moves the center of the view to the point.
    ///
    /// Latitudes beyond the Web Mercator range are clamped. Points with non-finite coordinates
    /// are ignored.
    pub fn center_on(&mut self, position: &GeoPoint2d) {
        let Some(center) = project(position) else {
            log::warn!("Cannot center the map on {position}");
            return;
        };

        self.view = self.view.with_center(center);
        self.redraw();
    }

    /// Centers the map on the search text.
    ///
    /// A `longitude,latitude` pair is applied immediately. Any other text is given to the
    /// geocoder in the background, and the map is centered on the first hit when the result is
    /// processed.
    pub fn search(&mut self, text: &str) {
        match parse_lonlat(text) {
            Ok(position) => self.center_on(&position),
            Err(err) => {
                log::debug!("{err}, asking the geocoder");
                self.pipeline
                    .search(self.geocoder.clone(), text.trim().to_string());
            }
        }
    }

    fn viewport_center(&self) -> Point2d {
        Point2d::new(
            self.viewport_size.width() as f64 / 2.0,
            self.viewport_size.height() as f64 / 2.0,
        )
    }

    /// Geographic position shown at the viewport pixel.
    pub fn position_at(&self, pixel: Point2d) -> GeoPoint2d {
        let offset = self
            .view
            .pixels_to_projected(pixel - self.viewport_center(), self.tile_size());
        to_geographic(&(self.view.center() + offset))
    }
}

fn project(position: &GeoPoint2d) -> Option<Point2d> {
    WebMercator::default().project(&position.clamp_to_mercator())
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::control::MapKey;
    use crate::tests::{CountingMessenger, StaticGeocoder, TestPlatformService};

    const TILE_URL: &str = "https://t/{layer}/{z}/{x}/{y}.png";

    struct Fixture {
        map: MapController,
        platform: Arc<TestPlatformService>,
        geocoder: Arc<StaticGeocoder>,
        messenger: Arc<CountingMessenger>,
    }

    fn fixture_with(config: MapConfig, platform: TestPlatformService, hits: Vec<GeoPoint2d>) -> Fixture {
        let platform = Arc::new(platform);
        let geocoder = Arc::new(StaticGeocoder::new(hits));
        let messenger = Arc::new(CountingMessenger::default());
        let mut map = MapController::with_services(
            config.with_tile_url(TILE_URL),
            platform.clone(),
            geocoder.clone(),
        )
        .unwrap()
        .with_messenger(messenger.clone());
        map.set_viewport_size(Size::new(800, 600));

        Fixture {
            map,
            platform,
            geocoder,
            messenger,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(
            MapConfig::default(),
            TestPlatformService::with_tiles(256),
            vec![],
        )
    }

    fn assert_center(map: &MapController, lon: f64, lat: f64) {
        let center = map.view().center_geo();
        assert_abs_diff_eq!(center.lon(), lon, epsilon = 1e-9);
        assert_abs_diff_eq!(center.lat(), lat, epsilon = 1e-9);
    }

    #[tokio::test]
    async fn loads_visible_tiles() {
        let Fixture { mut map, platform, .. } = fixture();
        map.load_visible_tiles().await;

        let plan = map.plan();
        assert!(!plan.is_empty());
        assert_eq!(platform.load_count(), plan.len());
        assert_eq!(map.cache().len(), plan.len());
        assert_eq!(map.cache().in_flight_count(), 0);
        assert!(plan
            .iter()
            .all(|tile| map.cache().lookup_image(&tile.link).is_some()));
        assert!(plan
            .iter()
            .all(|tile| tile.link.url.starts_with("https://t/osm-bright/8/")));
    }

    #[tokio::test]
    async fn tiles_are_requested_once() {
        let Fixture { mut map, platform, .. } = fixture();
        let requested = map.request_tiles();
        assert_eq!(requested, map.plan().len());
        assert_eq!(map.request_tiles(), 0);

        map.wait_idle().await;
        assert_eq!(map.request_tiles(), 0);
        assert_eq!(platform.load_count(), requested);
    }

    #[tokio::test]
    async fn frame_installs_results() {
        let Fixture { mut map, messenger, .. } = fixture();
        let redraws = messenger.redraws();

        let plan = map.frame();
        assert_eq!(map.outstanding(), plan.len());
        while map.outstanding() > 0 {
            tokio::task::yield_now().await;
            map.process_completions();
        }

        assert_eq!(map.cache().len(), plan.len());
        assert_eq!(messenger.redraws(), redraws + plan.len());
    }

    #[tokio::test]
    async fn failed_tiles_are_retried() {
        let Fixture {
            mut map, platform, ..
        } = fixture_with(MapConfig::default(), TestPlatformService::default(), vec![]);

        let requested = map.request_tiles();
        map.wait_idle().await;
        assert!(map.cache().is_empty());
        assert_eq!(map.cache().in_flight_count(), 0);

        assert_eq!(map.request_tiles(), requested);
        map.wait_idle().await;
        assert_eq!(platform.load_count(), requested * 2);
    }

    #[tokio::test]
    async fn failed_tiles_can_be_given_up() {
        let config = MapConfig::default().with_failed_tiles(FailedTilePolicy::GiveUp);
        let Fixture {
            mut map, platform, ..
        } = fixture_with(config, TestPlatformService::default(), vec![]);

        let requested = map.request_tiles();
        map.wait_idle().await;
        assert_eq!(map.request_tiles(), 0);
        assert_eq!(platform.load_count(), requested);
        assert!(map
            .plan()
            .iter()
            .all(|tile| map.cache().is_failed(&tile.link)));
    }

    #[tokio::test]
    async fn broken_image_fails_tile() {
        let Fixture {
            mut map, platform, ..
        } = fixture();
        let plan = map.plan();
        platform.respond(&plan[0].link.url, b"not an image");

        map.load_visible_tiles().await;
        assert!(map.cache().lookup_image(&plan[0].link).is_none());
        assert_eq!(map.cache().len(), plan.len() - 1);
    }

    #[test]
    fn zoom_is_limited() {
        let Fixture { mut map, .. } = fixture();
        map.handle(UserEvent::ZoomIn);
        assert_eq!(map.view().effective_zoom(), 9);

        for _ in 0..20 {
            map.handle(UserEvent::ZoomIn);
        }
        assert_eq!(map.view().effective_zoom(), 17);

        map.handle(UserEvent::ZoomOut);
        assert_eq!(map.view().effective_zoom(), 16);

        for _ in 0..20 {
            map.handle(UserEvent::Key(MapKey::Minus));
        }
        assert_eq!(map.view().effective_zoom(), 1);
    }

    #[test]
    fn drag_follows_pointer() {
        let Fixture { mut map, .. } = fixture();
        let start = map.view().center();

        map.handle(UserEvent::Drag(Vector2d::new(100.0, 0.0)));
        assert!(map.view().center().x < start.x);
        assert!(map.view().center_geo().lon() < 5.5);

        map.handle(UserEvent::Drag(Vector2d::new(-100.0, 0.0)));
        assert_abs_diff_eq!(map.view().center().x, start.x, epsilon = 1e-6);
    }

    #[test]
    fn arrow_keys_move_view() {
        let Fixture { mut map, .. } = fixture();
        let start = map.view().center_geo();

        map.handle(UserEvent::Key(MapKey::Right));
        assert!(map.view().center_geo().lon() > start.lon());

        map.handle(UserEvent::Key(MapKey::Up));
        assert!(map.view().center_geo().lat() > start.lat());

        let expected = map.position_at(Point2d::new(450.0, 300.0));
        map.handle(UserEvent::Key(MapKey::Right));
        let center = map.view().center_geo();
        assert_abs_diff_eq!(center.lon(), expected.lon(), epsilon = 1e-9);
        assert_abs_diff_eq!(center.lat(), expected.lat(), epsilon = 1e-9);
    }

    #[test]
    fn double_click_keeps_point_under_pointer() {
        let Fixture { mut map, .. } = fixture();
        let pointer = Point2d::new(650.0, 120.0);
        let before = map.position_at(pointer);

        map.handle(UserEvent::DoubleClick(pointer));
        assert_eq!(map.view().effective_zoom(), 9);

        let after = map.position_at(pointer);
        assert_abs_diff_eq!(before.lon(), after.lon(), epsilon = 1e-9);
        assert_abs_diff_eq!(before.lat(), after.lat(), epsilon = 1e-9);
    }

    #[test]
    fn double_click_at_center_only_zooms() {
        let Fixture { mut map, .. } = fixture();
        let center = map.view().center();

        map.handle(UserEvent::DoubleClick(Point2d::new(400.0, 300.0)));
        assert_eq!(map.view().effective_zoom(), 9);
        assert_abs_diff_eq!(map.view().center().x, center.x, epsilon = 1e-6);
        assert_abs_diff_eq!(map.view().center().y, center.y, epsilon = 1e-6);
    }

    #[test]
    fn center_on_clamps_latitude() {
        let Fixture { mut map, .. } = fixture();
        map.handle(UserEvent::CenterOn(GeoPoint2d::lonlat(10.0, 89.0)));
        assert!(map.view().center_geo().lat() < 85.06);
        assert_abs_diff_eq!(map.view().center_geo().lon(), 10.0, epsilon = 1e-9);
    }

    #[tokio::test]
    async fn search_with_coordinates() {
        let Fixture {
            mut map, geocoder, ..
        } = fixture();
        map.handle(UserEvent::Search(" 4.9, 52.37 ".into()));

        assert_center(&map, 4.9, 52.37);
        assert_eq!(map.view().effective_zoom(), 8);
        assert_eq!(map.outstanding(), 0);
        assert_eq!(geocoder.calls(), 0);
    }

    #[tokio::test]
    async fn search_with_geocoder() {
        let Fixture {
            mut map,
            geocoder,
            messenger,
            ..
        } = fixture_with(
            MapConfig::default(),
            TestPlatformService::with_tiles(256),
            vec![GeoPoint2d::lonlat(4.9, 52.37), GeoPoint2d::lonlat(0.0, 0.0)],
        );

        map.handle(UserEvent::Search("Amsterdam".into()));
        assert_center(&map, 5.5, 52.2);
        let redraws = messenger.redraws();

        assert!(map.next_completion().await);
        assert_center(&map, 4.9, 52.37);
        assert_eq!(map.view().effective_zoom(), 16);
        assert_eq!(geocoder.calls(), 1);
        assert_eq!(messenger.redraws(), redraws + 1);
    }

    #[tokio::test]
    async fn search_without_hits_keeps_view() {
        let Fixture { mut map, .. } = fixture();
        let view = *map.view();

        map.search("Atlantis");
        map.wait_idle().await;
        assert_eq!(*map.view(), view);
    }

    #[tokio::test]
    async fn non_finite_search_hit_keeps_view() {
        let Fixture { mut map, .. } = fixture_with(
            MapConfig::default(),
            TestPlatformService::with_tiles(256),
            vec![GeoPoint2d::lonlat(f64::NAN, f64::NAN)],
        );
        let view = *map.view();

        map.search("x");
        map.wait_idle().await;
        assert_eq!(*map.view(), view);

        map.handle(UserEvent::Drag(Vector2d::new(10.0, 10.0)));
        assert!(map.view().center().x.is_finite());
        assert!(map.view().center().y.is_finite());
    }

    #[tokio::test]
    async fn malformed_geocoder_response_keeps_view() {
        let platform = Arc::new(TestPlatformService::with_tiles(256));
        platform.respond(
            "https://geo.example.org/search?format=json&q=x",
            br#"[{"lon": "NaN", "lat": "NaN"}]"#,
        );
        let geocoder =
            NominatimGeocoder::new("https://geo.example.org/search?format=json", platform.clone())
                .unwrap();
        let mut map = MapController::with_services(
            MapConfig::default().with_tile_url(TILE_URL),
            platform,
            Arc::new(geocoder),
        )
        .unwrap();
        let view = *map.view();

        map.handle(UserEvent::Search("x".into()));
        map.wait_idle().await;
        assert_eq!(*map.view(), view);
        assert_eq!(map.view().effective_zoom(), 8);
    }

    #[test]
    fn center_on_ignores_non_finite_points() {
        let Fixture {
            mut map, messenger, ..
        } = fixture();
        let view = *map.view();
        let redraws = messenger.redraws();

        map.center_on(&GeoPoint2d::lonlat(f64::NAN, 10.0));
        map.handle(UserEvent::CenterOn(GeoPoint2d::lonlat(3.0, f64::INFINITY)));
        assert_eq!(*map.view(), view);
        assert_eq!(messenger.redraws(), redraws);
    }

    #[test]
    fn out_of_range_zoom_limits_are_rejected() {
        let services = || -> (Arc<TestPlatformService>, Arc<StaticGeocoder>) {
            (
                Arc::new(TestPlatformService::default()),
                Arc::new(StaticGeocoder::new(vec![])),
            )
        };

        let config: MapConfig = serde_json::from_str(r#"{"zoom_max": 4294967295}"#).unwrap();
        let (platform, geocoder) = services();
        let result = MapController::with_services(config, platform, geocoder);
        assert!(matches!(result, Err(TilemapError::Config(_))));

        let (platform, geocoder) = services();
        let result = MapController::with_services(
            MapConfig::default().with_zoom_limits(0, 40),
            platform,
            geocoder,
        );
        assert!(matches!(result, Err(TilemapError::Config(_))));

        let (platform, geocoder) = services();
        let map = MapController::with_services(
            MapConfig::default()
                .with_tile_url(TILE_URL)
                .with_zoom_limits(0, 30)
                .with_zoom(100),
            platform,
            geocoder,
        )
        .unwrap();
        assert_eq!(map.view().effective_zoom(), 30);
    }

    #[test]
    fn arrow_keys_pan_as_far_with_hidpi() {
        let Fixture { mut map, .. } = fixture();
        let start = map.view().center_geo();
        map.handle(UserEvent::Key(MapKey::Right));
        let standard_step = map.view().center_geo().lon() - start.lon();

        let Fixture { mut map, .. } = fixture_with(
            MapConfig::default().with_hidpi(true),
            TestPlatformService::with_tiles(512),
            vec![],
        );
        assert_eq!(map.tile_size(), 512);
        map.handle(UserEvent::Key(MapKey::Right));
        let hidpi_step = map.view().center_geo().lon() - start.lon();

        assert!(standard_step > 0.0);
        assert_abs_diff_eq!(hidpi_step, standard_step, epsilon = 1e-9);
    }

    #[tokio::test]
    async fn layers_are_cached_separately() {
        let Fixture {
            mut map, platform, ..
        } = fixture();
        map.load_visible_tiles().await;
        let first_layer = platform.load_count();

        map.set_layer("dark-matter").unwrap();
        assert_eq!(map.layer(), "dark-matter");
        assert!(map
            .plan()
            .iter()
            .all(|tile| tile.link.url.starts_with("https://t/dark-matter/")));
        map.load_visible_tiles().await;
        assert_eq!(platform.load_count(), first_layer * 2);

        map.set_layer("osm-bright").unwrap();
        assert_eq!(map.request_tiles(), 0);
        assert!(map.set_layer("satellite").is_err());
    }

    #[test]
    fn hidpi_tiles() {
        let Fixture {
            mut map, messenger, ..
        } = fixture();
        let redraws = messenger.redraws();

        map.handle(UserEvent::SetHiDpi(true));
        assert_eq!(map.tile_size(), 512);
        assert_eq!(messenger.redraws(), redraws + 1);
        assert!(map
            .plan()
            .iter()
            .all(|tile| tile.link.url.starts_with("https://t/osm-bright@2x/8/")));
    }

    #[test]
    fn resize_requests_redraw() {
        let Fixture {
            mut map, messenger, ..
        } = fixture();
        let redraws = messenger.redraws();

        map.handle(UserEvent::Resize(Size::new(1024, 768)));
        assert_eq!(map.viewport_size(), Size::new(1024, 768));
        map.handle(UserEvent::Resize(Size::new(1024, 768)));
        assert_eq!(messenger.redraws(), redraws + 1);
    }

    #[test]
    fn no_layers_is_an_error() {
        let config = MapConfig::default().with_layers(Vec::<String>::new());
        let result = MapController::with_services(
            config,
            Arc::new(TestPlatformService::default()),
            Arc::new(StaticGeocoder::new(vec![])),
        );
        assert!(matches!(result, Err(TilemapError::Template(_))));
    }
}
