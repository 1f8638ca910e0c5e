use std::f64::consts::PI;

use tilemap_types::cartesian::{Point2d, Vector2d};
use tilemap_types::geo::{to_geographic, to_projected, GeoPoint2d};
use tilemap_types::tile::MAX_ZOOM;
use tilemap_types::TileIndex;

/// Half of the width (and height) of the Web Mercator world square.
const HALF_WORLD: f64 = PI * 6_378_137.0;

/// Position of the map: the projected point in the center of the viewport and the zoom level.
///
/// The zoom level is stored as requested, while everything that uses it takes the
/// [effective zoom](ViewState::effective_zoom), clamped into `zoom_min..=zoom_max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    center: Point2d,
    zoom: i32,
    zoom_min: u32,
    zoom_max: u32,
}

impl ViewState {
    /// Creates a new view. If `zoom_min > zoom_max` the limits are swapped, and both are capped
    /// at [`MAX_ZOOM`].
    ///
    /// The center is [normalized](ViewState::with_center).
    pub fn new(center: Point2d, zoom: i32, zoom_min: u32, zoom_max: u32) -> Self {
        let zoom_min = zoom_min.min(MAX_ZOOM);
        let zoom_max = zoom_max.min(MAX_ZOOM);
        Self {
            center: normalize(center),
            zoom,
            zoom_min: zoom_min.min(zoom_max),
            zoom_max: zoom_max.max(zoom_min),
        }
    }

    /// Creates a view centered at the geographic point. The point is clamped into the Web
    /// Mercator range.
    pub fn from_geo(center: &GeoPoint2d, zoom: i32, zoom_min: u32, zoom_max: u32) -> Self {
        Self::new(
            to_projected(&center.clamp_to_mercator()),
            zoom,
            zoom_min,
            zoom_max,
        )
    }

    /// Projected center of the view.
    pub fn center(&self) -> Point2d {
        self.center
    }

    /// Geographic center of the view.
    pub fn center_geo(&self) -> GeoPoint2d {
        to_geographic(&self.center)
    }

    /// Zoom level as it was set, possibly outside of the limits.
    pub fn zoom(&self) -> i32 {
        self.zoom
    }

    /// Minimum zoom level.
    pub fn zoom_min(&self) -> u32 {
        self.zoom_min
    }

    /// Maximum zoom level.
    pub fn zoom_max(&self) -> u32 {
        self.zoom_max
    }

    /// Zoom level clamped into the limits.
    pub fn effective_zoom(&self) -> u32 {
        i64::from(self.zoom).clamp(i64::from(self.zoom_min), i64::from(self.zoom_max)) as u32
    }

    /// Tile containing the center at the effective zoom level.
    pub fn center_tile(&self) -> TileIndex {
        TileIndex::containing(&self.center_geo().clamp_to_mercator(), self.effective_zoom())
    }

    /// Returns the view with another center.
    ///
    /// Easting is wrapped around the antimeridian and northing is clamped to the top and bottom
    /// borders of the world, so the center always stays on the map.
    pub fn with_center(&self, center: Point2d) -> Self {
        Self {
            center: normalize(center),
            ..*self
        }
    }

    /// Returns the view with another zoom level.
    pub fn with_zoom(&self, zoom: i32) -> Self {
        Self { zoom, ..*self }
    }

    /// Returns the view with the zoom level changed by `delta` starting from the effective zoom.
    pub fn zoomed_by(&self, delta: i32) -> Self {
        self.with_zoom((self.effective_zoom() as i32).saturating_add(delta))
    }

    /// Projected distance covered by a pixel delta at the current center.
    ///
    /// Uses the projected size of the tile containing the center, so that one tile of
    /// `tile_size` pixels corresponds to one tile of the grid.
    pub fn pixels_to_projected(&self, delta_px: Vector2d, tile_size: u32) -> Vector2d {
        let tile_size = tile_size.max(1) as f64;
        let projected = self.center_tile().projected_size();
        Vector2d::new(
            projected.x * delta_px.x / tile_size,
            projected.y * delta_px.y / tile_size,
        )
    }

    /// Returns the view moved by the given number of pixels. Positive `x` moves the view to
    /// the east, positive `y` to the south.
    pub fn moved_by_pixels(&self, delta_px: Vector2d, tile_size: u32) -> Self {
        self.with_center(self.center + self.pixels_to_projected(delta_px, tile_size))
    }
}

fn normalize(center: Point2d) -> Point2d {
    let x = (center.x + HALF_WORLD).rem_euclid(2.0 * HALF_WORLD) - HALF_WORLD;
    let y = center.y.clamp(-HALF_WORLD, HALF_WORLD);
    Point2d::new(x, y)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn view(zoom: i32) -> ViewState {
        ViewState::from_geo(&GeoPoint2d::lonlat(5.5, 52.2), zoom, 1, 17)
    }

    #[test]
    fn effective_zoom_is_clamped() {
        assert_eq!(view(8).effective_zoom(), 8);
        assert_eq!(view(0).effective_zoom(), 1);
        assert_eq!(view(-5).effective_zoom(), 1);
        assert_eq!(view(20).effective_zoom(), 17);
        assert_eq!(view(20).zoom(), 20);
    }

    #[test]
    fn limits_are_ordered() {
        let view = ViewState::new(Point2d::origin(), 3, 10, 2);
        assert_eq!(view.zoom_min(), 2);
        assert_eq!(view.zoom_max(), 10);
        assert_eq!(view.effective_zoom(), 3);
    }

    #[test]
    fn limits_are_capped_at_max_zoom() {
        let view = ViewState::new(Point2d::origin(), i32::MAX, 1, u32::MAX);
        assert_eq!(view.zoom_max(), MAX_ZOOM);
        assert_eq!(view.effective_zoom(), MAX_ZOOM);
        assert_eq!(view.center_tile().z, MAX_ZOOM);
        assert_eq!(view.zoomed_by(1).effective_zoom(), MAX_ZOOM);
    }

    #[test]
    fn zoom_steps_from_effective_level() {
        let above = view(20);
        assert_eq!(above.zoomed_by(-1).effective_zoom(), 16);
        assert_eq!(view(17).zoomed_by(1).effective_zoom(), 17);
        assert_eq!(view(17).zoomed_by(1).zoomed_by(-1).effective_zoom(), 16);
    }

    #[test]
    fn center_tile() {
        assert_eq!(view(8).center_tile(), TileIndex::new(131, 84, 8));
    }

    #[test]
    fn moving_by_a_tile() {
        let start = view(8);
        let tile = start.center_tile().projected_size();
        let moved = start.moved_by_pixels(Vector2d::new(256.0, 256.0), 256);

        assert_abs_diff_eq!(moved.center().x - start.center().x, tile.x, epsilon = 1e-6);
        assert_abs_diff_eq!(moved.center().y - start.center().y, tile.y, epsilon = 1e-6);
        assert!(moved.center_geo().lat() < start.center_geo().lat());
        assert!(moved.center_geo().lon() > start.center_geo().lon());
    }

    #[test]
    fn center_wraps_around_antimeridian() {
        let view = ViewState::new(Point2d::new(HALF_WORLD - 10.0, 0.0), 3, 1, 17);
        let moved = view.with_center(view.center() + Vector2d::new(30.0, 0.0));
        assert_abs_diff_eq!(moved.center().x, -HALF_WORLD + 20.0, epsilon = 1e-6);
    }

    #[test]
    fn center_stays_inside_the_world() {
        let view = ViewState::new(Point2d::new(0.0, HALF_WORLD * 2.0), 3, 1, 17);
        assert_abs_diff_eq!(view.center().y, HALF_WORLD);
        assert_eq!(view.center_tile().y, 0);
    }
}
