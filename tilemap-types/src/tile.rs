//! Slippy map tile addresses and the conversions between them and the coordinate spaces of
//! [`geo`](crate::geo).
//!
//! At zoom level `z` the world is covered by `2^z × 2^z` square tiles. Tile `(0, 0)` is at the
//! top left corner (north-west), `x` grows to the east and `y` grows to the south.

use std::f64::consts::PI;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::cartesian::{Point2d, Vector2d};
use crate::error::TilemapTypesError;
use crate::geo::{to_projected, GeoPoint2d};

/// Highest zoom level for which tile indices fit into `u32`.
pub const MAX_ZOOM: u32 = 30;

/// Tile index.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileIndex {
    /// X index.
    pub x: u32,
    /// Y index.
    pub y: u32,
    /// Z index.
    pub z: u32,
}

/// Number of tiles along one axis at the zoom level `z`.
pub fn tiles_per_axis(z: u32) -> u32 {
    1 << z.min(MAX_ZOOM)
}

impl TileIndex {
    /// Create a new index instance.
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Creates an index checking that it is inside the tile grid of its zoom level.
    pub fn try_new(x: i64, y: i64, z: u32) -> Result<Self, TilemapTypesError> {
        let n = tiles_per_axis(z) as i64;
        if z > MAX_ZOOM || !(0..n).contains(&x) || !(0..n).contains(&y) {
            return Err(TilemapTypesError::InvalidTileIndex { x, y, z });
        }

        Ok(Self::new(x as u32, y as u32, z))
    }

    /// True if both indices are inside the `0..2^z` grid.
    pub fn is_valid(&self) -> bool {
        let n = tiles_per_axis(self.z);
        self.z <= MAX_ZOOM && self.x < n && self.y < n
    }

    /// Returns the tile that contains the given geographic point at the zoom level `z`.
    ///
    /// Points on the east and south borders of the world (longitude 180) belong to the last
    /// column/row, so the result always satisfies [`TileIndex::is_valid`]. The latitude must be
    /// in the Web Mercator range.
    pub fn containing(point: &GeoPoint2d, z: u32) -> Self {
        let z = z.min(MAX_ZOOM);
        let n = tiles_per_axis(z) as f64;
        let lat_rad = point.lat_rad();

        let x = ((point.lon() + 180.0) / 360.0 * n).floor();
        let y = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n).floor();

        let max = n - 1.0;
        Self::new(x.clamp(0.0, max) as u32, y.clamp(0.0, max) as u32, z)
    }

    /// Geographic coordinates of the top left (north-west) corner of the tile.
    ///
    /// Indices equal to `2^z` are accepted and give the south/east borders of the world.
    pub fn top_left_geo(&self) -> GeoPoint2d {
        let n = tiles_per_axis(self.z) as f64;
        let lon = self.x as f64 / n * 360.0 - 180.0;
        let lat = (PI * (1.0 - 2.0 * self.y as f64 / n)).sinh().atan().to_degrees();
        GeoPoint2d::lonlat(lon, lat)
    }

    /// Projected coordinates of the top left corner of the tile.
    pub fn top_left_projected(&self) -> Point2d {
        to_projected(&self.top_left_geo())
    }

    /// Size of the tile in projected units, as the vector from the top left corner to the bottom
    /// right corner.
    ///
    /// The northing component is negative because `y` grows to the south. It depends on `z` and
    /// `y` but not on `x`.
    pub fn projected_size(&self) -> Vector2d {
        let bottom_right = TileIndex::new(self.x + 1, self.y + 1, self.z);
        bottom_right.top_left_projected() - self.top_left_projected()
    }
}

impl Display for TileIndex {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "tile(x {}, y {}, z {})", self.x, self.y, self.z)
    }
}
