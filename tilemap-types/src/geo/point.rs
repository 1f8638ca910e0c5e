use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Largest latitude (in degrees) that the Web Mercator projection can show. At this latitude the
/// projected map is a square.
pub const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_779_806_6;

/// 2d point on the surface of the Earth in WGS84 degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct GeoPoint2d {
    lat: f64,
    lon: f64,
}

impl GeoPoint2d {
    /// Creates a point from latitude and longitude.
    pub const fn latlon(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Creates a point from longitude and latitude.
    pub const fn lonlat(lon: f64, lat: f64) -> Self {
        Self { lat, lon }
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Latitude in radians.
    pub fn lat_rad(&self) -> f64 {
        self.lat.to_radians()
    }

    /// Longitude in radians.
    pub fn lon_rad(&self) -> f64 {
        self.lon.to_radians()
    }

    /// True if the point can be projected into Web Mercator.
    pub fn is_in_mercator_range(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && self.lat.abs() < MAX_MERCATOR_LATITUDE
    }

    /// Returns the point with the latitude clamped into the Web Mercator range and the
    /// longitude clamped into `[-180, 180]`.
    pub fn clamp_to_mercator(&self) -> Self {
        // slightly inside the limit, so that the tile row stays inside the grid
        let max_lat = MAX_MERCATOR_LATITUDE - 1e-9;
        Self {
            lat: self.lat.clamp(-max_lat, max_lat),
            lon: self.lon.clamp(-180.0, 180.0),
        }
    }
}

impl Display for GeoPoint2d {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "(lon {}, lat {})", self.lon, self.lat)
    }
}

/// Creates a new GeoPoint2d from latitude and longitude values (in degrees).
///
/// ```
/// use tilemap_types::latlon;
///
/// let point = latlon!(52.2, 5.5);
/// assert_eq!(point.lat(), 52.2);
/// assert_eq!(point.lon(), 5.5);
/// ```
#[macro_export]
macro_rules! latlon {
    ($lat:expr, $lon:expr) => {
        $crate::geo::GeoPoint2d::latlon($lat, $lon)
    };
}
