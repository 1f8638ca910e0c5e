use std::f64::consts::FRAC_PI_4;

use crate::cartesian::Point2d;
use crate::geo::datum::Datum;
use crate::geo::point::GeoPoint2d;

/// Web Mercator projection (EPSG:3857) on a sphere with the radius of the datum semimajor axis.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WebMercator {
    datum: Datum,
}

impl WebMercator {
    /// Creates a projection over the given datum.
    pub fn new(datum: Datum) -> Self {
        Self { datum }
    }

    fn forward(&self, input: &GeoPoint2d) -> Point2d {
        let a = self.datum.semimajor();
        let easting = a * input.lon_rad();
        let northing = a * (FRAC_PI_4 + input.lat_rad() / 2.0).tan().ln();
        Point2d::new(easting, northing)
    }

    /// Projects a point, returning `None` if it lies outside of the Mercator band or is not
    /// finite.
    pub fn project(&self, input: &GeoPoint2d) -> Option<Point2d> {
        if !input.is_in_mercator_range() {
            return None;
        }

        let projected = self.forward(input);
        (projected.x.is_finite() && projected.y.is_finite()).then_some(projected)
    }

    fn inverse(&self, input: &Point2d) -> GeoPoint2d {
        let a = self.datum.semimajor();
        let lon = (input.x / a).to_degrees();
        let lat = (2.0 * ((input.y / a).exp().atan() - FRAC_PI_4)).to_degrees();
        GeoPoint2d::latlon(lat, lon)
    }
}

impl Default for WebMercator {
    fn default() -> Self {
        Self::new(Datum::WGS84)
    }
}

/// Projects a geographic point into Web Mercator meters.
///
/// The latitude must lie inside the Mercator band (see
/// [`MAX_MERCATOR_LATITUDE`](crate::geo::MAX_MERCATOR_LATITUDE)), otherwise the northing
/// diverges.
pub fn to_projected(point: &GeoPoint2d) -> Point2d {
    WebMercator::default().forward(point)
}

/// Converts Web Mercator meters back into a geographic point.
pub fn to_geographic(point: &Point2d) -> GeoPoint2d {
    WebMercator::default().inverse(point)
}
