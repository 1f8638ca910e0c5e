//! Geographic coordinates (longitude and latitude) and their projection into the Web Mercator
//! plane.

mod datum;
mod point;
mod web_mercator;

pub use datum::Datum;
pub use point::{GeoPoint2d, MAX_MERCATOR_LATITUDE};
pub use web_mercator::{to_geographic, to_projected, WebMercator};
