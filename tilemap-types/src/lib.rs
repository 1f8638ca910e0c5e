//! Coordinate types used by the `tilemap` engine.
//!
//! Three coordinate spaces are involved in showing a slippy map:
//!
//! * geographic coordinates ([`geo::GeoPoint2d`]) in degrees of WGS84 longitude and latitude,
//! * projected coordinates ([`cartesian::Point2d`]) in meters of the Web Mercator projection
//!   (EPSG:3857), see [`geo::WebMercator`],
//! * discrete tile addresses ([`tile::TileIndex`]) of the standard slippy map tiling scheme.
//!
//! The functions in the [`tile`] module convert between them.

pub mod cartesian;
pub mod error;
pub mod geo;
pub mod tile;

pub use tile::TileIndex;
