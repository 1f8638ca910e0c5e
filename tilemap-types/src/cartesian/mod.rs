//! Types and functions on geometries in cartesian coordinates.
//!
//! Projected coordinates use `nalgebra` points and vectors, screen coordinates use integer
//! pixels.

mod rect;
mod size;

pub use rect::Rect;
pub use size::Size;

/// Point in projected coordinates (easting, northing).
pub type Point2d = nalgebra::Point2<f64>;

/// Vector in projected coordinates.
pub type Vector2d = nalgebra::Vector2<f64>;
