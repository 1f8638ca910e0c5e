//! Error types used by the crate.

use image::ImageError;
use thiserror::Error;

/// Tilemap error type.
///
/// None of these errors is fatal for the map: they are logged and affect only the tile or the
/// user action that caused them.
#[derive(Debug, Error)]
pub enum TilemapError {
    /// Transport failure or a response with a status other than `200 OK`.
    #[error("network error: {0}")]
    Network(String),
    /// Image bytes cannot be decoded.
    #[error("image decode error: {0:?}")]
    Decode(#[from] ImageError),
    /// Text is not a `longitude,latitude` pair.
    #[error("cannot parse coordinates: {0}")]
    Parse(String),
    /// Geocoding service gave no hits or a malformed response.
    #[error("geocoding failed: {0}")]
    Geocode(String),
    /// Tile URL template is invalid.
    #[error("invalid tile url template: {0}")]
    Template(String),
    /// Map configuration has values outside of their allowed range.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Background task stopped without producing a result.
    #[error("background task was aborted")]
    Aborted,
}

impl From<reqwest::Error> for TilemapError {
    fn from(value: reqwest::Error) -> Self {
        Self::Network(value.to_string())
    }
}

impl From<serde_json::Error> for TilemapError {
    fn from(value: serde_json::Error) -> Self {
        Self::Geocode(value.to_string())
    }
}
