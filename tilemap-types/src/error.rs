//! Error type used by the crate.

use thiserror::Error;

/// Error enum.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TilemapTypesError {
    /// Tile coordinates are outside of the `0..2^z` grid of their zoom level.
    #[error("tile index ({x}, {y}) is out of range for zoom level {z}")]
    InvalidTileIndex {
        /// X index.
        x: i64,
        /// Y index.
        y: i64,
        /// Zoom level.
        z: u32,
    },
}
