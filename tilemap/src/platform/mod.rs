//! Provides platform specific logic and [`PlatformService`] to access it.
//!
//! Tiles and geocoding responses are loaded through this trait, so that the rest of the crate
//! does not depend on a specific network client or image decoder.

use async_trait::async_trait;
use bytes::Bytes;

use crate::decoded_image::DecodedImage;
use crate::error::TilemapError;

mod native;
pub use native::NativePlatformService;

/// Service providing network access and image decoding.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Loads a byte array from the given url.
    ///
    /// Any response status other than `200 OK` is returned as [`TilemapError::Network`].
    async fn load_bytes_from_url(&self, url: &str) -> Result<Bytes, TilemapError>;

    /// Decodes an image from raw byte data.
    async fn decode_image(&self, image_data: Bytes) -> Result<DecodedImage, TilemapError>;
}
