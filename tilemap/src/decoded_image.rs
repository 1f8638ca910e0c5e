//! This module contains utilities for loading images to be rendered on the map.

use tilemap_types::cartesian::Size;

use crate::error::TilemapError;

/// An image that has been loaded into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Raw bytes of the image, in RGBA order.
    bytes: Vec<u8>,
    /// Width and height of the image.
    dimensions: Size<u32>,
}

impl DecodedImage {
    /// Decode an image from a byte slice.
    ///
    /// Attempts to guess the format of the image from the data. Non-RGBA images
    /// will be converted to RGBA.
    pub fn decode(bytes: &[u8]) -> Result<Self, TilemapError> {
        let decoded = image::load_from_memory(bytes)?.to_rgba8();
        let dimensions = Size::new(decoded.width(), decoded.height());

        Ok(Self {
            bytes: decoded.into_raw(),
            dimensions,
        })
    }

    /// Creates an image from RGBA bytes. Returns `None` if the number of bytes does not match
    /// the dimensions.
    pub fn from_raw(bytes: Vec<u8>, dimensions: Size<u32>) -> Option<Self> {
        let expected = dimensions.width() as usize * dimensions.height() as usize * 4;
        if bytes.len() != expected {
            return None;
        }

        Some(Self { bytes, dimensions })
    }

    /// RGBA bytes of the image, row by row.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size of the image in pixels.
    pub fn size(&self) -> Size<u32> {
        self.dimensions
    }

    /// Width of the image in pixels.
    pub fn width(&self) -> u32 {
        self.dimensions.width()
    }

    /// Height of the image in pixels.
    pub fn height(&self) -> u32 {
        self.dimensions.height()
    }

    /// RGBA bytes of the pixels `x..x + len` in the row `y`.
    ///
    /// Returns `None` if the span does not fit into the image.
    pub fn row_span(&self, x: u32, y: u32, len: u32) -> Option<&[u8]> {
        if x.checked_add(len)? > self.width() || y >= self.height() {
            return None;
        }

        let start = (y as usize * self.width() as usize + x as usize) * 4;
        self.bytes.get(start..start + len as usize * 4)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::tests::png_bytes;

    #[test]
    fn decode_png() {
        let image = DecodedImage::decode(&png_bytes(4, 3, [10, 20, 30, 255])).unwrap();
        assert_eq!(image.size(), Size::new(4, 3));
        assert_eq!(image.bytes().len(), 4 * 3 * 4);
        assert_eq!(&image.bytes()[0..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn decode_garbage_fails() {
        assert_matches!(
            DecodedImage::decode(b"definitely not a png"),
            Err(TilemapError::Decode(_))
        );
    }

    #[test]
    fn from_raw_checks_length() {
        assert!(DecodedImage::from_raw(vec![0; 16], Size::new(2, 2)).is_some());
        assert!(DecodedImage::from_raw(vec![0; 15], Size::new(2, 2)).is_none());
    }

    #[test]
    fn row_span_bounds() {
        let mut bytes = vec![0; 3 * 2 * 4];
        bytes[(3 + 1) * 4] = 7;
        let image = DecodedImage::from_raw(bytes, Size::new(3, 2)).unwrap();

        assert_eq!(image.row_span(1, 1, 2).unwrap()[0], 7);
        assert!(image.row_span(2, 1, 2).is_none());
        assert!(image.row_span(0, 2, 1).is_none());
    }
}
