//! Test doubles for the network, the image decoder and the application.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ahash::{HashMap, HashMapExt};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tilemap_types::geo::GeoPoint2d;

use crate::decoded_image::DecodedImage;
use crate::error::TilemapError;
use crate::geocoding::Geocoder;
use crate::messenger::Messenger;
use crate::platform::PlatformService;

pub fn png_bytes(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba(color));
    let mut bytes = vec![];
    image::DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageOutputFormat::Png)
        .expect("failed to encode test image");
    bytes
}

/// Platform service serving canned responses.
///
/// Urls without a canned response are answered with a solid tile if a default tile is set, and
/// with a network error otherwise.
#[derive(Default)]
pub struct TestPlatformService {
    responses: Mutex<HashMap<String, Bytes>>,
    default_tile: Mutex<Option<Bytes>>,
    loads: Mutex<Vec<String>>,
    decodes: AtomicUsize,
}

impl TestPlatformService {
    pub fn with_tiles(size: u32) -> Self {
        let service = Self::default();
        *service.default_tile.lock() = Some(png_bytes(size, size, [0, 128, 255, 255]).into());
        service
    }

    pub fn respond(&self, url: &str, data: &[u8]) {
        self.responses
            .lock()
            .insert(url.to_string(), Bytes::copy_from_slice(data));
    }

    pub fn loads(&self) -> Vec<String> {
        self.loads.lock().clone()
    }

    pub fn load_count(&self) -> usize {
        self.loads.lock().len()
    }

    pub fn decode_count(&self) -> usize {
        self.decodes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PlatformService for TestPlatformService {
    async fn load_bytes_from_url(&self, url: &str) -> Result<Bytes, TilemapError> {
        self.loads.lock().push(url.to_string());
        if let Some(data) = self.responses.lock().get(url) {
            return Ok(data.clone());
        }

        self.default_tile
            .lock()
            .clone()
            .ok_or_else(|| TilemapError::Network(format!("no response for {url}")))
    }

    async fn decode_image(&self, image_data: Bytes) -> Result<DecodedImage, TilemapError> {
        self.decodes.fetch_add(1, Ordering::Relaxed);
        DecodedImage::decode(&image_data)
    }
}

/// Geocoder returning the same candidates for every query.
pub struct StaticGeocoder {
    hits: Vec<GeoPoint2d>,
    calls: AtomicUsize,
}

impl StaticGeocoder {
    pub fn new(hits: Vec<GeoPoint2d>) -> Self {
        Self {
            hits,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn search(&self, _query: &str) -> Result<Vec<GeoPoint2d>, TilemapError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.hits.clone())
    }
}

#[derive(Default)]
pub struct CountingMessenger {
    redraws: AtomicUsize,
}

impl CountingMessenger {
    pub fn redraws(&self) -> usize {
        self.redraws.load(Ordering::Relaxed)
    }
}

impl Messenger for Arc<CountingMessenger> {
    fn request_redraw(&self) {
        self.redraws.fetch_add(1, Ordering::Relaxed);
    }
}
