use async_trait::async_trait;
use bytes::Bytes;
use log::info;
use reqwest::StatusCode;

use crate::decoded_image::DecodedImage;
use crate::error::TilemapError;
use crate::platform::PlatformService;

/// Platform service that loads data with `reqwest` and decodes images with the `image` crate on
/// the blocking thread pool of `tokio`.
#[derive(Debug, Clone)]
pub struct NativePlatformService {
    http_client: reqwest::Client,
}

impl NativePlatformService {
    /// Creates a new service sending the given `User-Agent` header with every request.
    pub fn new(user_agent: &str) -> Result<Self, TilemapError> {
        let http_client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl PlatformService for NativePlatformService {
    async fn load_bytes_from_url(&self, url: &str) -> Result<Bytes, TilemapError> {
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            info!("Failed to load {url}: {status}");
            return Err(TilemapError::Network(format!(
                "response status is {status} instead of 200"
            )));
        }

        Ok(response.bytes().await?)
    }

    async fn decode_image(&self, image_data: Bytes) -> Result<DecodedImage, TilemapError> {
        match tokio::task::spawn_blocking(move || DecodedImage::decode(&image_data)).await {
            Ok(result) => result,
            Err(join_error) => Err(image::ImageError::IoError(std::io::Error::other(
                join_error.to_string(),
            ))
            .into()),
        }
    }
}
