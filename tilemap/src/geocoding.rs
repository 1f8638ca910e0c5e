//! Resolving free text into a map position.
//!
//! A search text is first tried as a `longitude,latitude` pair (see [`parse_lonlat`]). Anything
//! else is given to a [`Geocoder`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use tilemap_types::geo::GeoPoint2d;

use crate::error::TilemapError;
use crate::platform::PlatformService;

/// Service that finds places by a free text query.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Returns the candidate positions for the query, best match first.
    async fn search(&self, query: &str) -> Result<Vec<GeoPoint2d>, TilemapError>;
}

/// Parses a `longitude,latitude` pair, like `5.5,52.2`.
pub fn parse_lonlat(text: &str) -> Result<GeoPoint2d, TilemapError> {
    let mut parts = text.split(',');
    let (Some(lon), Some(lat), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(TilemapError::Parse(format!(
            "expected 'longitude,latitude', got '{text}'"
        )));
    };

    let parse = |value: &str| {
        value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| TilemapError::Parse(format!("'{value}' is not a number")))
    };

    Ok(GeoPoint2d::lonlat(parse(lon)?, parse(lat)?))
}

/// Geocoder using the search API of a Nominatim server.
pub struct NominatimGeocoder {
    base_url: Url,
    platform: Arc<dyn PlatformService>,
}

#[derive(Debug, Deserialize)]
struct NominatimHit {
    lon: String,
    lat: String,
    #[serde(default)]
    display_name: String,
}

impl NominatimGeocoder {
    /// Creates a geocoder for the search endpoint at `base_url`, for example
    /// `https://nominatim.openstreetmap.org/search.php?format=json`. The query is appended as
    /// the `q` parameter.
    pub fn new(base_url: &str, platform: Arc<dyn PlatformService>) -> Result<Self, TilemapError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| TilemapError::Geocode(format!("invalid url {base_url}: {err}")))?;
        Ok(Self { base_url, platform })
    }

    fn query_url(&self, query: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("q", query);
        url
    }

    fn parse_hits(data: &[u8]) -> Result<Vec<GeoPoint2d>, TilemapError> {
        let hits: Vec<NominatimHit> = serde_json::from_slice(data)?;
        hits.into_iter()
            .map(|hit| {
                let lon = hit.lon.parse::<f64>().ok().filter(|v| v.is_finite());
                let lat = hit.lat.parse::<f64>().ok().filter(|v| v.is_finite());
                match (lon, lat) {
                    (Some(lon), Some(lat)) => Ok(GeoPoint2d::lonlat(lon, lat)),
                    _ => Err(TilemapError::Geocode(format!(
                        "invalid location '{}, {}' of '{}'",
                        hit.lon, hit.lat, hit.display_name
                    ))),
                }
            })
            .collect()
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<GeoPoint2d>, TilemapError> {
        let url = self.query_url(query);
        log::info!("Searching for '{query}'");
        let data = self.platform.load_bytes_from_url(url.as_str()).await?;
        Self::parse_hits(&data)
    }
}

/// Returns the first candidate for the query.
pub(crate) async fn locate(geocoder: &dyn Geocoder, query: &str) -> Result<GeoPoint2d, TilemapError> {
    geocoder
        .search(query)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| TilemapError::Geocode(format!("no hits for '{query}'")))
}
