//! Background loading of tiles.
//!
//! Every tile that is needed and not cached gets its own task. Tasks share no state: each of
//! them sends exactly one [`Completion`] into the channel of the pipeline, and the owner of the
//! [`TileCache`] consumes the completions in the order they arrive.
//!
//! Tasks are not cancelled when their tile leaves the viewport, and the number of simultaneous
//! tasks is not limited. A fast pan over a large screen at a high zoom level may start many
//! requests at once.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tilemap_types::geo::GeoPoint2d;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::decoded_image::DecodedImage;
use crate::error::TilemapError;
use crate::geocoding::{locate, Geocoder};
use crate::platform::PlatformService;
use crate::tile_cache::{TileCache, TileLink};

/// Tile data produced by a successful task.
#[derive(Debug, Clone)]
pub struct LoadedTile {
    /// Bytes as received from the server.
    pub raw: Bytes,
    /// Decoded image.
    pub image: Arc<DecodedImage>,
}

/// Result of loading or decoding one tile.
#[derive(Debug)]
pub struct FetchResult {
    /// The tile the task worked on.
    pub link: TileLink,
    /// Loaded tile or the reason of the failure.
    pub outcome: Result<LoadedTile, TilemapError>,
}

/// Message sent by a background task when it finishes.
#[derive(Debug)]
pub enum Completion {
    /// A tile task finished.
    Tile(FetchResult),
    /// A geocoding search finished.
    Located {
        /// The search text.
        query: String,
        /// Best candidate for the query.
        result: Result<GeoPoint2d, TilemapError>,
    },
}

impl Completion {
    fn aborted_tile(link: TileLink) -> Self {
        Self::Tile(FetchResult {
            link,
            outcome: Err(TilemapError::Aborted),
        })
    }
}

/// Sends exactly one completion for a task: its result, or the fallback if the task is dropped
/// before finishing.
struct CompletionGuard {
    sender: UnboundedSender<Completion>,
    aborted: Option<Completion>,
}

impl CompletionGuard {
    fn complete(mut self, completion: Completion) {
        self.aborted = None;
        // The receiver lives as long as the pipeline, a send error means it was dropped.
        let _ = self.sender.send(completion);
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let Some(completion) = self.aborted.take() {
            log::warn!("Background task stopped without a result");
            let _ = self.sender.send(completion);
        }
    }
}

/// Kind of work started for a tile by [`FetchPipeline::request`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TileRequest {
    /// The tile is downloaded and decoded.
    Fetch,
    /// Raw bytes are cached, the tile is only decoded.
    Decode,
}

/// Spawns tile and geocoding tasks and collects their completions.
pub struct FetchPipeline {
    platform: Arc<dyn PlatformService>,
    sender: UnboundedSender<Completion>,
    receiver: UnboundedReceiver<Completion>,
    pending: AtomicUsize,
}

impl FetchPipeline {
    /// Creates a pipeline that loads data with the given platform service.
    pub fn new(platform: Arc<dyn PlatformService>) -> Self {
        let (sender, receiver) = unbounded_channel();
        Self {
            platform,
            sender,
            receiver,
            pending: AtomicUsize::new(0),
        }
    }

    /// Starts a task for the tile if the cache has neither the tile nor a task working on it.
    ///
    /// The link is marked as in flight before the task is spawned, so calling this again for
    /// the same link before the completion is installed does nothing.
    pub fn request(&self, cache: &mut TileCache, link: &TileLink) -> Option<TileRequest> {
        if cache.needs_fetch(link) {
            cache.mark_in_flight(link.clone());
            self.spawn_fetch(link.clone());
            return Some(TileRequest::Fetch);
        }

        if cache.needs_decode_only(link) {
            let raw = cache.lookup_raw_bytes(link)?.clone();
            cache.mark_in_flight(link.clone());
            self.spawn_decode(link.clone(), raw);
            return Some(TileRequest::Decode);
        }

        None
    }

    fn spawn_fetch(&self, link: TileLink) {
        log::debug!("Loading {}", link.url);
        let platform = self.platform.clone();
        self.spawn_task(Completion::aborted_tile(link.clone()), async move {
            let outcome = match platform.load_bytes_from_url(&link.url).await {
                Ok(raw) => Self::decode(platform.as_ref(), raw).await,
                Err(err) => Err(err),
            };
            Completion::Tile(FetchResult { link, outcome })
        });
    }

    fn spawn_decode(&self, link: TileLink, raw: Bytes) {
        log::debug!("Decoding cached {}", link.url);
        let platform = self.platform.clone();
        self.spawn_task(Completion::aborted_tile(link.clone()), async move {
            let outcome = Self::decode(platform.as_ref(), raw).await;
            Completion::Tile(FetchResult { link, outcome })
        });
    }

    /// Starts a geocoding search. The best candidate is delivered as [`Completion::Located`].
    pub fn search(&self, geocoder: Arc<dyn Geocoder>, query: String) {
        let aborted = Completion::Located {
            query: query.clone(),
            result: Err(TilemapError::Aborted),
        };
        self.spawn_task(aborted, async move {
            let result = locate(geocoder.as_ref(), &query).await;
            Completion::Located { query, result }
        });
    }

    async fn decode(platform: &dyn PlatformService, raw: Bytes) -> Result<LoadedTile, TilemapError> {
        let image = platform.decode_image(raw.clone()).await?;
        Ok(LoadedTile {
            raw,
            image: Arc::new(image),
        })
    }

    /// Spawns the task. If the task panics or is dropped by the runtime before it finishes,
    /// `aborted` is sent instead of its result, so every spawned task is accounted for.
    fn spawn_task(
        &self,
        aborted: Completion,
        task: impl std::future::Future<Output = Completion> + Send + 'static,
    ) {
        let guard = CompletionGuard {
            sender: self.sender.clone(),
            aborted: Some(aborted),
        };
        let pending = self.pending.fetch_add(1, Ordering::Relaxed) + 1;
        log::debug!("Spawned task, {pending} outstanding");

        crate::async_runtime::spawn(async move {
            let completion = task.await;
            guard.complete(completion);
        });
    }

    /// Number of spawned tasks whose completions have not been consumed yet.
    pub fn outstanding(&self) -> usize {
        self.pending.load(Ordering::Relaxed)
    }

    /// Takes the next completion without waiting.
    pub fn try_next(&mut self) -> Option<Completion> {
        let completion = self.receiver.try_recv().ok()?;
        self.pending.fetch_sub(1, Ordering::Relaxed);
        Some(completion)
    }

    /// Waits for the next completion.
    ///
    /// Returns `None` if all completions have been consumed, since then nothing would ever
    /// arrive.
    pub async fn next(&mut self) -> Option<Completion> {
        if self.outstanding() == 0 {
            return None;
        }

        let completion = self.receiver.recv().await?;
        self.pending.fetch_sub(1, Ordering::Relaxed);
        Some(completion)
    }
}
