//! Tilemap is a slippy map engine. It keeps the position of a map view, decides which raster
//! tiles are visible, loads them asynchronously from a tile server and keeps them in memory.
//!
//! # Quick start
//!
//! ```no_run
//! use tilemap::{MapConfig, MapController};
//! use tilemap::render::compose;
//! use tilemap_types::cartesian::Size;
//!
//! # tokio_test::block_on(async {
//! let mut map = MapController::new(MapConfig::default())?;
//! map.set_viewport_size(Size::new(800, 600));
//! map.load_visible_tiles().await;
//!
//! let image = compose(&map.plan(), map.cache(), map.viewport_size());
//! image.save("map.png").expect("failed to write the image");
//! # Ok::<(), tilemap::error::TilemapError>(())
//! # });
//! ```
//!
//! # Main components
//!
//! * [`MapController`] owns the [`ViewState`] and the [`TileCache`] and is the only thing that
//!   changes them. It handles [`control::UserEvent`]s and consumes completions of background
//!   tasks.
//! * [`viewport::plan_tiles`] computes which tiles cover the viewport and where each of them is
//!   drawn.
//! * [`FetchPipeline`] spawns a task for every missing tile and funnels the results back to the
//!   controller through a single channel.
//! * [`platform::PlatformService`] and [`geocoding::Geocoder`] are the seams to the network and
//!   the image decoder.
//!
//! Window management and drawing to a screen are left to the application: it reports the
//! viewport size and user input to the controller and draws the planned tiles, for example with
//! [`render::compose`].

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub(crate) mod async_runtime;
pub mod control;
pub mod decoded_image;
pub mod error;
pub mod fetch;
pub mod geocoding;
mod map;
mod messenger;
pub mod platform;
pub mod render;
pub mod tile_cache;
pub mod tile_source;
mod view;
pub mod viewport;

#[cfg(test)]
mod tests;

pub use fetch::FetchPipeline;
pub use map::{FailedTilePolicy, MapConfig, MapController};
pub use messenger::Messenger;
pub use tile_cache::{TileCache, TileLink};
pub use view::ViewState;

// Reexport tilemap_types
pub use tilemap_types;
