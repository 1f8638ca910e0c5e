//! Renders a map view into an image file without creating a window.
//!
//! ```shell
//! cargo run -p tilemap-render -- --search "Amsterdam" --layer positron -o amsterdam.png
//! ```
//!
//! All tiles of the view are loaded before the image is written, so the result has no blank
//! areas unless a tile failed to load.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tilemap::geocoding::parse_lonlat;
use tilemap::render::compose;
use tilemap::{MapConfig, MapController};
use tilemap_types::cartesian::Size;

#[derive(Parser, Debug)]
#[command(author, version, about = "Renders a slippy map view into a PNG file", long_about = None)]
struct Args {
    /// JSON file with the map configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output image file
    #[arg(short, long, default_value = "output_map.png")]
    output: PathBuf,

    /// Width of the image in pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Height of the image in pixels
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Center of the map as `longitude,latitude`
    #[arg(long, allow_hyphen_values = true)]
    center: Option<String>,

    /// Zoom level
    #[arg(short, long, allow_hyphen_values = true)]
    zoom: Option<i32>,

    /// Tileset to draw
    #[arg(short, long)]
    layer: Option<String>,

    /// Tile server URL with `{x}`, `{y}`, `{z}` and optional `{layer}` placeholders
    #[arg(long)]
    tile_url: Option<String>,

    /// Use high density tiles
    #[arg(long)]
    hidpi: bool,

    /// Center the map on a place found by the geocoder (or on a `longitude,latitude` pair)
    #[arg(short, long)]
    search: Option<String>,
}

impl Args {
    fn map_config(&self) -> Result<MapConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                serde_json::from_str(&json)
                    .with_context(|| format!("invalid configuration in {}", path.display()))?
            }
            None => MapConfig::default(),
        };

        if let Some(center) = &self.center {
            config = config.with_center(parse_lonlat(center)?);
        }
        if let Some(zoom) = self.zoom {
            config = config.with_zoom(zoom);
        }
        if let Some(layer) = &self.layer {
            config = config.with_layer(layer);
        }
        if let Some(url) = &self.tile_url {
            config = config.with_tile_url(url);
        }
        if self.hidpi {
            config = config.with_hidpi(true);
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut map = MapController::new(args.map_config()?)?;
    map.set_viewport_size(Size::new(args.width, args.height));

    if let Some(query) = &args.search {
        map.search(query);
    }

    map.load_visible_tiles().await;

    let center = map.view().center_geo();
    log::info!(
        "Rendering {} at {center}, zoom {}: {} tiles cached",
        map.layer(),
        map.view().effective_zoom(),
        map.cache().len()
    );

    let image = compose(&map.plan(), map.cache(), map.viewport_size());
    image
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    log::info!("Saved {}", args.output.display());

    Ok(())
}
