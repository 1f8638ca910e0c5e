//! Software rendering of the planned tiles into an image.

use image::{Rgba, RgbaImage};
use tilemap_types::cartesian::Size;

use crate::decoded_image::DecodedImage;
use crate::tile_cache::TileCache;
use crate::viewport::PlannedTile;

/// Color of the viewport areas without a loaded tile.
pub const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Draws the cached tiles of the plan into an image of the viewport size.
///
/// Tiles that are not loaded yet are left blank, showing the [`BACKGROUND`].
pub fn compose(plan: &[PlannedTile], cache: &TileCache, viewport: Size<u32>) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(viewport.width(), viewport.height(), BACKGROUND);
    let mut drawn = 0;
    for tile in plan {
        if let Some(image) = cache.lookup_image(&tile.link) {
            if draw_tile(&mut canvas, image, tile) {
                drawn += 1;
            }
        }
    }

    log::debug!("Composed {drawn} of {} tiles", plan.len());
    canvas
}

fn draw_tile(canvas: &mut RgbaImage, image: &DecodedImage, tile: &PlannedTile) -> bool {
    let width = canvas.width() as usize;
    let height = canvas.height() as usize;
    let dest = tile.dest;
    let src = tile.src;
    if dest.x_min() < 0
        || dest.y_min() < 0
        || dest.x_max() as usize > width
        || dest.y_max() as usize > height
    {
        log::warn!("Tile {} is planned outside of the canvas", tile.index);
        return false;
    }

    let row_len = dest.width() as usize * 4;
    let pixels: &mut [u8] = canvas;
    for row in 0..dest.height() {
        let Some(span) = image.row_span(
            src.x_min() as u32,
            (src.y_min() + row) as u32,
            dest.width() as u32,
        ) else {
            log::warn!(
                "Image of {} is {}x{}, smaller than the tile",
                tile.index,
                image.width(),
                image.height()
            );
            return false;
        };

        let start = ((dest.y_min() + row) as usize * width + dest.x_min() as usize) * 4;
        pixels[start..start + row_len].copy_from_slice(span);
    }

    true
}
