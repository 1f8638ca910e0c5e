//! Planning of the tiles that cover a viewport.
//!
//! [`plan_tiles`] is a pure function of the view, the viewport size and the tile size. The
//! controller uses its result both to request missing tiles and to draw the cached ones.

use tilemap_types::cartesian::{Rect, Size};
use tilemap_types::tile::tiles_per_axis;
use tilemap_types::TileIndex;

use crate::tile_cache::TileLink;
use crate::tile_source::TileUrlTemplate;
use crate::view::ViewState;

/// A tile that is (at least partially) visible, and where to draw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTile {
    /// Index of the tile. Columns to the east or west of the world are wrapped around, so the
    /// index is always inside the tile grid.
    pub index: TileIndex,
    /// Cache key of the tile, with the URL rendered from the active template.
    pub link: TileLink,
    /// Pixels of the viewport covered by the tile, clipped to the viewport.
    pub dest: Rect<i32>,
    /// Pixels of the tile image drawn into `dest`. Has the same size as `dest`.
    pub src: Rect<i32>,
}

/// Computes the tiles that cover a viewport of `viewport` pixels for the given view.
///
/// The tile containing the view center is placed so that the projected center of the view
/// falls on the center pixel of the viewport, and the grid is extended from it in all
/// directions until the whole viewport is covered. Destination rectangles do not overlap and
/// together cover every viewport pixel, except for the areas to the north and south of the
/// world, which have no tiles.
///
/// Tiles are returned row by row, from the top left corner.
pub fn plan_tiles(
    view: &ViewState,
    viewport: Size<u32>,
    tile_size: u32,
    template: &TileUrlTemplate,
) -> Vec<PlannedTile> {
    if viewport.is_zero() || tile_size == 0 {
        return vec![];
    }

    let z = view.effective_zoom();
    let center_tile = view.center_tile();
    let tile_projected = center_tile.projected_size();
    let offset = (center_tile.top_left_projected() - view.center()).component_div(&tile_projected)
        * tile_size as f64;

    let ts = tile_size as i64;
    let columns = Axis::new(viewport.width(), offset.x, ts);
    let rows = Axis::new(viewport.height(), offset.y, ts);

    let n = tiles_per_axis(z) as i64;
    let first_x = center_tile.x as i64 - columns.before_center;
    let first_y = center_tile.y as i64 - rows.before_center;
    let bounds = Rect::new(0, 0, viewport.width() as i32, viewport.height() as i32);

    let mut tiles = Vec::with_capacity((columns.count * rows.count) as usize);
    for row in 0..rows.count {
        for column in 0..columns.count {
            // columns wrap around the antimeridian, rows beyond the poles have no tiles
            let Ok(index) = TileIndex::try_new((first_x + column).rem_euclid(n), first_y + row, z)
            else {
                continue;
            };

            let placed = Rect::from_origin(
                (columns.origin + column * ts) as i32,
                (rows.origin + row * ts) as i32,
                ts as i32,
                ts as i32,
            );

            let Some(dest) = placed.intersection(bounds) else {
                continue;
            };

            tiles.push(PlannedTile {
                index,
                link: TileLink::new(index, template.url(&index)),
                dest,
                src: dest.translate(-placed.x_min(), -placed.y_min()),
            });
        }
    }

    tiles
}

/// Placement of the tile grid along one axis of the viewport.
struct Axis {
    /// Number of tiles drawn before the center tile.
    before_center: i64,
    /// Position of the first tile, in `(-tile_size, 0]`.
    origin: i64,
    /// Number of tiles needed to reach the far edge of the viewport.
    count: i64,
}

impl Axis {
    fn new(length: u32, center_offset: f64, tile_size: i64) -> Self {
        let length = length as i64;
        let center_tile_start = (length as f64 / 2.0 + center_offset).floor() as i64;
        let before_center = ceil_div(center_tile_start, tile_size);
        let origin = center_tile_start - before_center * tile_size;

        Self {
            before_center,
            origin,
            count: ceil_div(length - origin, tile_size),
        }
    }
}

fn ceil_div(value: i64, divisor: i64) -> i64 {
    (value + divisor - 1).div_euclid(divisor)
}
