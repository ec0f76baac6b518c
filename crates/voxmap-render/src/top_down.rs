//! Top-down projection: one pixel per column, colored by its topmost block.

use voxmap_world::WorldGrid;

use crate::color::resolve_color;
use crate::raster::TileImage;
use crate::region::{WorldRegion, top_block};

/// Renders `region` as a `w × h` image where pixel `(dx, dz)` is the color of
/// the topmost non-air block of column `(start_x + dx, start_z + dz)`.
///
/// Returns `None` when the region lies outside the world.
pub fn render_top_down(grid: &dyn WorldGrid, region: WorldRegion) -> Option<TileImage> {
    let (w, h) = region.extent(grid)?;
    let colors = grid.color_source();
    let mut image = TileImage::new(w, h);

    for dz in 0..h {
        for dx in 0..w {
            let (block, _) = top_block(grid, region.start_x + dx, region.start_z + dz);
            image.set_pixel(dx, dz, resolve_color(colors, block));
        }
    }

    Some(image)
}
