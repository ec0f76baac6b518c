//! Approximate isometric projection.
//!
//! Each column becomes a `PX_PER_BLOCK`-sized square placed on a diamond
//! grid and lifted by its height. This is a fast pseudo-isometric view, not a
//! perspective-correct one. All arithmetic is integer; switching to floats
//! moves pixels.

use voxmap_world::WorldGrid;

use crate::color::{Rgb, resolve_color};
use crate::raster::TileImage;
use crate::region::{WorldRegion, top_block};

/// Screen pixels per block edge.
pub const PX_PER_BLOCK: i32 = 2;

/// Canvas size for a region covering `w_blocks × z_blocks` columns.
pub fn canvas_size(w_blocks: u32, z_blocks: u32) -> (u32, u32) {
    let span = (w_blocks + z_blocks) as i32;
    let width = span * PX_PER_BLOCK + 4;
    let height = span * PX_PER_BLOCK / 2 + 64;
    (width as u32, height as u32)
}

/// Screen position of column `(dx, dz)` whose topmost block sits at `top_y`.
pub fn iso_position(dx: i32, dz: i32, top_y: i32, canvas_w: i32) -> (i32, i32) {
    let iso_x = (dx - dz) * PX_PER_BLOCK + canvas_w / 2;
    let iso_y = (dx + dz) * (PX_PER_BLOCK / 2) + 16 - top_y / 4;
    (iso_x, iso_y)
}

/// Brightens `base` by a quarter of the column height (capped at 80).
pub fn shade_for_height(base: Rgb, top_y: u32) -> Rgb {
    let shade = top_y.min(80) as i32;
    base.brighten(shade / 4)
}

/// Renders `region` in the isometric view.
///
/// Columns are painted back to front (descending `dz`, then descending `dx`)
/// so nearer columns overwrite farther ones. Returns `None` when the region
/// lies outside the world.
pub fn render_isometric(grid: &dyn WorldGrid, region: WorldRegion) -> Option<TileImage> {
    let (w_blocks, z_blocks) = region.extent(grid)?;
    let (canvas_w, canvas_h) = canvas_size(w_blocks, z_blocks);
    let colors = grid.color_source();
    let mut image = TileImage::new(canvas_w, canvas_h);

    for dz in (0..z_blocks).rev() {
        for dx in (0..w_blocks).rev() {
            let (block, top_y) = top_block(grid, region.start_x + dx, region.start_z + dz);
            let color = shade_for_height(resolve_color(colors, block), top_y);
            let (iso_x, iso_y) = iso_position(dx as i32, dz as i32, top_y as i32, canvas_w as i32);
            image.fill_rect(
                iso_x,
                iso_y,
                PX_PER_BLOCK as u32,
                PX_PER_BLOCK as u32,
                color,
            );
        }
    }

    Some(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::fallback_color;
    use voxmap_world::{BlockId, Dimensions, MemoryWorld};

    #[test]
    fn test_canvas_geometry_for_full_tile() {
        assert_eq!(canvas_size(64, 64), (260, 192));
        let (canvas_w, _) = canvas_size(64, 64);
        assert_eq!(iso_position(0, 0, 0, canvas_w as i32), (130, 16));
    }

    #[test]
    fn test_iso_position_uses_integer_division() {
        // 7 / 4 == 1, not 1.75.
        assert_eq!(iso_position(3, 1, 7, 260), (134, 19));
        assert_eq!(iso_position(0, 5, 0, 260), (120, 21));
    }

    #[test]
    fn test_shade_is_capped() {
        let base = Rgb::new(100, 100, 100);
        assert_eq!(shade_for_height(base, 0), base);
        assert_eq!(shade_for_height(base, 9), Rgb::new(102, 102, 102));
        assert_eq!(shade_for_height(base, 200), Rgb::new(120, 120, 120));
        assert_eq!(
            shade_for_height(Rgb::new(250, 0, 0), 80),
            Rgb::new(255, 20, 20)
        );
    }

    #[test]
    fn test_full_tile_places_origin_column() {
        let world = MemoryWorld::new("iso", Dimensions::new(64, 32, 64)).unwrap();
        world.fill_column(0, 0, 8, BlockId::STONE).unwrap();

        let image = render_isometric(&world, WorldRegion::for_tile(0, 0, 64).unwrap()).unwrap();
        assert_eq!(image.dimensions(), (260, 192));

        let expected = Rgb::new(102, 102, 102);
        // top_y = 8 -> iso_y = 16 - 2.
        for (x, y) in [(130, 14), (131, 14), (130, 15), (131, 15)] {
            assert_eq!(image.get_pixel(x, y), expected, "pixel ({x}, {y})");
        }
        // Background stays black.
        assert_eq!(image.get_pixel(0, 191), Rgb::BLACK);
    }

    #[test]
    fn test_nearer_column_occludes_farther_one() {
        let world = MemoryWorld::new("iso", Dimensions::new(16, 32, 16)).unwrap();
        // (0,0) at y=8 and (1,1) at y=16 land on the same screen square.
        world.fill_column(0, 0, 8, BlockId::GRASS).unwrap();
        world.fill_column(1, 1, 16, BlockId::LAVA).unwrap();

        let image = render_isometric(&world, WorldRegion::for_tile(0, 0, 16).unwrap()).unwrap();
        let (canvas_w, _) = canvas_size(16, 16);
        assert_eq!(iso_position(0, 0, 8, canvas_w as i32), iso_position(1, 1, 16, canvas_w as i32));

        let (x, y) = iso_position(0, 0, 8, canvas_w as i32);
        let grass = shade_for_height(fallback_color(BlockId::GRASS), 8);
        assert_eq!(image.get_pixel(x as u32, y as u32), grass);
    }

    #[test]
    fn test_tall_columns_are_clipped_not_panicking() {
        let world = MemoryWorld::new("iso", Dimensions::new(16, 256, 16)).unwrap();
        world.fill_column(0, 0, 255, BlockId::STONE).unwrap();
        let image = render_isometric(&world, WorldRegion::for_tile(0, 0, 16).unwrap());
        assert!(image.is_some());
    }

    #[test]
    fn test_outside_world_renders_nothing() {
        let world = MemoryWorld::new("iso", Dimensions::new(16, 16, 16)).unwrap();
        assert!(render_isometric(&world, WorldRegion::for_tile(0, 1, 16).unwrap()).is_none());
    }
}
