//! Tile regions and column scanning.

use voxmap_world::{BlockId, WorldGrid};

/// The block columns covered by one tile: `tile_size × tile_size` columns
/// starting at `(start_x, start_z)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldRegion {
    pub start_x: u32,
    pub start_z: u32,
    pub tile_size: u32,
}

impl WorldRegion {
    /// The region of tile `(tile_x, tile_z)`, or `None` if the start
    /// coordinate does not fit in `u32`.
    pub fn for_tile(tile_x: u32, tile_z: u32, tile_size: u32) -> Option<Self> {
        Some(Self {
            start_x: tile_x.checked_mul(tile_size)?,
            start_z: tile_z.checked_mul(tile_size)?,
            tile_size,
        })
    }

    /// Columns actually covered inside `grid`, clipped at the world edge.
    ///
    /// `None` when the region starts on or past the world edge.
    pub fn extent(&self, grid: &dyn WorldGrid) -> Option<(u32, u32)> {
        let dims = grid.dimensions();
        if self.start_x >= dims.width || self.start_z >= dims.length {
            return None;
        }
        let w = self.tile_size.min(dims.width - self.start_x);
        let h = self.tile_size.min(dims.length - self.start_z);
        (w > 0 && h > 0).then_some((w, h))
    }
}

/// Topmost non-air block of column `(x, z)` and its y-level.
///
/// An all-air column yields `(BlockId::AIR, 0)`.
pub fn top_block(grid: &dyn WorldGrid, x: u32, z: u32) -> (BlockId, u32) {
    (0..grid.dimensions().height)
        .rev()
        .map(|y| (grid.block(x, y, z), y))
        .find(|(block, _)| !block.is_air())
        .unwrap_or((BlockId::AIR, 0))
}
