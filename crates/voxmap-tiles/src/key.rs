//! Tile identity.

use std::fmt;

use voxmap_render::View;

/// Identifies one cached tile. World names compare case-insensitively.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TileKey {
    world: String,
    view: View,
    tile_x: u32,
    tile_z: u32,
}

impl TileKey {
    pub fn new(world: &str, view: View, tile_x: u32, tile_z: u32) -> Self {
        Self {
            world: world.to_lowercase(),
            view,
            tile_x,
            tile_z,
        }
    }

    /// Lower-cased world name.
    pub fn world(&self) -> &str {
        &self.world
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn tile_x(&self) -> u32 {
        self.tile_x
    }

    pub fn tile_z(&self) -> u32 {
        self.tile_z
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}",
            self.world, self.view, self.tile_x, self.tile_z
        )
    }
}

/// Tile index containing block coordinate `block`: `floor(block / tile_size)`.
///
/// Negative coordinates (and indices beyond `u32`) have no tile.
pub fn tile_coord(block: i64, tile_size: u32) -> Option<u32> {
    if block < 0 || tile_size == 0 {
        return None;
    }
    u32::try_from(block / tile_size as i64).ok()
}
