//! Contracts between the tile renderer and whatever owns the world data.

use std::sync::Arc;

use serde::Serialize;

use crate::block::BlockId;

/// World extent in blocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Dimensions {
    /// Extent along X.
    pub width: u32,
    /// Extent along Y (vertical).
    pub height: u32,
    /// Extent along Z.
    pub length: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32, length: u32) -> Self {
        Self {
            width,
            height,
            length,
        }
    }

    /// Number of cells in the world.
    pub fn volume(&self) -> usize {
        self.width as usize * self.height as usize * self.length as usize
    }

    /// Returns `true` if `(x, y, z)` lies inside the world.
    pub fn contains(&self, x: u32, y: u32, z: u32) -> bool {
        x < self.width && y < self.height && z < self.length
    }
}

/// Typed access to per-block display colors.
pub trait ColorSource: Send + Sync {
    /// Packed `0xRRGGBB` color for `block` (any alpha byte is ignored), or
    /// `None` when this source has no opinion.
    fn packed_color(&self, block: BlockId) -> Option<u32>;
}

/// Read access to one loaded world.
pub trait WorldGrid: Send + Sync {
    /// World name as known to the provider.
    fn name(&self) -> &str;

    fn dimensions(&self) -> Dimensions;

    /// Block at `(x, y, z)`. Coordinates outside the world read as air.
    fn block(&self, x: u32, y: u32, z: u32) -> BlockId;

    /// Color table owned by this world, if it has one.
    fn color_source(&self) -> Option<&dyn ColorSource> {
        None
    }
}

/// An entity (usually a player) and its block position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EntityPosition {
    pub name: String,
    pub world: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Lookup of worlds and the entities currently in them.
pub trait WorldProvider: Send + Sync {
    /// The loaded world named `name` (case-insensitive), if any.
    fn loaded_world(&self, name: &str) -> Option<Arc<dyn WorldGrid>>;

    fn is_loaded(&self, name: &str) -> bool {
        self.loaded_world(name).is_some()
    }

    /// Every world the provider knows about, loaded or not.
    fn world_names(&self) -> Vec<String>;

    /// Entities present in loaded worlds.
    fn entities(&self) -> Vec<EntityPosition>;
}
