//! Block identifiers and the map-backed block color table.

use rustc_hash::FxHashMap;

use crate::grid::ColorSource;

/// Compact block identifier stored in every world cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BlockId(pub u16);

impl BlockId {
    pub const AIR: BlockId = BlockId(0);
    pub const STONE: BlockId = BlockId(1);
    pub const GRASS: BlockId = BlockId(2);
    pub const DIRT: BlockId = BlockId(3);
    pub const WATER: BlockId = BlockId(8);
    pub const LAVA: BlockId = BlockId(10);

    /// Returns `true` for air (id 0).
    pub fn is_air(self) -> bool {
        self == Self::AIR
    }
}

/// Per-block packed colors (`0xRRGGBB`) supplied by the world owner.
#[derive(Clone, Debug, Default)]
pub struct BlockColorTable {
    colors: FxHashMap<BlockId, u32>,
}

impl BlockColorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the packed color for `block`, replacing any previous entry.
    pub fn set(&mut self, block: BlockId, packed: u32) {
        self.colors.insert(block, packed);
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl ColorSource for BlockColorTable {
    fn packed_color(&self, block: BlockId) -> Option<u32> {
        self.colors.get(&block).copied()
    }
}
