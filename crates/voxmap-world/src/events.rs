//! Block-change notifications published by mutable worlds.

/// Emitted after a single block in a world changed type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockChange {
    /// Name of the world the block belongs to.
    pub world: String,
    pub x: u32,
    pub y: u32,
    pub z: u32,
}
