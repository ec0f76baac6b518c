//! Block → color resolution.

use voxmap_world::{BlockId, ColorSource};

/// A 24-bit color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    /// Color of blocks nothing knows how to draw.
    pub const UNKNOWN: Rgb = Rgb::new(255, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Decodes `0xRRGGBB`; bits above the low 24 (alpha) are ignored.
    pub const fn from_packed(packed: u32) -> Self {
        Self::new((packed >> 16) as u8, (packed >> 8) as u8, packed as u8)
    }

    /// Adds `amount` to every channel, saturating at 0 and 255.
    pub fn brighten(self, amount: i32) -> Self {
        let ch = |c: u8| (c as i32 + amount).clamp(0, 255) as u8;
        Self::new(ch(self.r), ch(self.g), ch(self.b))
    }
}

/// Hardcoded palette for well-known blocks; magenta for everything else.
pub fn fallback_color(block: BlockId) -> Rgb {
    match block {
        BlockId::AIR => Rgb::BLACK,
        BlockId::STONE => Rgb::new(100, 100, 100),
        BlockId::GRASS => Rgb::new(60, 160, 60),
        BlockId::DIRT => Rgb::new(120, 85, 60),
        BlockId::WATER => Rgb::new(50, 80, 200),
        BlockId::LAVA => Rgb::new(220, 80, 20),
        _ => Rgb::UNKNOWN,
    }
}

/// Resolves the display color of `block`.
///
/// A non-black color from `source` wins; a missing source, a missing entry
/// or an all-zero color falls through to [`fallback_color`]. Total: every
/// block id maps to some color.
pub fn resolve_color(source: Option<&dyn ColorSource>, block: BlockId) -> Rgb {
    source
        .and_then(|s| s.packed_color(block))
        .map(Rgb::from_packed)
        .filter(|c| *c != Rgb::BLACK)
        .unwrap_or_else(|| fallback_color(block))
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxmap_world::BlockColorTable;

    #[test]
    fn test_from_packed_ignores_alpha() {
        assert_eq!(Rgb::from_packed(0x3CA03C), Rgb::new(60, 160, 60));
        assert_eq!(Rgb::from_packed(0xFF12_3456), Rgb::new(0x12, 0x34, 0x56));
    }

    #[test]
    fn test_brighten_saturates() {
        assert_eq!(Rgb::new(250, 10, 0).brighten(20), Rgb::new(255, 30, 20));
        assert_eq!(Rgb::new(5, 10, 0).brighten(-8), Rgb::new(0, 2, 0));
    }

    #[test]
    fn test_fallback_palette() {
        assert_eq!(fallback_color(BlockId::AIR), Rgb::BLACK);
        assert_eq!(fallback_color(BlockId::STONE), Rgb::new(100, 100, 100));
        assert_eq!(fallback_color(BlockId::WATER), Rgb::new(50, 80, 200));
        assert_eq!(fallback_color(BlockId::LAVA), Rgb::new(220, 80, 20));
    }

    #[test]
    fn test_unknown_block_resolves_to_sentinel() {
        for id in [4u16, 9, 200, u16::MAX] {
            assert_eq!(resolve_color(None, BlockId(id)), Rgb::UNKNOWN);
        }
    }

    #[test]
    fn test_color_source_takes_precedence() {
        let mut table = BlockColorTable::new();
        table.set(BlockId::STONE, 0x808080);
        table.set(BlockId(42), 0xAA5500);
        table.set(BlockId::GRASS, 0);
        let source: &dyn ColorSource = &table;

        assert_eq!(resolve_color(Some(source), BlockId::STONE), Rgb::new(128, 128, 128));
        assert_eq!(resolve_color(Some(source), BlockId(42)), Rgb::new(0xAA, 0x55, 0));
        // Zero color and missing entries fall back.
        assert_eq!(resolve_color(Some(source), BlockId::GRASS), Rgb::new(60, 160, 60));
        assert_eq!(resolve_color(Some(source), BlockId::DIRT), Rgb::new(120, 85, 60));
    }
}
