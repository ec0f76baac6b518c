//! Generated demo worlds so the server has something to map out of the box.
//!
//! Terrain heights come from multi-octave simplex noise. A wandering visitor
//! moves around the main world and drops blocks, which exercises the live
//! invalidation path end to end.

use std::f64::consts::TAU;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use noise::{NoiseFn, Simplex};
use voxmap_world::{
    BlockColorTable, BlockId, Dimensions, EntityPosition, MemoryWorld, WorldError, WorldGrid,
    WorldRegistry,
};

/// Shape of a generated world.
#[derive(Clone, Debug)]
pub struct TerrainParams {
    pub seed: u32,
    pub dimensions: Dimensions,
    /// Columns whose surface ends below this level are flooded.
    pub sea_level: u32,
    /// Frequency of the broadest octave, in cycles per block.
    pub base_frequency: f64,
    pub octaves: u32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            seed: 7,
            dimensions: Dimensions::new(256, 64, 256),
            sea_level: 24,
            base_frequency: 1.0 / 96.0,
            octaves: 4,
        }
    }
}

/// fBm over simplex noise, normalised to `0.0..=1.0`.
struct HeightSampler {
    noise: Simplex,
    base_frequency: f64,
    octaves: u32,
}

impl HeightSampler {
    fn new(params: &TerrainParams) -> Self {
        Self {
            noise: Simplex::new(params.seed),
            base_frequency: params.base_frequency,
            octaves: params.octaves.max(1),
        }
    }

    fn sample(&self, x: f64, z: f64) -> f64 {
        let mut total = 0.0;
        let mut max = 0.0;
        let mut frequency = self.base_frequency;
        let mut amplitude = 1.0;
        for _ in 0..self.octaves {
            total += self.noise.get([x * frequency, z * frequency]) * amplitude;
            max += amplitude;
            frequency *= 2.0;
            amplitude *= 0.5;
        }
        ((total / max) * 0.5 + 0.5).clamp(0.0, 1.0)
    }
}

/// Builds a world: stone below, a dirt layer, grass on top, water up to sea level.
pub fn generate_world(name: &str, params: &TerrainParams) -> Result<MemoryWorld, WorldError> {
    let dims = params.dimensions;
    let world = MemoryWorld::new(name, dims)?.with_colors(demo_colors());
    let sampler = HeightSampler::new(params);
    let max_y = dims.height - 1;

    for z in 0..dims.length {
        for x in 0..dims.width {
            let h = sampler.sample(f64::from(x), f64::from(z));
            let top = ((h * f64::from(max_y)) as u32).clamp(1, max_y);
            world.fill_column(x, z, top, BlockId::STONE)?;
            world.fill_column_range(x, z, top.saturating_sub(3).max(1), top, BlockId::DIRT)?;
            if top < params.sea_level {
                let water_top = params.sea_level.min(max_y);
                world.fill_column_range(x, z, top + 1, water_top, BlockId::WATER)?;
            } else {
                world.fill_column_range(x, z, top, top, BlockId::GRASS)?;
            }
        }
    }
    Ok(world)
}

/// Display colors for the demo block set. Lava keeps its fallback color.
pub fn demo_colors() -> BlockColorTable {
    let mut colors = BlockColorTable::new();
    colors.set(BlockId::STONE, 0x7D7D7D);
    colors.set(BlockId::GRASS, 0x5DA83A);
    colors.set(BlockId::DIRT, 0x866043);
    colors.set(BlockId::WATER, 0x2F5FD0);
    colors
}

/// Registers the demo worlds: a loaded `main` world and an unloaded `archive`.
pub fn populate(registry: &WorldRegistry) -> Result<Arc<MemoryWorld>, WorldError> {
    let main = registry.insert(generate_world("main", &TerrainParams::default())?);

    let archive = TerrainParams {
        seed: 1234,
        dimensions: Dimensions::new(128, 48, 128),
        sea_level: 16,
        ..TerrainParams::default()
    };
    registry.insert(generate_world("archive", &archive)?);
    registry.set_loaded("archive", false);
    Ok(main)
}

/// Column height (topmost non-air y) of `(x, z)`, scanning down from the sky.
fn surface(world: &MemoryWorld, x: u32, z: u32) -> u32 {
    (0..world.dimensions().height)
        .rev()
        .find(|&y| !world.block(x, y, z).is_air())
        .unwrap_or(0)
}

/// Position of the visitor on its circular walk at `step`.
fn walk_position(dims: Dimensions, step: u64) -> (u32, u32) {
    let (cx, cz) = (f64::from(dims.width) / 2.0, f64::from(dims.length) / 2.0);
    let radius = cx.min(cz) * 0.6;
    let angle = (step % 360) as f64 / 360.0 * TAU;
    let x = (cx + radius * angle.cos()).clamp(0.0, f64::from(dims.width - 1));
    let z = (cz + radius * angle.sin()).clamp(0.0, f64::from(dims.length - 1));
    (x as u32, z as u32)
}

/// Spawns the visitor thread. Each `interval` it moves one step and stacks a
/// lava block on the surface under it.
pub fn spawn_visitor(
    registry: Arc<WorldRegistry>,
    world: Arc<MemoryWorld>,
    interval: Duration,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("voxmap-demo-visitor".into())
        .spawn(move || {
            let dims = world.dimensions();
            for step in 0u64.. {
                let (x, z) = walk_position(dims, step);
                let y = (surface(&world, x, z) + 1).min(dims.height - 1);
                registry.upsert_entity(EntityPosition {
                    name: "visitor".into(),
                    world: world.name().to_string(),
                    x: x as i32,
                    y: y as i32,
                    z: z as i32,
                });
                if let Err(e) = world.set_block(x, y, z, BlockId::LAVA) {
                    tracing::warn!(error = %e, "demo visitor could not place a block");
                }
                thread::sleep(interval);
            }
        })
}
