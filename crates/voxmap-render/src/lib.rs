//! Projection of voxel columns into map tile rasters.
//!
//! Provides the [`TileImage`] raster, the block color resolver, and the
//! top-down and isometric projections. Renderers are pure: they read a
//! [`WorldGrid`](voxmap_world::WorldGrid) region and return pixels.

mod color;
mod isometric;
mod raster;
mod region;
mod top_down;
mod view;

pub use color::{Rgb, fallback_color, resolve_color};
pub use isometric::{PX_PER_BLOCK, canvas_size, iso_position, render_isometric, shade_for_height};
pub use raster::TileImage;
pub use region::{WorldRegion, top_block};
pub use top_down::render_top_down;
pub use view::{ParseViewError, View};

use voxmap_world::WorldGrid;

/// Errors raised while producing tile bytes.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// PNG encoding failed.
    #[error("failed to encode tile: {0}")]
    Encode(#[from] image::ImageError),
}

/// Renders `region` of `grid` in the given view.
///
/// Returns `None` when the region starts outside the world.
pub fn render_view(view: View, grid: &dyn WorldGrid, region: WorldRegion) -> Option<TileImage> {
    match view {
        View::TopDown => render_top_down(grid, region),
        View::Isometric => render_isometric(grid, region),
    }
}
