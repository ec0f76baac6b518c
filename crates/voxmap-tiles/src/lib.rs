//! On-demand tile cache for the live world map.
//!
//! A tile request goes through [`TileService::get_or_render_tile`]: the
//! [`RenderScheduler`] decides from the [`TileStore`] and the
//! [`DirtyTracker`] whether to re-render, the projection renderer produces a
//! PNG, the store replaces the cached file atomically, and the dirty mark is
//! cleared. World mutations reach the tracker through
//! [`spawn_block_change_listener`] and the periodic [`SoftSweep`].

pub mod dirty;
pub mod guard;
pub mod key;
pub mod listener;
pub mod scheduler;
pub mod service;
pub mod store;

pub use dirty::DirtyTracker;
pub use guard::{RENDER_GUARD_WINDOW, RenderGuard};
pub use key::{TileKey, tile_coord};
pub use listener::{SoftSweep, soft_tick, spawn_block_change_listener};
pub use scheduler::RenderScheduler;
pub use service::{ProjectionRenderer, ServedTile, StatsSnapshot, TileRenderer, TileService};
pub use store::{TileStore, TileStoreError, is_valid_world_name};
pub use voxmap_render::View;
