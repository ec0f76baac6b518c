//! Configuration system for the voxmap tile server.
//!
//! Settings persist to disk as a RON file, accept CLI overrides via clap,
//! support hot-reload detection, and tolerate missing or unknown fields.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    Config, DebugConfig, MAX_SOFT_TICK_SECONDS, MAX_TILE_SIZE, MIN_TILE_SIZE, ServerConfig,
    TileConfig,
};
pub use error::ConfigError;
