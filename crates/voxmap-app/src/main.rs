//! The `voxmap` binary: a live map tile server over generated demo worlds.

mod demo;
mod platform;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use voxmap_config::{CliArgs, Config};
use voxmap_server::TileServer;
use voxmap_tiles::{DirtyTracker, SoftSweep, TileService, TileStore, spawn_block_change_listener};
use voxmap_world::{WorldProvider, WorldRegistry};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// How often the demo visitor moves and places a block.
const VISITOR_INTERVAL: Duration = Duration::from_secs(2);

fn main() {
    let args = CliArgs::parse();
    if let Err(e) = run(&args) {
        eprintln!("voxmap: {e}");
        std::process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<(), BoxError> {
    let dirs = platform::PlatformDirs::resolve_and_create()?;
    let config_dir = args.config.clone().unwrap_or_else(|| dirs.config_dir.clone());

    let mut config = Config::load_or_create(&config_dir)?;
    config.apply_cli_overrides(args);

    voxmap_log::init_logging(Some(&dirs.log_dir), cfg!(debug_assertions), Some(&config));
    tracing::info!(
        config = %config_dir.display(),
        logs = %dirs.log_dir.display(),
        "voxmap starting"
    );

    let tile_size = config.tiles.tile_size;
    let (registry, block_changes) = WorldRegistry::with_block_changes();
    let registry = Arc::new(registry);
    let main_world = demo::populate(&registry)?;
    let provider: Arc<dyn WorldProvider> = registry.clone();

    let dirty = Arc::new(DirtyTracker::new());
    let _listener = spawn_block_change_listener(block_changes, Arc::clone(&dirty), tile_size)?;
    let _sweep = SoftSweep::spawn(
        Arc::clone(&provider),
        Arc::clone(&dirty),
        tile_size,
        Duration::from_secs(u64::from(config.tiles.soft_tick_seconds)),
    )?;

    let tile_root = dirs.tile_root(config.tiles.cache_dir.as_deref());
    tracing::info!(root = %tile_root.display(), tile_size, "tile cache ready");
    let service = Arc::new(TileService::new(
        Arc::clone(&provider),
        TileStore::new(tile_root),
        dirty,
        tile_size,
    ));

    let mut server = TileServer::new(config.bind_addr()?, config.server.workers);
    server.start(service, provider)?;
    tracing::info!(
        "map tiles at http://{}:{}/tiles/main/topdown/0/0.png",
        config.server.bind_host,
        server.actual_port()
    );

    let _visitor = demo::spawn_visitor(Arc::clone(&registry), main_world, VISITOR_INTERVAL)?;

    server.join();
    Ok(())
}
