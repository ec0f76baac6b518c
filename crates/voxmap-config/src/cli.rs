//! Command-line argument parsing for the tile server.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// voxmap command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "voxmap", about = "Live voxel world map tile server")]
pub struct CliArgs {
    /// Interface to bind the HTTP listener to.
    #[arg(long)]
    pub bind_host: Option<String>,

    /// HTTP port.
    #[arg(long)]
    pub port: Option<u16>,

    /// Request worker threads (0 = one per CPU).
    #[arg(long)]
    pub workers: Option<usize>,

    /// Tile edge length in blocks (16-256).
    #[arg(long)]
    pub tile_size: Option<u32>,

    /// Entity-proximity dirty sweep interval in seconds (0 disables it).
    #[arg(long)]
    pub soft_tick_seconds: Option<u32>,

    /// Directory that holds rendered tiles.
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config. The result is re-clamped.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref host) = args.bind_host {
            self.server.bind_host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        if let Some(workers) = args.workers {
            self.server.workers = workers;
        }
        if let Some(size) = args.tile_size {
            self.tiles.tile_size = size;
        }
        if let Some(secs) = args.soft_tick_seconds {
            self.tiles.soft_tick_seconds = secs;
        }
        if let Some(ref dir) = args.cache_dir {
            self.tiles.cache_dir = Some(dir.clone());
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        *self = std::mem::take(self).sanitized();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            bind_host: Some("127.0.0.1".to_string()),
            tile_size: Some(32),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.server.bind_host, "127.0.0.1");
        assert_eq!(config.tiles.tile_size, 32);
        // Non-overridden fields retain defaults
        assert_eq!(config.server.port, 48123);
        assert_eq!(config.tiles.soft_tick_seconds, 5);
    }

    #[test]
    fn test_cli_override_is_clamped() {
        let mut config = Config::default();
        let args = CliArgs {
            tile_size: Some(1),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.tiles.tile_size, crate::MIN_TILE_SIZE);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from([
            "voxmap",
            "--port",
            "9000",
            "--soft-tick-seconds",
            "0",
            "--cache-dir",
            "/tmp/tiles",
        ]);
        assert_eq!(args.port, Some(9000));
        assert_eq!(args.soft_tick_seconds, Some(0));
        assert_eq!(args.cache_dir, Some(PathBuf::from("/tmp/tiles")));
        assert!(args.tile_size.is_none());
    }
}
