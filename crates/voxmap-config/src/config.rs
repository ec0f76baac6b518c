//! Configuration structs with sensible defaults and RON persistence.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Smallest accepted tile edge, in blocks.
pub const MIN_TILE_SIZE: u32 = 16;
/// Largest accepted tile edge, in blocks.
pub const MAX_TILE_SIZE: u32 = 256;
/// Upper bound for the soft-dirty sweep interval.
pub const MAX_SOFT_TICK_SECONDS: u32 = 60;

const CONFIG_FILE: &str = "config.ron";

/// Top-level tile server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings.
    pub server: ServerConfig,
    /// Tile cache and invalidation settings.
    pub tiles: TileConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind. `127.0.0.1` keeps the map local-only.
    pub bind_host: String,
    /// TCP port.
    pub port: u16,
    /// Request worker threads (0 = one per CPU).
    pub workers: usize,
}

/// Tile cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TileConfig {
    /// Tile edge length in blocks. Clamped to `16..=256`.
    ///
    /// Changing it does not invalidate tiles rendered with the previous size.
    pub tile_size: u32,
    /// Interval of the entity-proximity dirty sweep (0 = disabled).
    pub soft_tick_seconds: u32,
    /// Tile root override. Defaults to `<data dir>/tiles`.
    pub cache_dir: Option<PathBuf>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 48123,
            workers: 0,
        }
    }
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            tile_size: 64,
            soft_tick_seconds: 5,
            cache_dir: None,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Validation ---

impl Config {
    /// Returns a copy with every numeric setting clamped into its legal range.
    pub fn sanitized(mut self) -> Self {
        self.tiles.tile_size = self.tiles.tile_size.clamp(MIN_TILE_SIZE, MAX_TILE_SIZE);
        self.tiles.soft_tick_seconds = self.tiles.soft_tick_seconds.min(MAX_SOFT_TICK_SECONDS);
        self
    }

    /// Parses `bind_host:port` into a socket address. `bind_host` must be an
    /// IP literal or `localhost`; no name resolution is performed.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let host = self.server.bind_host.trim();
        let ip = if host.eq_ignore_ascii_case("localhost") {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        } else {
            host.parse::<IpAddr>()
                .map_err(|_| ConfigError::InvalidAddress {
                    host: self.server.bind_host.clone(),
                    port: self.server.port,
                })?
        };
        Ok(SocketAddr::new(ip, self.server.port))
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config.sanitized())
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::WriteError)
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let contents = std::fs::read_to_string(config_dir.join(CONFIG_FILE))
            .map_err(ConfigError::ReadError)?;
        let new_config = ron::from_str::<Config>(&contents)
            .map_err(ConfigError::ParseError)?
            .sanitized();

        if &new_config != self {
            if new_config.tiles.tile_size != self.tiles.tile_size {
                log::warn!(
                    "tile_size changed {} -> {}; tiles rendered at the old size stay cached",
                    self.tiles.tile_size,
                    new_config.tiles.tile_size
                );
            }
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
