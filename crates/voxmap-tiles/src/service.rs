//! The tile request path: decide, render, persist, serve.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use voxmap_render::{RenderError, View, WorldRegion, render_view};
use voxmap_world::{WorldGrid, WorldProvider};

use crate::dirty::DirtyTracker;
use crate::guard::RenderGuard;
use crate::key::TileKey;
use crate::scheduler::RenderScheduler;
use crate::store::TileStore;

/// Produces encoded tile bytes for one region of a world.
pub trait TileRenderer: Send + Sync {
    /// `Ok(None)` when the region lies outside the world.
    fn render(
        &self,
        grid: &dyn WorldGrid,
        view: View,
        region: WorldRegion,
    ) -> Result<Option<Vec<u8>>, RenderError>;
}

/// The PNG projection renderer.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProjectionRenderer;

impl TileRenderer for ProjectionRenderer {
    fn render(
        &self,
        grid: &dyn WorldGrid,
        view: View,
        region: WorldRegion,
    ) -> Result<Option<Vec<u8>>, RenderError> {
        render_view(view, grid, region)
            .map(|image| image.encode_png())
            .transpose()
    }
}

/// A tile handed back to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServedTile {
    /// PNG bytes as stored on disk.
    pub bytes: Vec<u8>,
    /// `false` when a stale cached tile was served because re-rendering was
    /// not possible.
    pub fresh: bool,
}

/// Counters exposed through the state endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub render_attempts: u64,
    pub renders: u64,
    pub render_failures: u64,
    pub tiles_served: u64,
    pub tiles_missing: u64,
}

#[derive(Default)]
struct Stats {
    render_attempts: AtomicU64,
    renders: AtomicU64,
    render_failures: AtomicU64,
    tiles_served: AtomicU64,
    tiles_missing: AtomicU64,
}

impl Stats {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            render_attempts: self.render_attempts.load(Ordering::Relaxed),
            renders: self.renders.load(Ordering::Relaxed),
            render_failures: self.render_failures.load(Ordering::Relaxed),
            tiles_served: self.tiles_served.load(Ordering::Relaxed),
            tiles_missing: self.tiles_missing.load(Ordering::Relaxed),
        }
    }
}

/// Serves tiles from the cache, rendering them when missing or dirty.
///
/// Safe to share across request threads. Requests for the same dirty tile may
/// render concurrently; the store keeps the cached file whole either way.
pub struct TileService {
    provider: Arc<dyn WorldProvider>,
    store: TileStore,
    scheduler: RenderScheduler,
    renderer: Arc<dyn TileRenderer>,
    tile_size: u32,
    stats: Stats,
}

impl TileService {
    pub fn new(
        provider: Arc<dyn WorldProvider>,
        store: TileStore,
        dirty: Arc<DirtyTracker>,
        tile_size: u32,
    ) -> Self {
        Self {
            provider,
            store,
            scheduler: RenderScheduler::new(dirty, RenderGuard::default()),
            renderer: Arc::new(ProjectionRenderer),
            tile_size: tile_size.max(1),
            stats: Stats::default(),
        }
    }

    /// Replaces the renderer.
    pub fn with_renderer(mut self, renderer: Arc<dyn TileRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Replaces the stampede guard window.
    pub fn with_guard_window(mut self, window: Duration) -> Self {
        let dirty = Arc::clone(self.scheduler.dirty());
        self.scheduler = RenderScheduler::new(dirty, RenderGuard::new(window));
        self
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn dirty(&self) -> &Arc<DirtyTracker> {
        self.scheduler.dirty()
    }

    pub fn store(&self) -> &TileStore {
        &self.store
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Returns the tile `(tile_x, tile_z)` of `world` in `view`, rendering it
    /// first when it is missing or dirty.
    ///
    /// Render failures are logged and the previously cached tile (if any) is
    /// served; the key stays dirty so a later request retries. `None` means
    /// nothing is cached and nothing could be rendered.
    pub fn get_or_render_tile(
        &self,
        world: &str,
        view: View,
        tile_x: u32,
        tile_z: u32,
    ) -> Option<ServedTile> {
        let key = TileKey::new(world, view, tile_x, tile_z);
        let path = match self.store.tile_path(&key) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(tile = %key, error = %e, "cannot resolve tile path");
                Stats::bump(&self.stats.tiles_missing);
                return None;
            }
        };

        let rendered =
            self.scheduler.should_render_now(&key, &path) && self.render_into_store(&key, &path);

        match self.store.load(&path) {
            Ok(Some(bytes)) => {
                Stats::bump(&self.stats.tiles_served);
                let fresh = rendered || !self.dirty().is_dirty(&key);
                Some(ServedTile { bytes, fresh })
            }
            Ok(None) => {
                Stats::bump(&self.stats.tiles_missing);
                None
            }
            Err(e) => {
                tracing::warn!(tile = %key, error = %e, "failed to read cached tile");
                Stats::bump(&self.stats.tiles_missing);
                None
            }
        }
    }

    /// Renders `key` and atomically replaces the file at `path`.
    ///
    /// Returns `true` if a new tile was written. The dirty mark is cleared
    /// only if no newer mark arrived during the render.
    fn render_into_store(&self, key: &TileKey, path: &Path) -> bool {
        let observed = self.dirty().generation(key);

        let Some(grid) = self.provider.loaded_world(key.world()) else {
            tracing::debug!(tile = %key, "world not loaded, skipping render");
            return false;
        };
        let Some(region) = WorldRegion::for_tile(key.tile_x(), key.tile_z(), self.tile_size)
        else {
            tracing::debug!(tile = %key, "tile origin overflows, skipping render");
            return false;
        };
        if region.extent(grid.as_ref()).is_none() {
            tracing::debug!(tile = %key, "tile outside world bounds");
            return false;
        }

        Stats::bump(&self.stats.render_attempts);
        let bytes = match self.renderer.render(grid.as_ref(), key.view(), region) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return false,
            Err(e) => {
                Stats::bump(&self.stats.render_failures);
                tracing::warn!(tile = %key, error = %e, "tile render failed");
                return false;
            }
        };
        if let Err(e) = self.store.save(&bytes, path) {
            Stats::bump(&self.stats.render_failures);
            tracing::warn!(tile = %key, error = %e, "failed to store rendered tile");
            return false;
        }

        Stats::bump(&self.stats.renders);
        if !self.dirty().clear_if_unchanged(key, observed) {
            tracing::debug!(tile = %key, "tile re-dirtied during render");
        }
        tracing::trace!(tile = %key, bytes = bytes.len(), "tile rendered");
        true
    }
}
