//! Render-or-serve decision for incoming tile requests.

use std::path::Path;
use std::sync::Arc;

use crate::dirty::DirtyTracker;
use crate::guard::RenderGuard;
use crate::key::TileKey;

/// Decides per request whether a tile must be (re)rendered before serving.
pub struct RenderScheduler {
    dirty: Arc<DirtyTracker>,
    guard: RenderGuard,
}

impl RenderScheduler {
    pub fn new(dirty: Arc<DirtyTracker>, guard: RenderGuard) -> Self {
        Self { dirty, guard }
    }

    pub fn dirty(&self) -> &Arc<DirtyTracker> {
        &self.dirty
    }

    pub fn guard(&self) -> &RenderGuard {
        &self.guard
    }

    /// `true` when no cached file exists at `tile_path` or `key` is dirty.
    ///
    /// A clean, cached tile is never re-rendered: the guard only records the
    /// attempt. Two racing requests for the same dirty tile may both get
    /// `true`; their renders end in a last-writer-wins replace.
    pub fn should_render_now(&self, key: &TileKey, tile_path: &Path) -> bool {
        if !tile_path.exists() {
            return true;
        }
        if self.dirty.is_dirty(key) {
            return true;
        }
        self.guard.record_attempt(key);
        false
    }
}
