//! Dirty-region tracking: which cached tiles may no longer match the world.

use std::sync::{Mutex, MutexGuard, PoisonError};

use rustc_hash::FxHashMap;
use voxmap_render::View;

use crate::key::{TileKey, tile_coord};

#[derive(Default)]
struct DirtyState {
    /// Dirty keys mapped to the generation of their latest mark.
    marks: FxHashMap<TileKey, u64>,
    next_generation: u64,
}

/// Process-wide set of dirty tiles behind a single exclusive lock.
///
/// Every mark is stamped with a generation so the render path can clear a key
/// only when no newer mark arrived while it was rendering
/// (see [`clear_if_unchanged`](Self::clear_if_unchanged)).
#[derive(Default)]
pub struct DirtyTracker {
    state: Mutex<DirtyState>,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DirtyState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks one tile dirty. Negative (or unrepresentable) coordinates are ignored.
    pub fn mark_dirty(&self, world: &str, view: View, tile_x: i64, tile_z: i64) {
        let (Ok(tile_x), Ok(tile_z)) = (u32::try_from(tile_x), u32::try_from(tile_z)) else {
            return;
        };
        self.mark_key(TileKey::new(world, view, tile_x, tile_z));
    }

    /// Marks `key` dirty.
    pub fn mark_key(&self, key: TileKey) {
        let mut state = self.lock();
        state.next_generation += 1;
        let generation = state.next_generation;
        state.marks.insert(key, generation);
    }

    /// Marks the tile holding block column `(x, z)` dirty in every view.
    pub fn mark_block_changed(&self, world: &str, x: i64, z: i64, tile_size: u32) {
        let (Some(tile_x), Some(tile_z)) = (tile_coord(x, tile_size), tile_coord(z, tile_size))
        else {
            return;
        };
        for view in View::ALL {
            self.mark_key(TileKey::new(world, view, tile_x, tile_z));
        }
    }

    /// Marks the 3×3 block of tiles centred on `(tile_x, tile_z)` dirty in
    /// every view. Neighbours with negative coordinates are skipped.
    pub fn mark_neighborhood(&self, world: &str, tile_x: i64, tile_z: i64) {
        for ox in -1..=1 {
            for oz in -1..=1 {
                for view in View::ALL {
                    self.mark_dirty(world, view, tile_x + ox, tile_z + oz);
                }
            }
        }
    }

    pub fn is_dirty(&self, key: &TileKey) -> bool {
        self.lock().marks.contains_key(key)
    }

    /// Generation of the latest mark on `key`, or `None` if it is clean.
    pub fn generation(&self, key: &TileKey) -> Option<u64> {
        self.lock().marks.get(key).copied()
    }

    /// Removes `key` from the dirty set. Idempotent.
    pub fn clear_dirty(&self, key: &TileKey) {
        self.lock().marks.remove(key);
    }

    /// Clears `key` only if its mark is still the one observed before rendering.
    ///
    /// Returns `true` when the key is clean afterwards. A mark that arrived
    /// after `observed` was taken survives, so the next request re-renders.
    pub fn clear_if_unchanged(&self, key: &TileKey, observed: Option<u64>) -> bool {
        let mut state = self.lock();
        let current = state.marks.get(key).copied();
        match (current, observed) {
            (None, _) => true,
            (Some(now), Some(seen)) if now == seen => {
                state.marks.remove(key);
                true
            }
            _ => false,
        }
    }

    /// Number of dirty tiles.
    pub fn len(&self) -> usize {
        self.lock().marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
