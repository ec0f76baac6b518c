//! Registry of in-memory worlds, their load state, and online entities.

use std::sync::{Arc, PoisonError, RwLock};

use crossbeam_channel::{Receiver, Sender, unbounded};
use dashmap::DashMap;

use crate::events::BlockChange;
use crate::grid::{EntityPosition, WorldGrid, WorldProvider};
use crate::memory::MemoryWorld;

struct WorldEntry {
    world: Arc<MemoryWorld>,
    loaded: bool,
}

/// Thread-safe [`WorldProvider`] over [`MemoryWorld`]s.
///
/// World names are matched case-insensitively. A registry built with
/// [`with_block_changes`](Self::with_block_changes) publishes block changes
/// from every registered world on one channel; one built with
/// [`new`](Self::new) publishes nothing.
pub struct WorldRegistry {
    worlds: DashMap<String, WorldEntry>,
    entities: RwLock<Vec<EntityPosition>>,
    change_tx: Option<Sender<BlockChange>>,
}

impl WorldRegistry {
    pub fn new() -> Self {
        Self {
            worlds: DashMap::new(),
            entities: RwLock::new(Vec::new()),
            change_tx: None,
        }
    }

    /// A registry whose worlds publish block changes to the returned receiver.
    ///
    /// The receiver is the only one. Once it is dropped, changes are discarded
    /// instead of queued.
    pub fn with_block_changes() -> (Self, Receiver<BlockChange>) {
        let (change_tx, change_rx) = unbounded();
        let registry = Self {
            change_tx: Some(change_tx),
            ..Self::new()
        };
        (registry, change_rx)
    }

    /// Registers `world` as loaded, replacing any world with the same name.
    pub fn insert(&self, mut world: MemoryWorld) -> Arc<MemoryWorld> {
        if let Some(tx) = &self.change_tx {
            world.attach_events(tx.clone());
        }
        let world = Arc::new(world);
        let key = world.name().to_lowercase();
        tracing::info!(world = world.name(), dims = ?world.dimensions(), "world registered");
        self.worlds.insert(
            key,
            WorldEntry {
                world: Arc::clone(&world),
                loaded: true,
            },
        );
        world
    }

    /// The world named `name`, whether loaded or not.
    pub fn get(&self, name: &str) -> Option<Arc<MemoryWorld>> {
        self.worlds
            .get(&name.to_lowercase())
            .map(|entry| Arc::clone(&entry.world))
    }

    /// Marks a known world loaded or unloaded. Returns `false` for unknown worlds.
    pub fn set_loaded(&self, name: &str, loaded: bool) -> bool {
        match self.worlds.get_mut(&name.to_lowercase()) {
            Some(mut entry) => {
                entry.loaded = loaded;
                tracing::debug!(world = name, loaded, "world load state changed");
                true
            }
            None => false,
        }
    }

    /// Forgets a world entirely.
    pub fn remove(&self, name: &str) -> Option<Arc<MemoryWorld>> {
        self.worlds
            .remove(&name.to_lowercase())
            .map(|(_, entry)| entry.world)
    }

    /// Inserts or moves an entity, matched by name.
    pub fn upsert_entity(&self, position: EntityPosition) {
        let mut entities = self.entities.write().unwrap_or_else(PoisonError::into_inner);
        match entities.iter_mut().find(|e| e.name == position.name) {
            Some(existing) => *existing = position,
            None => entities.push(position),
        }
    }

    pub fn remove_entity(&self, name: &str) {
        self.entities
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|e| e.name != name);
    }
}

impl Default for WorldRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldProvider for WorldRegistry {
    fn loaded_world(&self, name: &str) -> Option<Arc<dyn WorldGrid>> {
        let entry = self.worlds.get(&name.to_lowercase())?;
        if !entry.loaded {
            return None;
        }
        let world: Arc<dyn WorldGrid> = entry.world.clone();
        Some(world)
    }

    fn world_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .worlds
            .iter()
            .map(|entry| entry.world.name().to_string())
            .collect();
        names.sort_by_key(|n| n.to_lowercase());
        names
    }

    fn entities(&self) -> Vec<EntityPosition> {
        self.entities
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| self.is_loaded(&e.world))
            .cloned()
            .collect()
    }
}
