//! Background invalidation: block-change events and the entity-proximity sweep.

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use voxmap_world::{BlockChange, WorldProvider};

use crate::dirty::DirtyTracker;

/// Spawns a thread that marks the tile of every block change dirty in all
/// views. The thread exits once every sender of `changes` is dropped.
pub fn spawn_block_change_listener(
    changes: Receiver<BlockChange>,
    dirty: Arc<DirtyTracker>,
    tile_size: u32,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("voxmap-block-changes".into())
        .spawn(move || {
            tracing::debug!("block change listener started");
            for change in changes.iter() {
                let (x, z) = (i64::from(change.x), i64::from(change.z));
                dirty.mark_block_changed(&change.world, x, z, tile_size);
            }
            tracing::debug!("block change listener stopped");
        })
}

/// One pass of the soft sweep: marks the 3×3 tile neighbourhood around every
/// entity in a loaded world dirty. Returns the number of entities visited.
pub fn soft_tick(provider: &dyn WorldProvider, dirty: &DirtyTracker, tile_size: u32) -> usize {
    let tile_size = i64::from(tile_size.max(1));
    let entities = provider.entities();
    for entity in &entities {
        let tile_x = i64::from(entity.x).div_euclid(tile_size);
        let tile_z = i64::from(entity.z).div_euclid(tile_size);
        dirty.mark_neighborhood(&entity.world, tile_x, tile_z);
    }
    entities.len()
}

/// Periodic [`soft_tick`] on a background thread. Stops when dropped.
pub struct SoftSweep {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SoftSweep {
    /// Starts sweeping every `interval`. A zero interval disables the sweep
    /// and spawns nothing.
    pub fn spawn(
        provider: Arc<dyn WorldProvider>,
        dirty: Arc<DirtyTracker>,
        tile_size: u32,
        interval: Duration,
    ) -> io::Result<Self> {
        if interval.is_zero() {
            tracing::info!("soft dirty sweep disabled");
            return Ok(Self {
                stop: None,
                handle: None,
            });
        }

        let (stop_tx, stop_rx) = bounded::<()>(1);
        let handle = thread::Builder::new()
            .name("voxmap-soft-sweep".into())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            let visited = soft_tick(provider.as_ref(), &dirty, tile_size);
                            tracing::trace!(entities = visited, "soft dirty sweep");
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })?;
        tracing::info!(interval_secs = interval.as_secs_f32(), "soft dirty sweep started");
        Ok(Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the sweep and waits for its thread.
    pub fn stop(&mut self) {
        // Dropping the sender disconnects the channel and wakes the thread.
        self.stop.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            tracing::error!("soft dirty sweep thread panicked");
        }
    }
}

impl Drop for SoftSweep {
    fn drop(&mut self) {
        self.stop();
    }
}
