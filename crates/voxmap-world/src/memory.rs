//! In-memory world storage that can be mutated while it is being rendered.

use std::sync::atomic::{AtomicU16, Ordering};

use crossbeam_channel::Sender;
use thiserror::Error;

use crate::block::{BlockColorTable, BlockId};
use crate::events::BlockChange;
use crate::grid::{ColorSource, Dimensions, WorldGrid};

/// Errors from constructing or editing a [`MemoryWorld`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorldError {
    /// One of the extents is zero.
    #[error("world dimensions must be non-zero, got {0:?}")]
    EmptyDimensions(Dimensions),
    /// A write addressed a cell outside the world.
    #[error("block ({x}, {y}, {z}) is outside the world")]
    OutOfBounds { x: u32, y: u32, z: u32 },
}

/// A fixed-size block grid with lock-free reads and writes.
///
/// Cells are laid out `(y * length + z) * width + x`. Single-block writes
/// through [`set_block`](Self::set_block) publish a [`BlockChange`] once the
/// world has been inserted into a registry; bulk fills do not.
pub struct MemoryWorld {
    name: String,
    dims: Dimensions,
    cells: Vec<AtomicU16>,
    colors: Option<BlockColorTable>,
    events: Option<Sender<BlockChange>>,
}

impl MemoryWorld {
    /// Creates an all-air world.
    pub fn new(name: impl Into<String>, dims: Dimensions) -> Result<Self, WorldError> {
        if dims.width == 0 || dims.height == 0 || dims.length == 0 {
            return Err(WorldError::EmptyDimensions(dims));
        }
        let cells = (0..dims.volume()).map(|_| AtomicU16::new(0)).collect();
        Ok(Self {
            name: name.into(),
            dims,
            cells,
            colors: None,
            events: None,
        })
    }

    /// Attaches a block color table.
    pub fn with_colors(mut self, colors: BlockColorTable) -> Self {
        self.colors = Some(colors);
        self
    }

    pub(crate) fn attach_events(&mut self, sender: Sender<BlockChange>) {
        self.events = Some(sender);
    }

    fn index(&self, x: u32, y: u32, z: u32) -> Option<usize> {
        if !self.dims.contains(x, y, z) {
            return None;
        }
        let (w, l) = (self.dims.width as usize, self.dims.length as usize);
        Some((y as usize * l + z as usize) * w + x as usize)
    }

    /// Writes one block. Returns `Ok(true)` when the stored type changed.
    pub fn set_block(&self, x: u32, y: u32, z: u32, block: BlockId) -> Result<bool, WorldError> {
        let idx = self
            .index(x, y, z)
            .ok_or(WorldError::OutOfBounds { x, y, z })?;
        let old = self.cells[idx].swap(block.0, Ordering::AcqRel);
        if old == block.0 {
            return Ok(false);
        }
        if let Some(events) = &self.events {
            // A closed channel only means nobody is listening for invalidations.
            let _ = events.send(BlockChange {
                world: self.name.clone(),
                x,
                y,
                z,
            });
        }
        Ok(true)
    }

    /// Fills `y = 0..=top_y` of column `(x, z)` with `block` without publishing events.
    pub fn fill_column(&self, x: u32, z: u32, top_y: u32, block: BlockId) -> Result<(), WorldError> {
        self.fill_column_range(x, z, 0, top_y, block)
    }

    /// Fills `y = from_y..=to_y` of column `(x, z)` without publishing events.
    /// An empty range (`from_y > to_y`) writes nothing.
    pub fn fill_column_range(
        &self,
        x: u32,
        z: u32,
        from_y: u32,
        to_y: u32,
        block: BlockId,
    ) -> Result<(), WorldError> {
        if self.index(x, to_y, z).is_none() {
            return Err(WorldError::OutOfBounds { x, y: to_y, z });
        }
        for y in from_y..=to_y {
            if let Some(idx) = self.index(x, y, z) {
                self.cells[idx].store(block.0, Ordering::Release);
            }
        }
        Ok(())
    }

    /// Fills a whole horizontal layer without publishing events.
    pub fn fill_layer(&self, y: u32, block: BlockId) -> Result<(), WorldError> {
        if y >= self.dims.height {
            return Err(WorldError::OutOfBounds { x: 0, y, z: 0 });
        }
        for z in 0..self.dims.length {
            for x in 0..self.dims.width {
                if let Some(idx) = self.index(x, y, z) {
                    self.cells[idx].store(block.0, Ordering::Release);
                }
            }
        }
        Ok(())
    }
}

impl WorldGrid for MemoryWorld {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimensions(&self) -> Dimensions {
        self.dims
    }

    fn block(&self, x: u32, y: u32, z: u32) -> BlockId {
        self.index(x, y, z)
            .map(|idx| BlockId(self.cells[idx].load(Ordering::Acquire)))
            .unwrap_or(BlockId::AIR)
    }

    fn color_source(&self) -> Option<&dyn ColorSource> {
        self.colors.as_ref().map(|c| c as &dyn ColorSource)
    }
}
