//! World grid access for the map renderer.
//!
//! The tile core only consumes the traits in [`grid`]; [`MemoryWorld`] and
//! [`WorldRegistry`] are the in-process implementation used by the server
//! binary and tests.

pub mod block;
pub mod events;
pub mod grid;
pub mod memory;
pub mod registry;

pub use block::{BlockColorTable, BlockId};
pub use events::BlockChange;
pub use grid::{ColorSource, Dimensions, EntityPosition, WorldGrid, WorldProvider};
pub use memory::{MemoryWorld, WorldError};
pub use registry::WorldRegistry;
