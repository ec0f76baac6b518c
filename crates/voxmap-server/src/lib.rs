//! HTTP front for the tile cache.
//!
//! Serves `/tiles/{world}/{view}/{tx}/{tz}.png`, the `/api/state` world and
//! player summary, and `/health`. Request parsing and status mapping live
//! here; everything about tiles is delegated to [`voxmap_tiles::TileService`].

pub mod routes;
pub mod server;

pub use routes::{Route, StateResponse, WorldSummary, build_state, parse_route};
pub use server::{TileServer, TileServerError};

#[cfg(test)]
mod tests;
