//! Shared value types and helpers for the skyblock crates.

pub mod location;
pub mod locks;

pub use location::{ChunkPos, Location, WorldId};
