//! World-qualified positions.
//!
//! A [`Location`] is a point in one world. Distances are only meaningful when
//! both points share a world, so the comparison helpers make that explicit.

use std::fmt;
use std::sync::Arc;

use glam::DVec3;

/// Name of a world (level) on the host server.
///
/// Cheap to clone; the name is shared.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorldId(Arc<str>);

impl WorldId {
    /// Creates a world id from its name.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// The world name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for WorldId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Chunk column coordinates (16x16 blocks).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkPos {
    /// Chunk x.
    pub x: i32,
    /// Chunk z.
    pub z: i32,
}

impl ChunkPos {
    /// Creates a chunk position.
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// The chunk containing the given block coordinates.
    #[must_use]
    pub fn containing(x: f64, z: f64) -> Self {
        Self {
            x: (x.floor() as i32) >> 4,
            z: (z.floor() as i32) >> 4,
        }
    }
}

/// A position inside a specific world.
#[derive(Clone, Debug, PartialEq)]
pub struct Location {
    /// The world this position belongs to.
    pub world: WorldId,
    /// Coordinates in world units.
    pub position: DVec3,
}

impl Location {
    /// Creates a location from raw coordinates.
    #[must_use]
    pub const fn new(world: WorldId, x: f64, y: f64, z: f64) -> Self {
        Self {
            world,
            position: DVec3::new(x, y, z),
        }
    }

    /// Returns the location moved to the centre of its block on the
    /// horizontal axes (`+0.5` on x and z).
    #[must_use]
    pub fn block_centered(&self) -> Self {
        Self {
            world: self.world.clone(),
            position: self.position + DVec3::new(0.5, 0.0, 0.5),
        }
    }

    /// Whether both locations are in the same world.
    #[must_use]
    pub fn same_world(&self, other: &Self) -> bool {
        self.world == other.world
    }

    /// Straight-line distance to `other`, or `None` when the worlds differ.
    #[must_use]
    pub fn distance_in_world(&self, other: &Self) -> Option<f64> {
        self.same_world(other)
            .then(|| self.position.distance(other.position))
    }

    /// The chunk column this location falls in.
    #[must_use]
    pub fn chunk(&self) -> ChunkPos {
        ChunkPos::containing(self.position.x, self.position.z)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({:.2}, {:.2}, {:.2})",
            self.world, self.position.x, self.position.y, self.position.z
        )
    }
}
