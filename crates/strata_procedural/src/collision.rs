//! # Collision Probe
//!
//! Solid/empty queries against the loaded terrain.
//!
//! Unloaded terrain is treated as empty: a body outside the streaming window
//! falls through it rather than colliding with terrain that has not been
//! generated.

use crate::chunk::ChunkCoord;
use crate::streamer::ChunkMap;

/// Answers "is this world cell solid?" for physics and raycasts.
pub trait SolidQuery {
    /// True if the cell containing the continuous point `(x, y, z)` is solid.
    fn is_solid(&self, x: f32, y: f32, z: f32) -> bool;
}

impl<T: SolidQuery + ?Sized> SolidQuery for &T {
    fn is_solid(&self, x: f32, y: f32, z: f32) -> bool {
        (**self).is_solid(x, y, z)
    }
}

/// Borrowed view over a loaded chunk set.
#[derive(Clone, Copy)]
pub struct CollisionProbe<'a> {
    chunks: &'a ChunkMap,
    chunk_size: i32,
}

impl<'a> CollisionProbe<'a> {
    /// Creates a probe over `chunks` laid out with side length `chunk_size`.
    #[must_use]
    pub const fn new(chunks: &'a ChunkMap, chunk_size: i32) -> Self {
        Self { chunks, chunk_size }
    }

    /// Solid test on integer world cell coordinates.
    #[inline]
    #[must_use]
    pub fn is_solid_block(&self, x: i32, y: i32, z: i32) -> bool {
        let coord = ChunkCoord::from_block_pos(x, z, self.chunk_size);
        self.chunks
            .get(&coord.key())
            .is_some_and(|chunk| chunk.has_block(x, y, z))
    }

    /// Terrain height of a loaded world column.
    #[must_use]
    pub fn height_at(&self, x: i32, z: i32) -> Option<i32> {
        let coord = ChunkCoord::from_block_pos(x, z, self.chunk_size);
        self.chunks.get(&coord.key())?.height_at(x, z)
    }
}

impl SolidQuery for CollisionProbe<'_> {
    #[inline]
    fn is_solid(&self, x: f32, y: f32, z: f32) -> bool {
        self.is_solid_block(x.floor() as i32, y.floor() as i32, z.floor() as i32)
    }
}

/// Owned copy of a loaded chunk set, safe to move to another thread.
///
/// Holds shared handles, so taking a snapshot never copies terrain.
#[derive(Clone)]
pub struct ChunkSnapshot {
    chunks: ChunkMap,
    chunk_size: i32,
}

impl ChunkSnapshot {
    /// Wraps a chunk set.
    #[must_use]
    pub const fn new(chunks: ChunkMap, chunk_size: i32) -> Self {
        Self { chunks, chunk_size }
    }

    /// Borrowed probe over this snapshot.
    #[must_use]
    pub fn probe(&self) -> CollisionProbe<'_> {
        CollisionProbe::new(&self.chunks, self.chunk_size)
    }

    /// Number of chunks captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// True if no chunks were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

impl SolidQuery for ChunkSnapshot {
    fn is_solid(&self, x: f32, y: f32, z: f32) -> bool {
        self.probe().is_solid(x, y, z)
    }
}
