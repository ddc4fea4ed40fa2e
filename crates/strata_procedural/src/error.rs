//! # Generation Error Types
//!
//! All errors that can occur while generating or streaming terrain.

use thiserror::Error;

use crate::chunk::ChunkCoord;

/// Errors that can occur in terrain generation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// The block fill loop ran past the pre-computed block count.
    ///
    /// The height sum and the fill pass disagree; the chunk is discarded
    /// rather than truncated.
    #[error("block overrun in chunk ({}, {}): buffer sized for {expected} blocks", .coord.x, .coord.z)]
    BlockOverrun {
        /// Chunk being generated.
        coord: ChunkCoord,
        /// Pre-computed block count.
        expected: usize,
    },

    /// The block fill loop ended before the pre-computed block count.
    #[error("block underrun in chunk ({}, {}): expected {expected}, wrote {written}", .coord.x, .coord.z)]
    BlockUnderrun {
        /// Chunk being generated.
        coord: ChunkCoord,
        /// Pre-computed block count.
        expected: usize,
        /// Blocks actually written.
        written: usize,
    },

    /// Chunk side length must be in `1..=MAX_CHUNK_SIZE`.
    #[error("invalid chunk size: {0}")]
    InvalidChunkSize(i32),

    /// The chunk would cover columns past `±WORLD_LIMIT`.
    #[error("chunk ({}, {}) of size {size} lies outside the world", .coord.x, .coord.z)]
    ChunkOutsideWorld {
        /// Rejected chunk.
        coord: ChunkCoord,
        /// Chunk side length it was requested with.
        size: i32,
    },

    /// A streaming reference position is NaN or infinite.
    #[error("invalid reference position ({x}, {z})")]
    InvalidPosition {
        /// World X.
        x: f32,
        /// World Z.
        z: f32,
    },

    /// A supplied height map does not match the chunk's dimensions.
    #[error("height map has {actual} columns, chunk needs {expected}")]
    HeightMapSize {
        /// Columns required (`size * size`).
        expected: usize,
        /// Columns supplied.
        actual: usize,
    },

    /// Terrain or streaming parameters are out of range.
    #[error("invalid generation parameters: {0}")]
    InvalidParams(String),

    /// A background generation worker panicked.
    #[error("chunk generation worker panicked")]
    WorkerPanicked,
}

/// Result type for generation operations.
pub type GenerationResult<T> = Result<T, GenerationError>;
