//! # STRATA Procedural Terrain
//!
//! Deterministic height-field terrain, streamed in chunks around a moving
//! observer.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed always produces the same world
//! 2. **Seamless**: Noise is addressed by absolute world coordinates, so
//!    neighbouring chunks agree on every shared column
//! 3. **Immutable chunks**: Generated once, published whole, never mutated
//! 4. **Streamable**: Chunks load and unload only at chunk-boundary crossings
//!
//! ## Core Components
//!
//! - `CoordinateNoiseField`: Lattice values and smooth value noise
//! - `OctaveSynthesizer`: Fractal layering into a `[0, 1]` height signal
//! - `TerrainGenerator`: World column height function
//! - `Chunk`: Height map plus render block list
//! - `WorldStreamer`: Chebyshev chunk window and render aggregate
//! - `CollisionProbe`: Solid/empty queries over loaded chunks
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use strata_procedural::{StreamerConfig, TerrainGenerator, WorldSeed, WorldStreamer, SolidQuery};
//!
//! let generator = Arc::new(TerrainGenerator::with_seed(WorldSeed::from_phrase("test")));
//! let mut world = WorldStreamer::new(generator, StreamerConfig::default())?;
//!
//! // Player at (8, 40, 8)
//! world.check_boundary([8.0, 40.0, 8.0])?;
//! assert_eq!(world.loaded_chunk_count(), 9);
//!
//! // Every loaded column is solid at y = 0
//! assert!(world.probe().is_solid(8.0, 0.0, 8.0));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod chunk;
pub mod collision;
pub mod error;
pub mod noise;
pub mod octave;
pub mod streamer;
pub mod terrain;

pub use chunk::{
    BlockInstance, Chunk, ChunkCoord, ChunkKey, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE, WORLD_LIMIT,
};
pub use collision::{ChunkSnapshot, CollisionProbe, SolidQuery};
pub use error::{GenerationError, GenerationResult};
pub use noise::{CoordinateNoiseField, LatticeStrategy, WorldSeed};
pub use octave::OctaveSynthesizer;
pub use streamer::{
    chebyshev_window, ChunkMap, StreamDelta, StreamStats, StreamerConfig, WorldStreamer,
    DEFAULT_RENDER_DISTANCE, MAX_RENDER_DISTANCE,
};
pub use terrain::{TerrainGenerator, TerrainParams, MAX_TERRAIN_HEIGHT};
