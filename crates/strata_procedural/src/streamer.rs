//! # World Streamer
//!
//! Keeps a square (Chebyshev) window of chunks loaded around a moving
//! reference point and maintains the flattened block buffer the renderer draws.
//!
//! ## Lifecycle
//!
//! 1. [`WorldStreamer::check_boundary`] runs every frame with the reference
//!    position. It does nothing until the reference enters a new chunk.
//! 2. On a crossing, [`WorldStreamer::update`] generates every missing chunk
//!    of the new window, then drops chunks outside it and inserts the new ones
//!    in one step. A chunk is never visible before both generation passes finish.
//! 3. If membership changed, the aggregate buffer is rebuilt in row-major
//!    `(z, x)` chunk order.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info};

use crate::chunk::{BlockInstance, Chunk, ChunkCoord, ChunkKey, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};
use crate::collision::{ChunkSnapshot, CollisionProbe};
use crate::error::{GenerationError, GenerationResult};
use crate::terrain::TerrainGenerator;

/// Default Chebyshev render radius in chunks.
pub const DEFAULT_RENDER_DISTANCE: i32 = 1;

/// Largest accepted render radius: a window of at most `65 x 65` chunks.
pub const MAX_RENDER_DISTANCE: i32 = 32;

/// Loaded chunks keyed by packed coordinate.
pub type ChunkMap = HashMap<ChunkKey, Arc<Chunk>>;

/// Streaming configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamerConfig {
    /// Chunk side length in blocks.
    pub chunk_size: i32,
    /// Chebyshev radius (in chunks) kept loaded around the reference.
    pub render_distance: i32,
    /// Threads used to generate missing chunks; `0` or `1` generates inline.
    pub worker_threads: usize,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            render_distance: DEFAULT_RENDER_DISTANCE,
            worker_threads: 1,
        }
    }
}

impl StreamerConfig {
    /// Checks sizes.
    ///
    /// # Errors
    ///
    /// Returns an error for a chunk size outside `1..=MAX_CHUNK_SIZE` or a
    /// render distance outside `0..=MAX_RENDER_DISTANCE`.
    pub fn validate(&self) -> GenerationResult<()> {
        if !(1..=MAX_CHUNK_SIZE).contains(&self.chunk_size) {
            return Err(GenerationError::InvalidChunkSize(self.chunk_size));
        }
        if !(0..=MAX_RENDER_DISTANCE).contains(&self.render_distance) {
            return Err(GenerationError::InvalidParams(format!(
                "render_distance {} must be in 0..={MAX_RENDER_DISTANCE}",
                self.render_distance
            )));
        }
        Ok(())
    }

    /// Number of chunks in a full window: `(2r + 1)^2`, with `r` clamped to
    /// `0..=MAX_RENDER_DISTANCE`.
    #[must_use]
    pub const fn window_len(&self) -> usize {
        let radius = if self.render_distance < 0 {
            0
        } else if self.render_distance > MAX_RENDER_DISTANCE {
            MAX_RENDER_DISTANCE
        } else {
            self.render_distance
        };
        let side = (2 * radius + 1) as usize;
        side * side
    }
}

/// Membership change produced by one [`WorldStreamer::update`].
///
/// The renderer releases resources for `unloaded` and re-reads the aggregate
/// buffer when [`StreamDelta::changed`] is true.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamDelta {
    /// Newly inserted chunks, row-major order.
    pub loaded: Vec<ChunkCoord>,
    /// Dropped chunks, row-major order.
    pub unloaded: Vec<ChunkCoord>,
}

impl StreamDelta {
    /// True if any chunk was loaded or unloaded.
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.loaded.is_empty() || !self.unloaded.is_empty()
    }
}

/// Lifetime counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Chunks generated since creation.
    pub generated_total: u64,
    /// Chunks dropped since creation.
    pub unloaded_total: u64,
    /// Aggregate buffer rebuilds.
    pub rebuilds: u64,
}

/// Owner of the loaded chunk set and the render aggregate.
pub struct WorldStreamer {
    generator: Arc<TerrainGenerator>,
    config: StreamerConfig,
    chunks: ChunkMap,
    current: Option<ChunkCoord>,
    aggregate: Vec<f32>,
    total_blocks: usize,
    stats: StreamStats,
}

impl WorldStreamer {
    /// Creates an empty streamer. Nothing is loaded until the first update.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` fails [`StreamerConfig::validate`].
    pub fn new(generator: Arc<TerrainGenerator>, config: StreamerConfig) -> GenerationResult<Self> {
        config.validate()?;
        Ok(Self {
            generator,
            config,
            chunks: HashMap::with_capacity(config.window_len()),
            current: None,
            aggregate: Vec::new(),
            total_blocks: 0,
            stats: StreamStats::default(),
        })
    }

    /// Streaming configuration.
    #[must_use]
    pub const fn config(&self) -> &StreamerConfig {
        &self.config
    }

    /// Shared terrain generator.
    #[must_use]
    pub fn generator(&self) -> &Arc<TerrainGenerator> {
        &self.generator
    }

    /// Chunk the reference was last seen in, if any.
    #[must_use]
    pub const fn current_chunk(&self) -> Option<ChunkCoord> {
        self.current
    }

    /// Lifetime counters.
    #[must_use]
    pub const fn stats(&self) -> StreamStats {
        self.stats
    }

    /// Derives the reference chunk from a world position and updates the
    /// window if the reference crossed into a different chunk.
    ///
    /// Returns `None` when the reference is still in the stored chunk.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidPosition`] for a non-finite X or Z,
    /// and propagates [`Self::update`] errors. Membership and the stored chunk
    /// are unchanged on error.
    pub fn check_boundary(&mut self, position: [f32; 3]) -> GenerationResult<Option<StreamDelta>> {
        if !(position[0].is_finite() && position[2].is_finite()) {
            return Err(GenerationError::InvalidPosition {
                x: position[0],
                z: position[2],
            });
        }
        let chunk = ChunkCoord::containing(position[0], position[2], self.config.chunk_size);
        if self.current == Some(chunk) {
            return Ok(None);
        }
        let delta = self.update(chunk)?;
        self.current = Some(chunk);
        Ok(Some(delta))
    }

    /// Makes the loaded set exactly the Chebyshev window around `center`,
    /// minus any chunks past the world limit.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::ChunkOutsideWorld`] if `center` itself is
    /// past the world limit, and propagates chunk generation errors.
    /// Generation completes for every missing chunk before any membership
    /// change, so a failure leaves the loaded set untouched.
    pub fn update(&mut self, center: ChunkCoord) -> GenerationResult<StreamDelta> {
        let size = self.config.chunk_size;
        if !center.is_within_world(size) {
            return Err(GenerationError::ChunkOutsideWorld { coord: center, size });
        }

        let missing: Vec<ChunkCoord> = chebyshev_window(center, self.config.render_distance)
            .into_iter()
            .filter(|coord| coord.is_within_world(size))
            .filter(|coord| !self.chunks.contains_key(&coord.key()))
            .collect();

        let generated = generate_batch(
            &self.generator,
            self.config.chunk_size,
            &missing,
            self.config.worker_threads,
        )
        .map_err(|e| {
            error!(chunk_x = center.x, chunk_z = center.z, "chunk generation failed: {e}");
            e
        })?;

        let mut unloaded: Vec<ChunkCoord> = self
            .chunks
            .keys()
            .map(|key| key.coord())
            .filter(|coord| coord.chebyshev_distance(center) > self.config.render_distance)
            .collect();
        unloaded.sort_unstable_by_key(|c| (c.z, c.x));

        for coord in &unloaded {
            self.chunks.remove(&coord.key());
        }
        for chunk in generated {
            self.chunks.insert(chunk.coord().key(), Arc::new(chunk));
        }

        let delta = StreamDelta {
            loaded: missing,
            unloaded,
        };

        if delta.changed() {
            self.stats.generated_total += delta.loaded.len() as u64;
            self.stats.unloaded_total += delta.unloaded.len() as u64;
            self.rebuild_aggregate();
            info!(
                chunk_x = center.x,
                chunk_z = center.z,
                loaded = delta.loaded.len(),
                unloaded = delta.unloaded.len(),
                total_blocks = self.total_blocks,
                "chunk window updated"
            );
        }

        Ok(delta)
    }

    /// Drops every chunk and forgets the reference chunk, so the next
    /// [`Self::check_boundary`] reloads the window from scratch.
    pub fn reset(&mut self) {
        self.stats.unloaded_total += self.chunks.len() as u64;
        self.chunks.clear();
        self.current = None;
        self.aggregate.clear();
        self.total_blocks = 0;
    }

    fn rebuild_aggregate(&mut self) {
        let mut ordered: Vec<&Arc<Chunk>> = self.chunks.values().collect();
        ordered.sort_unstable_by_key(|chunk| (chunk.coord().z, chunk.coord().x));

        self.total_blocks = ordered.iter().map(|chunk| chunk.num_cubes()).sum();
        self.aggregate.clear();
        self.aggregate
            .reserve(self.total_blocks * BlockInstance::COMPONENTS);
        for chunk in ordered {
            self.aggregate
                .extend_from_slice(bytemuck::cast_slice(chunk.blocks()));
        }
        self.stats.rebuilds += 1;
    }

    /// All loaded blocks as flattened `[x, y, z, reserved]` quadruples.
    #[must_use]
    pub fn aggregated_block_positions(&self) -> &[f32] {
        &self.aggregate
    }

    /// Number of blocks in the aggregate buffer.
    #[must_use]
    pub const fn total_block_count(&self) -> usize {
        self.total_blocks
    }

    /// Number of loaded chunks.
    #[must_use]
    pub fn loaded_chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Loaded chunk coordinates in row-major `(z, x)` order.
    #[must_use]
    pub fn loaded_coords(&self) -> Vec<ChunkCoord> {
        let mut coords: Vec<ChunkCoord> = self.chunks.keys().map(|key| key.coord()).collect();
        coords.sort_unstable_by_key(|c| (c.z, c.x));
        coords
    }

    /// True if the chunk at `coord` is loaded.
    #[must_use]
    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord.key())
    }

    /// The loaded chunk at `coord`.
    #[must_use]
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord.key()).map(|chunk| chunk.as_ref())
    }

    /// Solid/empty queries against the loaded set.
    #[must_use]
    pub fn probe(&self) -> CollisionProbe<'_> {
        CollisionProbe::new(&self.chunks, self.config.chunk_size)
    }

    /// Owned view of the current loaded set for readers on other threads.
    #[must_use]
    pub fn snapshot(&self) -> ChunkSnapshot {
        ChunkSnapshot::new(self.chunks.clone(), self.config.chunk_size)
    }
}

/// All chunk coordinates within Chebyshev distance `radius` of `center`,
/// row-major `(z, x)` order.
///
/// A negative `radius` gives an empty window and a larger one is capped at
/// [`MAX_RENDER_DISTANCE`]. Coordinates that would overflow `i32` are left out.
#[must_use]
pub fn chebyshev_window(center: ChunkCoord, radius: i32) -> Vec<ChunkCoord> {
    if radius < 0 {
        return Vec::new();
    }
    let radius = radius.min(MAX_RENDER_DISTANCE);
    let mut coords = Vec::new();
    for dz in -radius..=radius {
        let Some(z) = center.z.checked_add(dz) else {
            continue;
        };
        for dx in -radius..=radius {
            if let Some(x) = center.x.checked_add(dx) {
                coords.push(ChunkCoord::new(x, z));
            }
        }
    }
    coords
}

/// Generates `coords`, splitting the work across `workers` scoped threads.
///
/// Returns only once every chunk is complete (or the first error).
fn generate_batch(
    generator: &TerrainGenerator,
    size: i32,
    coords: &[ChunkCoord],
    workers: usize,
) -> GenerationResult<Vec<Chunk>> {
    if workers <= 1 || coords.len() <= 1 {
        return coords
            .iter()
            .map(|&coord| Chunk::generate(coord, size, generator))
            .collect();
    }

    let per_worker = coords.len().div_ceil(workers);
    std::thread::scope(|scope| -> GenerationResult<Vec<Chunk>> {
        let handles: Vec<_> = coords
            .chunks(per_worker)
            .map(|batch| {
                scope.spawn(move || {
                    batch
                        .iter()
                        .map(|&coord| Chunk::generate(coord, size, generator))
                        .collect::<GenerationResult<Vec<Chunk>>>()
                })
            })
            .collect();

        let mut chunks = Vec::with_capacity(coords.len());
        for handle in handles {
            let batch = handle.join().map_err(|_| GenerationError::WorkerPanicked)??;
            chunks.extend(batch);
        }
        Ok(chunks)
    })
}
