//! # Chunk System
//!
//! World data is organized into square chunks of `size x size` columns.
//! Each chunk owns:
//! - a height map (one clamped terrain height per column)
//! - a dense block list (one instance per solid block) for the renderer
//!
//! Chunks are generated once and never mutated.
//!
//! ## Block Layout
//!
//! Blocks are emitted column by column, bottom to top, as `[x, y, z, reserved]`
//! `f32` quadruples so the list can be uploaded as instance data unchanged.

use bytemuck::{Pod, Zeroable};
use tracing::debug;

use crate::error::{GenerationError, GenerationResult};
use crate::terrain::TerrainGenerator;

/// Default chunk width/depth in blocks.
pub const DEFAULT_CHUNK_SIZE: i32 = 16;

/// Largest chunk side length in blocks.
pub const MAX_CHUNK_SIZE: i32 = 256;

/// Largest absolute world X or Z block coordinate a chunk may cover.
///
/// `f32` positions stop resolving individual blocks past `2^24`.
pub const WORLD_LIMIT: i32 = 1 << 24;

/// Chunk coordinate (identifies a chunk in the world grid).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// X coordinate (in chunks, not blocks).
    pub x: i32,
    /// Z coordinate (in chunks, not blocks).
    pub z: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Converts world block coordinates to the owning chunk coordinate.
    #[inline]
    #[must_use]
    pub const fn from_block_pos(block_x: i32, block_z: i32, size: i32) -> Self {
        Self {
            x: block_x.div_euclid(size),
            z: block_z.div_euclid(size),
        }
    }

    /// Chunk containing a continuous world position: `floor(x / size)`, `floor(z / size)`.
    #[inline]
    #[must_use]
    pub fn containing(world_x: f32, world_z: f32, size: i32) -> Self {
        let size = size as f32;
        Self {
            x: (world_x / size).floor() as i32,
            z: (world_z / size).floor() as i32,
        }
    }

    /// Returns the world X coordinate of the chunk's origin (corner).
    ///
    /// Saturates for chunks outside [`WORLD_LIMIT`].
    #[inline]
    #[must_use]
    pub const fn world_x(self, size: i32) -> i32 {
        self.x.saturating_mul(size)
    }

    /// Returns the world Z coordinate of the chunk's origin.
    #[inline]
    #[must_use]
    pub const fn world_z(self, size: i32) -> i32 {
        self.z.saturating_mul(size)
    }

    /// True if every column of this chunk lies within `±WORLD_LIMIT`.
    #[must_use]
    pub fn is_within_world(self, size: i32) -> bool {
        let size = i64::from(size);
        let limit = i64::from(WORLD_LIMIT);
        [self.x, self.z].iter().all(|&axis| {
            let min = i64::from(axis) * size;
            min >= -limit && min + size - 1 <= limit
        })
    }

    /// Chebyshev (max-axis) distance to another chunk, saturating at `i32::MAX`.
    #[inline]
    #[must_use]
    pub fn chebyshev_distance(self, other: Self) -> i32 {
        let distance = self.x.abs_diff(other.x).max(self.z.abs_diff(other.z));
        i32::try_from(distance).unwrap_or(i32::MAX)
    }

    /// Packed map key for this coordinate.
    #[inline]
    #[must_use]
    pub const fn key(self) -> ChunkKey {
        ChunkKey::pack(self)
    }
}

/// A chunk coordinate packed into one integer: `x` in the high 32 bits,
/// `z` in the low 32 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkKey(u64);

impl ChunkKey {
    /// Packs a coordinate.
    #[inline]
    #[must_use]
    pub const fn pack(coord: ChunkCoord) -> Self {
        Self(((coord.x as u32 as u64) << 32) | (coord.z as u32 as u64))
    }

    /// Unpacks back into a coordinate.
    #[inline]
    #[must_use]
    pub const fn coord(self) -> ChunkCoord {
        ChunkCoord {
            x: (self.0 >> 32) as u32 as i32,
            z: self.0 as u32 as i32,
        }
    }

    /// The raw packed value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl From<ChunkCoord> for ChunkKey {
    fn from(coord: ChunkCoord) -> Self {
        Self::pack(coord)
    }
}

/// One solid block as handed to the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct BlockInstance {
    /// World X.
    pub x: f32,
    /// World Y.
    pub y: f32,
    /// World Z.
    pub z: f32,
    /// Reserved for per-block metadata; always zero.
    pub reserved: f32,
}

impl BlockInstance {
    /// Number of `f32` components per instance.
    pub const COMPONENTS: usize = 4;

    /// Creates an instance at integer world coordinates.
    #[inline]
    #[must_use]
    pub fn at(x: i32, y: i32, z: i32) -> Self {
        Self {
            x: x as f32,
            y: y as f32,
            z: z as f32,
            reserved: 0.0,
        }
    }
}

/// A generated chunk: height map plus block list.
///
/// Immutable after construction, which is what lets a finished chunk be
/// shared across threads without locking.
#[derive(Clone, Debug)]
pub struct Chunk {
    coord: ChunkCoord,
    size: i32,
    /// Column heights, indexed `[local_z * size + local_x]`.
    heights: Box<[i32]>,
    blocks: Box<[BlockInstance]>,
}

impl Chunk {
    /// Generates the chunk at `coord` from the shared terrain function.
    ///
    /// Pass 1 fills the height map; pass 2 emits one block per `y` in
    /// `0..=height` for every column.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidChunkSize`] if `size` is outside
    /// `1..=MAX_CHUNK_SIZE`, [`GenerationError::ChunkOutsideWorld`] past
    /// [`WORLD_LIMIT`], or a block-count error if the fill pass disagrees
    /// with the count taken in pass 1.
    pub fn generate(
        coord: ChunkCoord,
        size: i32,
        generator: &TerrainGenerator,
    ) -> GenerationResult<Self> {
        let side = checked_dimensions(coord, size)?;
        let origin_x = coord.world_x(size);
        let origin_z = coord.world_z(size);

        let mut heights = Vec::with_capacity(side * side);
        let mut expected = 0usize;
        for local_z in 0..size {
            for local_x in 0..size {
                let height = generator
                    .column_height(origin_x + local_x, origin_z + local_z)
                    .clamp(0, crate::terrain::MAX_TERRAIN_HEIGHT);
                expected += height as usize + 1;
                heights.push(height);
            }
        }

        let blocks = fill_blocks(coord, size, &heights, expected)?;
        let chunk = Self {
            coord,
            size,
            heights: heights.into_boxed_slice(),
            blocks: blocks.into_boxed_slice(),
        };
        debug!(
            chunk_x = coord.x,
            chunk_z = coord.z,
            blocks = chunk.num_cubes(),
            "generated chunk"
        );
        Ok(chunk)
    }

    /// Builds a chunk from an explicit height map (`[local_z * size + local_x]`).
    ///
    /// Heights are clamped to `[0, MAX_TERRAIN_HEIGHT]`.
    ///
    /// # Errors
    ///
    /// Returns an error if `size` is out of range, the chunk lies past
    /// [`WORLD_LIMIT`], the map has the wrong number of columns, or the block
    /// fill disagrees with the height sum.
    pub fn from_height_map(
        coord: ChunkCoord,
        size: i32,
        mut heights: Vec<i32>,
    ) -> GenerationResult<Self> {
        let side = checked_dimensions(coord, size)?;
        if heights.len() != side * side {
            return Err(GenerationError::HeightMapSize {
                expected: side * side,
                actual: heights.len(),
            });
        }
        let mut expected = 0usize;
        for h in &mut heights {
            *h = (*h).clamp(0, crate::terrain::MAX_TERRAIN_HEIGHT);
            expected += *h as usize + 1;
        }

        let blocks = fill_blocks(coord, size, &heights, expected)?;

        Ok(Self {
            coord,
            size,
            heights: heights.into_boxed_slice(),
            blocks: blocks.into_boxed_slice(),
        })
    }

    /// Chunk position in the world.
    #[inline]
    #[must_use]
    pub const fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Side length in blocks.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> i32 {
        self.size
    }

    /// World-space column bounds: `(min_x, min_z, max_x_exclusive, max_z_exclusive)`.
    #[must_use]
    pub const fn bounds(&self) -> (i32, i32, i32, i32) {
        let min_x = self.coord.world_x(self.size);
        let min_z = self.coord.world_z(self.size);
        (min_x, min_z, min_x + self.size, min_z + self.size)
    }

    /// Terrain height of a world column, or `None` outside this chunk.
    #[inline]
    #[must_use]
    pub fn height_at(&self, world_x: i32, world_z: i32) -> Option<i32> {
        let (min_x, min_z, max_x, max_z) = self.bounds();
        if world_x < min_x || world_x >= max_x || world_z < min_z || world_z >= max_z {
            return None;
        }
        let index = (world_z - min_z) * self.size + (world_x - min_x);
        self.heights.get(index as usize).copied()
    }

    /// True if a solid block occupies the world cell: `0 <= y <= height`.
    ///
    /// Cells outside this chunk's columns are empty.
    #[inline]
    #[must_use]
    pub fn has_block(&self, world_x: i32, world_y: i32, world_z: i32) -> bool {
        self.height_at(world_x, world_z)
            .is_some_and(|height| (0..=height).contains(&world_y))
    }

    /// Column heights, indexed `[local_z * size + local_x]`.
    #[must_use]
    pub fn heights(&self) -> &[i32] {
        &self.heights
    }

    /// Solid blocks in emission order.
    #[must_use]
    pub fn blocks(&self) -> &[BlockInstance] {
        &self.blocks
    }

    /// Number of solid blocks.
    #[inline]
    #[must_use]
    pub fn num_cubes(&self) -> usize {
        self.blocks.len()
    }
}

/// Side length as `usize` once `size` and `coord` are known to be in range.
fn checked_dimensions(coord: ChunkCoord, size: i32) -> GenerationResult<usize> {
    if !(1..=MAX_CHUNK_SIZE).contains(&size) {
        return Err(GenerationError::InvalidChunkSize(size));
    }
    if !coord.is_within_world(size) {
        return Err(GenerationError::ChunkOutsideWorld { coord, size });
    }
    Ok(size as usize)
}

/// Emits every column's blocks into a buffer sized exactly `expected`, the
/// count taken while the height map was built.
fn fill_blocks(
    coord: ChunkCoord,
    size: i32,
    heights: &[i32],
    expected: usize,
) -> GenerationResult<Vec<BlockInstance>> {
    let mut blocks = Vec::with_capacity(expected);

    let origin_x = coord.world_x(size);
    let origin_z = coord.world_z(size);

    for (index, &height) in heights.iter().enumerate() {
        let local_z = index as i32 / size;
        let local_x = index as i32 % size;
        let world_x = origin_x + local_x;
        let world_z = origin_z + local_z;

        for y in 0..=height {
            if blocks.len() == expected {
                return Err(GenerationError::BlockOverrun { coord, expected });
            }
            blocks.push(BlockInstance::at(world_x, y, world_z));
        }
    }

    if blocks.len() != expected {
        return Err(GenerationError::BlockUnderrun {
            coord,
            expected,
            written: blocks.len(),
        });
    }

    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::WorldSeed;
    use crate::terrain::MAX_TERRAIN_HEIGHT;

    fn generator() -> TerrainGenerator {
        TerrainGenerator::with_seed(WorldSeed::from_phrase("test"))
    }

    #[test]
    fn test_chunk_coord_from_block() {
        assert_eq!(ChunkCoord::from_block_pos(0, 0, 16), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_block_pos(15, 15, 16), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_block_pos(16, 16, 16), ChunkCoord::new(1, 1));
        assert_eq!(ChunkCoord::from_block_pos(-1, -1, 16), ChunkCoord::new(-1, -1));
        assert_eq!(ChunkCoord::from_block_pos(-16, -16, 16), ChunkCoord::new(-1, -1));
        assert_eq!(ChunkCoord::from_block_pos(-17, -17, 16), ChunkCoord::new(-2, -2));
    }

    #[test]
    fn test_chunk_coord_containing() {
        assert_eq!(ChunkCoord::containing(20.0, 3.5, 16), ChunkCoord::new(1, 0));
        assert_eq!(ChunkCoord::containing(-0.1, 15.99, 16), ChunkCoord::new(-1, 0));
        assert_eq!(ChunkCoord::containing(-16.0, -16.5, 16), ChunkCoord::new(-1, -2));
    }

    #[test]
    fn test_key_round_trips_negative_coords() {
        for coord in [
            ChunkCoord::new(0, 0),
            ChunkCoord::new(-1, 1),
            ChunkCoord::new(i32::MIN, i32::MAX),
            ChunkCoord::new(1234, -98765),
        ] {
            assert_eq!(coord.key().coord(), coord);
        }
        assert_ne!(ChunkCoord::new(1, 0).key(), ChunkCoord::new(0, 1).key());
    }

    #[test]
    fn test_block_count_identity() {
        let gen = generator();
        for coord in [
            ChunkCoord::new(0, 0),
            ChunkCoord::new(1, 0),
            ChunkCoord::new(-3, 7),
            ChunkCoord::new(12, -12),
            ChunkCoord::new(-40, -2),
            ChunkCoord::new(250, 31),
        ] {
            let chunk = Chunk::generate(coord, 16, &gen).expect("generation succeeds");
            let expected: usize = chunk.heights().iter().map(|&h| h as usize + 1).sum();
            assert_eq!(chunk.num_cubes(), expected, "count mismatch in {coord:?}");
        }
    }

    #[test]
    fn test_heights_match_generator_and_clamp() {
        let gen = generator();
        let coord = ChunkCoord::new(-2, 5);
        let chunk = Chunk::generate(coord, 16, &gen).expect("generation succeeds");
        let (min_x, min_z, max_x, max_z) = chunk.bounds();
        for z in min_z..max_z {
            for x in min_x..max_x {
                let h = chunk.height_at(x, z).expect("inside bounds");
                assert!((0..=MAX_TERRAIN_HEIGHT).contains(&h));
                assert_eq!(h, gen.column_height(x, z));
            }
        }
    }

    #[test]
    fn test_outside_bounds_is_empty() {
        let chunk = Chunk::generate(ChunkCoord::new(0, 0), 16, &generator()).expect("ok");
        assert_eq!(chunk.height_at(16, 0), None);
        assert_eq!(chunk.height_at(-1, 0), None);
        assert_eq!(chunk.height_at(0, 16), None);
        assert!(!chunk.has_block(16, 0, 0));
        assert!(!chunk.has_block(0, 0, -1));
    }

    #[test]
    fn test_has_block_follows_height() {
        let heights = (0..16).map(|i| i % 5).collect();
        let chunk = Chunk::from_height_map(ChunkCoord::new(1, -1), 4, heights).expect("ok");
        // Column (local x=1, local z=1) -> index 5 -> height 0
        assert!(chunk.has_block(5, 0, -3));
        assert!(!chunk.has_block(5, 1, -3));
        // Column (local x=3, local z=0) -> index 3 -> height 3
        assert!(chunk.has_block(7, 3, -4));
        assert!(!chunk.has_block(7, 4, -4));
        assert!(!chunk.has_block(7, -1, -4));
    }

    #[test]
    fn test_block_list_layout() {
        let chunk = Chunk::from_height_map(ChunkCoord::new(2, 3), 2, vec![1, 0, 2, 0]).expect("ok");
        let expected = [
            BlockInstance::at(4, 0, 6),
            BlockInstance::at(4, 1, 6),
            BlockInstance::at(5, 0, 6),
            BlockInstance::at(4, 0, 7),
            BlockInstance::at(4, 1, 7),
            BlockInstance::at(4, 2, 7),
            BlockInstance::at(5, 0, 7),
        ];
        assert_eq!(chunk.blocks(), &expected);
        assert!(chunk.blocks().iter().all(|b| b.reserved == 0.0));
    }

    #[test]
    fn test_from_height_map_clamps() {
        let chunk = Chunk::from_height_map(ChunkCoord::new(0, 0), 2, vec![-5, 300, 7, 0]).expect("ok");
        assert_eq!(chunk.heights(), &[0, MAX_TERRAIN_HEIGHT, 7, 0]);
        assert_eq!(chunk.num_cubes(), 1 + 101 + 8 + 1);
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        assert_eq!(
            Chunk::generate(ChunkCoord::new(0, 0), 0, &generator()).unwrap_err(),
            GenerationError::InvalidChunkSize(0)
        );
        assert_eq!(
            Chunk::from_height_map(ChunkCoord::new(0, 0), 3, vec![1; 8]).unwrap_err(),
            GenerationError::HeightMapSize { expected: 9, actual: 8 }
        );
    }

    #[test]
    fn test_rejects_oversized_chunks() {
        assert_eq!(
            Chunk::generate(ChunkCoord::new(0, 0), MAX_CHUNK_SIZE + 1, &generator()).unwrap_err(),
            GenerationError::InvalidChunkSize(MAX_CHUNK_SIZE + 1)
        );
        assert!(Chunk::from_height_map(ChunkCoord::new(0, 0), MAX_CHUNK_SIZE, vec![0; 256 * 256]).is_ok());
    }

    #[test]
    fn test_rejects_chunks_past_world_limit() {
        for coord in [
            ChunkCoord::new(i32::MAX, 0),
            ChunkCoord::new(0, i32::MIN),
            ChunkCoord::new(WORLD_LIMIT / 16 + 1, 0),
        ] {
            assert_eq!(
                Chunk::generate(coord, 16, &generator()).unwrap_err(),
                GenerationError::ChunkOutsideWorld { coord, size: 16 }
            );
            assert!(!coord.is_within_world(16));
        }
        // The outermost chunks still fit
        assert!(ChunkCoord::new(-WORLD_LIMIT / 16, 0).is_within_world(16));
        assert!(ChunkCoord::new(WORLD_LIMIT / 16 - 1, 0).is_within_world(16));
        assert!(!ChunkCoord::new(WORLD_LIMIT / 16, 0).is_within_world(16));
    }

    #[test]
    fn test_extreme_coords_do_not_overflow() {
        let far = ChunkCoord::new(i32::MAX, i32::MIN);
        assert_eq!(far.world_x(16), i32::MAX);
        assert_eq!(far.world_z(16), i32::MIN);
        assert_eq!(far.chebyshev_distance(ChunkCoord::new(i32::MIN, 0)), i32::MAX);
        assert_eq!(ChunkCoord::new(-3, 4).chebyshev_distance(ChunkCoord::new(2, 2)), 5);
    }

    #[test]
    fn test_fill_stops_at_expected_count() {
        let coord = ChunkCoord::new(1, -1);
        let heights = [2, 0, 1, 3];
        // True count is 3 + 1 + 2 + 4 = 10
        assert_eq!(
            fill_blocks(coord, 2, &heights, 7).unwrap_err(),
            GenerationError::BlockOverrun { coord, expected: 7 }
        );
        assert_eq!(
            fill_blocks(coord, 2, &heights, 12).unwrap_err(),
            GenerationError::BlockUnderrun { coord, expected: 12, written: 10 }
        );
        let blocks = fill_blocks(coord, 2, &heights, 10).expect("exact count");
        assert_eq!(blocks.len(), 10);
        assert_eq!(blocks[0], BlockInstance::at(2, 0, -2));
        assert_eq!(blocks[9], BlockInstance::at(3, 3, -1));
    }

    #[test]
    fn test_chunk_generation_determinism() {
        let a = Chunk::generate(ChunkCoord::new(5, 10), 16, &generator()).expect("ok");
        let b = Chunk::generate(ChunkCoord::new(5, 10), 16, &generator()).expect("ok");
        assert_eq!(a.heights(), b.heights());
        assert_eq!(a.blocks(), b.blocks());
    }

    #[test]
    fn test_instances_cast_to_floats() {
        let chunk = Chunk::from_height_map(ChunkCoord::new(0, 0), 1, vec![2]).expect("ok");
        let floats: &[f32] = bytemuck::cast_slice(chunk.blocks());
        assert_eq!(floats, &[0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 2.0, 0.0, 0.0]);
    }
}
