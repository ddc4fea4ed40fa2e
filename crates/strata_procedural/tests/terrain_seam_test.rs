//! # Terrain Seam Tests
//!
//! Heights must depend only on world coordinates, so neighbouring chunks
//! generated independently line up exactly at their shared border.

use strata_procedural::{
    Chunk, ChunkCoord, LatticeStrategy, TerrainGenerator, TerrainParams, WorldSeed,
    MAX_TERRAIN_HEIGHT,
};

const SIZE: i32 = 16;

fn generators() -> Vec<TerrainGenerator> {
    [LatticeStrategy::Permutation, LatticeStrategy::DirectHash]
        .into_iter()
        .map(|strategy| {
            TerrainGenerator::new(WorldSeed::from_phrase("test"), strategy, TerrainParams::default())
                .expect("default params are valid")
        })
        .collect()
}

/// A chunk generated by one generator agrees with an independently built
/// generator at every column, including both border rows.
#[test]
fn test_border_columns_match_independent_generator() {
    for gen in generators() {
        let other = TerrainGenerator::new(
            WorldSeed::from_phrase("test"),
            gen.field().strategy(),
            TerrainParams::default(),
        )
        .expect("valid");

        let east = Chunk::generate(ChunkCoord::new(1, 0), SIZE, &gen).expect("ok");
        for z in 0..SIZE {
            assert_eq!(east.height_at(SIZE, z), Some(other.column_height(SIZE, z)));
            assert_eq!(east.height_at(2 * SIZE - 1, z), Some(other.column_height(2 * SIZE - 1, z)));
        }
    }
}

/// With the default parameters one column step is bounded by
/// `80 * 0.02 * 4` (amplitude, scale, octave slope sum) plus one for the floor.
const MAX_COLUMN_STEP: i32 = 7;

/// Shared edges between horizontally and vertically adjacent chunks step by
/// no more than the terrain slope allows anywhere else.
#[test]
fn test_no_seams_between_neighbours() {
    for gen in generators() {
        for (cx, cz) in [(0, 0), (-1, 3), (7, -7)] {
            let here = Chunk::generate(ChunkCoord::new(cx, cz), SIZE, &gen).expect("ok");
            let east = Chunk::generate(ChunkCoord::new(cx + 1, cz), SIZE, &gen).expect("ok");
            let south = Chunk::generate(ChunkCoord::new(cx, cz + 1), SIZE, &gen).expect("ok");

            let (min_x, min_z, max_x, max_z) = here.bounds();
            for z in min_z..max_z {
                let inner = here.height_at(max_x - 1, z).expect("inside");
                let outer = east.height_at(max_x, z).expect("inside neighbour");
                assert!((inner - outer).abs() <= MAX_COLUMN_STEP, "seam at x={max_x}, z={z}");
            }
            for x in min_x..max_x {
                let inner = here.height_at(x, max_z - 1).expect("inside");
                let outer = south.height_at(x, max_z).expect("inside neighbour");
                assert!((inner - outer).abs() <= MAX_COLUMN_STEP, "seam at x={x}, z={max_z}");
            }
        }
    }
}

#[test]
fn test_interior_slope_bound_holds() {
    for gen in generators() {
        for z in -64..64 {
            for x in -64..64 {
                let h = gen.column_height(x, z);
                assert!((h - gen.column_height(x + 1, z)).abs() <= MAX_COLUMN_STEP);
                assert!((h - gen.column_height(x, z + 1)).abs() <= MAX_COLUMN_STEP);
            }
        }
    }
}

#[test]
fn test_heights_within_clamp_everywhere() {
    for gen in generators() {
        for (cx, cz) in [(0, 0), (100, -100), (-31, 17), (4, 4), (-1, -1)] {
            let chunk = Chunk::generate(ChunkCoord::new(cx, cz), SIZE, &gen).expect("ok");
            assert!(chunk
                .heights()
                .iter()
                .all(|h| (0..=MAX_TERRAIN_HEIGHT).contains(h)));

            let expected: usize = chunk.heights().iter().map(|&h| h as usize + 1).sum();
            assert_eq!(chunk.num_cubes(), expected);
        }
    }
}

#[test]
fn test_same_seed_same_world() {
    let a = TerrainGenerator::with_seed(WorldSeed::from_phrase("test"));
    let b = TerrainGenerator::with_seed(WorldSeed::from_phrase("test"));
    let c = TerrainGenerator::with_seed(WorldSeed::from_phrase("other"));

    let mut differs = false;
    for z in (-200..200).step_by(13) {
        for x in (-200..200).step_by(11) {
            assert_eq!(a.column_height(x, z), b.column_height(x, z));
            differs |= a.column_height(x, z) != c.column_height(x, z);
        }
    }
    assert!(differs, "different seeds should shape different terrain");
}
