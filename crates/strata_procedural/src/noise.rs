//! # Coordinate Noise Field
//!
//! Deterministic pseudo-random values on the integer lattice, plus smooth
//! value noise interpolated between lattice points.
//!
//! ## Determinism Guarantee
//!
//! A lattice value is a pure function of `(seed, x, z)` in absolute world
//! coordinates. Two chunks asking for the same world point always agree, so
//! terrain has no seams at chunk borders.
//!
//! ## Strategies
//!
//! - [`LatticeStrategy::Permutation`]: one 256-entry shuffled table built from
//!   the seed at world creation. Cheap per lookup, repeats every 256 blocks.
//! - [`LatticeStrategy::DirectHash`]: reseeds a `ChaCha8` stream from a
//!   fixed-width `(seed, x, z)` key for every lookup. No shared table, no
//!   period, heavier per call.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

/// Resolution of direct-hash lattice values (24 bits of the first PRNG word).
const DIRECT_HASH_RESOLUTION: f64 = 16_777_216.0;

/// Number of distinct permutation entries.
const PERMUTATION_SIZE: usize = 256;

/// World seed for deterministic generation.
///
/// All procedural generation derives from this seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldSeed(u64);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Creates a seed from a text phrase (64-bit FNV-1a over the UTF-8 bytes).
    #[must_use]
    pub fn from_phrase(phrase: &str) -> Self {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in phrase.bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Self(hash)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Derives a sub-seed for a specific purpose.
    ///
    /// Uses a hash function to create independent streams from one seed.
    #[inline]
    #[must_use]
    pub const fn derive(self, purpose: u64) -> Self {
        let mut hash = self.0;
        hash ^= purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        Self(hash)
    }
}

impl Default for WorldSeed {
    fn default() -> Self {
        Self(0xDEAD_BEEF_CAFE_BABE)
    }
}

impl From<u64> for WorldSeed {
    fn from(seed: u64) -> Self {
        Self::new(seed)
    }
}

impl From<&str> for WorldSeed {
    fn from(phrase: &str) -> Self {
        Self::from_phrase(phrase)
    }
}

/// How lattice values are derived from the seed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatticeStrategy {
    /// Shared shuffled table, built once per world.
    #[default]
    Permutation,
    /// Fresh PRNG per lattice point keyed by `(seed, x, z)`.
    DirectHash,
}

/// Pre-computed permutation table.
///
/// 256 shuffled entries, doubled so `perm[a + b]` never wraps for `a, b < 256`.
#[derive(Clone, Debug)]
struct PermutationTable {
    perm: Box<[u8; PERMUTATION_SIZE * 2]>,
}

impl PermutationTable {
    /// Fisher-Yates shuffle of `0..256` driven by a seeded `ChaCha8`.
    fn new(seed: WorldSeed) -> Self {
        let mut perm = [0u8; PERMUTATION_SIZE * 2];
        for (i, slot) in perm.iter_mut().take(PERMUTATION_SIZE).enumerate() {
            *slot = i as u8;
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed.value());
        for i in (1..PERMUTATION_SIZE).rev() {
            let j = rng.gen_range(0..=i);
            perm.swap(i, j);
        }

        let (low, high) = perm.split_at_mut(PERMUTATION_SIZE);
        high.copy_from_slice(low);

        Self {
            perm: Box::new(perm),
        }
    }

    #[inline]
    fn hash(&self, x: i32, z: i32) -> u8 {
        let xi = (x & 255) as usize;
        let zi = (z & 255) as usize;
        self.perm[self.perm[xi] as usize + zi]
    }
}

#[derive(Clone, Debug)]
enum Lattice {
    Permutation(PermutationTable),
    DirectHash,
}

/// Deterministic scalar field over integer lattice points.
///
/// Immutable after construction; share it by reference (or `Arc`) between
/// every chunk generator of a world.
///
/// # Example
///
/// ```rust,ignore
/// let field = CoordinateNoiseField::new(WorldSeed::from_phrase("test"), LatticeStrategy::Permutation);
///
/// let corner = field.value_at(12, -7);
/// assert!((0.0..1.0).contains(&corner));
///
/// // Smooth value noise reproduces lattice values at integer points
/// assert_eq!(field.sample(12.0, -7.0), corner);
/// ```
#[derive(Clone, Debug)]
pub struct CoordinateNoiseField {
    seed: WorldSeed,
    lattice: Lattice,
}

impl CoordinateNoiseField {
    /// Builds the field for a seed. The permutation table, if any, is built here.
    #[must_use]
    pub fn new(seed: WorldSeed, strategy: LatticeStrategy) -> Self {
        let lattice = match strategy {
            LatticeStrategy::Permutation => Lattice::Permutation(PermutationTable::new(seed)),
            LatticeStrategy::DirectHash => Lattice::DirectHash,
        };
        Self { seed, lattice }
    }

    /// Returns the seed this field was built from.
    #[inline]
    #[must_use]
    pub const fn seed(&self) -> WorldSeed {
        self.seed
    }

    /// Returns the lattice strategy in use.
    #[must_use]
    pub const fn strategy(&self) -> LatticeStrategy {
        match self.lattice {
            Lattice::Permutation(_) => LatticeStrategy::Permutation,
            Lattice::DirectHash => LatticeStrategy::DirectHash,
        }
    }

    /// Value at an integer lattice point, in `[0, 1)`.
    #[inline]
    #[must_use]
    pub fn value_at(&self, x: i32, z: i32) -> f64 {
        match &self.lattice {
            Lattice::Permutation(table) => {
                f64::from(table.hash(x, z)) / PERMUTATION_SIZE as f64
            }
            Lattice::DirectHash => direct_hash(self.seed, x, z),
        }
    }

    /// Samples 2D value noise at real-valued coordinates.
    ///
    /// Bilinear blend of the four surrounding lattice values with [`fade`]d
    /// weights. Continuous everywhere, equal to [`Self::value_at`] at integer
    /// points.
    ///
    /// # Returns
    ///
    /// A value in the range `[0, 1)`.
    #[must_use]
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        let gx0 = x.floor();
        let gz0 = z.floor();
        let tx = fade(x - gx0);
        let tz = fade(z - gz0);

        let ix = gx0 as i32;
        let iz = gz0 as i32;
        let ix1 = ix.wrapping_add(1);
        let iz1 = iz.wrapping_add(1);

        let v00 = self.value_at(ix, iz);
        let v10 = self.value_at(ix1, iz);
        let v01 = self.value_at(ix, iz1);
        let v11 = self.value_at(ix1, iz1);

        let near = lerp(v00, v10, tx);
        let far = lerp(v01, v11, tx);
        lerp(near, far, tz)
    }
}

/// Quintic easing curve `6t^5 - 15t^4 + 10t^3`.
///
/// First and second derivatives vanish at `t = 0` and `t = 1`.
#[inline]
#[must_use]
pub fn fade(t: f64) -> f64 {
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Linear interpolation; returns `a` exactly at `t = 0`.
#[inline]
#[must_use]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// One ChaCha8 draw keyed by a fixed-width `(seed, x, z)` encoding.
fn direct_hash(seed: WorldSeed, x: i32, z: i32) -> f64 {
    let mut key = [0u8; 32];
    key[..8].copy_from_slice(&seed.value().to_le_bytes());
    key[8..16].copy_from_slice(&i64::from(x).to_le_bytes());
    key[16..24].copy_from_slice(&i64::from(z).to_le_bytes());

    let mut rng = ChaCha8Rng::from_seed(key);
    f64::from(rng.next_u32() >> 8) / DIRECT_HASH_RESOLUTION
}
