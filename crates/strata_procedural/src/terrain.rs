//! # Terrain Height Function
//!
//! Maps octave noise to integer column heights. Every chunk of a world
//! shares one [`TerrainGenerator`], so a column's height depends only on its
//! world coordinates.

use serde::Deserialize;

use crate::error::{GenerationError, GenerationResult};
use crate::noise::{CoordinateNoiseField, LatticeStrategy, WorldSeed};
use crate::octave::OctaveSynthesizer;

/// Default height added under all terrain.
pub const DEFAULT_BASE_HEIGHT: f64 = 10.0;
/// Default height range spanned by the noise signal.
pub const DEFAULT_AMPLITUDE: f64 = 80.0;
/// Default world-to-noise coordinate scale.
pub const DEFAULT_NOISE_SCALE: f64 = 0.02;
/// Default number of octaves.
pub const DEFAULT_OCTAVES: u32 = 4;
/// Default amplitude decay per octave.
pub const DEFAULT_PERSISTENCE: f64 = 0.5;
/// Default first-octave frequency.
pub const DEFAULT_BASE_FREQUENCY: f64 = 1.0;
/// Highest column height; heights are clamped to `[0, MAX_TERRAIN_HEIGHT]`.
pub const MAX_TERRAIN_HEIGHT: i32 = 100;

/// Terrain shaping parameters.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TerrainParams {
    /// Height added under all terrain.
    pub base_height: f64,
    /// Height range spanned by the `[0, 1]` noise signal.
    pub amplitude: f64,
    /// World-to-noise coordinate scale.
    pub noise_scale: f64,
    /// Number of octaves.
    pub octaves: u32,
    /// Amplitude decay per octave.
    pub persistence: f64,
    /// First-octave frequency.
    pub base_frequency: f64,
    /// Upper clamp for column heights.
    pub max_height: i32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            base_height: DEFAULT_BASE_HEIGHT,
            amplitude: DEFAULT_AMPLITUDE,
            noise_scale: DEFAULT_NOISE_SCALE,
            octaves: DEFAULT_OCTAVES,
            persistence: DEFAULT_PERSISTENCE,
            base_frequency: DEFAULT_BASE_FREQUENCY,
            max_height: MAX_TERRAIN_HEIGHT,
        }
    }
}

impl TerrainParams {
    /// Checks parameter ranges.
    ///
    /// Zero octaves is allowed and yields flat terrain at `base_height`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InvalidParams`] for non-finite values, a
    /// negative amplitude, a persistence outside `(0, 1]`, a non-positive
    /// scale or frequency, or a `max_height` outside `[0, MAX_TERRAIN_HEIGHT]`.
    pub fn validate(&self) -> GenerationResult<()> {
        let finite = [
            self.base_height,
            self.amplitude,
            self.noise_scale,
            self.persistence,
            self.base_frequency,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(GenerationError::InvalidParams(
                "terrain parameters must be finite".into(),
            ));
        }
        if self.amplitude < 0.0 {
            return Err(GenerationError::InvalidParams(format!(
                "amplitude {} must not be negative",
                self.amplitude
            )));
        }
        if !(self.persistence > 0.0 && self.persistence <= 1.0) {
            return Err(GenerationError::InvalidParams(format!(
                "persistence {} not in (0, 1]",
                self.persistence
            )));
        }
        if self.noise_scale <= 0.0 || self.base_frequency <= 0.0 {
            return Err(GenerationError::InvalidParams(format!(
                "noise_scale {} and base_frequency {} must be positive",
                self.noise_scale, self.base_frequency
            )));
        }
        if !(0..=MAX_TERRAIN_HEIGHT).contains(&self.max_height) {
            return Err(GenerationError::InvalidParams(format!(
                "max_height {} not in [0, {MAX_TERRAIN_HEIGHT}]",
                self.max_height
            )));
        }
        Ok(())
    }

    /// The octave layering these parameters describe.
    #[must_use]
    pub const fn synthesizer(&self) -> OctaveSynthesizer {
        OctaveSynthesizer::new(self.octaves, self.persistence, self.base_frequency)
    }
}

/// Column height function shared by every chunk of a world.
///
/// Owns the noise field; immutable after construction.
#[derive(Clone, Debug)]
pub struct TerrainGenerator {
    field: CoordinateNoiseField,
    synth: OctaveSynthesizer,
    params: TerrainParams,
}

impl TerrainGenerator {
    /// Builds the generator and its noise field.
    ///
    /// # Errors
    ///
    /// Returns an error if `params` fail [`TerrainParams::validate`].
    pub fn new(
        seed: WorldSeed,
        strategy: LatticeStrategy,
        params: TerrainParams,
    ) -> GenerationResult<Self> {
        params.validate()?;
        Ok(Self {
            field: CoordinateNoiseField::new(seed, strategy),
            synth: params.synthesizer(),
            params,
        })
    }

    /// Generator with default terrain parameters and the permutation lattice.
    #[must_use]
    pub fn with_seed(seed: WorldSeed) -> Self {
        let params = TerrainParams::default();
        Self {
            field: CoordinateNoiseField::new(seed, LatticeStrategy::Permutation),
            synth: params.synthesizer(),
            params,
        }
    }

    /// The underlying lattice field.
    #[must_use]
    pub const fn field(&self) -> &CoordinateNoiseField {
        &self.field
    }

    /// Terrain parameters.
    #[must_use]
    pub const fn params(&self) -> &TerrainParams {
        &self.params
    }

    /// Raw `[0, 1]` height signal at a world column.
    #[inline]
    #[must_use]
    pub fn height_signal(&self, world_x: i32, world_z: i32) -> f64 {
        let scale = self.params.noise_scale;
        self.synth
            .synthesize(&self.field, f64::from(world_x) * scale, f64::from(world_z) * scale)
    }

    /// Terrain height at a world column: `floor(base + signal * amplitude)`,
    /// clamped to `[0, max_height]`.
    #[inline]
    #[must_use]
    pub fn column_height(&self, world_x: i32, world_z: i32) -> i32 {
        let raw = (self.params.base_height
            + self.height_signal(world_x, world_z) * self.params.amplitude)
            .floor();
        (raw as i32).clamp(0, self.params.max_height)
    }
}
