//! # World Configuration
//!
//! Loaded once at startup from TOML. Every field is optional; missing values
//! take the defaults below.
//!
//! ```toml
//! seed = "test"
//! chunk_size = 16
//! render_distance = 1
//! strategy = "direct_hash"
//!
//! [terrain]
//! octaves = 6
//!
//! [physics]
//! jump_speed = 12.0
//! ```

use std::path::Path;

use serde::Deserialize;
use strata_procedural::{
    LatticeStrategy, StreamerConfig, TerrainParams, WorldSeed, DEFAULT_CHUNK_SIZE,
    DEFAULT_RENDER_DISTANCE, WORLD_LIMIT,
};

use crate::error::ConfigError;
use crate::physics::{PhysicsParams, MAX_STEP_SECONDS};

/// Seed phrase used when none is configured.
pub const DEFAULT_SEED: &str = "strata";

/// Feet height below which the player is returned to spawn.
pub const DEFAULT_FALL_OUT_Y: f32 = -50.0;

/// Default spawn column (world X and Z), the middle of chunk (0, 0).
pub const DEFAULT_SPAWN: f32 = 8.5;

/// World seed as written in the config: a number or a phrase.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SeedSpec {
    /// `seed = 42`
    Number(i64),
    /// `seed = "test"`
    Phrase(String),
}

impl SeedSpec {
    /// Resolves to the world seed.
    #[must_use]
    pub fn to_seed(&self) -> WorldSeed {
        match self {
            Self::Number(n) => WorldSeed::new(u64::from_le_bytes(n.to_le_bytes())),
            Self::Phrase(phrase) => WorldSeed::from_phrase(phrase),
        }
    }
}

impl Default for SeedSpec {
    fn default() -> Self {
        Self::Phrase(DEFAULT_SEED.to_owned())
    }
}

/// Full startup configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World seed.
    pub seed: SeedSpec,
    /// Lattice strategy for the noise field.
    pub strategy: LatticeStrategy,
    /// Chunk side length in blocks, at most
    /// [`MAX_CHUNK_SIZE`](strata_procedural::MAX_CHUNK_SIZE).
    pub chunk_size: i32,
    /// Chebyshev radius kept loaded around the player, at most
    /// [`MAX_RENDER_DISTANCE`](strata_procedural::MAX_RENDER_DISTANCE).
    pub render_distance: i32,
    /// Chunk generation threads.
    pub worker_threads: usize,
    /// Longest physics step; longer frame times are clamped.
    pub max_step_seconds: f32,
    /// Fall-out-of-world threshold.
    pub fall_out_y: f32,
    /// Spawn world X, within `±WORLD_LIMIT`.
    pub spawn_x: f32,
    /// Spawn world Z.
    pub spawn_z: f32,
    /// Terrain shaping.
    pub terrain: TerrainParams,
    /// Player physics.
    pub physics: PhysicsParams,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: SeedSpec::default(),
            strategy: LatticeStrategy::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            render_distance: DEFAULT_RENDER_DISTANCE,
            worker_threads: 1,
            max_step_seconds: MAX_STEP_SECONDS,
            fall_out_y: DEFAULT_FALL_OUT_Y,
            spawn_x: DEFAULT_SPAWN,
            spawn_z: DEFAULT_SPAWN,
            terrain: TerrainParams::default(),
            physics: PhysicsParams::default(),
        }
    }
}

impl WorldConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Checks every value the world depends on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.streamer_config()
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        self.terrain
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if !(self.max_step_seconds > 0.0 && self.max_step_seconds <= MAX_STEP_SECONDS) {
            return Err(ConfigError::Invalid(format!(
                "max_step_seconds must be in (0, {MAX_STEP_SECONDS}], got {}",
                self.max_step_seconds
            )));
        }
        if !self.fall_out_y.is_finite() || !self.spawn_x.is_finite() || !self.spawn_z.is_finite() {
            return Err(ConfigError::Invalid(
                "fall_out_y and spawn coordinates must be finite".into(),
            ));
        }
        let limit = WORLD_LIMIT as f32;
        if self.spawn_x.abs() >= limit || self.spawn_z.abs() >= limit {
            return Err(ConfigError::Invalid(format!(
                "spawn ({}, {}) lies outside the world limit {WORLD_LIMIT}",
                self.spawn_x, self.spawn_z
            )));
        }

        let p = &self.physics;
        let positive = [
            ("gravity", p.gravity),
            ("terminal_velocity", p.terminal_velocity),
            ("player_height", p.player_height),
            ("player_radius", p.player_radius),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "physics.{name} must be positive, got {value}"
                )));
            }
        }
        if !(p.jump_speed.is_finite() && p.jump_speed >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "physics.jump_speed must be non-negative, got {}",
                p.jump_speed
            )));
        }
        if p.player_radius >= 0.5 {
            return Err(ConfigError::Invalid(format!(
                "physics.player_radius must be below 0.5, got {}",
                p.player_radius
            )));
        }

        Ok(())
    }

    /// Streaming part of the configuration.
    #[must_use]
    pub const fn streamer_config(&self) -> StreamerConfig {
        StreamerConfig {
            chunk_size: self.chunk_size,
            render_distance: self.render_distance,
            worker_threads: self.worker_threads,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_gives_defaults() {
        let config = WorldConfig::from_toml_str("").expect("empty is valid");
        assert_eq!(config, WorldConfig::default());
        assert_eq!(config.chunk_size, 16);
        assert_eq!(config.render_distance, 1);
    }

    #[test]
    fn test_full_document() {
        let config = WorldConfig::from_toml_str(
            r#"
            seed = "test"
            chunk_size = 32
            render_distance = 2
            strategy = "direct_hash"
            worker_threads = 4
            max_step_seconds = 0.05
            fall_out_y = -80.0

            [terrain]
            base_height = 12.0
            octaves = 6

            [physics]
            gravity = 20.0
            "#,
        )
        .expect("valid");

        assert_eq!(config.seed, SeedSpec::Phrase("test".into()));
        assert_eq!(config.strategy, LatticeStrategy::DirectHash);
        assert_eq!(config.chunk_size, 32);
        assert_eq!(config.worker_threads, 4);
        assert_eq!(config.terrain.octaves, 6);
        assert!((config.terrain.amplitude - 80.0).abs() < f64::EPSILON);
        assert!((config.physics.gravity - 20.0).abs() < f32::EPSILON);
        assert!((config.physics.jump_speed - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_numeric_and_phrase_seeds() {
        let numeric = WorldConfig::from_toml_str("seed = 42").expect("valid");
        assert_eq!(numeric.seed.to_seed(), WorldSeed::new(42));

        let phrase = WorldConfig::from_toml_str("seed = \"test\"").expect("valid");
        assert_eq!(phrase.seed.to_seed(), WorldSeed::from_phrase("test"));
    }

    #[test]
    fn test_rejects_bad_values() {
        for source in [
            "chunk_size = 0",
            "render_distance = -1",
            "render_distance = 33",
            "chunk_size = 257",
            "spawn_x = 3.0e9",
            "max_step_seconds = 0.0",
            "max_step_seconds = 0.5",
            "[terrain]\nnoise_scale = -1.0",
            "[physics]\nplayer_radius = 0.75",
            "[physics]\ngravity = 0.0",
        ] {
            let err = WorldConfig::from_toml_str(source).expect_err(source);
            assert!(matches!(err, ConfigError::Invalid(_)), "{source}: {err}");
        }
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = WorldConfig::from_toml_str("chunk_size = \"big\"").expect_err("type error");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = WorldConfig::load("/nonexistent/strata.toml").expect_err("no file");
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
