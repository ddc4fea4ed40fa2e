//! Error types for configuration and the frame loop.

use strata_procedural::GenerationError;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for this schema.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Errors surfaced by [`crate::WorldSession`].
#[derive(Error, Debug)]
pub enum SessionError {
    /// Startup configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Chunk generation failed; the loaded set is unchanged.
    #[error("Terrain generation failed: {0}")]
    Generation(#[from] GenerationError),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;
