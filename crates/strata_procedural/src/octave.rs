//! # Octave Synthesis
//!
//! Fractal (fBm) layering of value noise into a normalized height signal.

use serde::Deserialize;

use crate::noise::CoordinateNoiseField;

/// Frequency multiplier between successive octaves.
pub const LACUNARITY: f64 = 2.0;

/// Layering parameters for fractal noise.
///
/// # Example
///
/// ```rust,ignore
/// let synth = OctaveSynthesizer::new(4, 0.5, 1.0);
/// let h = synth.synthesize(&field, 0.02 * x, 0.02 * z);
/// assert!((0.0..=1.0).contains(&h));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct OctaveSynthesizer {
    /// Number of noise layers.
    pub octaves: u32,
    /// Amplitude decay per octave, in `(0, 1]`.
    pub persistence: f64,
    /// Frequency of the first octave.
    pub base_frequency: f64,
}

impl OctaveSynthesizer {
    /// Creates a synthesizer.
    #[must_use]
    pub const fn new(octaves: u32, persistence: f64, base_frequency: f64) -> Self {
        Self {
            octaves,
            persistence,
            base_frequency,
        }
    }

    /// Sum of all octave amplitudes (the normalization divisor).
    #[must_use]
    pub fn max_amplitude(&self) -> f64 {
        let mut amplitude = 1.0;
        let mut total = 0.0;
        for _ in 0..self.octaves {
            total += amplitude;
            amplitude *= self.persistence;
        }
        total
    }

    /// Synthesizes fractal noise at `(x, z)`.
    ///
    /// # Returns
    ///
    /// A value in `[0, 1]`, or exactly `0.0` when there are no octaves or the
    /// amplitudes sum to zero.
    #[must_use]
    pub fn synthesize(&self, field: &CoordinateNoiseField, x: f64, z: f64) -> f64 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        let mut frequency = self.base_frequency;
        let mut max_amplitude = 0.0;

        for _ in 0..self.octaves {
            total += field.sample(x * frequency, z * frequency) * amplitude;
            max_amplitude += amplitude;
            amplitude *= self.persistence;
            frequency *= LACUNARITY;
        }

        if max_amplitude <= 0.0 {
            return 0.0;
        }

        (total / max_amplitude).clamp(0.0, 1.0)
    }
}

impl Default for OctaveSynthesizer {
    fn default() -> Self {
        Self::new(4, 0.5, 1.0)
    }
}
