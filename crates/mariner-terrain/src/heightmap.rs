//! Multi-octave fractal Brownian motion (fBm) elevation sampler.
//!
//! Composites multiple octaves of simplex noise evaluated on the surface of the
//! unit sphere, so the result has no seam at the antimeridian and no pinching
//! at the poles.

use glam::Vec3;
use noise::{NoiseFn, Simplex};

/// Configuration for multi-octave fBm noise used for planet elevation.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightmapParams {
    /// Seed for deterministic generation.
    pub seed: u32,
    /// Number of noise octaves to composite. Typical range: 5–8.
    pub octaves: u32,
    /// Frequency multiplier between successive octaves. Default: 2.0.
    pub lacunarity: f64,
    /// Amplitude multiplier between successive octaves. Default: 0.5.
    pub persistence: f64,
    /// Frequency of the first octave over the unit sphere. Controls the size
    /// of continents. Default: 1.2.
    pub base_frequency: f64,
}

impl Default for HeightmapParams {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 6,
            lacunarity: 2.0,
            persistence: 0.5,
            base_frequency: 1.2,
        }
    }
}

/// Generates elevation values using fractal Brownian motion over simplex noise.
pub struct HeightmapSampler {
    noise: Simplex,
    params: HeightmapParams,
    max_amplitude: f64,
}

impl HeightmapSampler {
    pub fn new(params: HeightmapParams) -> Self {
        let noise = Simplex::new(params.seed);
        let mut max_amplitude = 0.0;
        let mut amplitude = 1.0;
        for _ in 0..params.octaves {
            max_amplitude += amplitude;
            amplitude *= params.persistence;
        }
        Self {
            noise,
            params,
            max_amplitude,
        }
    }

    /// Raw fBm value at a point on the unit sphere.
    ///
    /// The theoretical range is `[-max_amplitude, max_amplitude]`.
    pub fn sample(&self, direction: Vec3) -> f64 {
        let p = direction.as_dvec3();
        let mut total = 0.0;
        let mut frequency = self.params.base_frequency;
        let mut amplitude = 1.0;

        for _ in 0..self.params.octaves {
            total += self.noise.get([p.x * frequency, p.y * frequency, p.z * frequency]) * amplitude;
            frequency *= self.params.lacunarity;
            amplitude *= self.params.persistence;
        }

        total
    }

    /// Elevation normalized into `[-1, 1]`.
    pub fn sample_normalized(&self, direction: Vec3) -> f64 {
        if self.max_amplitude == 0.0 {
            return 0.0;
        }
        (self.sample(direction) / self.max_amplitude).clamp(-1.0, 1.0)
    }

    /// Geometric sum of all octave amplitudes.
    pub fn max_amplitude(&self) -> f64 {
        self.max_amplitude
    }

    pub fn params(&self) -> &HeightmapParams {
        &self.params
    }
}
