//! Traveling wave components
//!
//! Each component is a Gerstner wave travelling along `direction`. Index 0 is
//! the groundswell: it takes the full shoaling weight and drives the breaking fold.

use std::f32::consts::TAU;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Upper bound on the Gerstner displacement factor Q.
/// Larger values make neighbouring surface points overtake each other.
pub const MAX_DISPLACEMENT_FACTOR: f32 = 0.5;

/// One traveling wave component (immutable configuration)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveComponent {
    /// Propagation direction in the XZ plane (normalized by the surface field)
    pub direction: Vec2,
    /// Steepness before shoaling
    pub steepness: f32,
    /// Wavelength (meters)
    pub wavelength: f32,
    /// Amplitude (meters)
    pub amplitude: f32,
    /// Phase speed (meters per second)
    pub speed: f32,
}

impl WaveComponent {
    pub const fn new(
        dir_x: f32,
        dir_z: f32,
        steepness: f32,
        wavelength: f32,
        amplitude: f32,
        speed: f32,
    ) -> Self {
        Self {
            direction: Vec2::new(dir_x, dir_z),
            steepness,
            wavelength,
            amplitude,
            speed,
        }
    }

    /// Angular wave number k = 2π / wavelength
    #[inline]
    pub fn wave_number(&self) -> f32 {
        TAU / self.wavelength
    }

    /// Unclamped displacement factor Q for a sum of `count` components
    pub fn displacement_factor(&self, count: usize) -> f32 {
        self.steepness / (self.wave_number() * self.amplitude * count as f32)
    }

    /// Startup check for component `index` out of `count`
    pub fn validate(&self, index: usize, count: usize) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidWave { index, reason };

        let fields = [
            self.direction.x,
            self.direction.y,
            self.steepness,
            self.wavelength,
            self.amplitude,
            self.speed,
        ];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(invalid("all fields must be finite".to_string()));
        }
        if self.direction.length_squared() < 1e-8 {
            return Err(invalid("direction must be non-zero".to_string()));
        }
        if self.wavelength <= 0.0 {
            return Err(invalid(format!(
                "wavelength must be > 0, got {}",
                self.wavelength
            )));
        }
        if self.amplitude <= 0.0 {
            return Err(invalid(format!(
                "amplitude must be > 0, got {}",
                self.amplitude
            )));
        }
        if self.steepness < 0.0 {
            return Err(invalid(format!(
                "steepness must be >= 0, got {}",
                self.steepness
            )));
        }

        // Shoaling scales steepness and amplitude together, so Q is fixed by
        // the deep-water configuration.
        let q = self.displacement_factor(count);
        if q > MAX_DISPLACEMENT_FACTOR {
            return Err(ConfigError::DisplacementFactorTooLarge { index, q });
        }
        Ok(())
    }
}

/// Default ocean: long groundswell plus two shorter chop components
pub const DEFAULT_WAVES: [WaveComponent; 3] = [
    WaveComponent::new(0.0, 1.0, 0.25, 40.0, 1.2, 6.0), // Groundswell
    WaveComponent::new(0.3, 0.95, 0.15, 18.0, 0.35, 4.0), // Wind swell
    WaveComponent::new(-0.4, 0.92, 0.12, 9.0, 0.15, 2.8), // Chop
];
