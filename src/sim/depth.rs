//! Seabed depth model
//!
//! A diagonally angled reef: depth falls linearly from `deep` to `shallow`
//! as the shore-rotated Z coordinate moves past the reference line.

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Seabed profile (immutable configuration)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepthProfile {
    /// Tilt of the depth gradient off the world Z axis (dZ per unit X)
    pub shore_angle: f32,
    /// Open-water depth (meters)
    pub deep: f32,
    /// Minimum depth over the reef (meters, must be > 0)
    pub shallow: f32,
    /// Effective Z where the gradient starts
    pub reference_z: f32,
    /// Depth lost per meter of effective Z past the reference line
    pub gradient: f32,
}

impl Default for DepthProfile {
    fn default() -> Self {
        Self {
            shore_angle: 0.15,
            deep: 20.0,
            shallow: 1.2,
            reference_z: 20.0,
            gradient: 0.12,
        }
    }
}

impl DepthProfile {
    /// Seabed depth at world (x, z). Always within [shallow, deep].
    #[inline]
    pub fn depth_at(&self, x: f32, z: f32) -> f32 {
        let effective_z = z - x * self.shore_angle;
        let depth = self.deep - (effective_z - self.reference_z).max(0.0) * self.gradient;
        if depth.is_finite() {
            depth.clamp(self.shallow, self.deep)
        } else if effective_z > self.reference_z {
            self.shallow
        } else {
            self.deep
        }
    }

    /// Check the profile can never yield a non-positive or inverted depth range
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            self.shore_angle,
            self.deep,
            self.shallow,
            self.reference_z,
            self.gradient,
        ];
        if fields.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::InvalidDepthProfile(
                "all fields must be finite".to_string(),
            ));
        }
        if self.shallow <= 0.0 {
            return Err(ConfigError::InvalidDepthProfile(format!(
                "shallow depth must be > 0, got {}",
                self.shallow
            )));
        }
        if self.deep < self.shallow {
            return Err(ConfigError::InvalidDepthProfile(format!(
                "deep depth {} is less than shallow depth {}",
                self.deep, self.shallow
            )));
        }
        if self.gradient < 0.0 {
            return Err(ConfigError::InvalidDepthProfile(format!(
                "gradient must be >= 0, got {}",
                self.gradient
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_deep_before_reference_line() {
        let depth = DepthProfile::default();
        assert_eq!(depth.depth_at(0.0, -500.0), depth.deep);
        assert_eq!(depth.depth_at(0.0, depth.reference_z), depth.deep);
    }

    #[test]
    fn test_linear_ramp_then_clamp() {
        let depth = DepthProfile {
            shore_angle: 0.0,
            deep: 10.0,
            shallow: 1.0,
            reference_z: 0.0,
            gradient: 0.5,
        };
        assert!((depth.depth_at(0.0, 4.0) - 8.0).abs() < 1e-6);
        assert_eq!(depth.depth_at(0.0, 1000.0), 1.0);
    }

    #[test]
    fn test_shore_angle_rotates_gradient() {
        let depth = DepthProfile {
            shore_angle: 0.5,
            ..DepthProfile::default()
        };
        // Moving +X pushes the effective shoreline away
        let z = depth.reference_z + 50.0;
        assert!(depth.depth_at(40.0, z) > depth.depth_at(0.0, z));
        assert!(depth.depth_at(-40.0, z) < depth.depth_at(0.0, z));
    }

    #[test]
    fn test_validate_rejects_bad_profiles() {
        let bad = DepthProfile {
            shallow: 0.0,
            ..DepthProfile::default()
        };
        assert!(bad.validate().is_err());

        let inverted = DepthProfile {
            deep: 0.5,
            ..DepthProfile::default()
        };
        assert!(inverted.validate().is_err());

        assert!(DepthProfile::default().validate().is_ok());
    }

    proptest! {
        #[test]
        fn depth_always_within_bounds(x in -1e6f32..1e6, z in -1e6f32..1e6) {
            let depth = DepthProfile::default();
            let d = depth.depth_at(x, z);
            prop_assert!(d.is_finite());
            prop_assert!(d >= depth.shallow && d <= depth.deep);
        }
    }
}
