//! Ocean surface field
//!
//! One formula, shared by the display mesh and rider physics. Every query is a
//! pure function of (x, z, t) and the immutable configuration, so the bulk grid
//! evaluator and single-point physics samples can never drift apart.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

use super::depth::DepthProfile;
use super::wave::{MAX_DISPLACEMENT_FACTOR, WaveComponent};
use crate::config::{ConfigError, SurfaceTuning};
use crate::consts::BREAK_EPSILON;
use crate::smoothstep;

/// Surface geometry at one point and instant. Never cached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    /// Surface height above still water
    pub height: f32,
    /// Unit normal of the displaced surface
    pub normal: Vec3,
    /// (∂height/∂x, ∂height/∂z)
    pub slope: Vec2,
    /// Velocity of the surface point, when requested
    pub velocity: Option<Vec3>,
}

/// Displaced surface vertex for display meshes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SurfaceVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Regular grid of undisplaced sample points in the XZ plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    /// World (x, z) of the first vertex
    pub origin: Vec2,
    /// Vertices along X
    pub columns: usize,
    /// Vertices along Z
    pub rows: usize,
    /// Distance between neighbouring vertices (meters)
    pub spacing: f32,
}

impl GridSpec {
    /// Square grid of `size` x `size` vertices centered on `center`
    pub fn centered(center: Vec2, size: usize, spacing: f32) -> Self {
        let half = size.saturating_sub(1) as f32 * spacing / 2.0;
        Self {
            origin: center - Vec2::splat(half),
            columns: size,
            rows: size,
            spacing,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.columns * self.rows
    }

    /// Undisplaced world (x, z) of vertex (column, row)
    #[inline]
    pub fn point(&self, column: usize, row: usize) -> Vec2 {
        self.origin + Vec2::new(column as f32, row as f32) * self.spacing
    }
}

/// The ocean surface: wave components over a seabed, with shoaling and breaking
#[derive(Debug, Clone)]
pub struct SurfaceField {
    waves: Vec<WaveComponent>,
    depth: DepthProfile,
    tuning: SurfaceTuning,
}

impl SurfaceField {
    /// Validate the configuration once and build the field.
    ///
    /// Wave directions are normalized here so every query can assume unit vectors.
    pub fn new(
        waves: &[WaveComponent],
        depth: DepthProfile,
        tuning: SurfaceTuning,
    ) -> Result<Self, ConfigError> {
        if waves.is_empty() {
            return Err(ConfigError::NoWaveComponents);
        }
        let count = waves.len();
        for (i, wave) in waves.iter().enumerate() {
            wave.validate(i, count)?;
        }
        depth.validate()?;
        tuning.validate()?;

        let waves = waves
            .iter()
            .map(|w| WaveComponent {
                direction: w.direction.normalize(),
                ..*w
            })
            .collect();

        Ok(Self {
            waves,
            depth,
            tuning,
        })
    }

    pub fn waves(&self) -> &[WaveComponent] {
        &self.waves
    }

    pub fn depth_profile(&self) -> &DepthProfile {
        &self.depth
    }

    pub fn tuning(&self) -> &SurfaceTuning {
        &self.tuning
    }

    /// Seabed depth under world (x, z)
    #[inline]
    pub fn depth_at(&self, x: f32, z: f32) -> f32 {
        self.depth.depth_at(x, z)
    }

    /// Amplification for a wave entering shallower water: 1 in deep water
    #[inline]
    pub fn shoaling_factor(&self, depth: f32) -> f32 {
        let ratio = (depth / self.depth.deep).max(self.tuning.shoaling_floor);
        1.0 / ratio.sqrt()
    }

    /// 0 in deep water rising smoothly to 1 at the near-shore break depth
    #[inline]
    pub fn break_strength(&self, depth: f32) -> f32 {
        smoothstep(
            self.tuning.break_depth_start,
            self.tuning.break_depth_full,
            depth,
        )
    }

    /// Displaced position (x', y', z') of the surface point that rests at (x, 0, z)
    pub fn evaluate_displacement(&self, x: f32, z: f32, t: f32) -> Vec3 {
        let p = Vec2::new(x, z);
        let count = self.waves.len() as f32;
        let shoal = self.shoaling_factor(self.depth.depth_at(x, z));

        let mut out = Vec3::new(x, 0.0, z);
        let mut primary_phase = 0.0;

        for (i, wave) in self.waves.iter().enumerate() {
            let k = wave.wave_number();
            let phase = k * (wave.direction.dot(p) - wave.speed * t);
            if i == 0 {
                primary_phase = phase;
            }

            // Groundswell feels the bottom far more than short chop
            let weight = if i == 0 {
                1.0
            } else {
                self.tuning.secondary_shoaling_weight
            };
            let factor = 1.0 + (shoal - 1.0) * weight;
            let amplitude = wave.amplitude * factor;
            let steepness = (wave.steepness * factor).min(self.tuning.max_steepness);
            let q = (steepness / (k * amplitude * count)).clamp(0.0, MAX_DISPLACEMENT_FACTOR);

            let (sin_f, cos_f) = phase.sin_cos();
            let horizontal = q * amplitude * cos_f;
            out.x += horizontal * wave.direction.x;
            out.z += horizontal * wave.direction.y;
            out.y += amplitude * sin_f;
        }

        let break_strength = self.break_strength(self.depth.depth_at(x, z));
        if break_strength > BREAK_EPSILON {
            let crest = smoothstep(0.0, 0.8, primary_phase.sin()).powi(2);
            let break_amount = crest * break_strength;
            let fold_angle = break_amount * self.tuning.fold_scale;

            let above = out.y.max(0.0);
            let below = out.y.min(0.0);
            out.y = below + above * fold_angle.cos();

            // Lip curls over the face and is thrown ahead as depth keeps shoaling
            let curl = above * fold_angle.sin()
                + self.tuning.throw_coefficient * break_amount * break_amount * above;
            let dir = self.waves[0].direction;
            out.x += dir.x * curl;
            out.z += dir.y * curl;
        }

        out
    }

    /// Surface height above still water at (x, z, t)
    #[inline]
    pub fn sample_height(&self, x: f32, z: f32, t: f32) -> f32 {
        self.evaluate_displacement(x, z, t).y
    }

    /// Height gradient by central differences
    pub fn sample_slope(&self, x: f32, z: f32, t: f32) -> Vec2 {
        let h = self.tuning.fd_step;
        let dx = self.sample_height(x + h, z, t) - self.sample_height(x - h, z, t);
        let dz = self.sample_height(x, z + h, t) - self.sample_height(x, z - h, t);
        Vec2::new(dx, dz) / (2.0 * h)
    }

    /// Unit normal from tangents of the full displacement.
    ///
    /// Uses the same step as `sample_slope` so lighting and physics agree.
    pub fn sample_normal(&self, x: f32, z: f32, t: f32) -> Vec3 {
        let h = self.tuning.fd_step;
        let tangent_x = self.evaluate_displacement(x + h, z, t)
            - self.evaluate_displacement(x - h, z, t);
        let tangent_z = self.evaluate_displacement(x, z + h, t)
            - self.evaluate_displacement(x, z - h, t);
        tangent_z.cross(tangent_x).normalize_or(Vec3::Y)
    }

    /// Velocity of the displaced surface point by central difference in time
    pub fn sample_velocity(&self, x: f32, z: f32, t: f32) -> Vec3 {
        let dt = self.tuning.velocity_dt;
        (self.evaluate_displacement(x, z, t + dt) - self.evaluate_displacement(x, z, t - dt))
            / (2.0 * dt)
    }

    /// Height, normal and slope at one point
    pub fn sample(&self, x: f32, z: f32, t: f32) -> SurfaceSample {
        SurfaceSample {
            height: self.sample_height(x, z, t),
            normal: self.sample_normal(x, z, t),
            slope: self.sample_slope(x, z, t),
            velocity: None,
        }
    }

    /// `sample` plus surface velocity
    pub fn sample_with_velocity(&self, x: f32, z: f32, t: f32) -> SurfaceSample {
        SurfaceSample {
            velocity: Some(self.sample_velocity(x, z, t)),
            ..self.sample(x, z, t)
        }
    }

    /// Evaluate a whole display grid, row-major (rows along Z, columns along X)
    pub fn evaluate_grid(&self, grid: &GridSpec, t: f32) -> Vec<SurfaceVertex> {
        let mut vertices = Vec::with_capacity(grid.vertex_count());
        self.evaluate_rows(grid, 0..grid.rows, t, &mut vertices);
        vertices
    }

    /// Evaluate a band of grid rows into `out`, for callers splitting a grid
    /// across workers
    pub fn evaluate_rows(
        &self,
        grid: &GridSpec,
        rows: std::ops::Range<usize>,
        t: f32,
        out: &mut Vec<SurfaceVertex>,
    ) {
        for row in rows {
            for column in 0..grid.columns {
                let p = grid.point(column, row);
                let position = self.evaluate_displacement(p.x, p.y, t);
                let normal = self.sample_normal(p.x, p.y, t);
                out.push(SurfaceVertex {
                    position: position.to_array(),
                    normal: normal.to_array(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::FRAC_PI_2;

    /// Open ocean: the reef is far away, so depth is constant
    fn deep_water() -> DepthProfile {
        DepthProfile {
            shore_angle: 0.0,
            deep: 20.0,
            shallow: 1.0,
            reference_z: 10_000.0,
            gradient: 0.1,
        }
    }

    fn single_wave() -> WaveComponent {
        WaveComponent::new(0.0, 1.0, 0.12, 25.0, 1.2, 4.0)
    }

    fn field(waves: &[WaveComponent], depth: DepthProfile) -> SurfaceField {
        SurfaceField::new(waves, depth, SurfaceTuning::default()).unwrap()
    }

    #[test]
    fn test_rejects_empty_and_invalid_configs() {
        let err = SurfaceField::new(&[], deep_water(), SurfaceTuning::default()).unwrap_err();
        assert!(matches!(err, ConfigError::NoWaveComponents));

        let steep = WaveComponent::new(0.0, 1.0, 0.5, 25.0, 1.2, 4.0);
        let err = SurfaceField::new(&[steep], deep_water(), SurfaceTuning::default()).unwrap_err();
        assert!(matches!(err, ConfigError::DisplacementFactorTooLarge { .. }));
    }

    #[test]
    fn test_directions_normalized() {
        let wave = WaveComponent::new(3.0, 4.0, 0.12, 25.0, 1.2, 4.0);
        let field = field(&[wave], deep_water());
        assert!((field.waves()[0].direction.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_displacement_is_pure() {
        let field = field(&crate::sim::wave::DEFAULT_WAVES, DepthProfile::default());
        for &(x, z, t) in &[(0.0, 0.0, 0.0), (12.5, 160.0, 3.7), (-40.0, 175.0, 11.2)] {
            let a = field.evaluate_displacement(x, z, t);
            let b = field.evaluate_displacement(x, z, t);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_height_stays_within_amplitude_in_deep_water() {
        let field = field(&[single_wave()], deep_water());
        for i in 0..200 {
            let z = i as f32 * 0.37;
            let h = field.sample_height(0.0, z, 1.3);
            assert!(h.abs() <= 1.2 + 1e-4, "height {h} exceeds amplitude");
        }
    }

    #[test]
    fn test_slope_matches_analytic_derivative() {
        let wave = single_wave();
        let field = field(&[wave], deep_water());
        let k = wave.wave_number();
        for &z in &[0.0, 3.1, 7.9, 14.2] {
            let slope = field.sample_slope(5.0, z, 0.0);
            let expected = wave.amplitude * k * (k * z).cos();
            assert!(slope.x.abs() < 1e-4);
            assert!(
                (slope.y - expected).abs() < 1e-3,
                "slope {} vs analytic {expected}",
                slope.y
            );
        }
    }

    #[test]
    fn test_slope_antisymmetric_for_mirrored_config() {
        let waves = [
            WaveComponent::new(0.0, 1.0, 0.2, 40.0, 1.0, 6.0),
            WaveComponent::new(0.6, 0.8, 0.1, 15.0, 0.3, 3.5),
            WaveComponent::new(-0.6, 0.8, 0.1, 15.0, 0.3, 3.5),
        ];
        let open_water = field(&waves, deep_water());
        for &(x, z, t) in &[(3.0, 2.0, 0.5), (7.5, -4.0, 2.0), (11.0, 9.0, 4.2)] {
            let right = open_water.sample_slope(x, z, t).x;
            let left = open_water.sample_slope(-x, z, t).x;
            assert!(
                (right + left).abs() < 1e-3,
                "slopeX({x}) = {right}, slopeX(-{x}) = {left}"
            );
        }

        // Straight reef shoreward of z = 5: shoaling and the fold both run
        let reef = DepthProfile {
            shore_angle: 0.0,
            deep: 20.0,
            shallow: 1.5,
            reference_z: 5.0,
            gradient: 0.5,
        };
        let field = field(&waves, reef);
        let mut breaking = 0;
        for &(x, z, t) in &[
            (2.0, 20.0, 0.3),
            (4.5, 31.0, 1.1),
            (6.0, 35.5, 2.4),
            (9.0, 38.0, 0.7),
            (1.5, 42.0, 3.3),
        ] {
            assert!(field.shoaling_factor(field.depth_at(x, z)) > 1.0);
            if field.break_strength(field.depth_at(x, z)) > BREAK_EPSILON {
                breaking += 1;
            }
            let right = field.sample_slope(x, z, t).x;
            let left = field.sample_slope(-x, z, t).x;
            let scale = right.abs().max(1.0);
            assert!(
                (right + left).abs() < 1e-3 * scale,
                "reef slopeX({x}, {z}) = {right}, slopeX(-{x}, {z}) = {left}"
            );
        }
        assert!(breaking >= 3);
    }

    #[test]
    fn test_shoaling_amplifies_groundswell() {
        let depth = DepthProfile {
            shore_angle: 0.0,
            deep: 20.0,
            shallow: 2.0,
            reference_z: 0.0,
            gradient: 1.0,
        };
        let tuning = SurfaceTuning {
            break_depth_start: 0.5,
            break_depth_full: 0.2,
            ..SurfaceTuning::default()
        };
        let field = SurfaceField::new(&[single_wave()], depth, tuning).unwrap();
        assert_eq!(field.shoaling_factor(depth.deep), 1.0);

        let peak = |z: f32| {
            (0..400)
                .map(|i| field.sample_height(0.0, z, i as f32 * 0.02))
                .fold(f32::MIN, f32::max)
        };
        let deep_peak = peak(-50.0);
        let shallow_peak = peak(100.0);
        assert!(shallow_peak > deep_peak * 2.0, "{shallow_peak} vs {deep_peak}");
    }

    #[test]
    fn test_breaking_folds_crest_forward() {
        let depth = DepthProfile {
            shore_angle: 0.0,
            deep: 10.0,
            shallow: 1.0,
            reference_z: 0.0,
            gradient: 1.0,
        };
        let wave = WaveComponent::new(0.0, 1.0, 0.1, 20.0, 0.8, 5.0);
        let breaking = SurfaceField::new(&[wave], depth, SurfaceTuning::default()).unwrap();
        let unfolded = SurfaceField::new(
            &[wave],
            depth,
            SurfaceTuning {
                fold_scale: 0.0,
                ..SurfaceTuning::default()
            },
        )
        .unwrap();

        // Crest of the groundswell inside the fully breaking zone
        let z = (FRAC_PI_2 + std::f32::consts::TAU) / wave.wave_number();
        assert_eq!(breaking.break_strength(breaking.depth_at(0.0, z)), 1.0);

        let folded = breaking.evaluate_displacement(0.0, z, 0.0);
        let straight = unfolded.evaluate_displacement(0.0, z, 0.0);
        assert!(straight.y > 0.0);
        assert!(folded.y < straight.y);
        assert!(folded.z > straight.z);
    }

    #[test]
    fn test_no_fold_in_deep_water() {
        let field = field(&[single_wave()], deep_water());
        assert_eq!(field.break_strength(20.0), 0.0);
    }

    #[test]
    fn test_normal_is_unit_and_upward() {
        let field = field(&crate::sim::wave::DEFAULT_WAVES, deep_water());
        for i in 0..20 {
            let n = field.sample_normal(i as f32 * 1.7, i as f32 * -2.3, 0.8);
            assert!((n.length() - 1.0).abs() < 1e-4);
            assert!(n.y > 0.0);
        }
    }

    #[test]
    fn test_normal_agrees_with_slope_direction() {
        let field = field(&[single_wave()], deep_water());
        let s = field.sample(0.0, 2.0, 0.0);
        // Surface rising toward +Z tilts the normal toward -Z
        assert!(s.slope.y > 0.0);
        assert!(s.normal.z < 0.0);
    }

    #[test]
    fn test_vertical_velocity_matches_analytic() {
        let wave = single_wave();
        let field = field(&[wave], deep_water());
        let k = wave.wave_number();
        let (z, t) = (3.0, 0.7);
        let v = field.sample_with_velocity(0.0, z, t).velocity.unwrap();
        let expected = -wave.amplitude * k * wave.speed * (k * (z - wave.speed * t)).cos();
        assert!((v.y - expected).abs() < 1e-2, "{} vs {expected}", v.y);
    }

    #[test]
    fn test_grid_matches_point_queries() {
        let field = field(&crate::sim::wave::DEFAULT_WAVES, DepthProfile::default());
        let grid = GridSpec::centered(Vec2::new(0.0, 150.0), 9, 2.5);
        let vertices = field.evaluate_grid(&grid, 4.0);
        assert_eq!(vertices.len(), 81);

        let (column, row) = (3, 7);
        let p = grid.point(column, row);
        let v = vertices[row * grid.columns + column];
        assert_eq!(v.position, field.evaluate_displacement(p.x, p.y, 4.0).to_array());
        assert_eq!(v.normal, field.sample_normal(p.x, p.y, 4.0).to_array());
    }

    #[test]
    fn test_concurrent_grid_evaluation_matches_serial() {
        let field = field(&crate::sim::wave::DEFAULT_WAVES, DepthProfile::default());
        let grid = GridSpec::centered(Vec2::new(10.0, 140.0), 16, 1.5);
        let serial = field.evaluate_grid(&grid, 2.5);

        let halves = std::thread::scope(|scope| {
            let top = scope.spawn(|| {
                let mut out = Vec::new();
                field.evaluate_rows(&grid, 0..8, 2.5, &mut out);
                out
            });
            let bottom = scope.spawn(|| {
                let mut out = Vec::new();
                field.evaluate_rows(&grid, 8..16, 2.5, &mut out);
                out
            });
            // Physics query interleaved with the display workers
            let _ = field.sample_slope(10.0, 140.0, 2.5);
            let mut all = top.join().unwrap();
            all.extend(bottom.join().unwrap());
            all
        });

        assert_eq!(serial, halves);
    }

    proptest! {
        #[test]
        fn displacement_is_pure_and_finite(
            x in -1e4f32..1e4,
            z in -1e4f32..1e4,
            t in 0.0f32..1000.0,
        ) {
            let field = field(&crate::sim::wave::DEFAULT_WAVES, DepthProfile::default());
            let a = field.evaluate_displacement(x, z, t);
            let b = field.evaluate_displacement(x, z, t);
            prop_assert_eq!(a, b);
            prop_assert!(a.is_finite());
            prop_assert!(field.sample_slope(x, z, t).is_finite());
        }
    }

    #[test]
    fn test_vertex_is_pod() {
        let v = SurfaceVertex {
            position: [1.0, 2.0, 3.0],
            normal: [0.0, 1.0, 0.0],
        };
        let bytes: &[u8] = bytemuck::bytes_of(&v);
        assert_eq!(bytes.len(), 24);
    }
}
