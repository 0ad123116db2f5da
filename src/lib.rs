//! Foilride - hydrofoil rider over a procedurally generated ocean
//!
//! Core modules:
//! - `sim`: Deterministic simulation (surface field, depth model, rider dynamics)
//! - `config`: Immutable configuration surface, presets and JSON persistence

pub mod config;
pub mod sim;

pub use config::{ConfigError, SimConfig, SwellPreset};

use glam::Vec2;

/// Fixed design constants
pub mod consts {
    /// Gravitational acceleration (m/s²)
    pub const GRAVITY: f32 = 9.8;
    /// Largest timestep a single tick will integrate (seconds).
    /// Longer frames (hitches, a backgrounded tab) are clamped to this.
    pub const MAX_DT: f32 = 0.1;
    /// Nominal display-rate timestep used by the headless runner
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Breaking fold only runs above this break strength
    pub const BREAK_EPSILON: f32 = 1e-3;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= PI { wrapped - TAU } else { wrapped }
}

/// Hermite smoothstep, 0 at `edge0`, 1 at `edge1`.
/// Edges may be given in descending order to get a falling ramp.
#[inline]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge0 == edge1 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Horizontal forward direction (x, z) for a yaw angle.
///
/// Yaw 0 faces +Z (shoreward); positive yaw swings the nose toward +X.
#[inline]
pub fn yaw_to_forward(yaw: f32) -> Vec2 {
    Vec2::new(yaw.sin(), yaw.cos())
}
