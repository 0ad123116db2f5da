//! Simulation configuration
//!
//! Supplied once when a session starts and never mutated mid-session.
//! Coefficients are gameplay tuning, not physically derived values: they were
//! tuned for feel at display rate and should be re-tuned per control scheme.

use std::fmt;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::depth::DepthProfile;
use crate::sim::wave::{DEFAULT_WAVES, WaveComponent};

/// Configuration problems, reported once before simulation begins
#[derive(Debug)]
pub enum ConfigError {
    /// The surface needs at least one wave component
    NoWaveComponents,
    /// A wave component has degenerate parameters
    InvalidWave { index: usize, reason: String },
    /// A wave component's unclamped displacement factor exceeds 0.5
    DisplacementFactorTooLarge { index: usize, q: f32 },
    InvalidDepthProfile(String),
    InvalidTuning(String),
    Parse(serde_json::Error),
    Io(std::io::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NoWaveComponents => write!(f, "no wave components configured"),
            ConfigError::InvalidWave { index, reason } => {
                write!(f, "wave component {index}: {reason}")
            }
            ConfigError::DisplacementFactorTooLarge { index, q } => write!(
                f,
                "wave component {index}: displacement factor Q = {q:.3} exceeds 0.5 \
                 (lower steepness or raise amplitude/wavelength)"
            ),
            ConfigError::InvalidDepthProfile(reason) => write!(f, "depth profile: {reason}"),
            ConfigError::InvalidTuning(reason) => write!(f, "tuning: {reason}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Parse(e) => Some(e),
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

fn require(ok: bool, reason: impl FnOnce() -> String) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::InvalidTuning(reason()))
    }
}

/// Shoaling, breaking and sampling parameters of the surface field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceTuning {
    /// Share of the shoaling gain applied to non-primary components (0-1)
    pub secondary_shoaling_weight: f32,
    /// Lower bound on depth/deep before the square root (caps amplification)
    pub shoaling_floor: f32,
    /// Numerical ceiling on shoaled steepness
    pub max_steepness: f32,
    /// Depth (m) where breaking begins
    pub break_depth_start: f32,
    /// Depth (m) at and below which breaking is full strength
    pub break_depth_full: f32,
    /// Fold angle at full break (radians, ~π is a closed barrel)
    pub fold_scale: f32,
    /// Forward throw of the lip, scaled by break amount squared
    pub throw_coefficient: f32,
    /// Spatial finite-difference step for slope and normals (m)
    pub fd_step: f32,
    /// Temporal finite-difference step for surface velocity (s)
    pub velocity_dt: f32,
}

impl Default for SurfaceTuning {
    fn default() -> Self {
        Self {
            secondary_shoaling_weight: 0.3,
            shoaling_floor: 0.1,
            max_steepness: 0.95,
            break_depth_start: 6.0,
            break_depth_full: 3.0,
            fold_scale: 3.0,
            throw_coefficient: 0.6,
            fd_step: 0.05,
            velocity_dt: 0.02,
        }
    }
}

impl SurfaceTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            self.secondary_shoaling_weight,
            self.shoaling_floor,
            self.max_steepness,
            self.break_depth_start,
            self.break_depth_full,
            self.fold_scale,
            self.throw_coefficient,
            self.fd_step,
            self.velocity_dt,
        ];
        require(fields.iter().all(|v| v.is_finite()), || {
            "surface tuning values must be finite".to_string()
        })?;
        require((0.0..=1.0).contains(&self.secondary_shoaling_weight), || {
            format!(
                "secondary_shoaling_weight must be in [0, 1], got {}",
                self.secondary_shoaling_weight
            )
        })?;
        require(self.fold_scale >= 0.0 && self.throw_coefficient >= 0.0, || {
            format!(
                "fold_scale ({}) and throw_coefficient ({}) must be >= 0",
                self.fold_scale, self.throw_coefficient
            )
        })?;
        require(self.shoaling_floor > 0.0, || {
            format!("shoaling_floor must be > 0, got {}", self.shoaling_floor)
        })?;
        require(self.max_steepness > 0.0, || {
            format!("max_steepness must be > 0, got {}", self.max_steepness)
        })?;
        require(self.break_depth_start > self.break_depth_full, || {
            format!(
                "break_depth_start ({}) must be deeper than break_depth_full ({})",
                self.break_depth_start, self.break_depth_full
            )
        })?;
        require(self.fd_step > 0.0 && self.velocity_dt > 0.0, || {
            "finite-difference steps must be > 0".to_string()
        })
    }
}

/// Every coefficient of the rider integrator, by role
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiderTuning {
    // === Intent policy (radians) ===
    pub pitch_up_target: f32,
    pub pitch_down_target: f32,
    /// Pitch held with no input (keeps some lift)
    pub neutral_pitch: f32,
    /// Roll magnitude for roll-left / roll-right
    pub roll_target: f32,
    /// Pitch forced while snapping into a turn
    pub snap_pitch: f32,

    // === Orientation smoothing (1/s) ===
    pub pitch_response: f32,
    pub roll_response: f32,

    // === Thrust ===
    pub wave_thrust_coefficient: f32,
    pub foil_catch_coefficient: f32,
    /// Foil-catch multiplier when heading straight up the face
    pub uphill_catch_multiplier: f32,
    /// Alignment (cosine) between heading and uphill that counts as "straight up"
    pub uphill_alignment: f32,
    pub pump_pitch_weight: f32,
    pub pump_roll_weight: f32,

    // === Drag (1/s) ===
    pub base_drag: f32,
    pub stall_drag: f32,
    pub carve_drag: f32,
    pub snap_drag: f32,
    /// |roll| above which a held snap adds `snap_drag`
    pub snap_roll_threshold: f32,

    // === Speed (m/s) ===
    pub min_speed: f32,
    pub max_speed: f32,

    // === Lift ===
    pub base_lift: f32,
    pub pitch_lift: f32,
    /// Below this ride height the assist pushes up
    pub ground_effect_low: f32,
    /// Above this ride height the assist pulls down
    pub ground_effect_high: f32,
    pub ground_effect_strength: f32,
    pub wave_face_lift: f32,
    /// Per-tick multiplicative damping on vertical velocity
    pub vertical_damping: f32,

    // === Crash thresholds (ride height, m) ===
    pub touchdown_height: f32,
    pub breach_height: f32,

    // === Turning ===
    pub turn_rate: f32,
    pub snap_turn_multiplier: f32,
    /// Above this speed turn authority falls off unless snapping
    pub turn_reference_speed: f32,

    // === Initial pose ===
    pub start_position: Vec2,
    pub start_yaw: f32,
    pub start_height: f32,
    pub initial_speed: f32,
}

impl Default for RiderTuning {
    fn default() -> Self {
        Self {
            pitch_up_target: 0.35,
            pitch_down_target: -0.25,
            neutral_pitch: 0.05,
            roll_target: 0.6,
            snap_pitch: 0.4,

            pitch_response: 8.0,
            roll_response: 3.0,

            wave_thrust_coefficient: 0.6,
            foil_catch_coefficient: 2.0,
            uphill_catch_multiplier: 0.5,
            uphill_alignment: 0.7,
            pump_pitch_weight: 0.6,
            pump_roll_weight: 0.4,

            base_drag: 0.12,
            stall_drag: 1.5,
            carve_drag: 0.35,
            snap_drag: 1.2,
            snap_roll_threshold: 0.1,

            min_speed: 1.0,
            max_speed: 25.0,

            base_lift: 1.2,
            pitch_lift: 2.0,
            ground_effect_low: 0.3,
            ground_effect_high: 1.0,
            ground_effect_strength: 12.0,
            wave_face_lift: 0.3,
            vertical_damping: 0.85,

            touchdown_height: -0.05,
            breach_height: 1.3,

            turn_rate: 1.8,
            snap_turn_multiplier: 2.5,
            turn_reference_speed: 10.0,

            start_position: Vec2::ZERO,
            start_yaw: 0.0,
            start_height: 0.4,
            initial_speed: 8.0,
        }
    }
}

impl RiderTuning {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scalars = [
            self.pitch_up_target,
            self.pitch_down_target,
            self.neutral_pitch,
            self.roll_target,
            self.snap_pitch,
            self.pitch_response,
            self.roll_response,
            self.wave_thrust_coefficient,
            self.foil_catch_coefficient,
            self.uphill_catch_multiplier,
            self.uphill_alignment,
            self.pump_pitch_weight,
            self.pump_roll_weight,
            self.base_drag,
            self.stall_drag,
            self.carve_drag,
            self.snap_drag,
            self.snap_roll_threshold,
            self.min_speed,
            self.max_speed,
            self.base_lift,
            self.pitch_lift,
            self.ground_effect_low,
            self.ground_effect_high,
            self.ground_effect_strength,
            self.wave_face_lift,
            self.vertical_damping,
            self.touchdown_height,
            self.breach_height,
            self.turn_rate,
            self.snap_turn_multiplier,
            self.turn_reference_speed,
            self.start_position.x,
            self.start_position.y,
            self.start_yaw,
            self.start_height,
            self.initial_speed,
        ];
        require(scalars.iter().all(|v| v.is_finite()), || {
            "rider tuning values must be finite".to_string()
        })?;
        require(self.pitch_response > 0.0 && self.roll_response > 0.0, || {
            "smoothing responses must be > 0".to_string()
        })?;
        require(self.min_speed > 0.0 && self.max_speed >= self.min_speed, || {
            format!(
                "speed range [{}, {}] is invalid",
                self.min_speed, self.max_speed
            )
        })?;
        require(
            (self.min_speed..=self.max_speed).contains(&self.initial_speed),
            || {
                format!(
                    "initial_speed {} outside [{}, {}]",
                    self.initial_speed, self.min_speed, self.max_speed
                )
            },
        )?;
        require(
            self.touchdown_height < self.ground_effect_low
                && self.ground_effect_low <= self.ground_effect_high
                && self.ground_effect_high < self.breach_height,
            || {
                format!(
                    "height thresholds must satisfy touchdown ({}) < ground effect band [{}, {}] < breach ({})",
                    self.touchdown_height,
                    self.ground_effect_low,
                    self.ground_effect_high,
                    self.breach_height
                )
            },
        )?;
        require(
            self.start_height > self.touchdown_height && self.start_height < self.breach_height,
            || format!("start_height {} starts crashed", self.start_height),
        )?;
        require(
            self.vertical_damping > 0.0 && self.vertical_damping <= 1.0,
            || {
                format!(
                    "vertical_damping must be in (0, 1], got {}",
                    self.vertical_damping
                )
            },
        )?;
        require(self.turn_reference_speed > 0.0, || {
            "turn_reference_speed must be > 0".to_string()
        })
    }
}

/// Named swell conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SwellPreset {
    Mellow,
    #[default]
    Classic,
    Heavy,
}

impl SwellPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwellPreset::Mellow => "Mellow",
            SwellPreset::Classic => "Classic",
            SwellPreset::Heavy => "Heavy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mellow" | "small" => Some(SwellPreset::Mellow),
            "classic" | "default" => Some(SwellPreset::Classic),
            "heavy" | "big" => Some(SwellPreset::Heavy),
            _ => None,
        }
    }

    /// Groundswell size relative to the classic swell.
    /// Steepness scales with amplitude so Q is unchanged.
    pub fn groundswell_scale(&self) -> f32 {
        match self {
            SwellPreset::Mellow => 0.6,
            SwellPreset::Classic => 1.0,
            SwellPreset::Heavy => 1.5,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Wave components; index 0 is the groundswell
    pub waves: Vec<WaveComponent>,
    pub depth: DepthProfile,
    pub surface: SurfaceTuning,
    pub rider: RiderTuning,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            waves: DEFAULT_WAVES.to_vec(),
            depth: DepthProfile::default(),
            surface: SurfaceTuning::default(),
            rider: RiderTuning::default(),
        }
    }
}

impl SimConfig {
    /// Default configuration with the groundswell sized by `preset`
    pub fn from_preset(preset: SwellPreset) -> Self {
        let mut config = Self::default();
        let scale = preset.groundswell_scale();
        if let Some(swell) = config.waves.first_mut() {
            swell.amplitude *= scale;
            swell.steepness *= scale;
        }
        config
    }

    /// Check every part of the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.waves.is_empty() {
            return Err(ConfigError::NoWaveComponents);
        }
        for (i, wave) in self.waves.iter().enumerate() {
            wave.validate(i, self.waves.len())?;
        }
        self.depth.validate()?;
        self.surface.validate()?;
        self.rider.validate()
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a JSON config file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json_string()?)?;
        log::info!("Config saved to {}", path.display());
        Ok(())
    }
}
