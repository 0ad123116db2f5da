//! Rider integrator
//!
//! Advances a `RiderState` by one variable timestep. Stage order matters:
//! intent → orientation → rates → slope → thrust/drag → speed → lift →
//! height → crash → yaw → position → absolute height.

use glam::Vec2;

use super::state::{CrashVerdict, RiderState, TickInput};
use super::surface::SurfaceField;
use crate::config::{ConfigError, RiderTuning, SimConfig};
use crate::consts::{GRAVITY, MAX_DT};
use crate::{normalize_angle, yaw_to_forward};

/// Per-tick force terms, kept for HUD/debug overlays and tests
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Forces {
    pub wave_thrust: f32,
    pub foil_catch: f32,
    pub pump: f32,
    /// Total drag, including `snap_penalty`
    pub drag: f32,
    pub snap_penalty: f32,
    pub ground_effect: f32,
    /// Total upward force before gravity
    pub lift: f32,
    pub slope: Vec2,
}

/// Target (pitch, roll) for an input intent
pub fn resolve_targets(input: &TickInput, tuning: &RiderTuning) -> (f32, f32) {
    let mut pitch = match (input.pitch_up, input.pitch_down) {
        (true, false) => tuning.pitch_up_target,
        (false, true) => tuning.pitch_down_target,
        _ => tuning.neutral_pitch,
    };
    let roll = match (input.roll_left, input.roll_right) {
        (true, false) => -tuning.roll_target,
        (false, true) => tuning.roll_target,
        _ => 0.0,
    };
    // Hack posture: nose up while snapping into a turn
    if input.snap && roll != 0.0 {
        pitch = tuning.snap_pitch;
    }
    (pitch, roll)
}

/// Frame-rate independent exponential approach toward `target`
#[inline]
pub fn approach(current: f32, target: f32, response: f32, dt: f32) -> f32 {
    current + (target - current) * (1.0 - (-response * dt).exp())
}

/// Gravity along the face: downhill pushes, uphill brakes
#[inline]
pub fn wave_slope_thrust(slope: Vec2, forward: Vec2, tuning: &RiderTuning) -> f32 {
    -slope.dot(forward) * GRAVITY * tuning.wave_thrust_coefficient
}

/// Energy the foil extracts from a sloped, moving face
pub fn foil_catch_thrust(slope: Vec2, forward: Vec2, tuning: &RiderTuning) -> f32 {
    let magnitude = slope.length();
    if magnitude <= f32::EPSILON {
        return 0.0;
    }
    let uphill_alignment = slope.dot(forward) / magnitude;
    let multiplier = if uphill_alignment > tuning.uphill_alignment {
        tuning.uphill_catch_multiplier
    } else {
        1.0
    };
    magnitude * tuning.foil_catch_coefficient * multiplier
}

/// Reward for actively working pitch and roll
#[inline]
pub fn pump_thrust(pitch_rate: f32, roll_rate: f32, tuning: &RiderTuning) -> f32 {
    pitch_rate * tuning.pump_pitch_weight + roll_rate * tuning.pump_roll_weight
}

/// Snap penalty alone: a controlled near-stall pivot
#[inline]
pub fn snap_drag(speed: f32, roll: f32, snap: bool, tuning: &RiderTuning) -> f32 {
    if snap && roll.abs() > tuning.snap_roll_threshold {
        tuning.snap_drag * speed
    } else {
        0.0
    }
}

/// Base, stall, carve and snap drag
pub fn drag(speed: f32, pitch: f32, roll: f32, snap: bool, tuning: &RiderTuning) -> f32 {
    tuning.base_drag * speed
        + tuning.stall_drag * pitch.max(0.0) * speed
        + tuning.carve_drag * roll.abs() * speed
        + snap_drag(speed, roll, snap, tuning)
}

/// Restoring force that keeps ride height inside the playable band
pub fn ground_effect(height: f32, tuning: &RiderTuning) -> f32 {
    if height < tuning.ground_effect_low {
        tuning.ground_effect_strength * (tuning.ground_effect_low - height)
    } else if height > tuning.ground_effect_high {
        -tuning.ground_effect_strength * (height - tuning.ground_effect_high)
    } else {
        0.0
    }
}

/// Yaw rate from roll. High speed dulls turning unless snapping.
pub fn turn_rate(roll: f32, speed: f32, snap: bool, tuning: &RiderTuning) -> f32 {
    let snap_multiplier = if snap {
        tuning.snap_turn_multiplier
    } else {
        1.0
    };
    let speed_factor = if !snap && speed > tuning.turn_reference_speed {
        tuning.turn_reference_speed / speed
    } else {
        1.0
    };
    roll * tuning.turn_rate * snap_multiplier * speed_factor
}

/// Stateless stepper over an immutable surface and tuning
#[derive(Debug, Clone)]
pub struct RiderDynamics {
    field: SurfaceField,
    tuning: RiderTuning,
}

impl RiderDynamics {
    /// Validate `config` and build the surface it rides on
    pub fn new(config: &SimConfig) -> Result<Self, ConfigError> {
        let field = SurfaceField::new(&config.waves, config.depth, config.surface)?;
        Self::with_field(field, config.rider)
    }

    pub fn with_field(field: SurfaceField, tuning: RiderTuning) -> Result<Self, ConfigError> {
        tuning.validate()?;
        Ok(Self { field, tuning })
    }

    pub fn field(&self) -> &SurfaceField {
        &self.field
    }

    pub fn tuning(&self) -> &RiderTuning {
        &self.tuning
    }

    /// Starting pose with absolute height resolved against the surface
    pub fn initial_state(&self) -> RiderState {
        let mut state = RiderState::initial(&self.tuning);
        state.absolute_y = self.field.sample_height(state.position.x, state.position.y, 0.0)
            + state.height;
        state
    }

    /// Advance one tick
    pub fn step(&self, state: &RiderState, input: &TickInput, dt: f32) -> RiderState {
        self.step_detailed(state, input, dt).0
    }

    /// Advance one tick, also returning the force terms that drove it.
    ///
    /// Crashed states and non-positive or non-finite `dt` are returned unchanged.
    pub fn step_detailed(
        &self,
        state: &RiderState,
        input: &TickInput,
        dt: f32,
    ) -> (RiderState, Forces) {
        if state.is_frozen() || !dt.is_finite() || dt <= 0.0 {
            return (*state, Forces::default());
        }
        let dt = if dt > MAX_DT {
            log::debug!("Clamping dt {dt:.3}s to {MAX_DT}s");
            MAX_DT
        } else {
            dt
        };
        let t = &self.tuning;
        let mut next = *state;

        // Intent and orientation
        let (target_pitch, target_roll) = resolve_targets(input, t);
        next.prev_pitch = state.pitch;
        next.prev_roll = state.roll;
        next.pitch = approach(state.pitch, target_pitch, t.pitch_response, dt);
        next.roll = approach(state.roll, target_roll, t.roll_response, dt);
        let pitch_rate = (next.pitch - state.pitch).abs() / dt;
        let roll_rate = (next.roll - state.roll).abs() / dt;

        // Surface under the foil
        let slope = self
            .field
            .sample_slope(state.position.x, state.position.y, state.time);
        let forward = yaw_to_forward(state.yaw);

        // Speed
        let wave_thrust = wave_slope_thrust(slope, forward, t);
        let foil_catch = foil_catch_thrust(slope, forward, t);
        let pump = pump_thrust(pitch_rate, roll_rate, t);
        let snap_penalty = snap_drag(state.speed, next.roll, input.snap, t);
        let total_drag = drag(state.speed, next.pitch, next.roll, input.snap, t);

        let mut speed = state.speed + (wave_thrust + foil_catch + pump - total_drag) * dt;
        if !speed.is_finite() {
            log::warn!("Non-finite speed at t={:.3}s, resetting", state.time);
            speed = 0.0;
        }
        next.speed = speed.clamp(t.min_speed, t.max_speed);

        // Vertical
        let ground = ground_effect(state.height, t);
        let lift = t.base_lift * next.speed
            + t.pitch_lift * next.pitch * next.speed
            + ground
            + t.wave_face_lift * slope.length() * GRAVITY;

        let mut vertical_velocity =
            (state.vertical_velocity + (lift - GRAVITY) * dt) * t.vertical_damping;
        if !vertical_velocity.is_finite() {
            log::warn!("Non-finite vertical velocity at t={:.3}s, resetting", state.time);
            vertical_velocity = 0.0;
        }
        next.vertical_velocity = vertical_velocity;
        next.height = state.height + vertical_velocity * dt;
        next.time = state.time + dt;

        // Crash freezes heading and position on the tick it happens
        next.verdict = CrashVerdict::from_height(next.height, t);
        if !next.verdict.is_crash() {
            next.yaw = normalize_angle(
                state.yaw + turn_rate(next.roll, next.speed, input.snap, t) * dt,
            );
            next.position = state.position + yaw_to_forward(next.yaw) * next.speed * dt;
        }

        next.absolute_y = self
            .field
            .sample_height(next.position.x, next.position.y, next.time)
            + next.height;

        let forces = Forces {
            wave_thrust,
            foil_catch,
            pump,
            drag: total_drag,
            snap_penalty,
            ground_effect: ground,
            lift,
            slope,
        };
        (next, forces)
    }
}
