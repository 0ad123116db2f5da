//! Rider state and per-tick input/output types
//!
//! `RiderState` is a plain value: the integrator takes one and returns the next.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::RiderTuning;

/// Terminal verdict derived from ride height each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CrashVerdict {
    /// Still foiling
    #[default]
    Riding,
    /// Board hit the water
    Touchdown,
    /// Foil came out of the water
    Breached,
}

impl CrashVerdict {
    /// Classify a ride height against the crash thresholds
    pub fn from_height(height: f32, tuning: &RiderTuning) -> Self {
        if height <= tuning.touchdown_height {
            CrashVerdict::Touchdown
        } else if height >= tuning.breach_height {
            CrashVerdict::Breached
        } else {
            CrashVerdict::Riding
        }
    }

    pub fn is_crash(&self) -> bool {
        !matches!(self, CrashVerdict::Riding)
    }

    /// Human-readable reason for a crash
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            CrashVerdict::Riding => None,
            CrashVerdict::Touchdown => Some("Board touched down on the water"),
            CrashVerdict::Breached => Some("Foil breached: the wing came out of the water"),
        }
    }
}

/// Input intent for a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TickInput {
    pub pitch_up: bool,
    pub pitch_down: bool,
    pub roll_left: bool,
    pub roll_right: bool,
    /// Held to snap: a high-drag pivot into a sharp turn
    pub snap: bool,
}

/// Complete rider state (deterministic, serializable)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiderState {
    /// Nose-up angle (radians)
    pub pitch: f32,
    /// Bank angle (radians, positive banks toward +yaw)
    pub roll: f32,
    /// Heading (radians, 0 = +Z)
    pub yaw: f32,
    /// Ride height above the local water surface (m)
    pub height: f32,
    /// Vertical velocity of the ride height (m/s)
    pub vertical_velocity: f32,
    /// Forward speed (m/s)
    pub speed: f32,
    /// Pitch before this tick's smoothing
    pub prev_pitch: f32,
    /// Roll before this tick's smoothing
    pub prev_roll: f32,
    /// World (x, z)
    pub position: Vec2,
    /// Surface height under the rider plus ride height
    pub absolute_y: f32,
    /// Elapsed simulation time (s)
    pub time: f32,
    /// Crash verdict from the most recent tick
    pub verdict: CrashVerdict,
}

impl RiderState {
    /// Fixed starting pose from the tuning. `absolute_y` is resolved by the caller.
    pub fn initial(tuning: &RiderTuning) -> Self {
        Self {
            pitch: 0.0,
            roll: 0.0,
            yaw: tuning.start_yaw,
            height: tuning.start_height,
            vertical_velocity: 0.0,
            speed: tuning.initial_speed,
            prev_pitch: 0.0,
            prev_roll: 0.0,
            position: tuning.start_position,
            absolute_y: tuning.start_height,
            time: 0.0,
            verdict: CrashVerdict::Riding,
        }
    }

    /// Frozen states are never integrated again until reset
    pub fn is_frozen(&self) -> bool {
        self.verdict.is_crash()
    }
}

/// Read-only snapshot for camera and HUD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    pub tick: u64,
    pub time: f32,
    /// World position (x, absolute y, z)
    pub position: [f32; 3],
    pub pitch: f32,
    pub roll: f32,
    pub yaw: f32,
    pub speed: f32,
    /// Ride height above the local surface
    pub height: f32,
    pub verdict: CrashVerdict,
    pub reason: Option<String>,
}

impl Telemetry {
    pub fn from_state(state: &RiderState, tick: u64) -> Self {
        Self {
            tick,
            time: state.time,
            position: [state.position.x, state.absolute_y, state.position.y],
            pitch: state.pitch,
            roll: state.roll,
            yaw: state.yaw,
            speed: state.speed,
            height: state.height,
            verdict: state.verdict,
            reason: state.verdict.reason().map(str::to_string),
        }
    }
}
