//! Session control
//!
//! Owns the one live `RiderState` and hands out read-only telemetry.
//! A crash freezes the session until `respawn` or a fresh `start`.

use super::state::{CrashVerdict, RiderState, Telemetry, TickInput};
use super::surface::SurfaceField;
use super::tick::RiderDynamics;
use crate::config::{ConfigError, SimConfig};

#[derive(Debug, Clone)]
pub struct Session {
    dynamics: RiderDynamics,
    state: RiderState,
    /// Ticks integrated since the last start/respawn
    ticks: u64,
}

impl Session {
    /// Validate `config` and place the rider at the starting pose
    pub fn start(config: &SimConfig) -> Result<Self, ConfigError> {
        let dynamics = RiderDynamics::new(config)?;
        let state = dynamics.initial_state();
        log::info!(
            "Session started: {} wave components, rider at ({:.1}, {:.1})",
            dynamics.field().waves().len(),
            state.position.x,
            state.position.y
        );
        Ok(Self {
            dynamics,
            state,
            ticks: 0,
        })
    }

    /// Replace the rider state with the starting pose
    pub fn respawn(&mut self) {
        self.state = self.dynamics.initial_state();
        self.ticks = 0;
        log::info!("Rider respawned");
    }

    /// Advance one tick and return the refreshed telemetry
    pub fn tick(&mut self, input: &TickInput, dt: f32) -> Telemetry {
        if self.state.is_frozen() {
            log::debug!("Tick ignored: session frozen ({:?})", self.state.verdict);
            return self.telemetry();
        }

        let next = self.dynamics.step(&self.state, input, dt);
        if next != self.state {
            self.ticks += 1;
        }
        if let Some(reason) = next.verdict.reason() {
            log::info!(
                "Crash after {} ticks ({:.2}s): {}",
                self.ticks,
                next.time,
                reason
            );
        }
        self.state = next;
        self.telemetry()
    }

    pub fn telemetry(&self) -> Telemetry {
        Telemetry::from_state(&self.state, self.ticks)
    }

    pub fn state(&self) -> &RiderState {
        &self.state
    }

    pub fn verdict(&self) -> CrashVerdict {
        self.state.verdict
    }

    pub fn is_frozen(&self) -> bool {
        self.state.is_frozen()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn dynamics(&self) -> &RiderDynamics {
        &self.dynamics
    }

    /// Surface shared with display code
    pub fn field(&self) -> &SurfaceField {
        self.dynamics.field()
    }
}
