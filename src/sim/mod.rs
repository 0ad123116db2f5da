//! Deterministic simulation module
//!
//! Surface field, seabed and rider dynamics. Everything here is pure or owns
//! its state explicitly:
//! - Surface and depth queries depend only on arguments and configuration
//! - The rider integrator maps (state, input, dt) to the next state
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod depth;
pub mod session;
pub mod state;
pub mod surface;
pub mod tick;
pub mod wave;

pub use autopilot::Autopilot;
pub use depth::DepthProfile;
pub use session::Session;
pub use state::{CrashVerdict, RiderState, Telemetry, TickInput};
pub use surface::{GridSpec, SurfaceField, SurfaceSample, SurfaceVertex};
pub use tick::{Forces, RiderDynamics};
pub use wave::{DEFAULT_WAVES, MAX_DISPLACEMENT_FACTOR, WaveComponent};
