//! Idle/demo driver
//!
//! Produces intents from the rider state and a seeded RNG so attract-mode
//! runs and headless soak tests are reproducible.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{RiderState, TickInput};
use crate::config::RiderTuning;

/// Ticks per half pump stroke
const PUMP_HALF_PERIOD: u32 = 12;

#[derive(Debug, Clone)]
pub struct Autopilot {
    rng: Pcg32,
    /// -1 left, 0 straight, 1 right
    roll_dir: i8,
    roll_hold_ticks: u32,
    snapping: bool,
    tick: u32,
}

impl Autopilot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            roll_dir: 0,
            roll_hold_ticks: 0,
            snapping: false,
            tick: 0,
        }
    }

    /// Intent for the next tick
    pub fn next_input(&mut self, state: &RiderState, tuning: &RiderTuning) -> TickInput {
        self.tick = self.tick.wrapping_add(1);
        let mut input = TickInput::default();

        // Hold ride height in the band, pump when it is comfortable
        let margin = (tuning.ground_effect_high - tuning.ground_effect_low) * 0.25;
        if state.height < tuning.ground_effect_low + margin || state.vertical_velocity < -1.0 {
            input.pitch_up = true;
        } else if state.height > tuning.ground_effect_high - margin {
            input.pitch_down = true;
        } else if (self.tick / PUMP_HALF_PERIOD) % 2 == 0 {
            input.pitch_up = true;
        } else {
            input.pitch_down = true;
        }

        // Pick a new carve every so often
        if self.roll_hold_ticks == 0 {
            self.roll_dir = self.rng.random_range(-1..=1);
            self.roll_hold_ticks = self.rng.random_range(30..120);
            self.snapping = self.roll_dir != 0
                && state.speed > tuning.turn_reference_speed
                && self.rng.random_bool(0.2);
        } else {
            self.roll_hold_ticks -= 1;
        }

        match self.roll_dir {
            d if d < 0 => input.roll_left = true,
            d if d > 0 => input.roll_right = true,
            _ => {}
        }
        input.snap = self.snapping;
        input
    }
}
