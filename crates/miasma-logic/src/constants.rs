//! Simulation constants: contamination, ventilation and behavior probabilities.
//!
//! Plain constants with no engine dependency, shared by the engine systems
//! and the headless harness.

pub mod droplets {
    /// Concentration OR-ed into a cell by one infected agent per tick.
    pub const CONCENTRATION: u8 = 0x7F;
    /// Bits shifted off every cell's level per ventilation pass (x0.25).
    pub const VENTILATION_SHIFT: u32 = 2;
    /// Ventilations after which any byte level has decayed to zero.
    pub const CLEAR_AFTER_VENTILATIONS: u32 = 4;
}

pub mod behavior {
    /// Lower bound of the per-agent urgency draw.
    pub const URGENCY_MIN: f64 = 0.4;
    /// Upper bound of the per-agent urgency draw.
    pub const URGENCY_MAX: f64 = 0.95;
    /// Chance per acting tick that an infected agent heads to quarantine.
    pub const QUARANTINE_CHANCE: f64 = 0.05;

    // Cumulative thresholds for new task selection
    pub const TASK_TARGET_BELOW: f64 = 0.1;
    pub const TASK_START_BELOW: f64 = 0.2;
    pub const TASK_OPEN_BELOW: f64 = 0.5;

    /// Cumulative, non-exclusive thresholds for +x, -x, +y, -y random steps.
    pub const STEP_THRESHOLDS: [f64; 4] = [0.2, 0.4, 0.6, 0.8];
}

pub mod palette {
    /// Channel value at or above which a pixel channel reads as "on".
    pub const CHANNEL_ON: u8 = 128;
}
