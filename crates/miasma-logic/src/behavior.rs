//! Behavior decision tables.
//!
//! Each function maps a uniform roll in `[0, 1)` to a decision, so the
//! engine owns the random source and these stay deterministic.

use serde::{Deserialize, Serialize};

use crate::constants::behavior::{
    STEP_THRESHOLDS, TASK_OPEN_BELOW, TASK_START_BELOW, TASK_TARGET_BELOW,
};
use crate::grid::Cell;
use crate::map::Zone;

/// What an idle agent does next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskChoice {
    /// Path to a random cell of a zone.
    Travel(Zone),
    /// Take one uncommitted random step.
    RandomStep,
}

impl TaskChoice {
    /// 10% target zone, 10% start zone, 30% open terrain, 50% random step.
    pub fn from_roll(roll: f64) -> Self {
        if roll < TASK_TARGET_BELOW {
            TaskChoice::Travel(Zone::Target)
        } else if roll < TASK_START_BELOW {
            TaskChoice::Travel(Zone::Start)
        } else if roll < TASK_OPEN_BELOW {
            TaskChoice::Travel(Zone::Open)
        } else {
            TaskChoice::RandomStep
        }
    }
}

/// Random single step from `from`.
///
/// The four directions (+x, -x, +y, -y) are tried in order against
/// cumulative thresholds 0.2, 0.4, 0.6, 0.8; a direction is taken when the
/// roll is below its threshold and the destination is enterable. A blocked
/// direction falls through to the next one, and rolls of 0.8 or more stay
/// put.
pub fn random_step(roll: f64, from: Cell, can_enter: impl Fn(Cell) -> bool) -> Option<Cell> {
    from.neighbors4()
        .into_iter()
        .zip(STEP_THRESHOLDS)
        .find(|(next, below)| roll < *below && can_enter(*next))
        .map(|(next, _)| next)
}
