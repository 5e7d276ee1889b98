//! Systems - per-tick logic that operates on agent components

mod contact;
mod contagion;
mod movement;

pub use contact::*;
pub use contagion::*;
pub use movement::*;

use crate::components::Health;
use miasma_logic::HealthStatus;

/// Apply a status change, logging (and refusing) illegal transitions.
pub(crate) fn transition(health: &mut Health, next: HealthStatus) -> bool {
    match health.advance(next) {
        Ok(()) => true,
        Err(e) => {
            log::error!("{e}");
            false
        }
    }
}
