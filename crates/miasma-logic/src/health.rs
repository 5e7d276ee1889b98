//! Health status machine.
//!
//! Legal transitions:
//!
//! ```text
//! Susceptible -> Infected -> Recovered
//!                   |           ^
//!                   v           |
//!               Quarantined ----+
//! ```
//!
//! `Recovered` is terminal.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Infection status of one agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Susceptible,
    Infected,
    Recovered,
    Quarantined,
}

/// Display grouping used by population queries. Quarantined agents are
/// shown with the infected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayGroup {
    Susceptible,
    Infected,
    Recovered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("illegal health transition {from:?} -> {to:?}")]
    Illegal { from: HealthStatus, to: HealthStatus },
}

impl HealthStatus {
    pub fn can_transition_to(self, next: HealthStatus) -> bool {
        use HealthStatus::*;
        matches!(
            (self, next),
            (Susceptible, Infected)
                | (Infected, Quarantined)
                | (Infected, Recovered)
                | (Quarantined, Recovered)
        )
    }

    /// Validate a transition and return the new status.
    pub fn transition(self, next: HealthStatus) -> Result<HealthStatus, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError::Illegal {
                from: self,
                to: next,
            })
        }
    }

    /// Lays down droplets and infects on contact.
    pub fn is_contagious(self) -> bool {
        self == HealthStatus::Infected
    }

    pub fn is_susceptible(self) -> bool {
        self == HealthStatus::Susceptible
    }

    /// Eligible for a recovery roll.
    pub fn is_ill(self) -> bool {
        matches!(self, HealthStatus::Infected | HealthStatus::Quarantined)
    }

    pub fn is_terminal(self) -> bool {
        self == HealthStatus::Recovered
    }

    pub fn display_group(self) -> DisplayGroup {
        match self {
            HealthStatus::Susceptible => DisplayGroup::Susceptible,
            HealthStatus::Infected | HealthStatus::Quarantined => DisplayGroup::Infected,
            HealthStatus::Recovered => DisplayGroup::Recovered,
        }
    }
}
