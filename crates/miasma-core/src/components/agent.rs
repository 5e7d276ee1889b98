//! Agent components: identity, position, health, urgency and route.

use std::collections::VecDeque;

use miasma_logic::{Cell, HealthStatus, TransitionError};
use serde::{Deserialize, Serialize};

/// Identifies an entity as an agent. `id` is the creation index, which is
/// also the agent's place in the update order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    pub id: u32,
}

/// Grid cell the agent stands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub cell: Cell,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            cell: Cell::new(x, y),
        }
    }
}

/// Health component. Status only changes through [`Health::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    status: HealthStatus,
}

impl Health {
    pub fn susceptible() -> Self {
        Self {
            status: HealthStatus::Susceptible,
        }
    }

    pub fn status(&self) -> HealthStatus {
        self.status
    }

    /// Move to `next` if the transition is legal.
    pub fn advance(&mut self, next: HealthStatus) -> Result<(), TransitionError> {
        self.status = self.status.transition(next)?;
        Ok(())
    }
}

/// Probability in `[0, 1]` that the agent acts on a given tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Urgency(pub f64);

/// Cells still to walk, nearest first. Empty when idle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    steps: VecDeque<Cell>,
}

impl Route {
    pub fn new(steps: impl IntoIterator<Item = Cell>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }

    /// Abandon the current route and follow `steps` instead.
    pub fn replace(&mut self, steps: impl IntoIterator<Item = Cell>) {
        self.steps.clear();
        self.steps.extend(steps);
    }

    pub fn next_step(&mut self) -> Option<Cell> {
        self.steps.pop_front()
    }

    pub fn peek(&self) -> Option<Cell> {
        self.steps.front().copied()
    }

    pub fn destination(&self) -> Option<Cell> {
        self.steps.back().copied()
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_starts_susceptible() {
        assert_eq!(Health::susceptible().status(), HealthStatus::Susceptible);
    }

    #[test]
    fn test_health_rejects_illegal_transition() {
        let mut health = Health::susceptible();
        assert!(health.advance(HealthStatus::Recovered).is_err());
        assert_eq!(health.status(), HealthStatus::Susceptible);

        health.advance(HealthStatus::Infected).unwrap();
        health.advance(HealthStatus::Quarantined).unwrap();
        health.advance(HealthStatus::Recovered).unwrap();
        assert!(health.advance(HealthStatus::Infected).is_err());
        assert_eq!(health.status(), HealthStatus::Recovered);
    }

    #[test]
    fn test_route_fifo() {
        let mut route = Route::new([Cell::new(1, 0), Cell::new(2, 0)]);
        assert_eq!(route.destination(), Some(Cell::new(2, 0)));
        assert_eq!(route.next_step(), Some(Cell::new(1, 0)));
        assert_eq!(route.peek(), Some(Cell::new(2, 0)));
        route.replace([Cell::new(0, 1)]);
        assert_eq!(route.len(), 1);
        assert_eq!(route.next_step(), Some(Cell::new(0, 1)));
        assert!(route.is_empty());
        assert_eq!(route.next_step(), None);
    }
}
