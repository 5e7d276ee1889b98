//! Movement system - path following, task selection and quarantine routing

use hecs::{Entity, World};
use miasma_logic::behavior::{random_step, TaskChoice};
use miasma_logic::constants::behavior::QUARANTINE_CHANCE;
use miasma_logic::{Cell, HealthStatus, PathError, PathPlanner, TerrainMap, Zone};
use rand::Rng;

use super::{droplet_expose, transition};
use crate::components::{Health, Position, Route, Urgency};

/// What happened to one agent during its movement turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Urgency roll failed; the agent did nothing.
    Idle,
    /// Acted but ended on the same cell.
    Stayed,
    /// Moved one cell.
    Stepped,
    /// Chose a destination and planned a route to it.
    Planned,
    /// Next route cell was not enterable; route abandoned.
    Blocked,
    /// Rerouted to quarantine and became quarantined.
    Quarantined,
}

/// Uniformly random cell of a zone, `None` if the zone is empty.
pub fn random_cell(map: &TerrainMap, zone: Zone, rng: &mut impl Rng) -> Option<Cell> {
    let cells = map.zone(zone);
    if cells.is_empty() {
        return None;
    }
    Some(cells[rng.gen_range(0..cells.len())])
}

/// Plan a route from the agent's cell to `target`.
pub fn pathfind(
    map: &TerrainMap,
    planner: &PathPlanner,
    from: Cell,
    target: Cell,
) -> Result<Vec<Cell>, PathError> {
    planner.find_path(map.graph(), from, target)
}

/// Replace `route` with a fresh plan, leaving it empty when there is no
/// route.
pub fn reroute(route: &mut Route, map: &TerrainMap, planner: &PathPlanner, from: Cell, target: Cell) {
    match pathfind(map, planner, from, target) {
        Ok(steps) => route.replace(steps),
        Err(e) => {
            log::trace!("{e}; agent stays idle");
            route.clear();
        }
    }
}

/// Whether a committed route may advance from `from` to `to`.
///
/// Normally the destination must be enterable. An agent standing on a
/// non-enterable cell (a recovered agent leaving quarantine) may cross any
/// in-bounds non-wall cell.
fn can_follow(map: &TerrainMap, from: Cell, to: Cell) -> bool {
    if map.can_enter_cell(from) {
        map.can_enter_cell(to)
    } else {
        map.in_bounds(to) && !map.is_wall(to)
    }
}

/// Pick and start a new task for an idle agent.
pub fn new_task(
    position: &mut Position,
    route: &mut Route,
    map: &TerrainMap,
    planner: &PathPlanner,
    rng: &mut impl Rng,
) -> MoveOutcome {
    match TaskChoice::from_roll(rng.gen::<f64>()) {
        TaskChoice::Travel(zone) => {
            if let Some(target) = random_cell(map, zone, rng) {
                reroute(route, map, planner, position.cell, target);
            }
            MoveOutcome::Planned
        }
        TaskChoice::RandomStep => {
            match random_step(rng.gen::<f64>(), position.cell, |c| map.can_enter_cell(c)) {
                Some(next) => {
                    position.cell = next;
                    MoveOutcome::Stepped
                }
                None => MoveOutcome::Stayed,
            }
        }
    }
}

/// Run one agent's movement turn.
pub fn move_agent(
    world: &mut World,
    entity: Entity,
    map: &TerrainMap,
    planner: &PathPlanner,
    rng: &mut impl Rng,
) -> MoveOutcome {
    let Ok((position, health, urgency, route)) =
        world.query_one_mut::<(&mut Position, &mut Health, &Urgency, &mut Route)>(entity)
    else {
        return MoveOutcome::Idle;
    };

    // Quarantined agents only follow the route they were given
    if health.status() == HealthStatus::Quarantined {
        return match route.next_step() {
            Some(next) => {
                position.cell = next;
                MoveOutcome::Stepped
            }
            None => MoveOutcome::Stayed,
        };
    }

    if rng.gen::<f64>() >= urgency.0 {
        return MoveOutcome::Idle;
    }

    if health.status() == HealthStatus::Infected && rng.gen::<f64>() < QUARANTINE_CHANCE {
        if let Some(ward) = random_cell(map, Zone::Quarantine, rng) {
            reroute(route, map, planner, position.cell, ward);
            if transition(health, HealthStatus::Quarantined) {
                return MoveOutcome::Quarantined;
            }
        }
    }

    match route.next_step() {
        Some(next) if can_follow(map, position.cell, next) => {
            position.cell = next;
            MoveOutcome::Stepped
        }
        Some(_) => {
            route.clear();
            MoveOutcome::Blocked
        }
        None => new_task(position, route, map, planner, rng),
    }
}

/// Counts from one movement sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementTally {
    pub quarantines: u32,
    pub infections: u32,
}

/// Second sweep of a tick: each agent moves, then (with `expose` set)
/// breathes in the miasma of the cell it ended on, in population order.
pub fn movement_sweep(
    world: &mut World,
    population: &[Entity],
    map: &TerrainMap,
    planner: &PathPlanner,
    rng: &mut impl Rng,
    expose: bool,
) -> MovementTally {
    let mut tally = MovementTally::default();
    for &entity in population {
        if move_agent(world, entity, map, planner, rng) == MoveOutcome::Quarantined {
            tally.quarantines += 1;
        }
        if expose && droplet_expose(world, entity, map, rng) {
            tally.infections += 1;
        }
    }
    tally
}
