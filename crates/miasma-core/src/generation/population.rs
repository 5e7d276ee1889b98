//! Population generation

use hecs::{Entity, World};
use miasma_logic::constants::behavior::{URGENCY_MAX, URGENCY_MIN};
use miasma_logic::{HealthStatus, PathPlanner, TerrainMap, Zone};
use rand::Rng;

use crate::components::*;
use crate::systems::{random_cell, reroute};

/// Spawn `count` agents, each placed on a random start cell with a route
/// to a random target cell, and infect the first `carriers` of them.
///
/// Returns the entities in creation order, which is the update order.
pub fn generate_population(
    world: &mut World,
    map: &TerrainMap,
    planner: &PathPlanner,
    count: u32,
    carriers: u32,
    rng: &mut impl Rng,
) -> Vec<Entity> {
    let mut population = Vec::with_capacity(count as usize);

    for id in 0..count {
        // Both zones are non-empty on any loaded map
        let (Some(start), Some(target)) = (
            random_cell(map, Zone::Start, rng),
            random_cell(map, Zone::Target, rng),
        ) else {
            log::warn!("map has no start or target cell; spawned {id} of {count} agents");
            break;
        };
        let mut route = Route::default();
        reroute(&mut route, map, planner, start, target);
        let urgency = Urgency(rng.gen_range(URGENCY_MIN..=URGENCY_MAX));

        let mut health = Health::susceptible();
        if id < carriers {
            if let Err(e) = health.advance(HealthStatus::Infected) {
                log::error!("{e}");
            }
        }

        population.push(world.spawn((Agent { id }, Position { cell: start }, health, urgency, route)));
    }

    log::info!(
        "spawned {} agents ({} carriers)",
        population.len(),
        carriers.min(count)
    );
    population
}
