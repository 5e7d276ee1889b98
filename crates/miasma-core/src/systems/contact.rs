//! Contact infection - the pairwise model used before droplets existed
//!
//! Agents sharing a cell meet pairwise in population order. Each meeting of
//! a susceptible agent with an infected one infects with probability
//! `attack_rate`. Status changes are visible to later meetings of the same
//! sweep.

use std::collections::HashMap;

use hecs::{Entity, World};
use miasma_logic::{Cell, HealthStatus};
use rand::Rng;

use super::transition;
use crate::components::{Health, Position};

/// Run every same-cell meeting once. Returns the number of new infections.
pub fn contact_sweep(
    world: &mut World,
    population: &[Entity],
    attack_rate: f64,
    rng: &mut impl Rng,
) -> u32 {
    let mut cells = Vec::with_capacity(population.len());
    let mut statuses = Vec::with_capacity(population.len());
    let mut occupants: HashMap<Cell, Vec<usize>> = HashMap::new();
    for (index, &entity) in population.iter().enumerate() {
        let Ok((position, health)) = world.query_one_mut::<(&Position, &Health)>(entity) else {
            cells.push(None);
            statuses.push(HealthStatus::Recovered);
            continue;
        };
        cells.push(Some(position.cell));
        statuses.push(health.status());
        occupants.entry(position.cell).or_default().push(index);
    }

    let mut infections = 0;
    for p1 in 0..population.len() {
        let Some(cell) = cells[p1] else { continue };
        for &p2 in &occupants[&cell] {
            if !statuses[p1].is_susceptible() || !statuses[p2].is_contagious() {
                continue;
            }
            if rng.gen::<f64>() >= attack_rate {
                continue;
            }
            let Ok(health) = world.query_one_mut::<&mut Health>(population[p1]) else {
                continue;
            };
            if transition(health, HealthStatus::Infected) {
                statuses[p1] = HealthStatus::Infected;
                infections += 1;
            }
        }
    }
    infections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Agent, Route, Urgency};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn spawn(world: &mut World, x: i32, y: i32, infected: bool) -> Entity {
        let mut health = Health::susceptible();
        if infected {
            health.advance(HealthStatus::Infected).unwrap();
        }
        world.spawn((
            Agent { id: 0 },
            Position::new(x, y),
            health,
            Urgency(0.5),
            Route::default(),
        ))
    }

    fn status(world: &World, entity: Entity) -> HealthStatus {
        world.get::<&Health>(entity).unwrap().status()
    }

    #[test]
    fn test_certain_attack_infects_cellmates_only() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(21);
        let carrier = spawn(&mut world, 2, 2, true);
        let cellmate = spawn(&mut world, 2, 2, false);
        let neighbour = spawn(&mut world, 2, 3, false);

        let infections = contact_sweep(&mut world, &[carrier, cellmate, neighbour], 1.0, &mut rng);
        assert_eq!(infections, 1);
        assert_eq!(status(&world, cellmate), HealthStatus::Infected);
        assert_eq!(status(&world, neighbour), HealthStatus::Susceptible);
    }

    #[test]
    fn test_zero_attack_rate_never_infects() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(22);
        let carrier = spawn(&mut world, 0, 0, true);
        let others: Vec<Entity> = (0..10).map(|_| spawn(&mut world, 0, 0, false)).collect();
        let mut population = vec![carrier];
        population.extend(&others);

        assert_eq!(contact_sweep(&mut world, &population, 0.0, &mut rng), 0);
        assert!(others
            .iter()
            .all(|e| status(&world, *e) == HealthStatus::Susceptible));
    }

    #[test]
    fn test_new_infections_spread_within_sweep() {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(23);
        // The first agent is infected by the carrier behind it, and is then
        // contagious to the agent after it in the same sweep.
        let first = spawn(&mut world, 1, 1, false);
        let carrier = spawn(&mut world, 1, 1, true);
        let last = spawn(&mut world, 1, 1, false);

        let infections = contact_sweep(&mut world, &[first, carrier, last], 1.0, &mut rng);
        assert_eq!(infections, 2);
        assert_eq!(status(&world, first), HealthStatus::Infected);
        assert_eq!(status(&world, last), HealthStatus::Infected);
    }
}
