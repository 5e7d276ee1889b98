//! Contagion system - droplet spread, exposure and recovery
//!
//! Infected agents lay droplets on their cell at the start of a tick;
//! susceptible agents breathe in whatever is on their cell after moving.

use hecs::{Entity, World};
use miasma_logic::{HealthStatus, PathPlanner, TerrainMap, Zone};
use rand::Rng;

use super::{random_cell, reroute, transition};
use crate::components::{Health, Position, Route};

/// Contaminate the agent's cell if it is infected.
pub fn droplet_spread(world: &mut World, entity: Entity, map: &mut TerrainMap) -> bool {
    let Ok((position, health)) = world.query_one_mut::<(&Position, &Health)>(entity) else {
        return false;
    };
    if !health.status().is_contagious() {
        return false;
    }
    map.contaminate(position.cell.x, position.cell.y);
    true
}

/// Recovery roll for ill agents. A recovered agent is immediately routed
/// to a random open cell.
pub fn convalesce(
    world: &mut World,
    entity: Entity,
    map: &TerrainMap,
    planner: &PathPlanner,
    recovery_rate: f64,
    rng: &mut impl Rng,
) -> bool {
    let Ok((position, health, route)) =
        world.query_one_mut::<(&Position, &mut Health, &mut Route)>(entity)
    else {
        return false;
    };
    if !health.status().is_ill() {
        return false;
    }
    if rng.gen::<f64>() >= recovery_rate || !transition(health, HealthStatus::Recovered) {
        return false;
    }
    if let Some(target) = random_cell(map, Zone::Open, rng) {
        reroute(route, map, planner, position.cell, target);
    }
    true
}

/// Infection roll against the contamination on the agent's cell: a level
/// of `L` infects with probability `L / 256`.
pub fn droplet_expose(
    world: &mut World,
    entity: Entity,
    map: &TerrainMap,
    rng: &mut impl Rng,
) -> bool {
    let Ok((position, health)) = world.query_one_mut::<(&Position, &mut Health)>(entity) else {
        return false;
    };
    if !health.status().is_susceptible() {
        return false;
    }
    let level = map.virus_level(position.cell.x, position.cell.y);
    let roll: u16 = rng.gen_range(0..=255);
    roll < u16::from(level) && transition(health, HealthStatus::Infected)
}

/// First sweep of a tick: spread (when `spread` is set) then convalesce,
/// per agent in population order. Returns the number of recoveries.
pub fn contagion_sweep(
    world: &mut World,
    population: &[Entity],
    map: &mut TerrainMap,
    planner: &PathPlanner,
    recovery_rate: f64,
    rng: &mut impl Rng,
) -> u32 {
    let mut recoveries = 0;
    for &entity in population {
        droplet_spread(world, entity, map);
        if convalesce(world, entity, map, planner, recovery_rate, rng) {
            recoveries += 1;
        }
    }
    recoveries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Agent, Urgency};
    use miasma_logic::Cell;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const ROOM: &str = "
        S...T
        .....
        ..QQQ
    ";

    fn spawn(world: &mut World, at: Cell, status: &[HealthStatus]) -> Entity {
        let mut health = Health::susceptible();
        for next in status {
            health.advance(*next).unwrap();
        }
        world.spawn((
            Agent { id: 0 },
            Position { cell: at },
            health,
            Urgency(0.5),
            Route::default(),
        ))
    }

    fn status(world: &World, entity: Entity) -> HealthStatus {
        world.get::<&Health>(entity).unwrap().status()
    }

    #[test]
    fn test_only_infected_spread() {
        let mut map = TerrainMap::from_ascii(ROOM).unwrap();
        let mut world = World::new();
        let s = spawn(&mut world, Cell::new(0, 1), &[]);
        let i = spawn(&mut world, Cell::new(1, 1), &[HealthStatus::Infected]);
        let q = spawn(
            &mut world,
            Cell::new(2, 2),
            &[HealthStatus::Infected, HealthStatus::Quarantined],
        );

        assert!(!droplet_spread(&mut world, s, &mut map));
        assert!(droplet_spread(&mut world, i, &mut map));
        assert!(!droplet_spread(&mut world, q, &mut map));
        assert_eq!(map.virus_level(0, 1), 0);
        assert_eq!(map.virus_level(1, 1), 0x7F);
        assert_eq!(map.virus_level(2, 2), 0);
    }

    #[test]
    fn test_zero_recovery_rate_never_recovers() {
        let map = TerrainMap::from_ascii(ROOM).unwrap();
        let planner = PathPlanner::default();
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(11);
        let i = spawn(&mut world, Cell::new(1, 1), &[HealthStatus::Infected]);
        for _ in 0..200 {
            assert!(!convalesce(&mut world, i, &map, &planner, 0.0, &mut rng));
        }
        assert_eq!(status(&world, i), HealthStatus::Infected);
    }

    #[test]
    fn test_recovery_routes_out_of_quarantine() {
        let map = TerrainMap::from_ascii(ROOM).unwrap();
        let planner = PathPlanner::default();
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(12);
        let q = spawn(
            &mut world,
            Cell::new(3, 2),
            &[HealthStatus::Infected, HealthStatus::Quarantined],
        );

        assert!(convalesce(&mut world, q, &map, &planner, 1.0, &mut rng));
        assert_eq!(status(&world, q), HealthStatus::Recovered);
        let route = world.get::<&Route>(q).unwrap();
        let destination = route.destination().unwrap();
        assert!(map.zone(Zone::Open).contains(&destination));
    }

    #[test]
    fn test_susceptible_does_not_convalesce() {
        let map = TerrainMap::from_ascii(ROOM).unwrap();
        let planner = PathPlanner::default();
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(13);
        let s = spawn(&mut world, Cell::new(0, 0), &[]);
        assert!(!convalesce(&mut world, s, &map, &planner, 1.0, &mut rng));
        assert_eq!(status(&world, s), HealthStatus::Susceptible);
    }

    #[test]
    fn test_clean_air_never_infects() {
        let map = TerrainMap::from_ascii(ROOM).unwrap();
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(14);
        let s = spawn(&mut world, Cell::new(1, 0), &[]);
        for _ in 0..500 {
            assert!(!droplet_expose(&mut world, s, &map, &mut rng));
        }
    }

    #[test]
    fn test_saturated_air_infects_eventually() {
        let mut map = TerrainMap::from_ascii(ROOM).unwrap();
        map.contaminate(1, 0);
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(15);
        let s = spawn(&mut world, Cell::new(1, 0), &[]);
        let infected = (0..200).any(|_| droplet_expose(&mut world, s, &map, &mut rng));
        assert!(infected);
        assert_eq!(status(&world, s), HealthStatus::Infected);
    }

    fn infection_fraction(map: &TerrainMap, at: Cell, trials: u32, seed: u64) -> f64 {
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(seed);
        let s = spawn(&mut world, at, &[]);
        let mut infected = 0;
        for _ in 0..trials {
            *world.get::<&mut Health>(s).unwrap() = Health::susceptible();
            if droplet_expose(&mut world, s, map, &mut rng) {
                infected += 1;
            }
        }
        f64::from(infected) / f64::from(trials)
    }

    #[test]
    fn test_infection_probability_tracks_level() {
        let mut map = TerrainMap::from_ascii(ROOM).unwrap();
        map.contaminate(1, 0);
        assert_eq!(map.virus_level(1, 0), 0x7F);
        let fresh = infection_fraction(&map, Cell::new(1, 0), 8_000, 17);
        assert!((fresh - 127.0 / 256.0).abs() < 0.03, "fraction {fresh}");

        map.ventilate();
        assert_eq!(map.virus_level(1, 0), 0x1F);
        let stale = infection_fraction(&map, Cell::new(1, 0), 8_000, 18);
        assert!((stale - 31.0 / 256.0).abs() < 0.02, "fraction {stale}");
    }

    #[test]
    fn test_sweep_counts_recoveries() {
        let mut map = TerrainMap::from_ascii(ROOM).unwrap();
        let planner = PathPlanner::default();
        let mut world = World::new();
        let mut rng = StdRng::seed_from_u64(16);
        let population = vec![
            spawn(&mut world, Cell::new(0, 0), &[]),
            spawn(&mut world, Cell::new(1, 1), &[HealthStatus::Infected]),
            spawn(&mut world, Cell::new(3, 1), &[HealthStatus::Infected]),
        ];

        let recoveries =
            contagion_sweep(&mut world, &population, &mut map, &planner, 1.0, &mut rng);
        assert_eq!(recoveries, 2);
        // Droplets were laid before each agent recovered
        assert_eq!(map.virus_level(1, 1), 0x7F);
        assert_eq!(map.virus_level(3, 1), 0x7F);
        assert_eq!(map.virus_level(0, 0), 0);
    }
}
