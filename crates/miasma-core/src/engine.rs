//! Simulation engine - main entry point for running the simulation

use hecs::{Entity, World};
use miasma_logic::{
    Cell, DisplayGroup, HealthStatus, Miasma, PathPlanner, TerrainMap, WallSegment,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::components::*;
use crate::config::{InfectionModel, SimConfig};
use crate::error::EngineError;
use crate::generation::generate_population;
use crate::systems::*;

/// Head count per health status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Census {
    pub susceptible: u32,
    pub infected: u32,
    pub quarantined: u32,
    pub recovered: u32,
}

impl Census {
    pub fn total(&self) -> u32 {
        self.susceptible + self.infected + self.quarantined + self.recovered
    }

    /// Infected and quarantined together, as they are displayed.
    pub fn ill(&self) -> u32 {
        self.infected + self.quarantined
    }

    fn record(&mut self, status: HealthStatus) {
        match status {
            HealthStatus::Susceptible => self.susceptible += 1,
            HealthStatus::Infected => self.infected += 1,
            HealthStatus::Quarantined => self.quarantined += 1,
            HealthStatus::Recovered => self.recovered += 1,
        }
    }
}

/// What one call to [`SimulationEngine::model_step`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TickSummary {
    /// Ticks completed, including this one.
    pub tick: u64,
    pub new_infections: u32,
    pub recoveries: u32,
    pub quarantines: u32,
    /// Census after the tick.
    pub census: Census,
}

/// Read-only view of one agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AgentSnapshot {
    pub id: u32,
    pub cell: Cell,
    pub status: HealthStatus,
    pub urgency: f64,
    /// Cells left on the agent's current route.
    pub route_len: usize,
}

/// Main simulation engine
pub struct SimulationEngine {
    /// ECS world holding every agent
    world: World,
    /// Agents in creation order, which is also the update order
    population: Vec<Entity>,
    map: TerrainMap,
    config: SimConfig,
    planner: PathPlanner,
    rng: StdRng,
    tick: u64,
}

impl SimulationEngine {
    /// Validate `config`, then place and infect the population on `map`.
    pub fn new(map: TerrainMap, config: SimConfig) -> Result<Self, EngineError> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let planner = PathPlanner::new(config.heuristic);
        let mut world = World::new();
        let population = generate_population(
            &mut world,
            &map,
            &planner,
            config.population,
            config.carriers,
            &mut rng,
        );

        let (width, height) = map.shape();
        log::info!(
            "simulation ready: {} agents on {}x{}, {:?} infection, {:?} heuristic, seed {:?}",
            population.len(),
            width,
            height,
            config.infection_model,
            config.heuristic,
            config.seed
        );

        Ok(Self {
            world,
            population,
            map,
            config,
            planner,
            rng,
            tick: 0,
        })
    }

    /// Advance the simulation by exactly one tick.
    ///
    /// Every infected agent lays droplets and every ill agent rolls for
    /// recovery before anyone moves, so exposure this tick only sees droplets
    /// from agents that were contagious when the tick began. The air is
    /// ventilated once at the end.
    pub fn model_step(&mut self) -> TickSummary {
        self.tick += 1;

        let recoveries = contagion_sweep(
            &mut self.world,
            &self.population,
            &mut self.map,
            &self.planner,
            self.config.recovery_rate,
            &mut self.rng,
        );

        let droplets = self.config.infection_model == InfectionModel::Droplet;
        let moved = movement_sweep(
            &mut self.world,
            &self.population,
            &self.map,
            &self.planner,
            &mut self.rng,
            droplets,
        );
        let mut new_infections = moved.infections;
        if !droplets {
            new_infections += contact_sweep(
                &mut self.world,
                &self.population,
                self.config.attack_rate,
                &mut self.rng,
            );
        }

        self.map.ventilate();

        let summary = TickSummary {
            tick: self.tick,
            new_infections,
            recoveries,
            quarantines: moved.quarantines,
            census: self.census(),
        };
        log::debug!(
            "tick {}: +{} infected, +{} recovered, +{} quarantined, S/I/Q/R {}/{}/{}/{}",
            summary.tick,
            summary.new_infections,
            summary.recoveries,
            summary.quarantines,
            summary.census.susceptible,
            summary.census.infected,
            summary.census.quarantined,
            summary.census.recovered
        );
        summary
    }

    /// Run `ticks` ticks, returning one summary per tick.
    pub fn run(&mut self, ticks: u64) -> Vec<TickSummary> {
        (0..ticks).map(|_| self.model_step()).collect()
    }

    /// Grid dimensions `(width, height)`.
    pub fn get_model_size(&self) -> (usize, usize) {
        self.map.shape()
    }

    pub fn list_susceptible(&self) -> Vec<(i32, i32)> {
        self.list_group(DisplayGroup::Susceptible)
    }

    /// Positions of infected and quarantined agents.
    pub fn list_infected(&self) -> Vec<(i32, i32)> {
        self.list_group(DisplayGroup::Infected)
    }

    pub fn list_recovered(&self) -> Vec<(i32, i32)> {
        self.list_group(DisplayGroup::Recovered)
    }

    fn list_group(&self, group: DisplayGroup) -> Vec<(i32, i32)> {
        self.population
            .iter()
            .filter_map(|&entity| {
                let mut query = self.world.query_one::<(&Position, &Health)>(entity).ok()?;
                let (position, health) = query.get()?;
                let cell = position.cell;
                (health.status().display_group() == group).then_some((cell.x, cell.y))
            })
            .collect()
    }

    pub fn census(&self) -> Census {
        let mut census = Census::default();
        for (_, health) in self.world.query::<&Health>().iter() {
            census.record(health.status());
        }
        census
    }

    /// Snapshot of every agent in update order.
    pub fn agents(&self) -> Vec<AgentSnapshot> {
        self.population
            .iter()
            .filter_map(|&entity| {
                let mut query = self
                    .world
                    .query_one::<(&Agent, &Position, &Health, &Urgency, &Route)>(entity)
                    .ok()?;
                let (agent, position, health, urgency, route) = query.get()?;
                Some(AgentSnapshot {
                    id: agent.id,
                    cell: position.cell,
                    status: health.status(),
                    urgency: urgency.0,
                    route_len: route.len(),
                })
            })
            .collect()
    }

    /// Force an agent's status, subject to the usual transition rules.
    pub fn set_status(&mut self, index: usize, status: HealthStatus) -> Result<(), EngineError> {
        let entity = *self
            .population
            .get(index)
            .ok_or(EngineError::UnknownAgent { index })?;
        let health = self
            .world
            .query_one_mut::<&mut Health>(entity)
            .map_err(|_| EngineError::UnknownAgent { index })?;
        health.advance(status)?;
        Ok(())
    }

    /// Plan a route on the engine's map with its configured heuristic.
    pub fn plan_route(&self, from: Cell, to: Cell) -> Result<Vec<Cell>, EngineError> {
        Ok(self.planner.find_path(self.map.graph(), from, to)?)
    }

    pub fn terrain(&self) -> &TerrainMap {
        &self.map
    }

    /// Mutable access to the map, for pruning the navigation graph or
    /// seeding contamination between ticks.
    pub fn terrain_mut(&mut self) -> &mut TerrainMap {
        &mut self.map
    }

    pub fn miasma(&self) -> &Miasma {
        self.map.miasma()
    }

    pub fn wall_segments(&self) -> &[WallSegment] {
        self.map.wall_segments()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn population_size(&self) -> usize {
        self.population.len()
    }

    /// Ticks completed so far.
    pub fn tick(&self) -> u64 {
        self.tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miasma_logic::Zone;

    const WARD: &str = "
        SSS.......
        SSS...#...
        ......#TTT
        QQ....#TTT
    ";

    fn engine(population: u32, carriers: u32, recovery_rate: f64) -> SimulationEngine {
        let map = TerrainMap::from_ascii(WARD).unwrap();
        let config = SimConfig::new(population, carriers, 0.8, recovery_rate).with_seed(42);
        SimulationEngine::new(map, config).unwrap()
    }

    #[test]
    fn test_engine_creation() {
        let engine = engine(30, 4, 0.1);
        assert_eq!(engine.get_model_size(), (10, 4));
        assert_eq!(engine.population_size(), 30);
        assert_eq!(engine.tick(), 0);
        let census = engine.census();
        assert_eq!(census.infected, 4);
        assert_eq!(census.susceptible, 26);
        assert_eq!(census.total(), 30);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let map = TerrainMap::from_ascii(WARD).unwrap();
        let result = SimulationEngine::new(map, SimConfig::new(3, 4, 0.5, 0.5));
        assert!(matches!(result, Err(EngineError::Config(_))));
    }

    #[test]
    fn test_model_step_advances_tick() {
        let mut engine = engine(30, 4, 0.1);
        let summary = engine.model_step();
        assert_eq!(summary.tick, 1);
        assert_eq!(summary.census, engine.census());
        assert_eq!(engine.run(4).len(), 4);
        assert_eq!(engine.tick(), 5);
    }

    #[test]
    fn test_lists_partition_population() {
        let mut engine = engine(40, 6, 0.2);
        for _ in 0..30 {
            engine.model_step();
            let total = engine.list_susceptible().len()
                + engine.list_infected().len()
                + engine.list_recovered().len();
            assert_eq!(total, 40);
            assert_eq!(engine.list_infected().len() as u32, engine.census().ill());
        }
    }

    #[test]
    fn test_droplets_are_ventilated_each_tick() {
        let mut engine = engine(10, 10, 0.0);
        engine.model_step();
        // Laid at 0x7F during the tick, ventilated once before returning
        assert!(engine.miasma().peak() <= 0x1F);
        assert!(engine.miasma().contaminated_cells() > 0);
    }

    #[test]
    fn test_seeded_contamination_is_ventilated_by_next_tick() {
        let mut engine = engine(3, 0, 0.0);
        engine.terrain_mut().contaminate(9, 0);
        assert_eq!(engine.miasma().peak(), 0x7F);
        engine.model_step();
        assert_eq!(engine.terrain().virus_level(9, 0), 0x1F);
    }

    /// Overwrite one agent's movement and health components.
    fn place(
        engine: &mut SimulationEngine,
        index: usize,
        cell: Cell,
        health: Health,
        urgency: f64,
        route: Route,
    ) {
        let entity = engine.population[index];
        engine
            .world
            .insert(entity, (Position { cell }, health, Urgency(urgency), route))
            .unwrap();
    }

    #[test]
    fn test_spread_sweep_finishes_before_anyone_moves() {
        // Agent 0 walks onto the cell of carrier 1, which never moves.
        // Carrier 1 lays droplets before agent 0's turn only if every agent
        // spreads before any agent moves.
        let from = Cell::new(3, 0);
        let onto = Cell::new(4, 0);
        let mut infected = 0;
        for seed in 0..200 {
            let map = TerrainMap::from_ascii(WARD).unwrap();
            let config = SimConfig::new(2, 0, 0.8, 0.0).with_seed(seed);
            let mut engine = SimulationEngine::new(map, config).unwrap();
            let mut carrier = Health::susceptible();
            carrier.advance(HealthStatus::Infected).unwrap();
            place(&mut engine, 0, from, Health::susceptible(), 1.0, Route::new([onto]));
            place(&mut engine, 1, onto, carrier, 0.0, Route::default());

            let summary = engine.model_step();
            let agents = engine.agents();
            assert_eq!(agents[0].cell, onto);
            assert_eq!(agents[1].cell, onto);
            assert_eq!(engine.terrain().virus_level(4, 0), 0x1F);
            assert_eq!(summary.new_infections, u32::from(agents[0].status == HealthStatus::Infected));
            infected += summary.new_infections;
        }
        // 0x7F / 256 per exposure
        assert!((60..=140).contains(&infected), "{infected} of 200 infected");
    }

    #[test]
    fn test_set_status_follows_transition_rules() {
        let mut engine = engine(5, 0, 0.0);
        engine.set_status(0, HealthStatus::Infected).unwrap();
        assert!(matches!(
            engine.set_status(1, HealthStatus::Recovered),
            Err(EngineError::Transition(_))
        ));
        assert!(matches!(
            engine.set_status(9, HealthStatus::Infected),
            Err(EngineError::UnknownAgent { index: 9 })
        ));
        assert_eq!(engine.census().infected, 1);
    }

    #[test]
    fn test_plan_route_between_zones() {
        let engine = engine(1, 0, 0.0);
        let from = engine.terrain().zone(Zone::Start)[0];
        let to = engine.terrain().zone(Zone::Target)[0];
        let route = engine.plan_route(from, to).unwrap();
        assert_eq!(route.last(), Some(&to));
    }

    #[test]
    fn test_agents_snapshot_in_creation_order() {
        let engine = engine(12, 2, 0.0);
        let agents = engine.agents();
        assert_eq!(agents.len(), 12);
        for (index, agent) in agents.iter().enumerate() {
            assert_eq!(agent.id, index as u32);
        }
        assert_eq!(agents[0].status, HealthStatus::Infected);
        assert_eq!(agents[2].status, HealthStatus::Susceptible);
    }
}
