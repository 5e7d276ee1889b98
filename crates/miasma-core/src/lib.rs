//! Miasma Core - Epidemic Simulation Engine
//!
//! An ECS-based simulation of a population walking around a terrain map
//! while an airborne disease spreads through it.
//!
//! # Architecture
//!
//! The simulation uses an Entity Component System (ECS) architecture via `hecs`:
//! - **Entities**: Agents
//! - **Components**: Pure data attached to agents (Position, Health, Route, etc.)
//! - **Systems**: Contagion, movement and contact logic over those components
//!
//! Terrain, navigation and the health state machine live in `miasma-logic`.
//!
//! # Example
//!
//! ```rust,no_run
//! use miasma_core::prelude::*;
//!
//! let map = TerrainMap::from_ascii("SS..TT\n......\nQQ....").unwrap();
//! let config = SimConfig::new(50, 2, 0.8, 0.02).with_seed(7);
//! let mut engine = SimulationEngine::new(map, config).unwrap();
//!
//! for _ in 0..100 {
//!     let summary = engine.model_step();
//!     println!("{:?}", summary.census);
//! }
//! ```

pub mod components;
pub mod config;
pub mod engine;
pub mod error;
pub mod generation;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::{ConfigError, InfectionModel, SimConfig};
    pub use crate::engine::{AgentSnapshot, Census, SimulationEngine, TickSummary};
    pub use crate::error::EngineError;
    pub use miasma_logic::{Cell, HealthStatus, HeuristicKind, TerrainMap, Zone};
}
