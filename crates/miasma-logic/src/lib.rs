//! Pure epidemic-map logic for Miasma.
//!
//! This crate contains the terrain, contamination and navigation logic that
//! is independent of the ECS engine or any runtime. Functions take plain data
//! and return results, making them unit-testable and reusable from the engine,
//! the headless harness, and any future viewer.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`behavior`] | Task and single-step decision tables driven by uniform rolls |
//! | [`constants`] | Droplet concentration, ventilation shift, behavior probabilities |
//! | [`grid`] | Integer grid cells and boolean masks |
//! | [`health`] | Four-state health machine with explicit transition legality |
//! | [`map`] | `TerrainMap`: masks, valid predicate, zones, contamination, nav graph |
//! | [`miasma`] | Per-cell 8-bit airborne contamination field |
//! | [`navigation`] | 4-connected weighted grid graph with wall-cost edges |
//! | [`pathfinding`] | A* search with pluggable heuristics |
//! | [`terrain`] | Terrain classes, palette/ASCII sources, mask sets, builder |

pub mod behavior;
pub mod constants;
pub mod grid;
pub mod health;
pub mod map;
pub mod miasma;
pub mod navigation;
pub mod pathfinding;
pub mod terrain;

pub use grid::{Cell, Mask};
pub use health::{DisplayGroup, HealthStatus, TransitionError};
pub use map::{TerrainMap, Zone};
pub use miasma::Miasma;
pub use navigation::NavGraph;
pub use pathfinding::{Euclidean, Heuristic, HeuristicKind, PathError, PathPlanner, Zero};
pub use terrain::{TerrainBuilder, TerrainClass, TerrainError, TerrainMasks, WallSegment};
