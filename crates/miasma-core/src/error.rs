use miasma_logic::{PathError, TerrainError, TransitionError};
use thiserror::Error;

use crate::config::ConfigError;

/// Errors raised while setting up a simulation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid terrain: {0}")]
    Terrain(#[from] TerrainError),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("no agent at index {index}")]
    UnknownAgent { index: usize },
}
