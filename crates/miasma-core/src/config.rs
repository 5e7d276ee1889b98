//! Simulation parameters
//!
//! Every epidemiological parameter is explicit: there is no `Default` for
//! [`SimConfig`].

use miasma_logic::HeuristicKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How susceptible agents catch the disease.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfectionModel {
    /// Airborne residue: infection chance is the cell's contamination / 256.
    #[default]
    Droplet,
    /// Same-cell meetings infect with probability `attack_rate`.
    Contact,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{carriers} carriers exceed a population of {population}")]
    CarriersExceedPopulation { carriers: u32, population: u32 },
    #[error("{name} must be within [0, 1], got {value}")]
    RateOutOfRange { name: &'static str, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Number of agents.
    pub population: u32,
    /// Number of agents infected at creation.
    pub carriers: u32,
    /// Per-meeting infection probability, used by [`InfectionModel::Contact`].
    pub attack_rate: f64,
    /// Per-tick recovery probability of an ill agent.
    pub recovery_rate: f64,
    /// RNG seed; entropy-seeded when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub infection_model: InfectionModel,
    #[serde(default)]
    pub heuristic: HeuristicKind,
}

impl SimConfig {
    pub fn new(population: u32, carriers: u32, attack_rate: f64, recovery_rate: f64) -> Self {
        Self {
            population,
            carriers,
            attack_rate,
            recovery_rate,
            seed: None,
            infection_model: InfectionModel::default(),
            heuristic: HeuristicKind::default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_infection_model(mut self, model: InfectionModel) -> Self {
        self.infection_model = model;
        self
    }

    pub fn with_heuristic(mut self, heuristic: HeuristicKind) -> Self {
        self.heuristic = heuristic;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.carriers > self.population {
            return Err(ConfigError::CarriersExceedPopulation {
                carriers: self.carriers,
                population: self.population,
            });
        }
        for (name, value) in [
            ("attack_rate", self.attack_rate),
            ("recovery_rate", self.recovery_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RateOutOfRange { name, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_bounds() {
        assert!(SimConfig::new(10, 10, 0.0, 1.0).validate().is_ok());
        assert!(SimConfig::new(0, 0, 1.0, 0.0).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_too_many_carriers() {
        let err = SimConfig::new(5, 6, 0.5, 0.5).validate().unwrap_err();
        assert_eq!(
            err,
            ConfigError::CarriersExceedPopulation {
                carriers: 6,
                population: 5
            }
        );
    }

    #[test]
    fn test_validate_rejects_bad_rates() {
        assert!(matches!(
            SimConfig::new(5, 1, 1.5, 0.5).validate(),
            Err(ConfigError::RateOutOfRange { name: "attack_rate", .. })
        ));
        assert!(matches!(
            SimConfig::new(5, 1, 0.5, -0.1).validate(),
            Err(ConfigError::RateOutOfRange { name: "recovery_rate", .. })
        ));
        assert!(SimConfig::new(5, 1, f64::NAN, 0.5).validate().is_err());
    }

    #[test]
    fn test_builder_setters() {
        let config = SimConfig::new(100, 2, 0.8, 0.02)
            .with_seed(7)
            .with_infection_model(InfectionModel::Contact)
            .with_heuristic(HeuristicKind::Zero);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.infection_model, InfectionModel::Contact);
        assert_eq!(config.heuristic, HeuristicKind::Zero);
    }
}
