//! Configuration parameters for the relief-routing genetic algorithm.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Which best chromosome the controller reports at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BestTracking {
    /// Report the best chromosome of the final generation's evaluation.
    #[default]
    LastGeneration,
    /// Report the best chromosome seen in any generation.
    AllGenerations,
}

/// Configuration settings for the genetic algorithm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of chromosomes in every generation
    pub population_size: usize,
    /// Number of generations to run
    pub num_generations: usize,
    /// Probability of mutating a freshly produced child
    pub mutation_rate: f64,
    /// Seed for the random number generator; `None` seeds from entropy
    pub seed: Option<u64>,
    /// Which best chromosome to report
    pub best_tracking: BestTracking,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            population_size: 50,
            num_generations: 100,
            mutation_rate: 0.2,
            seed: None,
            best_tracking: BestTracking::LastGeneration,
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Config::default()
    }

    /// Set the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Set the number of generations.
    pub fn with_num_generations(mut self, generations: usize) -> Self {
        self.num_generations = generations;
        self
    }

    /// Set the mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Fix the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the best-chromosome tracking mode.
    pub fn with_best_tracking(mut self, tracking: BestTracking) -> Self {
        self.best_tracking = tracking;
        self
    }

    /// Check that every parameter is in range.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(Error::InvalidConfig(
                "population_size must be at least 1".into(),
            ));
        }
        if self.num_generations == 0 {
            return Err(Error::InvalidConfig(
                "num_generations must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(Error::InvalidConfig(format!(
                "mutation_rate must lie in [0, 1], got {}",
                self.mutation_rate
            )));
        }
        Ok(())
    }
}
