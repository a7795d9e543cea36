//! # relief_ga
//!
//! A genetic algorithm that plans how a single vehicle visits relief camps to
//! hand out food while respecting which roads may be used.
//!
//! Two chromosome encodings share one generational controller ([`ReliefGa`]):
//!
//! - visit orders over a [`problem::Problem`], scored by simulated delivery
//!   cost with a fixed penalty for forbidden legs ([`fitness`]);
//! - fixed-length cell paths over a [`grid::GridProblem`], scored by the number
//!   of tents reached ([`grid`]).
//!
//! The search is a heuristic: it converges toward good plans within a fixed
//! number of generations and guarantees nothing about optimality. Runs are
//! reproducible when [`config::Config::seed`] is set.

pub mod config;
pub mod error;
pub mod fitness;
pub mod genetic;
pub mod grid;
pub mod individual;
pub mod population;
pub mod problem;
pub mod utils;
pub mod variant;

use crate::config::{BestTracking, Config};
use crate::error::{Error, Result};
use crate::population::{Population, Scored};
use crate::utils::RunStatistics;
use crate::variant::Variant;

use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Times a chromosome is regenerated after a sampling stall before the run fails.
pub const MAX_GENERATION_RETRIES: usize = 1000;

/// Where the controller is in its generational cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initializing,
    Evaluating,
    Selecting,
    Reproducing,
    Terminated,
}

/// Outcome of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport<C, S> {
    /// The reported best chromosome and its score
    pub best: individual::Individual<C, S>,
    /// Generations evaluated
    pub generations: usize,
    /// Best fitness of each generation's evaluation
    pub fitness_history: Vec<f64>,
    pub run_time: Duration,
}

/// The report type produced for variant `V`.
pub type Report<V> = RunReport<<V as Variant>::Chromosome, <V as Variant>::Score>;

/// The main algorithm structure that drives the generational loop.
pub struct ReliefGa<V: Variant> {
    pub variant: V,
    pub config: Config,
    /// The most recently evaluated generation
    pub population: Option<Population<V>>,
    /// The best individual according to the configured tracking mode
    pub best: Option<Scored<V>>,
    pub fitness_history: Vec<f64>,
    pub generation: usize,
    pub run_time: Duration,
    phase: Phase,
    rng: ChaCha8Rng,
}

impl<V: Variant> ReliefGa<V> {
    /// Create a controller for the given instance and configuration.
    pub fn new(variant: V, config: Config) -> Result<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        Ok(ReliefGa {
            variant,
            fitness_history: Vec::with_capacity(config.num_generations),
            config,
            population: None,
            best: None,
            generation: 0,
            run_time: Duration::from_secs(0),
            phase: Phase::Initializing,
            rng,
        })
    }

    /// Current phase of the generational cycle.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Generate the initial chromosomes.
    ///
    /// A chromosome whose generation stalls is drawn again, up to
    /// [`MAX_GENERATION_RETRIES`] times.
    pub fn initialize(&mut self) -> Result<Vec<V::Chromosome>> {
        self.phase = Phase::Initializing;
        let mut chromosomes = Vec::with_capacity(self.config.population_size);
        while chromosomes.len() < self.config.population_size {
            chromosomes.push(self.generate_chromosome()?);
        }
        Ok(chromosomes)
    }

    fn generate_chromosome(&mut self) -> Result<V::Chromosome> {
        let mut retries = 0;
        loop {
            match self.variant.generate(&mut self.rng) {
                Err(Error::SamplingStall { attempts }) if retries < MAX_GENERATION_RETRIES => {
                    retries += 1;
                    warn!(
                        "chromosome generation stalled after {} attempts, retry {}",
                        attempts, retries
                    );
                }
                result => return result,
            }
        }
    }

    /// Run every generation and report the best chromosome.
    pub fn run(&mut self) -> Result<Report<V>> {
        let start_time = Instant::now();
        info!(
            "starting run on {} ({} sites): population {}, {} generations, mutation rate {}",
            self.variant.name(),
            self.variant.size(),
            self.config.population_size,
            self.config.num_generations,
            self.config.mutation_rate
        );

        self.best = None;
        self.fitness_history.clear();
        let mut chromosomes = self.initialize()?;

        for generation in 0..self.config.num_generations {
            self.generation = generation;

            self.phase = Phase::Evaluating;
            let population = Population::evaluate(&self.variant, chromosomes);
            let generation_best = population
                .get_best(&self.variant)
                .cloned()
                .ok_or_else(|| Error::Selection("generation is empty".to_string()))?;

            let fitness = self.variant.fitness_value(&generation_best.score);
            self.fitness_history.push(fitness);
            debug!("generation {}: best {}", generation, generation_best.score);
            self.update_best(generation_best);

            if generation + 1 == self.config.num_generations {
                self.population = Some(population);
                break;
            }

            self.phase = Phase::Selecting;
            let selector = population.select(&self.variant)?;

            self.phase = Phase::Reproducing;
            chromosomes = population.reproduce(
                &self.variant,
                &selector,
                self.config.population_size,
                self.config.mutation_rate,
                &mut self.rng,
            )?;
            self.population = Some(population);
        }

        self.phase = Phase::Terminated;
        self.run_time = start_time.elapsed();

        let best = self
            .best
            .clone()
            .ok_or_else(|| Error::Selection("no generation was evaluated".to_string()))?;
        info!(
            "finished after {} generations in {:?}: {}",
            self.fitness_history.len(),
            self.run_time,
            best.score
        );

        Ok(RunReport {
            best,
            generations: self.fitness_history.len(),
            fitness_history: self.fitness_history.clone(),
            run_time: self.run_time,
        })
    }

    /// Record a generation's best according to the tracking mode.
    fn update_best(&mut self, candidate: Scored<V>) {
        let replace = match (&self.best, self.config.best_tracking) {
            (None, _) | (_, BestTracking::LastGeneration) => true,
            (Some(best), BestTracking::AllGenerations) => {
                self.variant.is_better(&candidate.score, &best.score)
            }
        };

        if replace {
            self.best = Some(candidate);
        }
    }

    /// Summarise a report for printing or saving.
    pub fn statistics(&self, report: &Report<V>) -> RunStatistics {
        RunStatistics {
            instance: self.variant.name().to_string(),
            generations: report.generations,
            population_size: self.config.population_size,
            runtime: report.run_time,
            best_fitness: self.variant.fitness_value(&report.best.score),
            best_score: report.best.score.to_string(),
            best_chromosome: self.variant.describe(&report.best.chromosome),
        }
    }
}
