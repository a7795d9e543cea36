//! The contract between the generational controller and a chromosome encoding.
//!
//! Two encodings are provided:
//!
//! - [`Problem`]: a chromosome is a visit order (permutation of location
//!   indices) scored by [`evaluate_route`]; higher fitness is better and parents
//!   are drawn in proportion to fitness.
//! - [`GridProblem`]: a chromosome is a fixed-length path of grid cells scored by
//!   tents reached; parents are drawn uniformly among the paths tied for the most
//!   tents.

use crate::error::Result;
use crate::fitness::{evaluate_route, RouteEvaluation};
use crate::genetic::Genetic;
use crate::grid::{Cell, Coverage, GridProblem};
use crate::problem::Problem;
use itertools::Itertools;
use rand::Rng;
use std::fmt;

/// A problem instance together with the operators of its chromosome encoding.
pub trait Variant {
    /// Candidate solution.
    type Chromosome: Clone + fmt::Debug;

    /// Result of evaluating a chromosome.
    type Score: Copy + fmt::Debug + fmt::Display;

    /// Instance name, for logs and reports.
    fn name(&self) -> &str;

    /// Create a random chromosome valid against the instance.
    fn generate<R: Rng>(&self, rng: &mut R) -> Result<Self::Chromosome>;

    /// Score a chromosome. Must not depend on any previous evaluation.
    fn evaluate(&self, chromosome: &Self::Chromosome) -> Self::Score;

    /// Whether `candidate` is strictly better than `incumbent`.
    fn is_better(&self, candidate: &Self::Score, incumbent: &Self::Score) -> bool;

    /// Non-negative parent-selection weights, one per score, not all zero.
    fn selection_weights(&self, scores: &[Self::Score]) -> Vec<f64>;

    /// Recombine two parents into one or two children.
    fn crossover<R: Rng>(
        &self,
        parent1: &Self::Chromosome,
        parent2: &Self::Chromosome,
        rng: &mut R,
    ) -> Vec<Self::Chromosome>;

    /// Mutate in place with probability `mutation_rate`; returns whether anything changed.
    fn mutate<R: Rng>(
        &self,
        chromosome: &mut Self::Chromosome,
        mutation_rate: f64,
        rng: &mut R,
    ) -> Result<bool>;

    /// Scalar view of a score for statistics and history.
    fn fitness_value(&self, score: &Self::Score) -> f64;

    /// Human-readable rendering of a chromosome.
    fn describe(&self, chromosome: &Self::Chromosome) -> String;

    /// Size of the instance (locations or tents), for logs.
    fn size(&self) -> usize;
}

impl Variant for Problem {
    type Chromosome = Vec<usize>;
    type Score = RouteEvaluation;

    fn name(&self) -> &str {
        &self.name
    }

    fn generate<R: Rng>(&self, rng: &mut R) -> Result<Vec<usize>> {
        Ok(Genetic.generate_chromosome(self.location_count(), rng))
    }

    fn evaluate(&self, chromosome: &Vec<usize>) -> RouteEvaluation {
        evaluate_route(chromosome, self)
    }

    fn is_better(&self, candidate: &RouteEvaluation, incumbent: &RouteEvaluation) -> bool {
        candidate.fitness > incumbent.fitness
    }

    /// Fitness scaled by the population maximum so a degenerate `f64::MAX`
    /// cannot overflow the wheel.
    fn selection_weights(&self, scores: &[RouteEvaluation]) -> Vec<f64> {
        let max = scores
            .iter()
            .map(|score| score.fitness)
            .fold(0.0_f64, f64::max);

        if max <= 0.0 || !max.is_finite() {
            return vec![1.0; scores.len()];
        }

        scores.iter().map(|score| score.fitness / max).collect()
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &Vec<usize>,
        parent2: &Vec<usize>,
        rng: &mut R,
    ) -> Vec<Vec<usize>> {
        let (child1, child2) = Genetic.crossover(parent1, parent2, rng);
        vec![child1, child2]
    }

    fn mutate<R: Rng>(
        &self,
        chromosome: &mut Vec<usize>,
        mutation_rate: f64,
        rng: &mut R,
    ) -> Result<bool> {
        Ok(Genetic.mutate(chromosome, mutation_rate, rng))
    }

    fn fitness_value(&self, score: &RouteEvaluation) -> f64 {
        score.fitness
    }

    fn describe(&self, chromosome: &Vec<usize>) -> String {
        chromosome.iter().join(" -> ")
    }

    fn size(&self) -> usize {
        self.location_count()
    }
}

impl Variant for GridProblem {
    type Chromosome = Vec<Cell>;
    type Score = Coverage;

    fn name(&self) -> &str {
        &self.name
    }

    fn generate<R: Rng>(&self, rng: &mut R) -> Result<Vec<Cell>> {
        self.generate_path(rng)
    }

    fn evaluate(&self, chromosome: &Vec<Cell>) -> Coverage {
        self.evaluate_path(chromosome)
    }

    fn is_better(&self, candidate: &Coverage, incumbent: &Coverage) -> bool {
        candidate.is_better_than(incumbent)
    }

    fn selection_weights(&self, scores: &[Coverage]) -> Vec<f64> {
        let most = scores
            .iter()
            .map(|score| score.tents_supplied)
            .max()
            .unwrap_or(0);

        scores
            .iter()
            .map(|score| if score.tents_supplied == most { 1.0 } else { 0.0 })
            .collect()
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &Vec<Cell>,
        parent2: &Vec<Cell>,
        rng: &mut R,
    ) -> Vec<Vec<Cell>> {
        vec![self.crossover_paths(parent1, parent2, rng)]
    }

    fn mutate<R: Rng>(
        &self,
        chromosome: &mut Vec<Cell>,
        mutation_rate: f64,
        rng: &mut R,
    ) -> Result<bool> {
        self.mutate_path(chromosome, mutation_rate, rng)
    }

    fn fitness_value(&self, score: &Coverage) -> f64 {
        score.tents_supplied as f64
    }

    fn describe(&self, chromosome: &Vec<Cell>) -> String {
        chromosome.iter().join(" -> ")
    }

    fn size(&self) -> usize {
        self.tent_count()
    }
}
