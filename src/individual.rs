//! Individual representation for the genetic algorithm population.

use serde::Serialize;

/// A chromosome together with its evaluation.
#[derive(Debug, Clone, Serialize)]
pub struct Individual<C, S> {
    /// The candidate solution
    pub chromosome: C,
    /// The score the chromosome received when its generation was evaluated
    pub score: S,
}

impl<C, S> Individual<C, S> {
    /// Pair a chromosome with its score.
    pub fn new(chromosome: C, score: S) -> Self {
        Individual { chromosome, score }
    }
}
