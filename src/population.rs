//! Population management for the genetic algorithm.

use crate::error::{Error, Result};
use crate::individual::Individual;
use crate::variant::Variant;
use log::warn;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// An evaluated individual of variant `V`.
pub type Scored<V> = Individual<<V as Variant>::Chromosome, <V as Variant>::Score>;

/// One evaluated generation.
pub struct Population<V: Variant> {
    pub individuals: Vec<Scored<V>>,
}

/// Parent sampler for one generation: the elite plus a roulette wheel.
pub struct ParentSelector {
    elite: usize,
    wheel: WeightedIndex<f64>,
}

impl ParentSelector {
    /// Index of the individual carried over unchanged.
    pub fn elite(&self) -> usize {
        self.elite
    }

    /// Draw a parent index, with replacement.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        self.wheel.sample(rng)
    }
}

impl<V: Variant> Population<V> {
    /// Score every chromosome of a generation.
    pub fn evaluate(variant: &V, chromosomes: Vec<V::Chromosome>) -> Self {
        let individuals = chromosomes
            .into_iter()
            .map(|chromosome| {
                let score = variant.evaluate(&chromosome);
                Individual::new(chromosome, score)
            })
            .collect();

        Population { individuals }
    }

    /// Get the population size.
    pub fn get_pop_size(&self) -> usize {
        self.individuals.len()
    }

    /// Whether the generation holds no individual.
    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Index of the best individual; ties go to the earliest.
    pub fn best_index(&self, variant: &V) -> Option<usize> {
        let mut best: Option<usize> = None;
        for (i, individual) in self.individuals.iter().enumerate() {
            match best {
                Some(b) if !variant.is_better(&individual.score, &self.individuals[b].score) => {}
                _ => best = Some(i),
            }
        }
        best
    }

    /// The best individual of the generation.
    pub fn get_best(&self, variant: &V) -> Option<&Scored<V>> {
        self.best_index(variant).map(|i| &self.individuals[i])
    }

    /// Selection weights of the generation as assigned by the variant.
    pub fn selection_weights(&self, variant: &V) -> Vec<f64> {
        let scores: Vec<V::Score> = self.individuals.iter().map(|ind| ind.score).collect();
        variant.selection_weights(&scores)
    }

    /// Pick the elite and build the fitness-proportionate wheel.
    pub fn select(&self, variant: &V) -> Result<ParentSelector> {
        let elite = self
            .best_index(variant)
            .ok_or_else(|| Error::Selection("cannot select from empty population".to_string()))?;
        let wheel = WeightedIndex::new(self.selection_weights(variant))?;

        Ok(ParentSelector { elite, wheel })
    }

    /// Build the next generation's chromosomes.
    ///
    /// The elite is copied first; then pairs of parents are drawn, recombined,
    /// and every child is mutated independently until `population_size` is
    /// reached. Surplus children are dropped. A mutation that cannot sample a
    /// legal replacement leaves the child unchanged.
    pub fn reproduce<R: Rng>(
        &self,
        variant: &V,
        selector: &ParentSelector,
        population_size: usize,
        mutation_rate: f64,
        rng: &mut R,
    ) -> Result<Vec<V::Chromosome>> {
        let mut next_generation = Vec::with_capacity(population_size + 1);
        next_generation.push(self.individuals[selector.elite()].chromosome.clone());

        while next_generation.len() < population_size {
            let parent1 = &self.individuals[selector.draw(rng)].chromosome;
            let parent2 = &self.individuals[selector.draw(rng)].chromosome;

            for mut child in variant.crossover(parent1, parent2, rng) {
                match variant.mutate(&mut child, mutation_rate, rng) {
                    Ok(_) => {}
                    Err(Error::SamplingStall { attempts }) => {
                        warn!(
                            "mutation skipped: no legal cell after {} attempts",
                            attempts
                        );
                    }
                    Err(err) => return Err(err),
                }
                next_generation.push(child);
            }
        }

        next_generation.truncate(population_size);
        Ok(next_generation)
    }
}
