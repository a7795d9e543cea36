//! Genetic operators for visit-order chromosomes.

use rand::seq::{index, SliceRandom};
use rand::Rng;
use std::collections::HashSet;

/// Implements the genetic operators (generation, crossover, mutation) on permutations.
#[derive(Debug, Clone, Copy, Default)]
pub struct Genetic;

impl Genetic {
    /// Generate a uniformly random visit order of `location_count` locations.
    pub fn generate_chromosome<R: Rng + ?Sized>(
        &self,
        location_count: usize,
        rng: &mut R,
    ) -> Vec<usize> {
        let mut chromosome: Vec<usize> = (0..location_count).collect();
        chromosome.shuffle(rng);
        chromosome
    }

    /// One-point order-preserving crossover.
    ///
    /// A cut is drawn in `1..len`. The first child keeps `parent1` up to the cut
    /// and appends the genes of `parent2` in their order, skipping those already
    /// taken; the second child is built the same way with the parents swapped.
    /// Parents shorter than two genes are returned unchanged.
    pub fn crossover<R: Rng + ?Sized>(
        &self,
        parent1: &[usize],
        parent2: &[usize],
        rng: &mut R,
    ) -> (Vec<usize>, Vec<usize>) {
        let tour_size = parent1.len().min(parent2.len());
        if tour_size < 2 {
            return (parent1.to_vec(), parent2.to_vec());
        }

        let cut = rng.gen_range(1..tour_size);

        let child1 = Self::fill_from(&parent1[..cut], parent2);
        let child2 = Self::fill_from(&parent2[..cut], parent1);

        (child1, child2)
    }

    /// Prefix followed by the donor's genes not already in the prefix.
    fn fill_from(prefix: &[usize], donor: &[usize]) -> Vec<usize> {
        let used: HashSet<usize> = prefix.iter().copied().collect();

        let mut child = Vec::with_capacity(donor.len());
        child.extend_from_slice(prefix);
        child.extend(donor.iter().copied().filter(|gene| !used.contains(gene)));
        child
    }

    /// With probability `mutation_rate`, swap two distinct positions.
    ///
    /// Returns whether the chromosome was changed.
    pub fn mutate<R: Rng + ?Sized>(
        &self,
        chromosome: &mut [usize],
        mutation_rate: f64,
        rng: &mut R,
    ) -> bool {
        if chromosome.len() < 2 || !rng.gen_bool(mutation_rate) {
            return false;
        }

        let picked = index::sample(rng, chromosome.len(), 2);
        chromosome.swap(picked.index(0), picked.index(1));
        true
    }

    /// Check that the chromosome visits each of `0..location_count` exactly once.
    pub fn is_permutation(chromosome: &[usize], location_count: usize) -> bool {
        if chromosome.len() != location_count {
            return false;
        }

        let mut seen = vec![false; location_count];
        for &gene in chromosome {
            if gene >= location_count || seen[gene] {
                return false;
            }
            seen[gene] = true;
        }
        true
    }
}
