//! Fitness evaluation of visit orders.
//!
//! A visit order is scored by simulating the vehicle: every legal leg delivers
//! the goods required at its starting camp from a private copy of the supply
//! pool and then drives to the next camp. Illegal legs are not rejected; they
//! add [`ILLEGAL_EDGE_PENALTY`] so that selection drives them out while
//! crossover can still recombine them.

use crate::problem::{Good, Problem, Supplies};
use itertools::Itertools;
use serde::Serialize;
use std::fmt;

/// Distance-equivalent cost of a leg the instance forbids.
pub const ILLEGAL_EDGE_PENALTY: f64 = 9999.0;

/// Fitness assigned when the accumulated cost is exactly zero.
pub const DEGENERATE_FITNESS: f64 = f64::MAX;

/// Outcome of simulating one visit order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteEvaluation {
    /// Travel distance + commute units + penalties
    pub cost: f64,
    /// Euclidean distance of the legal legs
    pub distance: f64,
    /// Delivery rounds over all camps
    pub commutes: u32,
    /// Number of legs forbidden by the instance
    pub illegal_edges: usize,
    /// Goods that were required but no longer available
    pub shortfall: Supplies,
    /// The cost was zero and the fitness was substituted
    pub degenerate: bool,
    pub fitness: f64,
}

impl fmt::Display for RouteEvaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cost {:.2} (distance {:.2}, {} commutes, {} illegal legs), shortfall [{}]",
            self.cost, self.distance, self.commutes, self.illegal_edges, self.shortfall
        )
    }
}

/// Result of serving a single camp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivery {
    /// Number of transfer rounds
    pub commutes: u32,
    /// Requirement left unmet once the pool ran dry
    pub shortfall: Supplies,
}

/// Serve `required` from `pool`, carrying at most `capacity` of each good per round.
///
/// Each round moves `min(pool, remaining, capacity)` of every good and counts one
/// commute. Rounds stop when the camp is satisfied or none of the goods it still
/// needs is left in the pool. The pool never goes below zero.
pub fn deliver(required: Supplies, pool: &mut Supplies, capacity: Option<u32>) -> Delivery {
    let limit = capacity.unwrap_or(u32::MAX).max(1);
    let mut remaining = required;
    let mut commutes = 0;

    while Good::ALL
        .iter()
        .any(|&good| remaining[good] > 0 && pool[good] > 0)
    {
        for good in Good::ALL {
            let carried = remaining[good].min(pool[good]).min(limit);
            pool[good] -= carried;
            remaining[good] -= carried;
        }
        commutes += 1;
    }

    Delivery {
        commutes,
        shortfall: remaining,
    }
}

/// Reciprocal fitness, substituting [`DEGENERATE_FITNESS`] for a zero cost.
pub fn fitness_from_cost(cost: f64) -> f64 {
    if cost == 0.0 {
        DEGENERATE_FITNESS
    } else {
        1.0 / cost
    }
}

/// Simulate the visit order and score it.
pub fn evaluate_route(chromosome: &[usize], problem: &Problem) -> RouteEvaluation {
    let mut pool = problem.supplies;
    let mut cost = 0.0;
    let mut distance = 0.0;
    let mut commutes = 0;
    let mut illegal_edges = 0;
    let mut shortfall = Supplies::zero();

    for (current, next) in chromosome.iter().copied().tuple_windows() {
        if !problem.is_traversable(current, next) {
            cost += ILLEGAL_EDGE_PENALTY;
            illegal_edges += 1;
            continue;
        }

        let delivery = deliver(
            problem.required_goods(current),
            &mut pool,
            problem.vehicle_capacity,
        );
        commutes += delivery.commutes;
        shortfall += delivery.shortfall;

        let leg = problem.get_distance(current, next);
        distance += leg;
        cost += delivery.commutes as f64 + leg;
    }

    RouteEvaluation {
        cost,
        distance,
        commutes,
        illegal_edges,
        shortfall,
        degenerate: cost == 0.0,
        fitness: fitness_from_cost(cost),
    }
}
