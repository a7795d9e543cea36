//! Problem definition and data structures for relief-supply routing.

use crate::error::{Error, Result};
use crate::utils;
use itertools::Itertools;
use log::warn;
use petgraph::algo::connected_components;
use petgraph::graph::DiGraph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::ops::{AddAssign, Index, IndexMut};
use std::path::Path;

/// A point in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a point from its coordinates.
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// Calculate the Euclidean distance between two points.
    pub fn distance(&self, other: &Point) -> f64 {
        utils::distance(*self, *other)
    }
}

/// A category of relief goods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Good {
    Milk,
    Bread,
    Flour,
    Rice,
    Dhal,
}

impl Good {
    pub const COUNT: usize = 5;
    pub const ALL: [Good; Good::COUNT] = [
        Good::Milk,
        Good::Bread,
        Good::Flour,
        Good::Rice,
        Good::Dhal,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Quantities of every good, used for supply pools, rations and requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Good, u32>", into = "BTreeMap<Good, u32>")]
pub struct Supplies([u32; Good::COUNT]);

impl Supplies {
    /// No goods at all.
    pub fn zero() -> Self {
        Supplies([0; Good::COUNT])
    }

    /// Quantities given in [`Good::ALL`] order.
    pub fn new(quantities: [u32; Good::COUNT]) -> Self {
        Supplies(quantities)
    }

    /// Builder-style setter for one good.
    pub fn with(mut self, good: Good, quantity: u32) -> Self {
        self[good] = quantity;
        self
    }

    /// Whether every quantity is zero.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&q| q == 0)
    }

    /// Sum over all goods.
    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }

    /// Quantities paired with their good, in [`Good::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Good, u32)> + '_ {
        Good::ALL.iter().map(move |&good| (good, self[good]))
    }

    /// Multiply every quantity by `factor`.
    pub fn scaled(&self, factor: u32) -> Self {
        let mut scaled = *self;
        for q in scaled.0.iter_mut() {
            *q = q.saturating_mul(factor);
        }
        scaled
    }
}

impl Index<Good> for Supplies {
    type Output = u32;

    fn index(&self, good: Good) -> &u32 {
        &self.0[good.index()]
    }
}

impl IndexMut<Good> for Supplies {
    fn index_mut(&mut self, good: Good) -> &mut u32 {
        &mut self.0[good.index()]
    }
}

impl AddAssign for Supplies {
    fn add_assign(&mut self, other: Supplies) {
        for good in Good::ALL {
            self[good] = self[good].saturating_add(other[good]);
        }
    }
}

impl From<BTreeMap<Good, u32>> for Supplies {
    fn from(map: BTreeMap<Good, u32>) -> Self {
        let mut supplies = Supplies::zero();
        for (good, quantity) in map {
            supplies[good] = quantity;
        }
        supplies
    }
}

impl From<Supplies> for BTreeMap<Good, u32> {
    fn from(supplies: Supplies) -> Self {
        supplies.iter().collect()
    }
}

impl fmt::Display for Supplies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts = self
            .iter()
            .map(|(good, q)| format!("{:?}={}", good, q).to_lowercase())
            .join(" ");
        write!(f, "{}", parts)
    }
}

/// A category of dependents living at a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Children,
    Adults,
}

/// Number of dependents per category.
pub type Dependents = BTreeMap<Category, u32>;

/// Per-person ration of every good, by dependent category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsumptionRates(BTreeMap<Category, Supplies>);

impl Default for ConsumptionRates {
    fn default() -> Self {
        let mut rates = BTreeMap::new();
        rates.insert(
            Category::Children,
            Supplies::zero().with(Good::Milk, 3).with(Good::Bread, 1),
        );
        rates.insert(
            Category::Adults,
            Supplies::zero()
                .with(Good::Flour, 3)
                .with(Good::Rice, 3)
                .with(Good::Dhal, 1),
        );
        ConsumptionRates(rates)
    }
}

impl ConsumptionRates {
    /// Rates with no category defined.
    pub fn empty() -> Self {
        ConsumptionRates(BTreeMap::new())
    }

    /// Define the ration of one category.
    pub fn with_rate(mut self, category: Category, ration: Supplies) -> Self {
        self.0.insert(category, ration);
        self
    }

    /// Ration per person of the category, if defined.
    pub fn rate(&self, category: Category) -> Option<&Supplies> {
        self.0.get(&category)
    }

    /// Goods required to serve the given dependents.
    pub fn required(&self, dependents: &Dependents) -> Result<Supplies> {
        let mut total = Supplies::zero();
        for (&category, &count) in dependents {
            let ration = self.rate(category).ok_or_else(|| {
                Error::InvalidInstance(format!(
                    "no consumption rate defined for category {:?}",
                    category
                ))
            })?;
            total += ration.scaled(count);
        }
        Ok(total)
    }
}

/// A supply point (camp) to visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub point: Point,
    #[serde(default)]
    pub dependents: Dependents,
}

impl Location {
    /// Create a location without dependents.
    pub fn new(x: f64, y: f64) -> Self {
        Location {
            point: Point::new(x, y),
            dependents: Dependents::new(),
        }
    }

    /// Set the number of dependents of one category.
    pub fn with_dependents(mut self, category: Category, count: u32) -> Self {
        self.dependents.insert(category, count);
        self
    }
}

/// Square boolean matrix over location indices; `(i, j)` permits travel from `i` to `j`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct AdjacencyMatrix {
    size: usize,
    cells: Vec<bool>,
}

impl AdjacencyMatrix {
    /// Every ordered pair permitted.
    pub fn fully_connected(size: usize) -> Self {
        AdjacencyMatrix {
            size,
            cells: vec![true; size * size],
        }
    }

    /// No pair permitted.
    pub fn empty(size: usize) -> Self {
        AdjacencyMatrix {
            size,
            cells: vec![false; size * size],
        }
    }

    /// Build from rows of `0`/`1` flags. Any non-zero entry permits the move.
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self> {
        let size = rows.len();
        let mut cells = Vec::with_capacity(size * size);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != size {
                return Err(Error::InvalidInstance(format!(
                    "adjacency matrix is not square: row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    size
                )));
            }
            cells.extend(row.iter().map(|&flag| flag != 0));
        }
        Ok(AdjacencyMatrix { size, cells })
    }

    /// Fully connected matrix with the listed ordered pairs forbidden.
    pub fn without_edges(size: usize, forbidden: &[(usize, usize)]) -> Self {
        let mut matrix = AdjacencyMatrix::fully_connected(size);
        for &(from, to) in forbidden {
            if from < size && to < size {
                matrix.cells[from * size + to] = false;
            }
        }
        matrix
    }

    /// Number of locations covered.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether travel from `from` to `to` is permitted. Out-of-range indices are not.
    pub fn permits(&self, from: usize, to: usize) -> bool {
        from < self.size && to < self.size && self.cells[from * self.size + to]
    }
}

impl TryFrom<Vec<Vec<u8>>> for AdjacencyMatrix {
    type Error = Error;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self> {
        AdjacencyMatrix::from_rows(&rows)
    }
}

impl From<AdjacencyMatrix> for Vec<Vec<u8>> {
    fn from(matrix: AdjacencyMatrix) -> Self {
        matrix
            .cells
            .chunks(matrix.size.max(1))
            .take(matrix.size)
            .map(|row| row.iter().map(|&flag| flag as u8).collect())
            .collect()
    }
}

/// Serializable description of a visit-order instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemDefinition {
    pub name: String,
    pub locations: Vec<Location>,
    /// General road connectivity; fully connected when omitted
    #[serde(default)]
    pub roads: Option<AdjacencyMatrix>,
    /// Permitted paths; fully connected when omitted
    #[serde(default)]
    pub restrictions: Option<AdjacencyMatrix>,
    pub supplies: Supplies,
    #[serde(default)]
    pub rates: ConsumptionRates,
    /// Maximum quantity of each good carried per trip
    #[serde(default)]
    pub vehicle_capacity: Option<u32>,
}

impl ProblemDefinition {
    /// Validate the definition and derive the per-location requirements.
    pub fn build(self) -> Result<Problem> {
        let n = self.locations.len();
        if n == 0 {
            return Err(Error::InvalidInstance(
                "instance has no locations".to_string(),
            ));
        }

        let roads = self
            .roads
            .unwrap_or_else(|| AdjacencyMatrix::fully_connected(n));
        let restrictions = self
            .restrictions
            .unwrap_or_else(|| AdjacencyMatrix::fully_connected(n));
        for (label, matrix) in [("road", &roads), ("restriction", &restrictions)] {
            if matrix.size() != n {
                return Err(Error::InvalidInstance(format!(
                    "{} matrix covers {} locations, instance has {}",
                    label,
                    matrix.size(),
                    n
                )));
            }
        }

        if self.vehicle_capacity == Some(0) {
            return Err(Error::InvalidInstance(
                "vehicle capacity must be positive".to_string(),
            ));
        }

        let requirements = self
            .locations
            .iter()
            .map(|location| self.rates.required(&location.dependents))
            .collect::<Result<Vec<_>>>()?;

        let problem = Problem {
            name: self.name,
            locations: self.locations,
            roads,
            restrictions,
            supplies: self.supplies,
            rates: self.rates,
            vehicle_capacity: self.vehicle_capacity,
            requirements,
        };

        let components = problem.component_count();
        if components > 1 {
            warn!(
                "instance {}: traversable graph splits into {} components, \
                 every visit order will cross a forbidden edge",
                problem.name, components
            );
        }

        Ok(problem)
    }
}

/// A visit-order problem instance.
#[derive(Debug, Clone)]
pub struct Problem {
    pub name: String,
    pub locations: Vec<Location>,
    pub roads: AdjacencyMatrix,
    pub restrictions: AdjacencyMatrix,
    pub supplies: Supplies,
    pub rates: ConsumptionRates,
    pub vehicle_capacity: Option<u32>,
    requirements: Vec<Supplies>,
}

impl Problem {
    /// Create an instance with the default consumption rates and no carry limit.
    pub fn new(
        name: String,
        locations: Vec<Location>,
        roads: AdjacencyMatrix,
        restrictions: AdjacencyMatrix,
        supplies: Supplies,
    ) -> Result<Self> {
        ProblemDefinition {
            name,
            locations,
            roads: Some(roads),
            restrictions: Some(restrictions),
            supplies,
            rates: ConsumptionRates::default(),
            vehicle_capacity: None,
        }
        .build()
    }

    /// Limit the quantity of each good carried per trip.
    pub fn with_vehicle_capacity(mut self, capacity: u32) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidInstance(
                "vehicle capacity must be positive".to_string(),
            ));
        }
        self.vehicle_capacity = Some(capacity);
        Ok(self)
    }

    /// Load an instance from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let definition: ProblemDefinition = serde_json::from_str(&text)?;
        definition.build()
    }

    /// Number of locations to visit.
    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    /// Goods required at a location.
    pub fn required_goods(&self, location: usize) -> Supplies {
        self.requirements[location]
    }

    /// Whether both the road network and the path restrictions permit the move.
    pub fn is_traversable(&self, from: usize, to: usize) -> bool {
        self.roads.permits(from, to) && self.restrictions.permits(from, to)
    }

    /// Euclidean distance between two locations.
    pub fn get_distance(&self, from: usize, to: usize) -> f64 {
        self.locations[from]
            .point
            .distance(&self.locations[to].point)
    }

    /// Directed graph of traversable moves weighted by distance.
    pub fn traversable_graph(&self) -> DiGraph<usize, f64> {
        let n = self.location_count();
        let mut graph = DiGraph::with_capacity(n, n * n);
        let nodes: Vec<_> = (0..n).map(|i| graph.add_node(i)).collect();

        for from in 0..n {
            for to in 0..n {
                if from != to && self.is_traversable(from, to) {
                    graph.add_edge(nodes[from], nodes[to], self.get_distance(from, to));
                }
            }
        }

        graph
    }

    /// Number of weakly connected components of the traversable graph.
    pub fn component_count(&self) -> usize {
        connected_components(&self.traversable_graph())
    }

    /// The eight-camp relief scenario with a handful of closed roads.
    pub fn relief_camps() -> Result<Self> {
        let camp = |x: f64, y: f64, adults: u32, children: u32| {
            Location::new(x, y)
                .with_dependents(Category::Adults, adults)
                .with_dependents(Category::Children, children)
        };

        let locations = vec![
            camp(0.0, 0.0, 3, 2),
            camp(3.0, 0.0, 12, 0),
            camp(4.0, 0.0, 2, 3),
            camp(5.0, 1.0, 4, 0),
            camp(5.0, 4.0, 3, 2),
            camp(5.0, 4.0, 3, 2),
            camp(2.0, 6.0, 2, 3),
            camp(3.0, 6.0, 2, 1),
        ];
        let n = locations.len();

        let roads = AdjacencyMatrix::without_edges(n, &[(0, 6), (6, 0), (1, 7), (7, 1)]);
        let restrictions =
            AdjacencyMatrix::without_edges(n, &[(2, 5), (5, 2), (3, 6), (6, 3), (0, 4)]);

        let supplies = Supplies::zero()
            .with(Good::Dhal, 15)
            .with(Good::Milk, 28)
            .with(Good::Flour, 12)
            .with(Good::Rice, 20)
            .with(Good::Bread, 10);

        ProblemDefinition {
            name: "relief-camps".to_string(),
            locations,
            roads: Some(roads),
            restrictions: Some(restrictions),
            supplies,
            rates: ConsumptionRates::default(),
            vehicle_capacity: Some(15),
        }
        .build()
    }
}
