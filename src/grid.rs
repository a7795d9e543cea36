//! Coordinate-path variant: a vehicle wanders a grid of cells and is rewarded
//! for the number of tents it reaches.
//!
//! Paths have a fixed length and may repeat cells; they are not guaranteed to
//! cover every tent. Cells are drawn by bounded rejection sampling against a
//! legality mask.

use crate::error::{Error, Result};
use crate::problem::{Category, ConsumptionRates, Dependents, Good, Point};
use log::warn;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;

/// Default number of cells in a path.
pub const DEFAULT_PATH_LENGTH: usize = 15;

/// Default number of draws allowed when sampling one legal cell.
pub const DEFAULT_SAMPLING_ATTEMPTS: usize = 10_000;

/// A grid cell addressed by column `x` and row `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    /// Create a cell from its column and row.
    pub fn new(x: usize, y: usize) -> Self {
        Cell { x, y }
    }

    /// The cell's coordinates as a point in the plane.
    pub fn to_point(self) -> Point {
        Point::new(self.x as f64, self.y as f64)
    }

    /// Euclidean distance between cell coordinates.
    pub fn distance(&self, other: &Cell) -> f64 {
        self.to_point().distance(&other.to_point())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A rectangular boolean mask, stored row by row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u8>>", into = "Vec<Vec<u8>>")]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Grid {
    /// A grid with no cell set.
    pub fn empty(width: usize, height: usize) -> Self {
        Grid {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    /// Build from rows of `0`/`1` flags; `rows[y][x]` addresses cell `(x, y)`.
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        if height == 0 || width == 0 {
            return Err(Error::InvalidInstance("grid is empty".to_string()));
        }

        let mut cells = Vec::with_capacity(width * height);
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(Error::InvalidInstance(format!(
                    "grid is ragged: row {} has {} cells, expected {}",
                    y,
                    row.len(),
                    width
                )));
            }
            cells.extend(row.iter().map(|&flag| flag != 0));
        }

        Ok(Grid {
            width,
            height,
            cells,
        })
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Whether the cell lies inside the grid.
    pub fn contains(&self, cell: Cell) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    /// Whether the cell is flagged. Cells outside the grid are not.
    pub fn is_set(&self, cell: Cell) -> bool {
        self.contains(cell) && self.cells[cell.y * self.width + cell.x]
    }

    /// All flagged cells in row-major order.
    pub fn set_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &flag)| flag)
            .map(move |(i, _)| Cell::new(i % self.width, i / self.width))
    }

    /// Number of flagged cells.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&flag| flag).count()
    }

    /// Draw uniform cells until a flagged one turns up, at most `attempts` times.
    pub fn sample_set_cell<R: Rng + ?Sized>(
        &self,
        attempts: usize,
        rng: &mut R,
    ) -> Result<Cell> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::SamplingStall { attempts: 0 });
        }

        for _ in 0..attempts {
            let x = rng.gen_range(0..self.width);
            let y = rng.gen_range(0..self.height);
            let cell = Cell::new(x, y);
            if self.is_set(cell) {
                return Ok(cell);
            }
        }

        Err(Error::SamplingStall { attempts })
    }
}

impl TryFrom<Vec<Vec<u8>>> for Grid {
    type Error = Error;

    fn try_from(rows: Vec<Vec<u8>>) -> Result<Self> {
        Grid::from_rows(&rows)
    }
}

impl From<Grid> for Vec<Vec<u8>> {
    fn from(grid: Grid) -> Self {
        grid.cells
            .chunks(grid.width.max(1))
            .take(grid.height)
            .map(|row| row.iter().map(|&flag| flag as u8).collect())
            .collect()
    }
}

/// Dependents living in one tent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tent {
    pub cell: Cell,
    pub dependents: Dependents,
}

impl Tent {
    /// Create a tent without dependents.
    pub fn new(x: usize, y: usize) -> Self {
        Tent {
            cell: Cell::new(x, y),
            dependents: Dependents::new(),
        }
    }

    /// Set the number of dependents of one category.
    pub fn with_dependents(mut self, category: Category, count: u32) -> Self {
        self.dependents.insert(category, count);
        self
    }
}

/// Score of a path: tents reached first, distance second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coverage {
    /// Distinct tents visited by the path
    pub tents_supplied: usize,
    /// Distance walked until the last tent was reached (or the path ended)
    pub distance: f64,
    /// Milk and bread required across all tents
    pub required_weight: u32,
}

impl Coverage {
    /// More tents wins; among equal counts the shorter walk wins.
    pub fn is_better_than(&self, other: &Coverage) -> bool {
        self.tents_supplied > other.tents_supplied
            || (self.tents_supplied == other.tents_supplied && self.distance < other.distance)
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} tents supplied, distance {:.2}, required weight {}",
            self.tents_supplied, self.distance, self.required_weight
        )
    }
}

fn default_path_length() -> usize {
    DEFAULT_PATH_LENGTH
}

fn default_sampling_attempts() -> usize {
    DEFAULT_SAMPLING_ATTEMPTS
}

/// Serializable description of a grid instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridDefinition {
    pub name: String,
    /// Cells holding a tent
    pub tent_map: Grid,
    /// Cells a path may use
    pub legality: Grid,
    #[serde(default)]
    pub tents: Vec<Tent>,
    #[serde(default)]
    pub rates: ConsumptionRates,
    #[serde(default = "default_path_length")]
    pub path_length: usize,
    #[serde(default = "default_sampling_attempts")]
    pub max_sampling_attempts: usize,
}

impl GridDefinition {
    /// Definition with default rates, path length and sampling budget.
    pub fn new(name: String, tent_map: Grid, legality: Grid) -> Self {
        GridDefinition {
            name,
            tent_map,
            legality,
            tents: Vec::new(),
            rates: ConsumptionRates::default(),
            path_length: DEFAULT_PATH_LENGTH,
            max_sampling_attempts: DEFAULT_SAMPLING_ATTEMPTS,
        }
    }

    /// Set the tents and their dependents.
    pub fn with_tents(mut self, tents: Vec<Tent>) -> Self {
        self.tents = tents;
        self
    }

    /// Set the number of cells in every path.
    pub fn with_path_length(mut self, length: usize) -> Self {
        self.path_length = length;
        self
    }

    /// Set the number of draws allowed when sampling one legal cell.
    pub fn with_max_sampling_attempts(mut self, attempts: usize) -> Self {
        self.max_sampling_attempts = attempts;
        self
    }

    /// Validate the definition.
    pub fn build(self) -> Result<GridProblem> {
        if self.tent_map.width() != self.legality.width()
            || self.tent_map.height() != self.legality.height()
        {
            return Err(Error::InvalidInstance(format!(
                "tent map is {}x{} but legality mask is {}x{}",
                self.tent_map.width(),
                self.tent_map.height(),
                self.legality.width(),
                self.legality.height()
            )));
        }
        if self.tent_map.count() == 0 {
            return Err(Error::InvalidInstance("tent map marks no tent".to_string()));
        }
        if self.legality.count() == 0 {
            return Err(Error::InvalidInstance(
                "legality mask permits no cell".to_string(),
            ));
        }
        if self.path_length == 0 {
            return Err(Error::InvalidInstance(
                "path length must be positive".to_string(),
            ));
        }
        if self.max_sampling_attempts == 0 {
            return Err(Error::InvalidInstance(
                "sampling budget must be positive".to_string(),
            ));
        }

        let mut required_weight = 0u32;
        for tent in &self.tents {
            if !self.tent_map.contains(tent.cell) {
                return Err(Error::InvalidInstance(format!(
                    "tent {} lies outside the grid",
                    tent.cell
                )));
            }
            if !self.tent_map.is_set(tent.cell) {
                warn!(
                    "instance {}: dependents listed for {} which is not a tent",
                    self.name, tent.cell
                );
            }
            let required = self.rates.required(&tent.dependents)?;
            required_weight = required_weight
                .saturating_add(required[Good::Milk])
                .saturating_add(required[Good::Bread]);
        }

        let unreachable = self
            .tent_map
            .set_cells()
            .filter(|&cell| !self.legality.is_set(cell))
            .count();
        if unreachable > 0 {
            warn!(
                "instance {}: {} tents lie on cells no path may use",
                self.name, unreachable
            );
        }

        Ok(GridProblem {
            tent_count: self.tent_map.count(),
            required_weight,
            name: self.name,
            tent_map: self.tent_map,
            legality: self.legality,
            tents: self.tents,
            rates: self.rates,
            path_length: self.path_length,
            max_sampling_attempts: self.max_sampling_attempts,
        })
    }
}

/// A coordinate-path problem instance.
#[derive(Debug, Clone)]
pub struct GridProblem {
    pub name: String,
    pub tent_map: Grid,
    pub legality: Grid,
    pub tents: Vec<Tent>,
    pub rates: ConsumptionRates,
    pub path_length: usize,
    pub max_sampling_attempts: usize,
    tent_count: usize,
    required_weight: u32,
}

impl GridProblem {
    /// Create an instance with default rates, path length and sampling budget.
    pub fn new(name: String, tent_map: Grid, legality: Grid) -> Result<Self> {
        GridDefinition::new(name, tent_map, legality).build()
    }

    /// Load an instance from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let definition: GridDefinition = serde_json::from_str(&text)?;
        definition.build()
    }

    /// Number of tents flagged in the tent map.
    pub fn tent_count(&self) -> usize {
        self.tent_count
    }

    /// Milk and bread required across all tents.
    pub fn required_weight(&self) -> u32 {
        self.required_weight
    }

    /// Draw one legal cell, giving up after `max_sampling_attempts` draws.
    pub fn sample_legal_cell<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Cell> {
        self.legality.sample_set_cell(self.max_sampling_attempts, rng)
    }

    /// Generate a random path of legal cells.
    pub fn generate_path<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<Cell>> {
        (0..self.path_length)
            .map(|_| self.sample_legal_cell(rng))
            .collect()
    }

    /// One-point crossover: `parent1` up to a cut in `1..len`, `parent2` after it.
    pub fn crossover_paths<R: Rng + ?Sized>(
        &self,
        parent1: &[Cell],
        parent2: &[Cell],
        rng: &mut R,
    ) -> Vec<Cell> {
        let length = parent1.len().min(parent2.len());
        if length < 2 {
            return parent1.to_vec();
        }

        let cut = rng.gen_range(1..length);
        let mut child = Vec::with_capacity(parent1.len());
        child.extend_from_slice(&parent1[..cut]);
        child.extend_from_slice(&parent2[cut..]);
        child
    }

    /// With probability `mutation_rate`, replace one random cell by a fresh legal one.
    pub fn mutate_path<R: Rng + ?Sized>(
        &self,
        path: &mut [Cell],
        mutation_rate: f64,
        rng: &mut R,
    ) -> Result<bool> {
        if path.is_empty() || !rng.gen_bool(mutation_rate) {
            return Ok(false);
        }

        let position = rng.gen_range(0..path.len());
        path[position] = self.sample_legal_cell(rng)?;
        Ok(true)
    }

    /// Walk the path, counting distinct tents and the distance until all are reached.
    ///
    /// The starting cell counts as visited, so a path that begins on a tent supplies it.
    pub fn evaluate_path(&self, path: &[Cell]) -> Coverage {
        let mut supplied = HashSet::new();
        let mut distance = 0.0;

        for (i, cell) in path.iter().enumerate() {
            if i > 0 {
                distance += path[i - 1].distance(cell);
            }

            if self.tent_map.is_set(*cell)
                && supplied.insert(*cell)
                && supplied.len() == self.tent_count
            {
                break;
            }
        }

        Coverage {
            tents_supplied: supplied.len(),
            distance,
            required_weight: self.required_weight,
        }
    }

    /// The six-by-six tent city: tents along the edge, a ring road inside.
    pub fn tent_city() -> Result<Self> {
        let tent_map = Grid::from_rows(&[
            vec![1, 0, 0, 1, 1, 0],
            vec![0, 0, 0, 0, 0, 1],
            vec![0, 0, 0, 0, 0, 0],
            vec![0, 0, 0, 0, 0, 0],
            vec![0, 0, 0, 0, 0, 1],
            vec![0, 0, 1, 1, 0, 0],
        ])?;
        let legality = Grid::from_rows(&[
            vec![1, 0, 0, 1, 1, 0],
            vec![0, 1, 1, 1, 1, 1],
            vec![0, 1, 0, 0, 1, 0],
            vec![0, 1, 0, 0, 1, 0],
            vec![0, 1, 1, 1, 1, 1],
            vec![0, 0, 1, 1, 0, 0],
        ])?;

        let tent = |x: usize, y: usize, children: u32, adults: u32| {
            Tent::new(x, y)
                .with_dependents(Category::Children, children)
                .with_dependents(Category::Adults, adults)
        };
        let tents = vec![
            tent(0, 0, 2, 3),
            tent(3, 0, 0, 12),
            tent(4, 0, 3, 2),
            tent(5, 1, 0, 4),
            tent(5, 4, 1, 3),
            tent(2, 5, 3, 2),
            tent(3, 5, 3, 2),
        ];

        GridDefinition::new("tent-city".to_string(), tent_map, legality)
            .with_tents(tents)
            .build()
    }
}
