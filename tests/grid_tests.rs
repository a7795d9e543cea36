//! Unit tests for the coordinate-path variant.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use relief_ga::error::Error;
use relief_ga::grid::{Cell, Coverage, Grid, GridDefinition, GridProblem, Tent};
use relief_ga::population::Population;
use relief_ga::problem::Category;
use relief_ga::variant::Variant;

/// A three-cell strip with tents at both ends, every cell legal.
fn create_test_problem() -> GridProblem {
    let tent_map = Grid::from_rows(&[vec![1, 0, 1]]).unwrap();
    let legality = Grid::from_rows(&[vec![1, 1, 1]]).unwrap();

    GridDefinition::new("Strip".to_string(), tent_map, legality)
        .with_tents(vec![
            Tent::new(0, 0).with_dependents(Category::Children, 1),
            Tent::new(2, 0).with_dependents(Category::Adults, 2),
        ])
        .with_path_length(4)
        .build()
        .unwrap()
}

/// A square grid whose only legal cell, (0, 0), is also its only tent.
fn create_sparse_problem(size: usize, path_length: usize) -> GridProblem {
    let mut rows = vec![vec![0u8; size]; size];
    rows[0][0] = 1;
    let mask = Grid::from_rows(&rows).unwrap();

    GridDefinition::new("Sparse".to_string(), mask.clone(), mask)
        .with_path_length(path_length)
        .with_max_sampling_attempts(1)
        .build()
        .unwrap()
}

#[test]
fn test_grid_from_rows() {
    let grid = Grid::from_rows(&[vec![0, 1, 0], vec![1, 0, 0]]).unwrap();

    assert_eq!(grid.width(), 3);
    assert_eq!(grid.height(), 2);
    assert_eq!(grid.count(), 2);
    assert!(grid.is_set(Cell::new(1, 0)));
    assert!(grid.is_set(Cell::new(0, 1)));
    assert!(!grid.is_set(Cell::new(0, 0)));
    assert!(!grid.is_set(Cell::new(5, 5)));

    let set: Vec<Cell> = grid.set_cells().collect();
    assert_eq!(set, vec![Cell::new(1, 0), Cell::new(0, 1)]);
}

#[test]
fn test_grid_rejects_malformed_rows() {
    assert!(matches!(
        Grid::from_rows(&[]),
        Err(Error::InvalidInstance(_))
    ));
    assert!(matches!(
        Grid::from_rows(&[vec![1, 0], vec![1]]),
        Err(Error::InvalidInstance(_))
    ));
}

#[test]
fn test_sampling_stall_is_bounded() {
    let grid = Grid::empty(4, 4);
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    match grid.sample_set_cell(50, &mut rng) {
        Err(Error::SamplingStall { attempts }) => assert_eq!(attempts, 50),
        other => panic!("expected a sampling stall, got {:?}", other),
    }
}

#[test]
fn test_sample_set_cell_finds_only_legal_cells() {
    let grid = Grid::from_rows(&[vec![0, 0, 0], vec![0, 1, 0]]).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(2);

    for _ in 0..20 {
        assert_eq!(grid.sample_set_cell(10_000, &mut rng).unwrap(), Cell::new(1, 1));
    }
}

#[test]
fn test_invalid_grid_instances() {
    let tents = Grid::from_rows(&[vec![1, 0], vec![0, 0]]).unwrap();

    // Dimension mismatch
    let wide = Grid::from_rows(&[vec![1, 1, 1], vec![1, 1, 1]]).unwrap();
    assert!(GridProblem::new("Mismatch".to_string(), tents.clone(), wide).is_err());

    // Nothing legal
    let nothing = Grid::empty(2, 2);
    assert!(matches!(
        GridProblem::new("Blocked".to_string(), tents.clone(), nothing),
        Err(Error::InvalidInstance(_))
    ));

    // No tents
    let legal = Grid::from_rows(&[vec![1, 1], vec![1, 1]]).unwrap();
    assert!(GridProblem::new("Empty".to_string(), Grid::empty(2, 2), legal.clone()).is_err());

    // Zero path length
    let zero_length = GridDefinition::new("Short".to_string(), tents.clone(), legal.clone())
        .with_path_length(0)
        .build();
    assert!(zero_length.is_err());

    // Dependents outside the grid
    let outside = GridDefinition::new("Outside".to_string(), tents, legal)
        .with_tents(vec![Tent::new(5, 0)])
        .build();
    assert!(outside.is_err());
}

#[test]
fn test_generate_path() {
    let problem = GridProblem::tent_city().unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    for _ in 0..10 {
        let path = problem.generate_path(&mut rng).unwrap();
        assert_eq!(path.len(), problem.path_length);
        assert!(path.iter().all(|&cell| problem.legality.is_set(cell)));
    }
}

#[test]
fn test_crossover_paths() {
    let problem = create_test_problem();
    let mut rng = ChaCha8Rng::seed_from_u64(4);
    let parent1 = vec![Cell::new(0, 0); 4];
    let parent2 = vec![Cell::new(2, 0); 4];

    for _ in 0..10 {
        let child = problem.crossover_paths(&parent1, &parent2, &mut rng);
        assert_eq!(child.len(), 4);
        assert_eq!(child[0], parent1[0]);
        assert_eq!(child[3], parent2[3]);

        // A single cut: once the second parent starts, it continues
        let cut = child.iter().position(|&cell| cell == parent2[0]).unwrap();
        assert!(child[cut..].iter().all(|&cell| cell == parent2[0]));
    }
}

#[test]
fn test_mutate_path() {
    let problem = GridProblem::tent_city().unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let original = problem.generate_path(&mut rng).unwrap();

    let mut path = original.clone();
    assert!(problem.mutate_path(&mut path, 1.0, &mut rng).unwrap());
    let changed = path.iter().zip(original.iter()).filter(|(a, b)| a != b).count();
    assert!(changed <= 1);
    assert!(path.iter().all(|&cell| problem.legality.is_set(cell)));

    let mut path = original.clone();
    assert!(!problem.mutate_path(&mut path, 0.0, &mut rng).unwrap());
    assert_eq!(path, original);
}

#[test]
fn test_evaluate_path() {
    let problem = GridProblem::tent_city().unwrap();

    let path = vec![Cell::new(0, 0), Cell::new(3, 0), Cell::new(4, 0)];
    let coverage = problem.evaluate_path(&path);

    // The starting cell counts as visited
    assert_eq!(coverage.tents_supplied, 3);
    assert!((coverage.distance - 4.0).abs() < 1e-9);
    assert_eq!(coverage.required_weight, 48);
}

#[test]
fn test_evaluate_path_counts_distinct_tents_and_stops_when_done() {
    let problem = create_test_problem();

    let revisit = vec![Cell::new(0, 0), Cell::new(1, 0), Cell::new(0, 0), Cell::new(1, 0)];
    assert_eq!(problem.evaluate_path(&revisit).tents_supplied, 1);

    // Walking stops counting distance once both tents are reached
    let path = vec![Cell::new(0, 0), Cell::new(2, 0), Cell::new(1, 0), Cell::new(0, 0)];
    let coverage = problem.evaluate_path(&path);
    assert_eq!(coverage.tents_supplied, 2);
    assert!((coverage.distance - 2.0).abs() < 1e-9);
}

#[test]
fn test_tent_city() {
    let problem = GridProblem::tent_city().unwrap();

    assert_eq!(problem.tent_count(), 7);
    assert_eq!(problem.required_weight(), 48);
    assert_eq!(problem.path_length, 15);
    assert!(problem
        .tent_map
        .set_cells()
        .all(|cell| problem.legality.is_set(cell)));
}

#[test]
fn test_coverage_ordering() {
    let many = Coverage {
        tents_supplied: 3,
        distance: 10.0,
        required_weight: 0,
    };
    let few = Coverage {
        tents_supplied: 2,
        distance: 1.0,
        required_weight: 0,
    };
    let many_short = Coverage {
        distance: 5.0,
        ..many
    };

    assert!(many.is_better_than(&few));
    assert!(!few.is_better_than(&many));
    assert!(many_short.is_better_than(&many));
    assert!(!many.is_better_than(&many));
}

#[test]
fn test_grid_selection_weights_favour_most_tents() {
    let problem = create_test_problem();
    let score = |tents| Coverage {
        tents_supplied: tents,
        distance: 0.0,
        required_weight: 0,
    };

    let weights = problem.selection_weights(&[score(1), score(2), score(0), score(2)]);
    assert_eq!(weights, vec![0.0, 1.0, 0.0, 1.0]);
}

#[test]
fn test_grid_from_json() {
    let json = r#"{
        "name": "json-strip",
        "tent_map": [[1, 0, 1]],
        "legality": [[1, 1, 1]],
        "tents": [
            { "cell": { "x": 0, "y": 0 }, "dependents": { "children": 2 } }
        ],
        "path_length": 6
    }"#;

    let path = std::env::temp_dir().join(format!("relief_ga_grid_{}.json", std::process::id()));
    std::fs::write(&path, json).unwrap();
    let problem = GridProblem::from_file(&path);
    std::fs::remove_file(&path).unwrap();

    let problem = problem.unwrap();
    assert_eq!(problem.name, "json-strip");
    assert_eq!(problem.tent_count(), 2);
    assert_eq!(problem.path_length, 6);
    assert_eq!(problem.required_weight(), 8);
}

#[test]
fn test_stalled_mutation_leaves_path_unchanged() {
    let problem = create_sparse_problem(10, 3);
    let mut rng = ChaCha8Rng::seed_from_u64(6);
    let original = vec![Cell::new(0, 0); 3];

    let mut stalls = 0;
    for _ in 0..50 {
        let mut path = original.clone();
        match problem.mutate_path(&mut path, 1.0, &mut rng) {
            Err(Error::SamplingStall { attempts }) => {
                assert_eq!(attempts, 1);
                assert_eq!(path, original);
                stalls += 1;
            }
            Ok(changed) => {
                assert!(changed);
                assert_eq!(path, original);
            }
            Err(other) => panic!("unexpected error {:?}", other),
        }
    }

    // One legal cell in a hundred with a single draw almost always stalls
    assert!(stalls > 0);
}

#[test]
fn test_reproduce_skips_stalled_mutations() {
    let problem = create_sparse_problem(10, 3);
    let mut rng = ChaCha8Rng::seed_from_u64(8);

    let chromosomes = vec![vec![Cell::new(0, 0); 3]; 4];
    let population = Population::evaluate(&problem, chromosomes);
    let selector = population.select(&problem).unwrap();

    let next = population
        .reproduce(&problem, &selector, 6, 1.0, &mut rng)
        .unwrap();

    assert_eq!(next.len(), 6);
    for path in &next {
        assert_eq!(path.len(), 3);
        assert!(path.iter().all(|&cell| problem.legality.is_set(cell)));
    }
}
