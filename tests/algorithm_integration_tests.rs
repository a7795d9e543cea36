//! Integration tests for the full generational search.

use relief_ga::config::{BestTracking, Config};
use relief_ga::error::Error;
use relief_ga::fitness::ILLEGAL_EDGE_PENALTY;
use relief_ga::genetic::Genetic;
use relief_ga::grid::{Cell, Grid, GridDefinition, GridProblem};
use relief_ga::problem::{AdjacencyMatrix, Category, Good, Location, Problem, Supplies};
use relief_ga::{Phase, ReliefGa};

/// Creates a moderate size problem: camps on a grid with some forbidden legs.
fn create_moderate_problem() -> Problem {
    let mut locations = Vec::new();
    for i in 0..3 {
        for j in 0..4 {
            let camp = Location::new(i as f64 * 10.0, j as f64 * 10.0)
                .with_dependents(Category::Adults, (i + j) as u32 % 3 + 1)
                .with_dependents(Category::Children, j as u32 % 2);
            locations.push(camp);
        }
    }
    let n = locations.len();

    let supplies = Good::ALL
        .iter()
        .fold(Supplies::zero(), |acc, &good| acc.with(good, 60));

    Problem::new(
        "ModerateTestProblem".to_string(),
        locations,
        AdjacencyMatrix::fully_connected(n),
        AdjacencyMatrix::without_edges(n, &[(0, 1), (5, 6), (7, 3), (10, 11)]),
        supplies,
    )
    .unwrap()
}

/// Two camps without dependents.
fn create_pair_problem() -> Problem {
    Problem::new(
        "Pair".to_string(),
        vec![Location::new(0.0, 0.0), Location::new(6.0, 8.0)],
        AdjacencyMatrix::fully_connected(2),
        AdjacencyMatrix::fully_connected(2),
        Supplies::zero(),
    )
    .unwrap()
}

#[test]
fn test_algorithm_initialization() {
    let problem = create_moderate_problem();
    let config = Config::new().with_population_size(10).with_seed(1);

    let mut algorithm = ReliefGa::new(problem, config).unwrap();
    assert_eq!(algorithm.phase(), Phase::Initializing);

    let chromosomes = algorithm.initialize().unwrap();
    assert_eq!(chromosomes.len(), 10);
    assert!(chromosomes.iter().all(|c| Genetic::is_permutation(c, 12)));
}

#[test]
fn test_invalid_config_is_rejected() {
    let problem = create_pair_problem();
    let config = Config::new().with_population_size(0);

    assert!(matches!(
        ReliefGa::new(problem, config),
        Err(Error::InvalidConfig(_))
    ));
}

#[test]
fn test_algorithm_short_run() {
    let problem = create_moderate_problem();
    let config = Config::new()
        .with_population_size(20)
        .with_num_generations(30)
        .with_seed(42);

    let mut algorithm = ReliefGa::new(problem, config).unwrap();
    let report = algorithm.run().unwrap();

    assert_eq!(algorithm.phase(), Phase::Terminated);
    assert_eq!(report.generations, 30);
    assert_eq!(report.fitness_history.len(), 30);
    assert!(Genetic::is_permutation(&report.best.chromosome, 12));
    assert!(report.best.score.fitness > 0.0);

    // The final population has the configured size
    let population = algorithm.population.as_ref().unwrap();
    assert_eq!(population.get_pop_size(), 20);

    // The elite is carried over, so the best of each generation never gets worse
    for window in report.fitness_history.windows(2) {
        assert!(window[1] >= window[0]);
    }
}

#[test]
fn test_two_location_run() {
    let config = Config::new()
        .with_population_size(10)
        .with_num_generations(1)
        .with_seed(3);

    let mut algorithm = ReliefGa::new(create_pair_problem(), config).unwrap();
    let report = algorithm.run().unwrap();

    assert!((report.best.score.cost - 10.0).abs() < 1e-9);
    assert!((report.best.score.fitness - 0.1).abs() < 1e-12);
}

#[test]
fn test_all_edges_restricted_run() {
    let problem = Problem::new(
        "Blocked".to_string(),
        vec![
            Location::new(0.0, 0.0),
            Location::new(6.0, 8.0),
            Location::new(1.0, 1.0).with_dependents(Category::Children, 2),
        ],
        AdjacencyMatrix::fully_connected(3),
        AdjacencyMatrix::empty(3),
        Supplies::zero().with(Good::Milk, 10),
    )
    .unwrap();

    let config = Config::new()
        .with_population_size(8)
        .with_num_generations(5)
        .with_seed(9);
    let mut algorithm = ReliefGa::new(problem, config).unwrap();
    let report = algorithm.run().unwrap();

    // Every order crosses two forbidden legs and nothing else
    let expected = 1.0 / (2.0 * ILLEGAL_EDGE_PENALTY);
    for individual in &algorithm.population.as_ref().unwrap().individuals {
        assert!((individual.score.fitness - expected).abs() < 1e-15);
    }
    assert_eq!(report.best.score.illegal_edges, 2);
}

#[test]
fn test_population_of_one() {
    let config = Config::new()
        .with_population_size(1)
        .with_num_generations(5)
        .with_seed(4);

    let mut algorithm = ReliefGa::new(create_moderate_problem(), config).unwrap();
    let report = algorithm.run().unwrap();

    assert_eq!(algorithm.population.as_ref().unwrap().get_pop_size(), 1);
    assert_eq!(report.fitness_history.len(), 5);
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let config = Config::new()
        .with_population_size(15)
        .with_num_generations(20)
        .with_seed(1234);

    let first = ReliefGa::new(create_moderate_problem(), config.clone())
        .unwrap()
        .run()
        .unwrap();
    let second = ReliefGa::new(create_moderate_problem(), config)
        .unwrap()
        .run()
        .unwrap();

    assert_eq!(first.best.chromosome, second.best.chromosome);
    assert_eq!(first.fitness_history, second.fitness_history);
}

#[test]
fn test_best_tracking_modes() {
    let config = Config::new()
        .with_population_size(12)
        .with_num_generations(15)
        .with_mutation_rate(0.8)
        .with_seed(77);

    // Last generation: the report is the best of the final evaluation
    let mut last = ReliefGa::new(create_moderate_problem(), config.clone()).unwrap();
    let report = last.run().unwrap();
    let final_best = last
        .population
        .as_ref()
        .unwrap()
        .get_best(&last.variant)
        .unwrap()
        .score
        .fitness;
    assert_eq!(report.best.score.fitness, final_best);
    assert_eq!(Some(&final_best), report.fitness_history.last());

    // All generations: the report is the best seen anywhere
    let config = config.with_best_tracking(BestTracking::AllGenerations);
    let mut ever = ReliefGa::new(create_moderate_problem(), config).unwrap();
    let report = ever.run().unwrap();
    let best_seen = report
        .fitness_history
        .iter()
        .copied()
        .fold(f64::MIN, f64::max);
    assert_eq!(report.best.score.fitness, best_seen);

    // Tracking does not touch the random stream, so both runs saw the same generations
    assert!(report.best.score.fitness >= final_best);
}

#[test]
fn test_relief_camps_run() {
    let config = Config::new()
        .with_population_size(30)
        .with_num_generations(40)
        .with_seed(7);

    let mut algorithm = ReliefGa::new(Problem::relief_camps().unwrap(), config).unwrap();
    let report = algorithm.run().unwrap();

    assert!(Genetic::is_permutation(&report.best.chromosome, 8));

    let statistics = algorithm.statistics(&report);
    assert_eq!(statistics.instance, "relief-camps");
    assert_eq!(statistics.generations, 40);
    assert_eq!(statistics.best_fitness, report.best.score.fitness);
}

#[test]
fn test_grid_variant_run() {
    let problem = GridProblem::tent_city().unwrap();
    let path_length = problem.path_length;
    let config = Config::new()
        .with_population_size(20)
        .with_num_generations(25)
        .with_seed(11);

    let mut algorithm = ReliefGa::new(problem, config).unwrap();
    let report = algorithm.run().unwrap();

    assert_eq!(algorithm.phase(), Phase::Terminated);
    assert_eq!(report.best.chromosome.len(), path_length);
    assert!(report
        .best
        .chromosome
        .iter()
        .all(|&cell| algorithm.variant.legality.is_set(cell)));
    assert!(report.best.score.tents_supplied <= 7);
    assert!(report.best.score.tents_supplied >= 1);
    assert_eq!(report.best.score.required_weight, 48);

    for window in report.fitness_history.windows(2) {
        assert!(window[1] >= window[0]);
    }
}

/// A square grid whose only legal cell, (0, 0), is also its only tent.
fn create_sparse_grid(size: usize, path_length: usize) -> GridProblem {
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
fn test_sparse_grid_run_recovers_from_stalls() {
    // One draw per cell finds the legal cell a quarter of the time
    let problem = create_sparse_grid(2, 2);
    let config = Config::new()
        .with_population_size(4)
        .with_num_generations(3)
        .with_mutation_rate(1.0)
        .with_seed(2);

    let mut algorithm = ReliefGa::new(problem, config).unwrap();
    let report = algorithm.run().unwrap();

    assert_eq!(algorithm.phase(), Phase::Terminated);
    assert_eq!(report.generations, 3);
    assert_eq!(report.best.score.tents_supplied, 1);
    for individual in &algorithm.population.as_ref().unwrap().individuals {
        assert_eq!(individual.chromosome, vec![Cell::new(0, 0); 2]);
    }
}

#[test]
fn test_hopeless_grid_fails_after_retries() {
    let problem = create_sparse_grid(10, 15);
    let config = Config::new()
        .with_population_size(4)
        .with_num_generations(3)
        .with_seed(2);

    let mut algorithm = ReliefGa::new(problem, config).unwrap();

    assert!(matches!(
        algorithm.run(),
        Err(Error::SamplingStall { attempts: 1 })
    ));
}
