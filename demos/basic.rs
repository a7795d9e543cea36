//! Basic example of using the relief_ga library.

use relief_ga::config::Config;
use relief_ga::grid::GridProblem;
use relief_ga::problem::Problem;
use relief_ga::utils::{format_duration, save_report};
use relief_ga::ReliefGa;
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Get instance path from command line or use the built-in camps
    let args: Vec<String> = env::args().collect();
    let problem = if args.len() > 1 {
        println!("Loading problem from: {}", &args[1]);
        Problem::from_file(&args[1])?
    } else {
        Problem::relief_camps()?
    };
    println!(
        "Loaded problem: {} with {} camps",
        problem.name,
        problem.location_count()
    );

    // Configure algorithm
    let config = Config::new()
        .with_population_size(50)
        .with_num_generations(100)
        .with_mutation_rate(0.2)
        .with_seed(7);

    // Create and run algorithm
    let mut algorithm = ReliefGa::new(problem, config.clone())?;
    let report = algorithm.run()?;

    // Print results
    println!("Search completed in {}", format_duration(report.run_time));
    println!("Best visit order: {:?}", report.best.chromosome);
    println!("Best evaluation: {}", report.best.score);

    // Save report
    let statistics = algorithm.statistics(&report);
    let output_path = format!("{}.report", statistics.instance);
    println!("Saving report to: {}", output_path);
    save_report(&statistics, &output_path)?;

    // The grid variant runs through the same controller
    let mut grid = ReliefGa::new(GridProblem::tent_city()?, config)?;
    let grid_report = grid.run()?;
    println!("Best path: {:?}", grid_report.best.chromosome);
    println!("Coverage: {}", grid_report.best.score);

    Ok(())
}
