//! Command line front end: load or build an instance, run the search, report.

use clap::{Parser, Subcommand};
use log::info;
use relief_ga::config::{BestTracking, Config};
use relief_ga::grid::GridProblem;
use relief_ga::problem::Problem;
use relief_ga::utils::save_report;
use relief_ga::variant::Variant;
use relief_ga::ReliefGa;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "relief-ga",
    version,
    about = "Plan relief-supply delivery routes with a genetic algorithm"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Number of chromosomes per generation
    #[arg(long, global = true, default_value_t = 50)]
    population_size: usize,

    /// Number of generations to run
    #[arg(long, global = true, default_value_t = 100)]
    generations: usize,

    /// Probability of mutating each child
    #[arg(long, global = true, default_value_t = 0.2)]
    mutation_rate: f64,

    /// Seed for reproducible runs
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Report the best chromosome of all generations instead of the last one
    #[arg(long, global = true)]
    best_ever: bool,

    /// Write the report to this file
    #[arg(long, global = true)]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Optimise the order in which camps are visited
    Route {
        /// JSON instance; the built-in relief camps are used when omitted
        #[arg(long)]
        instance: Option<PathBuf>,
    },
    /// Optimise a free-form path over a tent grid
    Grid {
        /// JSON instance; the built-in tent city is used when omitted
        #[arg(long)]
        instance: Option<PathBuf>,
    },
}

impl Cli {
    fn config(&self) -> Config {
        let tracking = if self.best_ever {
            BestTracking::AllGenerations
        } else {
            BestTracking::LastGeneration
        };

        let config = Config::new()
            .with_population_size(self.population_size)
            .with_num_generations(self.generations)
            .with_mutation_rate(self.mutation_rate)
            .with_best_tracking(tracking);

        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}

fn solve<V: Variant>(
    variant: V,
    config: Config,
    output: Option<&PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut algorithm = ReliefGa::new(variant, config)?;
    let report = algorithm.run()?;
    let statistics = algorithm.statistics(&report);

    println!("{}", statistics.format());

    if let Some(path) = output {
        info!("saving report to {}", path.display());
        save_report(&statistics, path)?;
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let cli = Cli::parse();
    let config = cli.config();

    match &cli.command {
        Command::Route { instance } => {
            let problem = match instance {
                Some(path) => Problem::from_file(path)?,
                None => Problem::relief_camps()?,
            };
            solve(problem, config, cli.output.as_ref())
        }
        Command::Grid { instance } => {
            let problem = match instance {
                Some(path) => GridProblem::from_file(path)?,
                None => GridProblem::tent_city()?,
            };
            solve(problem, config, cli.output.as_ref())
        }
    }
}
