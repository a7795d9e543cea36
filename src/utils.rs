//! Geometry and reporting helpers.

use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use crate::problem::Point;

/// Euclidean distance between two points.
pub fn distance(p1: Point, p2: Point) -> f64 {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    (dx * dx + dy * dy).sqrt()
}

/// Format a duration as hours, minutes, and seconds.
pub fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}h {:02}m {:02}s", hours, minutes, seconds)
}

/// Summary of a finished run, ready to be printed or saved.
#[derive(Debug, Clone)]
pub struct RunStatistics {
    pub instance: String,
    pub generations: usize,
    pub population_size: usize,
    pub runtime: Duration,
    pub best_fitness: f64,
    pub best_score: String,
    pub best_chromosome: String,
}

impl RunStatistics {
    /// Format the statistics as a string.
    pub fn format(&self) -> String {
        format!(
            "Search Statistics:
- Instance: {}
- Generations: {}
- Population Size: {}
- Runtime: {}
- Best Fitness: {:.6}
- Best Score: {}
- Best Chromosome: {}",
            self.instance,
            self.generations,
            self.population_size,
            format_duration(self.runtime),
            self.best_fitness,
            self.best_score,
            self.best_chromosome
        )
    }
}

/// Save run statistics to a file.
pub fn save_report<P: AsRef<Path>>(statistics: &RunStatistics, path: P) -> std::io::Result<()> {
    let mut file = File::create(path)?;

    writeln!(file, "Relief distribution plan for instance: {}", statistics.instance)?;
    writeln!(file, "Best Fitness: {:.6}", statistics.best_fitness)?;
    writeln!(file, "Best Score: {}", statistics.best_score)?;
    writeln!(file, "Visit Order: {}", statistics.best_chromosome)?;
    writeln!(file)?;
    writeln!(file, "{}", statistics.format())?;

    Ok(())
}
