//! Repeated-trial statistics for the cuckoo search.
//!
//! A [`TrialRunner`] runs one solver configuration several times on the
//! same objective, in parallel, and condenses the outcome into a
//! serializable [`TrialReport`]: best, worst, mean and sample standard
//! deviation of the final fitness, plus optional per-generation dynamics.

pub mod compare;
pub mod dynamics;

pub use compare::{compare_strategies, Comparison};
pub use dynamics::{Dynamics, DynamicsRecorder};

use crate::error::{SearchError, SearchResult};
use cuckoo_optimization::algorithms::CuckooSolver;
use cuckoo_optimization::{
    CuckooConfig, Direction, GenerationObserver, GenerationSnapshot, LambdaRange, MoveStrategy, ObjectiveFunction,
    OptimizationResult, StepRange,
};
use ndarray::Array1;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Summary of a set of final fitness values.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub best: f64,
    pub worst: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl Summary {
    pub fn from_values(values: &[f64], direction: Direction) -> SearchResult<Self> {
        let first = *values
            .first()
            .ok_or_else(|| SearchError::InvalidTrial("no values to summarize".into()))?;
        let (best, worst) = values.iter().fold((first, first), |(best, worst), &v| {
            (
                if direction.is_better(v, best) { v } else { best },
                if direction.is_better(worst, v) { v } else { worst },
            )
        });
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std_dev = if values.len() == 1 {
            0.0
        } else {
            (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        };
        Ok(Self {
            best,
            worst,
            mean,
            std_dev,
        })
    }
}

/// Outcome of running one configuration `trials` times.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrialReport {
    pub function_name: String,
    pub strategy: MoveStrategy,
    pub direction: Direction,
    pub population_size: usize,
    pub max_generations: usize,
    pub lambda: LambdaRange,
    pub step: StepRange,
    pub abandon_probability: f64,
    pub results: Vec<f64>,
    pub summary: Summary,
    pub best_solution: Vec<f64>,
    /// Best position found by each trial, in trial order.
    pub solutions: Vec<Vec<f64>>,
    pub evaluations: u64,
    pub elapsed_secs: f64,
    pub dynamics: Option<Dynamics>,
}

impl TrialReport {
    pub fn write_json(&self, path: impl AsRef<Path>) -> SearchResult<()> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn read_json(path: impl AsRef<Path>) -> SearchResult<Self> {
        let file = File::open(path.as_ref())?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}

impl fmt::Display for TrialReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({:?}, {:?})", self.function_name, self.strategy, self.direction)?;
        writeln!(
            f,
            "Nests: {}  Generations: {}  Abandon probability: {}",
            self.population_size, self.max_generations, self.abandon_probability
        )?;
        writeln!(f, "Lambda: [{}, {}]", self.lambda.min, self.lambda.max)?;
        writeln!(f, "Trials: {}", self.results.len())?;
        writeln!(f, "Best result: {}", self.summary.best)?;
        writeln!(f, "Worst result: {}", self.summary.worst)?;
        writeln!(f, "Average result: {}", self.summary.mean)?;
        writeln!(f, "Standard deviation: {}", self.summary.std_dev)?;
        write!(f, "Time: {:.3}s", self.elapsed_secs)?;
        if !self.solutions.is_empty() {
            write!(f, "\nSolutions:")?;
            for (i, solution) in self.solutions.iter().enumerate() {
                write!(f, "\n  Trial #{}: {:?}", i + 1, solution)?;
            }
        }
        Ok(())
    }
}

/// Runs one solver configuration repeatedly on one objective.
#[derive(Clone, Debug)]
pub struct TrialRunner {
    config: CuckooConfig,
    trials: usize,
    record_dynamics: bool,
}

impl TrialRunner {
    pub fn new(config: CuckooConfig, trials: usize) -> Self {
        Self {
            config,
            trials,
            record_dynamics: false,
        }
    }

    /// Also record the champion of every generation of every trial.
    pub fn with_dynamics(mut self, record: bool) -> Self {
        self.record_dynamics = record;
        self
    }

    pub fn run(&self, objective: &ObjectiveFunction) -> SearchResult<TrialReport> {
        if self.trials == 0 {
            return Err(SearchError::InvalidTrial("at least one trial is required".into()));
        }
        let start = Instant::now();

        let outcomes = (0..self.trials)
            .into_par_iter()
            .map(|trial| self.run_trial(objective, trial))
            .collect::<SearchResult<Vec<_>>>()?;

        let direction = self.config.direction;
        let results: Vec<f64> = outcomes.iter().map(|(result, _)| result.best_fitness).collect();
        let summary = Summary::from_values(&results, direction)?;
        let best = outcomes
            .iter()
            .map(|(result, _)| result)
            .reduce(|best, r| if direction.is_better(r.best_fitness, best.best_fitness) { r } else { best })
            .ok_or_else(|| SearchError::InvalidTrial("no trial produced a result".into()))?;
        let solutions = outcomes
            .iter()
            .map(|(result, _)| result.best_variables.to_vec())
            .collect();
        let evaluations = outcomes.iter().map(|(result, _)| result.evaluations).sum();
        let dynamics = if self.record_dynamics {
            let runs: Vec<_> = outcomes.iter().map(|(_, champions)| champions.clone()).collect();
            Some(Dynamics::average(&runs))
        } else {
            None
        };

        let report = TrialReport {
            function_name: objective.name().to_string(),
            strategy: self.config.strategy,
            direction,
            population_size: self.config.population_size,
            max_generations: self.config.max_generations,
            lambda: self.config.lambda,
            step: self.config.step.clone(),
            abandon_probability: self.config.abandon_probability,
            results,
            summary,
            best_solution: best.best_variables.to_vec(),
            solutions,
            evaluations,
            elapsed_secs: start.elapsed().as_secs_f64(),
            dynamics,
        };
        info!(
            function = %report.function_name,
            trials = self.trials,
            best = report.summary.best,
            mean = report.summary.mean,
            "Trials complete"
        );
        Ok(report)
    }

    fn run_trial(
        &self,
        objective: &ObjectiveFunction,
        trial: usize,
    ) -> SearchResult<(OptimizationResult, Vec<(f64, Array1<f64>)>)> {
        let mut config = self.config.clone();
        config.seed = self.config.seed.map(|seed| trial_seed(seed, trial));

        let recorder = Arc::new(DynamicsRecorder::new());
        let mut solver = CuckooSolver::new(config);
        if self.record_dynamics {
            solver = solver.with_observer(ForwardTo(recorder.clone()));
        }

        let result = solver.solve(objective)?;
        info!(trial = trial + 1, result = result.best_fitness, "Trial result");
        Ok((result, recorder.take()))
    }
}

struct ForwardTo(Arc<DynamicsRecorder>);

impl GenerationObserver for ForwardTo {
    fn on_generation(&self, snapshot: &GenerationSnapshot<'_>) {
        self.0.on_generation(snapshot)
    }
}

fn trial_seed(seed: u64, trial: usize) -> u64 {
    seed.wrapping_add((trial as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_minimize() {
        let summary = Summary::from_values(&[3.0, 1.0, 2.0], Direction::Minimize).unwrap();
        assert_eq!(summary.best, 1.0);
        assert_eq!(summary.worst, 3.0);
        assert_eq!(summary.mean, 2.0);
        assert!((summary.std_dev - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_summary_maximize_and_single_value() {
        let summary = Summary::from_values(&[3.0, 1.0, 2.0], Direction::Maximize).unwrap();
        assert_eq!(summary.best, 3.0);
        assert_eq!(summary.worst, 1.0);

        let single = Summary::from_values(&[5.0], Direction::Minimize).unwrap();
        assert_eq!(single.std_dev, 0.0);
        assert!(Summary::from_values(&[], Direction::Minimize).is_err());
    }

    #[test]
    fn test_trial_seeds_differ() {
        assert_ne!(trial_seed(1, 0), trial_seed(1, 1));
        assert_eq!(trial_seed(1, 0), 1);
    }
}
