use super::{TrialReport, TrialRunner};
use crate::error::{SearchError, SearchResult};
use cuckoo_optimization::{CuckooConfig, MoveStrategy, ObjectiveFunction};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Standard and lazy flights run on the same objective.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Comparison {
    pub standard: TrialReport,
    pub lazy: TrialReport,
}

impl Comparison {
    /// Ratio of mean final fitness, lazy over standard.
    pub fn mean_ratio(&self) -> f64 {
        self.lazy.summary.mean / self.standard.summary.mean
    }
}

/// Runs `config` with both move strategies.
///
/// A lazy flight evaluates the objective twice, so the standard run
/// gets `iteration_multiplier` times as many generations to even out the
/// evaluation budget.
pub fn compare_strategies(
    config: &CuckooConfig,
    objective: &ObjectiveFunction,
    trials: usize,
    iteration_multiplier: f64,
) -> SearchResult<Comparison> {
    if !(iteration_multiplier.is_finite() && iteration_multiplier > 0.0) {
        return Err(SearchError::InvalidTrial(format!(
            "iteration multiplier must be positive, got {}",
            iteration_multiplier
        )));
    }
    let standard_generations = ((config.max_generations as f64) * iteration_multiplier).round().max(1.0) as usize;

    let standard = config
        .clone()
        .with_strategy(MoveStrategy::Standard)
        .with_max_generations(standard_generations);
    let lazy = config.clone().with_strategy(MoveStrategy::Lazy);

    let standard = TrialRunner::new(standard, trials).run(objective)?;
    let lazy = TrialRunner::new(lazy, trials).run(objective)?;
    info!(
        function = objective.name(),
        standard_mean = standard.summary.mean,
        lazy_mean = lazy.summary.mean,
        "Strategy comparison complete"
    );
    Ok(Comparison { standard, lazy })
}
