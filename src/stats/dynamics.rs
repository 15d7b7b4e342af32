use cuckoo_optimization::{GenerationObserver, GenerationSnapshot};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, PoisonError};

/// Records the champion of every generation of one run.
#[derive(Debug, Default)]
pub struct DynamicsRecorder {
    champions: Mutex<Vec<(f64, Array1<f64>)>>,
}

impl DynamicsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<(f64, Array1<f64>)> {
        std::mem::take(&mut *self.champions.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl GenerationObserver for DynamicsRecorder {
    fn on_generation(&self, snapshot: &GenerationSnapshot<'_>) {
        let champion = snapshot.champion;
        self.champions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((champion.fitness(), champion.position().clone()));
    }
}

/// Champion fitness and position per generation, averaged over trials.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Dynamics {
    pub mean_fitness: Vec<f64>,
    pub mean_solution: Vec<Vec<f64>>,
}

impl Dynamics {
    /// Averages per generation over the runs that reached it.
    pub fn average(runs: &[Vec<(f64, Array1<f64>)>]) -> Self {
        let generations = runs.iter().map(Vec::len).max().unwrap_or(0);
        let mut dynamics = Dynamics::default();

        for g in 0..generations {
            let reached: Vec<&(f64, Array1<f64>)> = runs.iter().filter_map(|run| run.get(g)).collect();
            let count = reached.len() as f64;
            let fitness = reached.iter().map(|(f, _)| f).sum::<f64>() / count;

            let mut solution = Array1::<f64>::zeros(reached[0].1.len());
            for (_, position) in &reached {
                solution += position;
            }
            solution /= count;

            dynamics.mean_fitness.push(fitness);
            dynamics.mean_solution.push(solution.to_vec());
        }
        dynamics
    }
}
