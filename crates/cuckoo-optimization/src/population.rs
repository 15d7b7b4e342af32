use crate::common::{Direction, LambdaRange, Problem};
use crate::error::{CuckooError, CuckooResult};
use crate::nest::Nest;
use ndarray::Array1;
use rand::Rng;
use rayon::prelude::*;

/// Fixed-size ordered set of nests.
#[derive(Clone, Debug)]
pub struct Population {
    nests: Vec<Nest>,
    direction: Direction,
}

impl Population {
    pub fn new(nests: Vec<Nest>, direction: Direction) -> CuckooResult<Self> {
        if nests.is_empty() {
            return Err(CuckooError::Validation("population must hold at least one nest".into()));
        }
        Ok(Self { nests, direction })
    }

    pub fn len(&self) -> usize {
        self.nests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nests.is_empty()
    }

    pub fn nests(&self) -> &[Nest] {
        &self.nests
    }

    /// Rank 0 (only meaningful right after [`Population::rank`]).
    pub fn first(&self) -> &Nest {
        &self.nests[0]
    }

    /// Stable sort, best first.
    pub fn rank(&mut self) {
        let direction = self.direction;
        self.nests
            .sort_by(|a, b| direction.compare(a.fitness(), b.fitness()));
    }

    pub fn is_ranked(&self) -> bool {
        self.nests
            .windows(2)
            .all(|w| !w[1].is_better_than(&w[0], self.direction))
    }

    /// Writes the per-rank lambdas and the shared alpha into every nest.
    pub fn apply_schedule(&mut self, lambdas: &[f64], alpha: &Array1<f64>) -> CuckooResult<()> {
        if lambdas.len() != self.nests.len() {
            return Err(CuckooError::Configuration(format!(
                "lambda schedule has {} entries for {} nests",
                lambdas.len(),
                self.nests.len()
            )));
        }
        self.nests
            .par_iter_mut()
            .zip(lambdas.par_iter())
            .try_for_each(|(nest, &lambda)| {
                nest.set_lambda(lambda)?;
                nest.set_alpha(alpha.clone())
            })
    }

    /// Greedy replacement of slot `target` by `candidate`.
    ///
    /// Reading the slot, comparing, writing it and refreshing the champion
    /// happen under one exclusive borrow, so no other update can interleave
    /// between the comparison and the write.
    pub fn offer(&mut self, target: usize, candidate: Nest, champion: &mut Champion) -> bool {
        if !candidate.is_better_than(&self.nests[target], self.direction) {
            return false;
        }
        self.nests[target] = candidate;
        if target == 0 {
            champion.consider(&self.nests[0]);
        }
        true
    }

    /// Replaces every nest from `cutoff` onwards with a fresh random one.
    /// `fresh` builds the replacement for a given slot.
    pub fn abandon_from<F>(&mut self, cutoff: usize, fresh: F) -> CuckooResult<usize>
    where
        F: Fn(usize) -> CuckooResult<Nest> + Sync,
    {
        let cutoff = cutoff.min(self.nests.len());
        self.nests[cutoff..]
            .par_iter_mut()
            .enumerate()
            .try_for_each(|(offset, nest)| {
                *nest = fresh(cutoff + offset)?;
                Ok::<(), CuckooError>(())
            })?;
        Ok(self.nests.len() - cutoff)
    }

    /// Builds `size` random nests; slot `i` draws from the generator `rng_for(i)` returns.
    pub fn random<P, F, R>(problem: &P, size: usize, direction: Direction, rng_for: F) -> CuckooResult<Self>
    where
        P: Problem + ?Sized,
        F: Fn(usize) -> R + Sync,
        R: Rng,
    {
        let nests = (0..size)
            .into_par_iter()
            .map(|i| Nest::random(problem, &mut rng_for(i)))
            .collect::<CuckooResult<Vec<_>>>()?;
        Self::new(nests, direction)
    }
}

/// Best nest seen over a whole run. Its fitness never worsens.
#[derive(Clone, Debug)]
pub struct Champion {
    nest: Nest,
    direction: Direction,
}

impl Champion {
    pub fn new(nest: Nest, direction: Direction) -> Self {
        Self { nest, direction }
    }

    /// Takes a snapshot of `candidate` if it strictly improves on the champion.
    pub fn consider(&mut self, candidate: &Nest) -> bool {
        if candidate.is_better_than(&self.nest, self.direction) {
            self.nest = candidate.clone();
            true
        } else {
            false
        }
    }

    pub fn nest(&self) -> &Nest {
        &self.nest
    }

    pub fn fitness(&self) -> f64 {
        self.nest.fitness()
    }

    pub fn into_nest(self) -> Nest {
        self.nest
    }
}

/// Lambda per rank: linear from `range.max` at rank 0 down to `range.min`
/// at the last rank. A single nest gets the midpoint.
pub fn lambda_schedule(size: usize, range: &LambdaRange) -> Vec<f64> {
    if size == 1 {
        return vec![range.midpoint()];
    }
    let spread = range.max - range.min;
    let last = (size - 1) as f64;
    (0..size)
        .map(|i| range.max - i as f64 * spread / last)
        .collect()
}

/// Geometric decay of the step scale from `max` (generation 0) to `min`
/// (generation `max_generations`).
#[derive(Clone, Debug, PartialEq)]
pub struct StepSchedule {
    max: Array1<f64>,
    delta: Array1<f64>,
}

impl StepSchedule {
    pub fn new(min: &Array1<f64>, max: &Array1<f64>, max_generations: usize) -> Self {
        let exponent = 1.0 / max_generations as f64;
        let delta = (min / max).mapv(|ratio| ratio.powf(exponent));
        Self {
            max: max.clone(),
            delta,
        }
    }

    pub fn alpha_at(&self, generation: usize) -> Array1<f64> {
        let k = generation as f64;
        &self.max * &self.delta.mapv(|d| d.powf(k))
    }
}

/// First abandoned index for a population of `size` given the abandon
/// probability and a uniform draw `u` in [0, 1).
pub fn abandon_cutoff(size: usize, probability: f64, u: f64) -> usize {
    let abandoned = (probability * u * size as f64).floor() as usize;
    size - abandoned.min(size)
}
