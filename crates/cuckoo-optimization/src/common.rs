use crate::error::{CuckooError, CuckooResult};
use crate::moves::MoveStrategy;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Closed interval a single decision variable may take.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    pub fn new(lower: f64, upper: f64) -> CuckooResult<Self> {
        let bounds = Self { lower, upper };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> CuckooResult<()> {
        if !self.lower.is_finite() || !self.upper.is_finite() || self.lower > self.upper {
            return Err(CuckooError::Validation(format!(
                "bounds must be finite with lower <= upper, got [{}, {}]",
                self.lower, self.upper
            )));
        }
        Ok(())
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.lower, self.upper)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }
}

/// Which way fitness is optimized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Minimize,
    Maximize,
}

impl Direction {
    /// Strict improvement of `candidate` over `incumbent`.
    pub fn is_better(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Direction::Minimize => candidate < incumbent,
            Direction::Maximize => candidate > incumbent,
        }
    }

    /// Ordering in which `Less` means `a` ranks ahead of `b`.
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        let ord = match self {
            Direction::Minimize => a.partial_cmp(&b),
            Direction::Maximize => b.partial_cmp(&a),
        };
        ord.unwrap_or(Ordering::Equal)
    }
}

/// Defines the optimization problem.
pub trait Problem: Send + Sync {
    /// The raw objective value at `variables`.
    fn objective(&self, variables: &Array1<f64>) -> f64;

    /// Number of variables.
    fn dim(&self) -> usize;

    /// Lower and upper bound of each variable.
    fn bounds(&self) -> Vec<Bounds>;

    /// Checked evaluation: the input length must agree with both the
    /// configured dimension and the number of bounds on every call.
    fn evaluate(&self, variables: &Array1<f64>) -> CuckooResult<f64> {
        check_shape(variables.len(), self.dim(), self.bounds().len())?;
        finite_or_inf(self.objective(variables), variables)
    }
}

fn check_shape(len: usize, dim: usize, bounds: usize) -> CuckooResult<()> {
    if len != dim {
        return Err(CuckooError::Configuration(format!(
            "objective expects {} dimensions but received {} arguments",
            dim, len
        )));
    }
    if bounds != len {
        return Err(CuckooError::Configuration(format!(
            "objective has {} bounds but received {} arguments",
            bounds, len
        )));
    }
    Ok(())
}

fn finite_or_inf(value: f64, variables: &Array1<f64>) -> CuckooResult<f64> {
    if value.is_nan() {
        return Err(CuckooError::Problem(format!(
            "objective returned NaN at {}",
            variables
        )));
    }
    Ok(value)
}

type ObjectiveFn = dyn Fn(&Array1<f64>) -> f64 + Send + Sync;

struct Shape {
    dim: usize,
    bounds: Vec<Bounds>,
}

/// A named objective defined by a closure.
///
/// Dimension and bounds live behind a lock so a collaborator may reconfigure
/// the function while a run holds a shared reference to it; any mismatch is
/// reported by the next evaluation.
pub struct ObjectiveFunction {
    name: String,
    function: Box<ObjectiveFn>,
    shape: RwLock<Shape>,
}

impl ObjectiveFunction {
    /// Same `bounds` broadcast over `dim` variables.
    pub fn new<F>(name: impl Into<String>, dim: usize, bounds: Bounds, function: F) -> Self
    where
        F: Fn(&Array1<f64>) -> f64 + Send + Sync + 'static,
    {
        Self::with_bounds(name, vec![bounds; dim], function)
    }

    pub fn with_bounds<F>(name: impl Into<String>, bounds: Vec<Bounds>, function: F) -> Self
    where
        F: Fn(&Array1<f64>) -> f64 + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            function: Box::new(function),
            shape: RwLock::new(Shape {
                dim: bounds.len(),
                bounds,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Changes the dimension, re-broadcasting the first bound.
    pub fn set_dimensions(&self, dim: usize) -> CuckooResult<()> {
        let mut shape = self.shape_mut();
        let first = shape.bounds.first().copied().ok_or_else(|| {
            CuckooError::Configuration(format!("{} has no bounds to broadcast", self.name))
        })?;
        shape.dim = dim;
        shape.bounds = vec![first; dim];
        Ok(())
    }

    /// Replaces the bounds without touching the dimension.
    pub fn set_bounds(&self, bounds: Vec<Bounds>) -> CuckooResult<()> {
        for b in &bounds {
            b.validate()?;
        }
        self.shape_mut().bounds = bounds;
        Ok(())
    }

    fn shape(&self) -> RwLockReadGuard<'_, Shape> {
        self.shape.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn shape_mut(&self) -> RwLockWriteGuard<'_, Shape> {
        self.shape.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Problem for ObjectiveFunction {
    fn objective(&self, variables: &Array1<f64>) -> f64 {
        (self.function)(variables)
    }

    fn dim(&self) -> usize {
        self.shape().dim
    }

    fn bounds(&self) -> Vec<Bounds> {
        self.shape().bounds.clone()
    }

    fn evaluate(&self, variables: &Array1<f64>) -> CuckooResult<f64> {
        {
            let shape = self.shape();
            check_shape(variables.len(), shape.dim, shape.bounds.len())?;
        }
        finite_or_inf(self.objective(variables), variables)
    }
}

impl fmt::Debug for ObjectiveFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = self.shape();
        f.debug_struct("ObjectiveFunction")
            .field("name", &self.name)
            .field("dim", &shape.dim)
            .field("bounds", &shape.bounds)
            .finish()
    }
}

/// Open interval every lambda must lie in.
pub const LAMBDA_LIMITS: (f64, f64) = (0.0, 2.0);

pub(crate) fn check_lambda(lambda: f64) -> bool {
    lambda > LAMBDA_LIMITS.0 && lambda < LAMBDA_LIMITS.1
}

/// Range the per-rank lambda schedule interpolates over.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LambdaRange {
    pub min: f64,
    pub max: f64,
}

impl LambdaRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn midpoint(&self) -> f64 {
        self.min + (self.max - self.min) / 2.0
    }

    pub fn validate(&self) -> CuckooResult<()> {
        if !check_lambda(self.min) || !check_lambda(self.max) || self.min > self.max {
            return Err(CuckooError::Validation(format!(
                "lambda range must satisfy {} < min <= max < {}, got ({}, {})",
                LAMBDA_LIMITS.0, LAMBDA_LIMITS.1, self.min, self.max
            )));
        }
        Ok(())
    }
}

impl Default for LambdaRange {
    fn default() -> Self {
        Self::new(0.1, 1.99)
    }
}

/// Range the step scale decays over, either one value broadcast to every
/// dimension or explicit per-dimension vectors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum StepRange {
    Scalar { min: f64, max: f64 },
    PerDimension { min: Vec<f64>, max: Vec<f64> },
}

impl StepRange {
    /// Expands the range to `dim` components and validates it.
    pub fn resolve(&self, dim: usize) -> CuckooResult<(Array1<f64>, Array1<f64>)> {
        let (min, max) = match self {
            StepRange::Scalar { min, max } => (Array1::from_elem(dim, *min), Array1::from_elem(dim, *max)),
            StepRange::PerDimension { min, max } => {
                if min.len() != dim || max.len() != dim {
                    return Err(CuckooError::Configuration(format!(
                        "step range has {}/{} components but the objective has {} dimensions",
                        min.len(),
                        max.len(),
                        dim
                    )));
                }
                (Array1::from_vec(min.clone()), Array1::from_vec(max.clone()))
            }
        };
        for (lo, hi) in min.iter().zip(max.iter()) {
            if !(*lo > 0.0 && lo <= hi && hi.is_finite()) {
                return Err(CuckooError::Validation(format!(
                    "step range must satisfy 0 < min <= max, got ({}, {})",
                    lo, hi
                )));
            }
        }
        Ok((min, max))
    }
}

impl Default for StepRange {
    fn default() -> Self {
        StepRange::Scalar { min: 1e-6, max: 1e-2 }
    }
}

/// Configuration for the solver.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CuckooConfig {
    pub population_size: usize,
    pub max_generations: usize,
    pub lambda: LambdaRange,
    pub step: StepRange,
    /// Upper fraction of the population abandoned each generation.
    pub abandon_probability: f64,
    pub strategy: MoveStrategy,
    pub direction: Direction,
    /// Seed for every random source of a run; `None` draws one from entropy.
    pub seed: Option<u64>,
}

impl Default for CuckooConfig {
    fn default() -> Self {
        Self {
            population_size: 32,
            max_generations: 1000,
            lambda: LambdaRange::default(),
            step: StepRange::default(),
            abandon_probability: 0.25,
            strategy: MoveStrategy::Standard,
            direction: Direction::Minimize,
            seed: None,
        }
    }
}

impl CuckooConfig {
    pub fn with_population_size(mut self, population_size: usize) -> Self {
        self.population_size = population_size;
        self
    }

    pub fn with_max_generations(mut self, max_generations: usize) -> Self {
        self.max_generations = max_generations;
        self
    }

    pub fn with_lambda(mut self, min: f64, max: f64) -> Self {
        self.lambda = LambdaRange::new(min, max);
        self
    }

    pub fn with_step(mut self, min: f64, max: f64) -> Self {
        self.step = StepRange::Scalar { min, max };
        self
    }

    pub fn with_step_per_dimension(mut self, min: Vec<f64>, max: Vec<f64>) -> Self {
        self.step = StepRange::PerDimension { min, max };
        self
    }

    pub fn with_pa(mut self, abandon_probability: f64) -> Self {
        self.abandon_probability = abandon_probability;
        self
    }

    pub fn with_strategy(mut self, strategy: MoveStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks every parameter against a problem of `dim` variables.
    pub fn validate(&self, dim: usize) -> CuckooResult<()> {
        if self.population_size == 0 {
            return Err(CuckooError::Validation("population size must be at least 1".into()));
        }
        if self.max_generations == 0 {
            return Err(CuckooError::Validation("max generations must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.abandon_probability) {
            return Err(CuckooError::Validation(format!(
                "abandon probability must be in range [0, 1], got {}",
                self.abandon_probability
            )));
        }
        self.lambda.validate()?;
        self.step.resolve(dim)?;
        Ok(())
    }
}

/// The result of an optimization run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub best_variables: Array1<f64>,
    pub best_fitness: f64,
    /// Champion fitness at the end of every completed generation.
    pub history: Vec<f64>,
    pub generations: usize,
    pub evaluations: u64,
    /// True when the stop criterion ended the run before `max_generations`.
    pub stopped_early: bool,
}
