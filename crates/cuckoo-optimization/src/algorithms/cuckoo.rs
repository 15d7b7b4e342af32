use crate::common::{Bounds, CuckooConfig, Direction, OptimizationResult, Problem};
use crate::error::{CuckooError, CuckooResult};
use crate::moves::MoveStrategy;
use crate::nest::Nest;
use crate::observer::{GenerationObserver, GenerationSnapshot};
use crate::population::{abandon_cutoff, lambda_schedule, Champion, Population, StepSchedule};
use ndarray::Array1;
use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, info_span, trace, warn};

pub type StopCriterion = dyn Fn() -> bool + Send + Sync;

/// Phase of a single run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SearchState {
    Uninitialized,
    Initializing,
    Generation(usize),
    Terminated,
}

/// Cuckoo search with per-rank adaptive Levy exponents, decaying step
/// scale, random-slot greedy replacement and randomized abandonment.
#[derive(Clone)]
pub struct CuckooSolver {
    pub config: CuckooConfig,
    stop_criterion: Option<Arc<StopCriterion>>,
    observer: Option<Arc<dyn GenerationObserver>>,
}

impl CuckooSolver {
    pub fn new(config: CuckooConfig) -> Self {
        Self {
            config,
            stop_criterion: None,
            observer: None,
        }
    }

    pub fn with_pa(config: CuckooConfig, pa: f64) -> Self {
        Self::new(config.with_pa(pa))
    }

    /// Predicate consulted before every generation; `false` stops the run.
    pub fn with_stop_criterion<F>(mut self, criterion: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.stop_criterion = Some(Arc::new(criterion));
        self
    }

    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: GenerationObserver + 'static,
    {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub fn use_lazy_moves(&mut self) {
        self.config.strategy = MoveStrategy::Lazy;
    }

    pub fn use_standard_moves(&mut self) {
        self.config.strategy = MoveStrategy::Standard;
    }

    pub fn is_lazy(&self) -> bool {
        self.config.strategy == MoveStrategy::Lazy
    }

    /// Runs in the configured direction.
    pub fn solve<P: Problem + ?Sized>(&self, problem: &P) -> CuckooResult<OptimizationResult> {
        self.run(problem, self.config.direction)
    }

    pub fn find_min<P: Problem + ?Sized>(&self, problem: &P) -> CuckooResult<OptimizationResult> {
        self.run(problem, Direction::Minimize)
    }

    pub fn find_max<P: Problem + ?Sized>(&self, problem: &P) -> CuckooResult<OptimizationResult> {
        self.run(problem, Direction::Maximize)
    }

    fn run<P: Problem + ?Sized>(&self, problem: &P, direction: Direction) -> CuckooResult<OptimizationResult> {
        let dim = problem.dim();
        self.config.validate(dim)?;
        validate_bounds(&problem.bounds(), dim)?;

        let seed = self.config.seed.unwrap_or_else(rand::random);
        let span = info_span!(
            "cuckoo_search",
            dim,
            nests = self.config.population_size,
            strategy = ?self.config.strategy,
            direction = ?direction,
            seed,
        );
        let _enter = span.enter();

        let counting = CountingProblem::new(problem);
        let mut search = Search::new(&counting, &self.config, direction, seed)?;
        search.initialize()?;

        while search.should_continue(self.stop_criterion.as_deref()) {
            search.generation(self.observer.as_deref())?;
        }

        let stopped_early = search.stopped_early();
        if stopped_early {
            warn!(generations = search.completed(), "Stop criterion ended the run early");
        }
        let result = search.terminate(counting.evaluations(), stopped_early);
        info!(
            generations = result.generations,
            evaluations = result.evaluations,
            best_fitness = result.best_fitness,
            "Cuckoo search finished"
        );
        Ok(result)
    }
}

impl fmt::Debug for CuckooSolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CuckooSolver")
            .field("config", &self.config)
            .field("stop_criterion", &self.stop_criterion.is_some())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

fn validate_bounds(bounds: &[Bounds], dim: usize) -> CuckooResult<()> {
    if bounds.len() != dim {
        return Err(CuckooError::Configuration(format!(
            "objective has {} dimensions but {} bounds",
            dim,
            bounds.len()
        )));
    }
    bounds.iter().try_for_each(Bounds::validate)
}

struct Search<'a, P: Problem + ?Sized> {
    problem: &'a P,
    config: &'a CuckooConfig,
    direction: Direction,
    seed: u64,
    rng: StdRng,
    state: SearchState,
    steps: StepSchedule,
    population: Option<Population>,
    champion: Option<Champion>,
    lambdas: Vec<f64>,
    history: Vec<f64>,
}

impl<'a, P: Problem + ?Sized> Search<'a, P> {
    fn new(problem: &'a P, config: &'a CuckooConfig, direction: Direction, seed: u64) -> CuckooResult<Self> {
        let (step_min, step_max) = config.step.resolve(problem.dim())?;
        Ok(Self {
            problem,
            config,
            direction,
            seed,
            rng: StdRng::seed_from_u64(seed),
            state: SearchState::Uninitialized,
            steps: StepSchedule::new(&step_min, &step_max, config.max_generations),
            population: None,
            champion: None,
            lambdas: Vec::new(),
            history: Vec::new(),
        })
    }

    fn transition(&mut self, next: SearchState) {
        trace!(from = ?self.state, to = ?next, "State transition");
        self.state = next;
    }

    fn initialize(&mut self) -> CuckooResult<()> {
        self.transition(SearchState::Initializing);
        let n = self.config.population_size;
        let seed = self.seed;

        let mut population = Population::random(self.problem, n, self.direction, |i| {
            stream_rng(seed, INIT_STREAM, 0, i)
        })?;
        population.rank();

        self.lambdas = lambda_schedule(n, &self.config.lambda);
        population.apply_schedule(&self.lambdas, &self.steps.alpha_at(0))?;

        let champion = Champion::new(population.first().clone(), self.direction);
        debug!(best_fitness = champion.fitness(), "Initial population ranked");

        self.population = Some(population);
        self.champion = Some(champion);
        self.transition(SearchState::Generation(1));
        Ok(())
    }

    fn should_continue(&self, stop: Option<&StopCriterion>) -> bool {
        match self.state {
            SearchState::Generation(k) if k <= self.config.max_generations => stop.map_or(true, |keep_going| keep_going()),
            _ => false,
        }
    }

    fn generation(&mut self, observer: Option<&dyn GenerationObserver>) -> CuckooResult<()> {
        let SearchState::Generation(k) = self.state else {
            return Ok(());
        };
        let (Some(population), Some(champion)) = (self.population.as_mut(), self.champion.as_mut()) else {
            return Ok(());
        };
        let n = population.len();
        let problem = self.problem;
        let seed = self.seed;
        let strategy = self.config.strategy;
        let direction = self.direction;

        // per-rank lambda and decayed step scale
        self.lambdas = lambda_schedule(n, &self.config.lambda);
        let alpha = self.steps.alpha_at(k);
        population.apply_schedule(&self.lambdas, &alpha)?;

        // flights run in parallel; replacements apply in index order
        let proposals = population
            .nests()
            .par_iter()
            .enumerate()
            .map(|(i, nest)| {
                let mut rng = stream_rng(seed, MOVE_STREAM, k, i);
                let proposal = strategy.propose(problem, nest, direction, &mut rng)?;
                let target = rng.gen_range(0..n);
                Ok::<_, CuckooError>((target, proposal))
            })
            .collect::<CuckooResult<Vec<_>>>()?;

        let mut replaced = 0;
        for (target, proposal) in proposals {
            let fitness = proposal.fitness();
            if population.offer(target, proposal, champion) {
                trace!(generation = k, target, fitness, "Nest replaced");
                replaced += 1;
            }
        }

        population.rank();
        champion.consider(population.first());

        // abandon a randomly sized worst fraction
        let u: f64 = self.rng.gen();
        let cutoff = abandon_cutoff(n, self.config.abandon_probability, u);
        let abandoned = population.abandon_from(cutoff, |i| {
            Nest::random(problem, &mut stream_rng(seed, ABANDON_STREAM, k, i))
        })?;
        for nest in &population.nests()[cutoff..] {
            champion.consider(nest);
        }

        self.history.push(champion.fitness());
        debug!(
            generation = k,
            replaced,
            abandoned,
            best_fitness = champion.fitness(),
            "Generation complete"
        );

        if let Some(observer) = observer {
            observer.on_generation(&GenerationSnapshot {
                generation: k,
                nests: population.nests(),
                champion: champion.nest(),
                lambdas: &self.lambdas,
                alpha: &alpha,
                replaced,
                abandon_cutoff: cutoff,
                abandoned,
            });
        }

        self.transition(SearchState::Generation(k + 1));
        Ok(())
    }

    fn completed(&self) -> usize {
        self.history.len()
    }

    fn stopped_early(&self) -> bool {
        matches!(self.state, SearchState::Generation(k) if k <= self.config.max_generations)
    }

    fn terminate(mut self, evaluations: u64, stopped_early: bool) -> OptimizationResult {
        self.transition(SearchState::Terminated);
        let generations = self.completed();
        let (best_variables, best_fitness) = match self.champion.take() {
            Some(champion) => {
                let nest = champion.into_nest();
                (nest.position().clone(), nest.fitness())
            }
            None => (Array1::zeros(0), f64::NAN),
        };
        OptimizationResult {
            best_variables,
            best_fitness,
            history: self.history,
            generations,
            evaluations,
            stopped_early,
        }
    }
}

const INIT_STREAM: u64 = 0x494E_4954_5F53_5452;
const MOVE_STREAM: u64 = 0x4D4F_5645_5F53_5452;
const ABANDON_STREAM: u64 = 0x4142_414E_5F53_5452;

/// Independent generator for one work item, so results do not depend on
/// which worker thread executes it.
fn stream_rng(seed: u64, stream: u64, generation: usize, index: usize) -> StdRng {
    let key = splitmix64(splitmix64(seed ^ stream) ^ generation as u64);
    StdRng::seed_from_u64(splitmix64(key ^ index as u64))
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Wraps a problem and counts objective evaluations across worker threads.
struct CountingProblem<'a, P: Problem + ?Sized> {
    inner: &'a P,
    evaluations: AtomicU64,
}

impl<'a, P: Problem + ?Sized> CountingProblem<'a, P> {
    fn new(inner: &'a P) -> Self {
        Self {
            inner,
            evaluations: AtomicU64::new(0),
        }
    }

    fn evaluations(&self) -> u64 {
        self.evaluations.load(Ordering::Relaxed)
    }
}

impl<P: Problem + ?Sized> Problem for CountingProblem<'_, P> {
    fn objective(&self, variables: &Array1<f64>) -> f64 {
        self.inner.objective(variables)
    }

    fn dim(&self) -> usize {
        self.inner.dim()
    }

    fn bounds(&self) -> Vec<Bounds> {
        self.inner.bounds()
    }

    fn evaluate(&self, variables: &Array1<f64>) -> CuckooResult<f64> {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        self.inner.evaluate(variables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::ObjectiveFunction;

    fn sphere(dim: usize) -> ObjectiveFunction {
        ObjectiveFunction::new("sphere", dim, Bounds::new(-10.0, 10.0).unwrap(), |x| {
            x.iter().map(|v| v * v).sum()
        })
    }

    #[test]
    fn test_splitmix64_is_deterministic() {
        assert_eq!(splitmix64(0), splitmix64(0));
        assert_ne!(splitmix64(0), splitmix64(1));
    }

    #[test]
    fn test_stream_rng_distinct_per_item() {
        let a: u64 = stream_rng(1, MOVE_STREAM, 3, 0).gen();
        let b: u64 = stream_rng(1, MOVE_STREAM, 3, 1).gen();
        let c: u64 = stream_rng(1, MOVE_STREAM, 4, 0).gen();
        let a2: u64 = stream_rng(1, MOVE_STREAM, 3, 0).gen();
        assert_eq!(a, a2);
        assert_ne!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_state_machine_runs_to_termination() {
        let problem = sphere(2);
        let config = CuckooConfig::default()
            .with_population_size(3)
            .with_max_generations(5)
            .with_seed(4);
        let counting = CountingProblem::new(&problem);
        let mut search = Search::new(&counting, &config, Direction::Minimize, 4).unwrap();
        assert_eq!(search.state, SearchState::Uninitialized);
        search.initialize().unwrap();
        assert_eq!(search.state, SearchState::Generation(1));

        while search.should_continue(None) {
            search.generation(None).unwrap();
        }
        assert_eq!(search.state, SearchState::Generation(6));
        assert!(!search.stopped_early());

        let result = search.terminate(counting.evaluations(), false);
        assert_eq!(result.generations, 5);
        assert_eq!(result.history.len(), 5);
    }

    #[test]
    fn test_evaluations_are_counted() {
        let problem = sphere(2);
        let config = CuckooConfig::default()
            .with_population_size(4)
            .with_max_generations(10)
            .with_pa(0.0)
            .with_seed(1);
        let result = CuckooSolver::new(config).solve(&problem).unwrap();
        // 4 initial nests plus one flight per nest and generation
        assert_eq!(result.evaluations, 4 + 4 * 10);
    }
}
