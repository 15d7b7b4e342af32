//! Cuckoo Search
//!
//! Stochastic, derivative-free global optimization over bounded continuous
//! spaces, built on the `cuckoo-optimization` engine.
//!
//! # Layout
//!
//! - [`optimization`]: the engine itself (nests, Levy flights, move
//!   strategies, the generational solver).
//! - [`benchmarks`]: standard test objectives (Sphere, Ackley, Griewank,
//!   Rastrigin, Rosenbrock, Michalewicz).
//! - [`stats`]: repeated trials, summaries, per-generation dynamics and
//!   standard-vs-lazy comparisons.
//!
//! ## Example Usage
//!
//! ```rust
//! use cuckoo_search::benchmarks::Benchmark;
//! use cuckoo_search::{CuckooConfig, CuckooSolver};
//!
//! let sphere = Benchmark::Sphere.objective(2);
//! let config = CuckooConfig::default()
//!     .with_population_size(8)
//!     .with_max_generations(50)
//!     .with_step(1e-3, 50.0)
//!     .with_seed(1);
//!
//! let result = CuckooSolver::new(config).solve(&sphere).unwrap();
//! assert_eq!(result.generations, 50);
//! assert!(result.best_variables.iter().all(|x| (-100.0..=100.0).contains(x)));
//! ```

pub mod benchmarks;
pub mod error;
pub mod stats;

pub use cuckoo_optimization as optimization;
pub use cuckoo_optimization::algorithms::CuckooSolver;
pub use cuckoo_optimization::{
    Bounds, CuckooConfig, CuckooError, Direction, GenerationObserver, GenerationSnapshot, MoveStrategy,
    ObjectiveFunction, OptimizationResult, Problem,
};
pub use error::{SearchError, SearchResult};
