//! Cuckoo Search optimization engine.
//!
//! Searches a bounded continuous space for an extremum of a scalar objective
//! with a population of nests perturbed by Levy flights. Each generation
//! assigns per-rank Levy exponents and a decaying step scale, lets every nest
//! fly in parallel and compete against a random slot, ranks the population
//! and abandons a randomly sized worst fraction. The best nest ever seen is
//! tracked independently of the population and returned at the end.
//!
//! ```no_run
//! use cuckoo_optimization::algorithms::CuckooSolver;
//! use cuckoo_optimization::{Bounds, CuckooConfig, ObjectiveFunction};
//!
//! let sphere = ObjectiveFunction::new("sphere", 2, Bounds::new(-10.0, 10.0).unwrap(), |x| {
//!     x.iter().map(|v| v * v).sum()
//! });
//! let config = CuckooConfig::default().with_population_size(16).with_step(1e-3, 5.0);
//! let result = CuckooSolver::new(config).solve(&sphere).unwrap();
//! println!("best {} at {}", result.best_fitness, result.best_variables);
//! ```

pub mod algorithms;
pub mod common;
pub mod error;
pub mod levy;
pub mod moves;
pub mod nest;
pub mod observer;
pub mod population;

/// Re-export common types
pub use common::*;
pub use error::{CuckooError, CuckooResult};
pub use levy::LevyFlight;
pub use moves::MoveStrategy;
pub use nest::Nest;
pub use observer::{GenerationObserver, GenerationSnapshot};
pub use population::{Champion, Population};
