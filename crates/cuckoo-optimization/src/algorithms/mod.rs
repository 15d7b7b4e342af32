pub mod cuckoo;

pub use cuckoo::{CuckooSolver, StopCriterion};
