use cuckoo_optimization::CuckooError;
use thiserror::Error;

/// Errors raised by the benchmark catalogue and trial statistics.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Optimization error: {0}")]
    Optimization(#[from] CuckooError),

    #[error("Unknown benchmark function: {0}")]
    UnknownBenchmark(String),

    #[error("Invalid trial setup: {0}")]
    InvalidTrial(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type SearchResult<T> = Result<T, SearchError>;
