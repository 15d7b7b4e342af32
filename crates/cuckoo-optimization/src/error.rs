use thiserror::Error;

/// Errors that abort a cuckoo search run.
///
/// Every variant is raised synchronously at the point of violation and
/// propagated out of the current generation; no partial result is produced.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CuckooError {
    /// A parameter (lambda, alpha, probability, sizes) is outside its contractual domain.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The objective, its bounds and an input vector disagree on dimensionality.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The Levy sampler was asked for an exponent outside (0, 2).
    #[error("Domain error: {0}")]
    Domain(String),

    /// The objective itself failed (e.g. produced NaN).
    #[error("Problem error: {0}")]
    Problem(String),
}

pub type CuckooResult<T> = Result<T, CuckooError>;
