//! Error types for engine construction.

use thiserror::Error;

/// Errors raised when a [`DifferentialEvolver`](super::DifferentialEvolver)
/// cannot be built.
///
/// These are configuration mistakes, not runtime conditions: once an engine
/// exists, `step` and `insert` have no error paths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeError {
    /// Fewer than four individuals: three distinct donors plus the target
    /// cannot be drawn.
    #[error("population size ({size}) must be >= 4")]
    PopulationTooSmall {
        /// The rejected population size.
        size: usize,
    },

    /// The frozen tail would cover the whole population.
    #[error("untouchable count ({untouchable}) must be < population size ({size})")]
    TooManyUntouchable {
        /// Requested number of untouchable individuals.
        untouchable: usize,
        /// Population size.
        size: usize,
    },

    /// Candidates have no coordinates, so no forced coordinate exists.
    #[error("candidates must have at least one coordinate")]
    EmptyCandidate,
}

/// A specialized `Result` type for engine construction.
pub type Result<T> = std::result::Result<T, DeError>;
