//! Error types for the evolutionary core

/// Errors raised by the ledger and the evolution engine
///
/// Every failure is reported immediately; a rejected call leaves the ledger
/// exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GaError {
    #[error("population must contain at least one individual")]
    EmptyPopulation,

    #[error("dimension mismatch: expected {expected} fitness values, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("individuals must carry at least one gene")]
    EmptyGenome,

    #[error("individual {index} has {actual} genes, expected {expected}")]
    GeneCountMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    #[error("fitness at index {index} is NaN")]
    NanFitness { index: usize },

    #[error("binary encoding needs genes of 0 or 1, individual {index} has {value} at gene {gene}")]
    NonBinaryGene {
        index: usize,
        gene: usize,
        value: f64,
    },

    #[error("index {index} out of bounds for population of {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("microbial selection needs at least 2 individuals, got {size}")]
    PopulationTooSmall { size: usize },

    #[error("{name} must lie in [0, 1], got {value}")]
    InvalidProbability { name: &'static str, value: f64 },

    #[error("mutation deviation must be finite, got {value}")]
    InvalidDeviation { value: f64 },
}

pub type Result<T> = std::result::Result<T, GaError>;
