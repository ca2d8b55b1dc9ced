//! Error types for the ssa-forecast library.

use thiserror::Error;

/// Result type alias for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur during forecasting operations.
///
/// Every fallible operation reports its error before touching engine state,
/// so a failed call leaves the engine exactly as it was.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Window, series, horizon, rank or confidence settings are unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// The eigen-solve did not converge or saw non-finite values.
    #[error("numerical instability: {0}")]
    NumericalInstability(String),

    /// The selected subspace is nearly vertical and admits no recurrence.
    #[error("degenerate subspace: verticality coefficient {nu_squared:.6} is too close to 1")]
    DegenerateSubspace { nu_squared: f64 },

    /// Operation requires a trained engine.
    #[error("engine must be trained before this operation")]
    NotTrained,

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),

    /// Index out of bounds.
    #[error("index out of bounds: {index} (size: {size})")]
    IndexOutOfBounds { index: usize, size: usize },

    /// Reading or writing a checkpoint failed.
    #[error("checkpoint error: {0}")]
    Checkpoint(String),
}

impl From<crate::checkpoint::CheckpointError> for ForecastError {
    fn from(err: crate::checkpoint::CheckpointError) -> Self {
        ForecastError::Checkpoint(err.to_string())
    }
}
