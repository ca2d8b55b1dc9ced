//! Singular Spectrum Analysis forecasting.
//!
//! Training embeds the trailing window of a series into an `L × K` Hankel
//! matrix, decomposes it with a cyclic Jacobi eigen-solve of the lag
//! covariance, keeps the leading components, and derives a linear recurrence
//! of order `L - 1` from their left singular vectors. Forecasts iterate that
//! recurrence from the most recent observations:
//! - [`SequenceBuffer`]: FIFO window of recent observations
//! - [`TrajectoryMatrix`]: lag embedding and diagonal averaging
//! - [`decompose`]: spectral basis with rank selection
//! - [`build_recurrence`]: recurrence coefficients and residual variance
//! - [`ConfidenceEstimator`]: per-step symmetric bounds
//! - [`ForecastEngine`]: train / observe / forecast / checkpoint

mod buffer;
mod confidence;
mod config;
mod decomposition;
mod embedding;
mod engine;
mod recurrence;

pub use buffer::SequenceBuffer;
pub use confidence::{z_score, ConfidenceEstimator};
pub use config::{RankSelection, SsaConfig};
pub use decomposition::{
    decompose, select_rank, symmetric_eigen, SingularTriple, SpectralBasis, SymmetricEigen,
    NUMERICAL_RANK_TOLERANCE,
};
pub use embedding::{hankelize, TrajectoryMatrix};
pub use engine::ForecastEngine;
pub use recurrence::{build_recurrence, recurrence_coefficients, Recurrence, VERTICALITY_EPSILON};
