//! # ssa-forecast
//!
//! Univariate time series forecasting with Singular Spectrum Analysis.
//!
//! The [`ForecastEngine`](models::ssa::ForecastEngine) learns a low-rank
//! linear recurrence from a history, projects future values with symmetric
//! confidence bounds, slides new observations into its window without
//! relearning, and checkpoints its learned state to a versioned binary blob.

#![allow(clippy::needless_range_loop)]

pub mod checkpoint;
pub mod core;
pub mod error;
pub mod models;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::core::{DataSource, Forecast, ForecastStep, Observation, TimeSeries};
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::ssa::{ForecastEngine, RankSelection, SsaConfig};
    pub use crate::models::Forecaster;
    pub use crate::utils::{calculate_metrics, AccuracyMetrics};
}
