//! Forecasting models.

mod traits;

pub mod ssa;

pub use ssa::ForecastEngine;
pub use traits::{BoxedForecaster, Forecaster};
