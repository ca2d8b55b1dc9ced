//! Forecaster trait defining the common interface for forecasting models.

use crate::core::{Forecast, TimeSeries};
use crate::error::Result;

/// Common interface for forecasting models.
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Fit the model to the time series data.
    fn fit(&mut self, series: &TimeSeries) -> Result<()>;

    /// Generate point predictions for the specified horizon.
    fn predict(&self, horizon: usize) -> Result<Forecast>;

    /// Generate predictions with confidence intervals.
    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        // Models without an interval model return point predictions
        let _ = level;
        self.predict(horizon)
    }

    /// Get the fitted values (in-sample reconstruction).
    fn fitted_values(&self) -> Option<&[f64]>;

    /// Get the residuals (actual - fitted).
    fn residuals(&self) -> Option<&[f64]>;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

/// Type alias for boxed forecaster trait objects.
///
/// # Example
///
/// ```
/// use ssa_forecast::models::{BoxedForecaster, Forecaster};
/// use ssa_forecast::models::ssa::ForecastEngine;
///
/// let model: BoxedForecaster = Box::new(ForecastEngine::default());
/// assert_eq!(model.name(), "SSA");
/// ```
pub type BoxedForecaster = Box<dyn Forecaster>;
