//! Confidence bounds for multi-step forecasts.
//!
//! The forecast error at step `k` is modelled as the sum of `k` independent
//! one-step errors, so its variance is `σ²_res · k`. This accumulated-variance
//! rule is an approximation: it ignores how the recurrence itself propagates
//! earlier errors. The half-width at step `k` is `z(c) · sqrt(σ²_res · k)`,
//! with `z(c)` the standard-normal quantile at `(1 + c) / 2`.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::error::{ForecastError, Result};

/// Two-sided standard-normal critical value for confidence level `level`.
///
/// # Example
/// ```
/// use ssa_forecast::models::ssa::z_score;
///
/// let z = z_score(0.95).unwrap();
/// assert!((z - 1.959964).abs() < 1e-5);
/// ```
pub fn z_score(level: f64) -> Result<f64> {
    if !(level > 0.0 && level < 1.0) {
        return Err(ForecastError::InvalidConfiguration(format!(
            "confidence level must be in (0, 1), got {}",
            level
        )));
    }
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::InvalidConfiguration(e.to_string()))?;
    Ok(normal.inverse_cdf((1.0 + level) / 2.0))
}

/// Turns a residual variance and a confidence level into per-step bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceEstimator {
    residual_variance: f64,
    z: f64,
}

impl ConfidenceEstimator {
    pub fn new(residual_variance: f64, level: f64) -> Result<Self> {
        if !(residual_variance.is_finite() && residual_variance >= 0.0) {
            return Err(ForecastError::InvalidConfiguration(format!(
                "residual variance must be finite and non-negative, got {}",
                residual_variance
            )));
        }
        Ok(Self {
            residual_variance,
            z: z_score(level)?,
        })
    }

    /// Critical value in use.
    pub fn z(&self) -> f64 {
        self.z
    }

    /// Half-width of the interval at 1-based step `k`.
    pub fn half_width(&self, step: usize) -> f64 {
        let k = step.max(1) as f64;
        self.z * (self.residual_variance * k).sqrt()
    }

    /// Raw symmetric `(lower, upper)` bounds around `point` at step `k`.
    ///
    /// No clamping is applied; callers with a restricted domain (for example
    /// non-negative counts) clamp the lower bound themselves.
    pub fn bounds(&self, point: f64, step: usize) -> (f64, f64) {
        let hw = self.half_width(step);
        (point - hw, point + hw)
    }
}
