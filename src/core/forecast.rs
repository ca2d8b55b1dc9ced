//! Forecast result structure for holding predictions.

use crate::error::{ForecastError, Result};

/// One forecast step: point estimate with its interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastStep {
    pub point: f64,
    pub lower: f64,
    pub upper: f64,
}

/// A forecast result containing point predictions and optional intervals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    point: Vec<f64>,
    lower: Option<Vec<f64>>,
    upper: Option<Vec<f64>>,
}

impl Forecast {
    /// Create an empty forecast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forecast from point predictions.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            point: values,
            lower: None,
            upper: None,
        }
    }

    /// Create a forecast with prediction intervals.
    pub fn from_values_with_intervals(
        values: Vec<f64>,
        lower: Vec<f64>,
        upper: Vec<f64>,
    ) -> Result<Self> {
        for bound in [&lower, &upper] {
            if bound.len() != values.len() {
                return Err(ForecastError::DimensionMismatch {
                    expected: values.len(),
                    got: bound.len(),
                });
            }
        }
        Ok(Self {
            point: values,
            lower: Some(lower),
            upper: Some(upper),
        })
    }

    /// Get the forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    /// Check if forecast is empty.
    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    /// Point predictions.
    pub fn point(&self) -> &[f64] {
        &self.point
    }

    /// Check if lower interval is available.
    pub fn has_lower(&self) -> bool {
        self.lower.is_some()
    }

    /// Check if upper interval is available.
    pub fn has_upper(&self) -> bool {
        self.upper.is_some()
    }

    pub fn lower(&self) -> Option<&[f64]> {
        self.lower.as_deref()
    }

    pub fn upper(&self) -> Option<&[f64]> {
        self.upper.as_deref()
    }

    /// Get the step at `index` (0-based). Missing bounds collapse onto the point.
    pub fn step(&self, index: usize) -> Result<ForecastStep> {
        let point = *self.point.get(index).ok_or(ForecastError::IndexOutOfBounds {
            index,
            size: self.point.len(),
        })?;
        let lower = self.lower.as_ref().map_or(point, |l| l[index]);
        let upper = self.upper.as_ref().map_or(point, |u| u[index]);
        Ok(ForecastStep {
            point,
            lower,
            upper,
        })
    }

    /// Iterate over `(point, lower, upper)` steps.
    pub fn steps(&self) -> impl Iterator<Item = ForecastStep> + '_ {
        self.point.iter().enumerate().map(move |(i, &point)| ForecastStep {
            point,
            lower: self.lower.as_ref().map_or(point, |l| l[i]),
            upper: self.upper.as_ref().map_or(point, |u| u[i]),
        })
    }

    /// Copy of this forecast with every lower bound raised to at least `floor`.
    pub fn with_lower_floor(&self, floor: f64) -> Self {
        Self {
            point: self.point.clone(),
            lower: self
                .lower
                .as_ref()
                .map(|l| l.iter().map(|&x| x.max(floor)).collect()),
            upper: self.upper.clone(),
        }
    }
}
