//! Configuration for the SSA forecast engine.

use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, Result};

/// Rule used to decide how many spectral components feed the recurrence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RankSelection {
    /// Use exactly this many leading components.
    Fixed(usize),
    /// Use the smallest number of leading components whose share of the
    /// total squared singular values first exceeds the threshold
    /// (0 < t ≤ 1). The result is capped at `window_size - 1`.
    Energy(f64),
    /// Use the numerical rank of the spectrum when it is below
    /// `window_size`; otherwise cut at the largest ratio between consecutive
    /// singular values. Capped at `window_size - 1`.
    SpectralGap,
}

impl Default for RankSelection {
    fn default() -> Self {
        RankSelection::SpectralGap
    }
}

/// Settings for [`ForecastEngine`](super::ForecastEngine).
///
/// # Example
/// ```
/// use ssa_forecast::models::ssa::{RankSelection, SsaConfig};
///
/// let config = SsaConfig::new(7, 30)
///     .with_horizon(7)
///     .with_confidence_level(0.95)
///     .with_rank(RankSelection::Fixed(3));
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.lag_count(), 24);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SsaConfig {
    /// Embedding window length `L`.
    pub window_size: usize,
    /// Capacity of the sequence buffer.
    pub series_length: usize,
    /// Default number of steps produced by `forecast_default`.
    pub horizon: usize,
    /// Two-sided confidence level for the bounds, in (0, 1).
    pub confidence_level: f64,
    /// Rank selection rule.
    pub rank: RankSelection,
    /// Number of trailing values the recurrence is learned from.
    /// `None` uses `series_length`.
    pub train_size: Option<usize>,
    /// Maximum number of Jacobi sweeps before giving up.
    pub max_sweeps: usize,
    /// Relative off-diagonal norm at which the eigen-solve is converged.
    pub tolerance: f64,
}

impl Default for SsaConfig {
    fn default() -> Self {
        Self {
            window_size: 7,
            series_length: 30,
            horizon: 7,
            confidence_level: 0.95,
            rank: RankSelection::default(),
            train_size: None,
            max_sweeps: 100,
            tolerance: 1e-12,
        }
    }
}

impl SsaConfig {
    /// Create a configuration with the given window size and series length.
    pub fn new(window_size: usize, series_length: usize) -> Self {
        Self {
            window_size,
            series_length,
            ..Default::default()
        }
    }

    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    pub fn with_confidence_level(mut self, level: f64) -> Self {
        self.confidence_level = level;
        self
    }

    pub fn with_rank(mut self, rank: RankSelection) -> Self {
        self.rank = rank;
        self
    }

    pub fn with_train_size(mut self, train_size: usize) -> Self {
        self.train_size = Some(train_size);
        self
    }

    pub fn with_max_sweeps(mut self, max_sweeps: usize) -> Self {
        self.max_sweeps = max_sweeps;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Number of values the recurrence is learned from.
    pub fn effective_train_size(&self) -> usize {
        self.train_size.unwrap_or(self.series_length)
    }

    /// Minimum history length accepted by `train`.
    pub fn required_history(&self) -> usize {
        self.series_length.max(self.effective_train_size())
    }

    /// Number of lagged vectors `K` in the training trajectory matrix.
    pub fn lag_count(&self) -> usize {
        (self.effective_train_size() + 1).saturating_sub(self.window_size)
    }

    /// Check every setting, reporting the first problem found.
    pub fn validate(&self) -> Result<()> {
        if self.window_size <= 1 {
            return Err(ForecastError::InvalidConfiguration(format!(
                "window size must exceed 1, got {}",
                self.window_size
            )));
        }
        if self.series_length <= self.window_size {
            return Err(ForecastError::InvalidConfiguration(format!(
                "series length {} must exceed window size {}",
                self.series_length, self.window_size
            )));
        }
        if let Some(train_size) = self.train_size {
            if train_size <= self.window_size {
                return Err(ForecastError::InvalidConfiguration(format!(
                    "train size {} must exceed window size {}",
                    train_size, self.window_size
                )));
            }
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ForecastError::InvalidConfiguration(format!(
                "confidence level must be in (0, 1), got {}",
                self.confidence_level
            )));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(ForecastError::InvalidConfiguration(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }

        match self.rank {
            RankSelection::Fixed(r) => {
                let max_rank = self.window_size.min(self.lag_count());
                if r == 0 || r > max_rank {
                    return Err(ForecastError::InvalidConfiguration(format!(
                        "fixed rank must be in 1..={}, got {}",
                        max_rank, r
                    )));
                }
            }
            RankSelection::Energy(threshold) => {
                if !(threshold > 0.0 && threshold <= 1.0) {
                    return Err(ForecastError::InvalidConfiguration(format!(
                        "energy threshold must be in (0, 1], got {}",
                        threshold
                    )));
                }
            }
            RankSelection::SpectralGap => {}
        }

        Ok(())
    }
}
