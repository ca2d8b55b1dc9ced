//! TimeSeries data structure for representing univariate temporal data.

use crate::core::observation::{DataSource, Observation};
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};

/// A univariate time series with strictly increasing timestamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create a univariate time series.
    ///
    /// # Example
    /// ```
    /// use ssa_forecast::core::TimeSeries;
    /// use chrono::{Duration, TimeZone, Utc};
    ///
    /// let base = Utc.with_ymd_and_hms(2011, 1, 1, 0, 0, 0).unwrap();
    /// let timestamps: Vec<_> = (0..3).map(|i| base + Duration::days(i)).collect();
    /// let ts = TimeSeries::univariate(timestamps, vec![985.0, 801.0, 1349.0]).unwrap();
    /// assert_eq!(ts.len(), 3);
    /// ```
    pub fn univariate(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if values.len() != timestamps.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }
        for i in 1..timestamps.len() {
            if timestamps[i] <= timestamps[i - 1] {
                return Err(ForecastError::TimestampError(
                    "timestamps must be strictly increasing".to_string(),
                ));
            }
        }

        Ok(Self { timestamps, values })
    }

    /// Build a series from observations, which must already be in order.
    pub fn from_observations(observations: &[Observation]) -> Result<Self> {
        let (timestamps, values) = observations
            .iter()
            .map(|o| (o.timestamp, o.value))
            .unzip();
        Self::univariate(timestamps, values)
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the observation at `index`.
    pub fn observation(&self, index: usize) -> Result<Observation> {
        match (self.timestamps.get(index), self.values.get(index)) {
            (Some(&timestamp), Some(&value)) => Ok(Observation { timestamp, value }),
            _ => Err(ForecastError::IndexOutOfBounds {
                index,
                size: self.len(),
            }),
        }
    }

    pub fn observations(&self) -> impl Iterator<Item = Observation> + '_ {
        self.timestamps
            .iter()
            .zip(&self.values)
            .map(|(&timestamp, &value)| Observation { timestamp, value })
    }

    /// Extract a slice of the time series.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries> {
        if start > end {
            return Err(ForecastError::InvalidConfiguration(
                "start must be <= end".to_string(),
            ));
        }
        if end > self.len() {
            return Err(ForecastError::IndexOutOfBounds {
                index: end,
                size: self.len(),
            });
        }

        Ok(TimeSeries {
            timestamps: self.timestamps[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
        })
    }

    /// Check if series has missing values (NaN or Inf).
    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }
}

impl DataSource for TimeSeries {
    fn observations_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Observation> {
        let lo = self.timestamps.partition_point(|t| *t < start);
        let hi = self.timestamps.partition_point(|t| *t < end).max(lo);
        self.timestamps[lo..hi]
            .iter()
            .zip(&self.values[lo..hi])
            .map(|(&timestamp, &value)| Observation { timestamp, value })
            .collect()
    }
}
