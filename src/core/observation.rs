//! Timestamped observations and the data-source seam.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single observation: a timestamp paired with a value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Observation {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Anything that can supply ordered observations for a time range.
///
/// Implementations return observations with `start <= timestamp < end`,
/// ordered by timestamp.
pub trait DataSource {
    fn observations_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Observation>;

    /// Values of [`observations_between`](Self::observations_between), in order.
    fn values_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<f64> {
        self.observations_between(start, end)
            .into_iter()
            .map(|o| o.value)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    struct Fixed(Vec<Observation>);

    impl DataSource for Fixed {
        fn observations_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Observation> {
            self.0
                .iter()
                .filter(|o| o.timestamp >= start && o.timestamp < end)
                .copied()
                .collect()
        }
    }

    #[test]
    fn values_between_projects_values() {
        let base = Utc.with_ymd_and_hms(2011, 1, 1, 0, 0, 0).unwrap();
        let source = Fixed(
            (0..5)
                .map(|i| Observation::new(base + Duration::days(i), i as f64 * 10.0))
                .collect(),
        );

        let values = source.values_between(base + Duration::days(1), base + Duration::days(3));
        assert_eq!(values, vec![10.0, 20.0]);
    }
}
