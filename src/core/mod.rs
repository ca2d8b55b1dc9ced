//! Core data structures for time series forecasting.

mod forecast;
mod observation;
mod time_series;

pub use forecast::{Forecast, ForecastStep};
pub use observation::{DataSource, Observation};
pub use time_series::TimeSeries;
