//! Utility functions for forecast evaluation.

pub mod metrics;

pub use metrics::{calculate_metrics, AccuracyMetrics};
