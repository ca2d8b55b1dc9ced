//! SSA forecast engine: training, incremental observation, forecasting and
//! checkpointing.

use std::path::Path;

use tracing::{debug, info, warn};

use super::buffer::SequenceBuffer;
use super::confidence::ConfidenceEstimator;
use super::config::SsaConfig;
use super::decomposition::{decompose, SpectralBasis};
use super::embedding::TrajectoryMatrix;
use super::recurrence::{build_recurrence, Recurrence};
use crate::checkpoint::{self, EngineSnapshot, CHECKPOINT_VERSION};
use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::Forecaster;
use crate::utils::metrics::{calculate_metrics, AccuracyMetrics};

/// State learned by a successful `train`.
#[derive(Debug, Clone)]
struct TrainedModel {
    buffer: SequenceBuffer,
    coefficients: Vec<f64>,
    residual_variance: f64,
    rank: usize,
    /// Reconstruction of the training window; not part of a checkpoint.
    fitted: Option<Vec<f64>>,
    residuals: Option<Vec<f64>>,
}

#[derive(Debug, Clone)]
enum EngineState {
    Untrained,
    Trained(TrainedModel),
}

/// Singular Spectrum Analysis forecaster.
///
/// The engine starts untrained. [`train`](Self::train) learns a linear
/// recurrence from the trailing window of a history and fills the sequence
/// buffer; [`observe`](Self::observe) slides new values into the buffer
/// without relearning; [`forecast`](Self::forecast) iterates the recurrence
/// from the buffer. Calling `train` again replaces the learned state.
///
/// Every operation either succeeds completely or leaves the engine untouched.
/// The engine is not internally synchronised: concurrent use of one instance
/// needs external mutual exclusion, which `&mut self` already enforces for
/// the mutating methods.
///
/// # Example
/// ```
/// use ssa_forecast::models::ssa::{ForecastEngine, SsaConfig};
///
/// let history: Vec<f64> = (0..60)
///     .map(|t| 100.0 + 10.0 * (2.0 * std::f64::consts::PI * t as f64 / 7.0).sin())
///     .collect();
///
/// let mut engine = ForecastEngine::new(SsaConfig::default()).unwrap();
/// engine.train(&history).unwrap();
///
/// let forecast = engine.forecast(7).unwrap();
/// assert_eq!(forecast.horizon(), 7);
/// for step in forecast.steps() {
///     assert!(step.lower <= step.point && step.point <= step.upper);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    config: SsaConfig,
    state: EngineState,
}

impl Default for ForecastEngine {
    fn default() -> Self {
        Self {
            config: SsaConfig::default(),
            state: EngineState::Untrained,
        }
    }
}

impl ForecastEngine {
    /// Create an untrained engine after validating `config`.
    pub fn new(config: SsaConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: EngineState::Untrained,
        })
    }

    pub fn config(&self) -> &SsaConfig {
        &self.config
    }

    pub fn is_trained(&self) -> bool {
        matches!(self.state, EngineState::Trained(_))
    }

    fn trained(&self) -> Result<&TrainedModel> {
        match &self.state {
            EngineState::Trained(model) => Ok(model),
            EngineState::Untrained => Err(ForecastError::NotTrained),
        }
    }

    fn trained_mut(&mut self) -> Result<&mut TrainedModel> {
        match &mut self.state {
            EngineState::Trained(model) => Ok(model),
            EngineState::Untrained => Err(ForecastError::NotTrained),
        }
    }

    /// Recurrence coefficients, oldest lag first.
    pub fn coefficients(&self) -> Option<&[f64]> {
        self.trained().ok().map(|m| m.coefficients.as_slice())
    }

    pub fn residual_variance(&self) -> Option<f64> {
        self.trained().ok().map(|m| m.residual_variance)
    }

    /// Number of spectral components behind the recurrence.
    pub fn rank(&self) -> Option<usize> {
        self.trained().ok().map(|m| m.rank)
    }

    /// Snapshot of the buffered values, oldest first.
    pub fn buffer(&self) -> Option<Vec<f64>> {
        self.trained().ok().map(|m| m.buffer.window())
    }

    /// Learn the recurrence from the trailing values of `history`.
    ///
    /// The recurrence is learned from the last `train_size` values (default
    /// `series_length`) and the buffer is filled with the last
    /// `series_length` values. On error the engine keeps its previous state.
    pub fn train(&mut self, history: &[f64]) -> Result<()> {
        let needed = self.config.required_history();
        if history.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: history.len(),
            });
        }

        let window = &history[history.len() - self.config.effective_train_size()..];
        let (basis, recurrence) = self.learn(window).map_err(|e| {
            warn!(error = %e, train_size = window.len(), "ssa training failed");
            e
        })?;

        info!(
            window_size = self.config.window_size,
            train_size = window.len(),
            rank = basis.rank(),
            explained_energy = basis.explained_energy,
            verticality = recurrence.verticality,
            residual_variance = recurrence.residual_variance,
            "ssa engine trained"
        );

        self.state = EngineState::Trained(TrainedModel {
            buffer: SequenceBuffer::from_values(self.config.series_length, history),
            coefficients: recurrence.coefficients,
            residual_variance: recurrence.residual_variance,
            rank: basis.rank(),
            fitted: Some(recurrence.fitted),
            residuals: Some(recurrence.residuals),
        });
        Ok(())
    }

    fn learn(&self, window: &[f64]) -> Result<(SpectralBasis, Recurrence)> {
        let trajectory = TrajectoryMatrix::embed(window, self.config.window_size)?;
        let basis = decompose(
            &trajectory,
            self.config.rank,
            self.config.max_sweeps,
            self.config.tolerance,
        )?;
        let recurrence = build_recurrence(&basis, &trajectory, window)?;
        Ok((basis, recurrence))
    }

    /// Train from the values of a [`TimeSeries`].
    pub fn train_series(&mut self, series: &TimeSeries) -> Result<()> {
        self.train(series.values())
    }

    /// Slide a new observation into the buffer, evicting the oldest value.
    ///
    /// The recurrence is not relearned.
    pub fn observe(&mut self, value: f64) -> Result<()> {
        let model = self.trained_mut()?;
        model.buffer.push(value);
        Ok(())
    }

    /// Observe several values in order.
    pub fn observe_many(&mut self, values: &[f64]) -> Result<()> {
        let model = self.trained_mut()?;
        for &value in values {
            model.buffer.push(value);
        }
        debug!(count = values.len(), "observed values");
        Ok(())
    }

    /// Point forecasts for `horizon` steps.
    ///
    /// Each step applies the recurrence to the previous `L - 1` values of the
    /// buffer extended by the forecasts already produced.
    pub fn point_forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        let model = self.trained()?;
        let lags = model.coefficients.len();

        let mut history = model.buffer.tail(lags);
        history.reserve(horizon);
        for _ in 0..horizon {
            let next = Recurrence::next_value(&model.coefficients, &history);
            history.push(next);
        }
        Ok(history.split_off(lags))
    }

    /// Forecast `horizon` steps with bounds at the configured confidence level.
    pub fn forecast(&self, horizon: usize) -> Result<Forecast> {
        self.forecast_with_level(horizon, self.config.confidence_level)
    }

    /// Forecast the configured horizon.
    pub fn forecast_default(&self) -> Result<Forecast> {
        self.forecast(self.config.horizon)
    }

    /// Forecast `horizon` steps with bounds at confidence `level`.
    pub fn forecast_with_level(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let model = self.trained()?;
        let estimator = ConfidenceEstimator::new(model.residual_variance, level)?;
        let points = self.point_forecast(horizon)?;

        let (lower, upper): (Vec<f64>, Vec<f64>) = points
            .iter()
            .enumerate()
            .map(|(i, &p)| estimator.bounds(p, i + 1))
            .unzip();

        Forecast::from_values_with_intervals(points, lower, upper)
    }

    /// One-step-ahead evaluation over a test sequence.
    ///
    /// For each actual value the engine forecasts one step, records the point
    /// forecast and then observes the actual. The buffer ends up exactly as
    /// after observing every test value.
    pub fn evaluate(&mut self, actuals: &[f64]) -> Result<AccuracyMetrics> {
        self.trained()?;
        if actuals.is_empty() {
            return Err(ForecastError::EmptyData);
        }

        let mut predicted = Vec::with_capacity(actuals.len());
        for &actual in actuals {
            let next = self.point_forecast(1)?[0];
            predicted.push(next);
            self.observe(actual)?;
        }

        calculate_metrics(actuals, &predicted, None)
    }

    fn snapshot(&self) -> Result<EngineSnapshot> {
        let model = self.trained()?;
        let snapshot = EngineSnapshot {
            version: CHECKPOINT_VERSION,
            config: self.config.clone(),
            buffer: model.buffer.window(),
            coefficients: model.coefficients.clone(),
            residual_variance: model.residual_variance,
            rank: model.rank,
        };
        // Refuse to write a blob that restore would reject.
        snapshot.validate()?;
        Ok(snapshot)
    }

    fn from_snapshot(snapshot: EngineSnapshot) -> Self {
        let buffer = SequenceBuffer::from_values(snapshot.config.series_length, &snapshot.buffer);
        Self {
            config: snapshot.config,
            state: EngineState::Trained(TrainedModel {
                buffer,
                coefficients: snapshot.coefficients,
                residual_variance: snapshot.residual_variance,
                rank: snapshot.rank,
                fitted: None,
                residuals: None,
            }),
        }
    }

    /// Serialize the trained state into an opaque versioned blob.
    pub fn checkpoint(&self) -> Result<Vec<u8>> {
        let bytes = checkpoint::encode(&self.snapshot()?)?;
        debug!(bytes = bytes.len(), "engine checkpoint encoded");
        Ok(bytes)
    }

    /// Rebuild a trained engine from a blob produced by [`checkpoint`](Self::checkpoint).
    pub fn restore(bytes: &[u8]) -> Result<Self> {
        let snapshot = checkpoint::decode(bytes)?;
        debug!(
            window_size = snapshot.config.window_size,
            series_length = snapshot.config.series_length,
            rank = snapshot.rank,
            "engine restored from checkpoint"
        );
        Ok(Self::from_snapshot(snapshot))
    }

    /// Write the checkpoint blob to `path`.
    pub fn save_checkpoint<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        checkpoint::write_snapshot(&self.snapshot()?, path.as_ref())?;
        info!(path = %path.as_ref().display(), "engine checkpoint saved");
        Ok(())
    }

    /// Load an engine from a checkpoint file written by
    /// [`save_checkpoint`](Self::save_checkpoint).
    pub fn load_checkpoint<P: AsRef<Path>>(path: P) -> Result<Self> {
        let snapshot = checkpoint::read_snapshot(path.as_ref())?;
        info!(path = %path.as_ref().display(), "engine checkpoint loaded");
        Ok(Self::from_snapshot(snapshot))
    }
}

impl Forecaster for ForecastEngine {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        self.train_series(series)
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        Ok(Forecast::from_values(self.point_forecast(horizon)?))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        self.forecast_with_level(horizon, level)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.trained().ok().and_then(|m| m.fitted.as_deref())
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.trained().ok().and_then(|m| m.residuals.as_deref())
    }

    fn name(&self) -> &str {
        "SSA"
    }

    fn is_fitted(&self) -> bool {
        self.is_trained()
    }
}
