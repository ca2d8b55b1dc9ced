//! Scenario tests for the SSA forecast engine lifecycle.
//!
//! These exercise the public API end to end: training on synthetic series,
//! rejecting invalid transitions, incremental observation and checkpoints.

use approx::assert_relative_eq;
use chrono::{Duration, TimeZone, Utc};
use ssa_forecast::core::{DataSource, TimeSeries};
use ssa_forecast::models::ssa::{ForecastEngine, RankSelection, SsaConfig};
use ssa_forecast::ForecastError;

fn make_ts(values: &[f64]) -> TimeSeries {
    let base = Utc.with_ymd_and_hms(2011, 1, 1, 0, 0, 0).unwrap();
    let timestamps: Vec<_> = (0..values.len())
        .map(|i| base + Duration::days(i as i64))
        .collect();
    TimeSeries::univariate(timestamps, values.to_vec()).unwrap()
}

fn seasonal(n: usize, base: f64, amplitude: f64, period: f64) -> Vec<f64> {
    (0..n)
        .map(|t| base + amplitude * (2.0 * std::f64::consts::PI * t as f64 / period).sin())
        .collect()
}

#[test]
fn linear_series_one_step_error_vanishes() {
    let config = SsaConfig::new(3, 30).with_rank(RankSelection::Fixed(2));
    let mut engine = ForecastEngine::new(config).unwrap();
    let history: Vec<f64> = (0..30).map(|t| t as f64).collect();
    engine.train(&history).unwrap();

    let coefficients = engine.coefficients().unwrap();
    assert_relative_eq!(coefficients[0], -1.0, epsilon = 1e-6);
    assert_relative_eq!(coefficients[1], 2.0, epsilon = 1e-6);

    for t in 30..40 {
        let next = engine.forecast(1).unwrap().point()[0];
        assert!((next - t as f64).abs() < 1e-6, "t={} forecast={}", t, next);
        engine.observe(t as f64).unwrap();
    }
}

#[test]
fn linear_series_under_default_rank_rule() {
    let mut engine = ForecastEngine::new(SsaConfig::new(3, 30)).unwrap();
    let history: Vec<f64> = (0..30).map(|t| t as f64).collect();
    engine.train(&history).unwrap();

    assert_eq!(engine.rank(), Some(2));
    for t in 30..40 {
        let next = engine.forecast(1).unwrap().point()[0];
        assert!((next - t as f64).abs() < 1e-6, "t={} forecast={}", t, next);
        engine.observe(t as f64).unwrap();
    }
}

#[test]
fn constant_series_is_not_degenerate() {
    let mut engine = ForecastEngine::default();
    engine.train(&[5.0; 30]).unwrap();

    assert!(engine.residual_variance().unwrap().abs() < 1e-20);
    let forecast = engine.forecast(7).unwrap();
    assert_eq!(forecast.horizon(), 7);
    for step in forecast.steps() {
        assert_relative_eq!(step.point, 5.0, epsilon = 1e-9);
    }
}

#[test]
fn full_rank_subspace_is_degenerate() {
    let config = SsaConfig::new(5, 30).with_rank(RankSelection::Fixed(5));
    let mut engine = ForecastEngine::new(config).unwrap();
    let history: Vec<f64> = (0..30).map(|t| ((t * 37) % 11) as f64).collect();

    assert!(matches!(
        engine.train(&history),
        Err(ForecastError::DegenerateSubspace { .. })
    ));
    assert!(!engine.is_trained());
}

#[test]
fn exhausted_sweeps_report_instability() {
    let config = SsaConfig::default().with_max_sweeps(0);
    let mut engine = ForecastEngine::new(config).unwrap();

    assert!(matches!(
        engine.train(&seasonal(30, 10.0, 2.0, 7.0)),
        Err(ForecastError::NumericalInstability(_))
    ));
}

#[test]
fn non_finite_history_reports_instability() {
    let mut engine = ForecastEngine::default();
    let mut history = seasonal(30, 10.0, 2.0, 7.0);
    history[12] = f64::NAN;

    assert!(matches!(
        engine.train(&history),
        Err(ForecastError::NumericalInstability(_))
    ));
}

#[test]
fn invalid_configurations_are_rejected() {
    let configs = [
        SsaConfig::new(1, 30),
        SsaConfig::new(7, 7),
        SsaConfig::default().with_confidence_level(0.0),
        SsaConfig::default().with_rank(RankSelection::Fixed(0)),
        SsaConfig::default().with_rank(RankSelection::Energy(1.5)),
        SsaConfig::default().with_train_size(5),
    ];
    for config in configs {
        assert!(matches!(
            ForecastEngine::new(config),
            Err(ForecastError::InvalidConfiguration(_))
        ));
    }
}

#[test]
fn state_machine_order_is_enforced() {
    let mut engine = ForecastEngine::default();
    assert!(matches!(engine.observe(1.0), Err(ForecastError::NotTrained)));
    assert!(matches!(engine.forecast(1), Err(ForecastError::NotTrained)));
    assert!(matches!(engine.checkpoint(), Err(ForecastError::NotTrained)));

    assert!(matches!(
        engine.train(&[1.0; 29]),
        Err(ForecastError::InsufficientData { needed: 30, got: 29 })
    ));

    engine.train(&seasonal(30, 10.0, 2.0, 7.0)).unwrap();
    assert!(engine.observe(1.0).is_ok());
    assert!(engine.forecast(1).is_ok());
}

#[test]
fn checkpoint_restore_preserves_forecasts() {
    let config = SsaConfig::new(7, 30)
        .with_horizon(7)
        .with_rank(RankSelection::Fixed(3));
    let mut engine = ForecastEngine::new(config).unwrap();
    let history: Vec<f64> = seasonal(60, 100.0, 10.0, 7.0)
        .into_iter()
        .enumerate()
        .map(|(i, v)| v + 0.3 * ((i * 13 % 5) as f64 - 2.0))
        .collect();
    engine.train(&history).unwrap();
    engine.observe_many(&[101.0, 108.5, 95.2]).unwrap();

    let restored = ForecastEngine::restore(&engine.checkpoint().unwrap()).unwrap();

    assert_eq!(restored.coefficients(), engine.coefficients());
    assert_eq!(
        restored.residual_variance().map(f64::to_bits),
        engine.residual_variance().map(f64::to_bits)
    );
    assert_eq!(restored.rank(), Some(3));
    assert_eq!(
        restored.forecast_default().unwrap(),
        engine.forecast_default().unwrap()
    );
}

#[test]
fn corrupted_checkpoint_is_rejected() {
    let mut engine = ForecastEngine::default();
    engine.train(&seasonal(30, 10.0, 2.0, 7.0)).unwrap();
    let mut blob = engine.checkpoint().unwrap();

    // Bump the leading little-endian version word.
    blob[0] = blob[0].wrapping_add(1);
    assert!(matches!(
        ForecastEngine::restore(&blob),
        Err(ForecastError::Checkpoint(_))
    ));

    let blob = engine.checkpoint().unwrap();
    assert!(ForecastEngine::restore(&blob[..blob.len() / 2]).is_err());
}

#[test]
fn independent_engines_do_not_share_state() {
    let mut a = ForecastEngine::default();
    let mut b = ForecastEngine::default();
    let history = seasonal(30, 10.0, 2.0, 7.0);
    a.train(&history).unwrap();
    b.train(&history).unwrap();

    a.observe(50.0).unwrap();
    assert_ne!(a.buffer(), b.buffer());
    assert_ne!(a.forecast(3).unwrap(), b.forecast(3).unwrap());
}

#[test]
fn train_from_data_source_range() {
    let values = seasonal(400, 50.0, 5.0, 7.0);
    let series = make_ts(&values);
    let start = series.timestamps()[0];
    let split = series.timestamps()[365];

    let train = TimeSeries::from_observations(&series.observations_between(start, split)).unwrap();
    assert_eq!(train.len(), 365);

    let config = SsaConfig::default()
        .with_train_size(365)
        .with_rank(RankSelection::Fixed(3));
    let mut engine = ForecastEngine::new(config).unwrap();
    engine.train_series(&train).unwrap();

    let metrics = engine.evaluate(&values[365..]).unwrap();
    assert_eq!(metrics.n, 35);
    assert!(metrics.mae < 1e-4, "mae {}", metrics.mae);
}
