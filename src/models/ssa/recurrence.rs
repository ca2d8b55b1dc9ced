//! Linear recurrent formula derived from the signal subspace.

use super::decomposition::SpectralBasis;
use super::embedding::{hankelize, TrajectoryMatrix};
use crate::error::{ForecastError, Result};

/// Largest verticality coefficient `ν²` accepted; beyond `1 - ε` the
/// recurrence is undefined.
pub const VERTICALITY_EPSILON: f64 = 1e-9;

/// Output of the recurrence builder.
#[derive(Debug, Clone)]
pub struct Recurrence {
    /// `a ∈ ℝ^{L-1}`, oldest lag first: `x[t] ≈ Σ a_k · x[t-L+1+k]`.
    pub coefficients: Vec<f64>,
    /// Population variance of `series - fitted`.
    pub residual_variance: f64,
    /// Verticality coefficient `ν² = Σ π_i²`.
    pub verticality: f64,
    /// Rank-`r` reconstruction of the training series.
    pub fitted: Vec<f64>,
    /// `series - fitted`.
    pub residuals: Vec<f64>,
}

impl Recurrence {
    /// Apply the recurrence to the trailing `L - 1` values of `history`.
    pub fn next_value(coefficients: &[f64], history: &[f64]) -> f64 {
        let start = history.len() - coefficients.len();
        coefficients
            .iter()
            .zip(&history[start..])
            .map(|(a, x)| a * x)
            .sum()
    }
}

/// Derive the recurrence coefficients from the selected left singular vectors.
///
/// With `π_i` the last entry of `u_i` and `u_i⁻` the remaining entries,
/// `a = (Σ π_i u_i⁻) / (1 - ν²)`.
pub fn recurrence_coefficients(basis: &SpectralBasis) -> Result<(Vec<f64>, f64)> {
    let l = basis
        .triples
        .first()
        .map(|t| t.u.len())
        .ok_or(ForecastError::EmptyData)?;

    let nu_squared: f64 = basis
        .triples
        .iter()
        .map(|t| t.u[l - 1] * t.u[l - 1])
        .sum();

    if nu_squared >= 1.0 - VERTICALITY_EPSILON {
        return Err(ForecastError::DegenerateSubspace { nu_squared });
    }

    let mut coefficients = vec![0.0; l - 1];
    for triple in &basis.triples {
        let pi = triple.u[l - 1];
        for (a, &u) in coefficients.iter_mut().zip(&triple.u[..l - 1]) {
            *a += pi * u;
        }
    }
    let scale = 1.0 / (1.0 - nu_squared);
    for a in coefficients.iter_mut() {
        *a *= scale;
    }

    Ok((coefficients, nu_squared))
}

/// Build the recurrence and measure how well the basis reconstructs `series`.
pub fn build_recurrence(
    basis: &SpectralBasis,
    trajectory: &TrajectoryMatrix,
    series: &[f64],
) -> Result<Recurrence> {
    if series.len() != trajectory.rows() + trajectory.cols() - 1 {
        return Err(ForecastError::DimensionMismatch {
            expected: trajectory.rows() + trajectory.cols() - 1,
            got: series.len(),
        });
    }

    let (coefficients, verticality) = recurrence_coefficients(basis)?;

    let components: Vec<(f64, &[f64], &[f64])> = basis
        .triples
        .iter()
        .map(|t| (t.sigma, t.u.as_slice(), t.v.as_slice()))
        .collect();
    let fitted = hankelize(&components, trajectory.rows(), trajectory.cols());

    let residuals: Vec<f64> = series.iter().zip(&fitted).map(|(x, f)| x - f).collect();
    let n = residuals.len() as f64;
    let mean = residuals.iter().sum::<f64>() / n;
    let residual_variance = residuals.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;

    Ok(Recurrence {
        coefficients,
        residual_variance,
        verticality,
        fitted,
        residuals,
    })
}
