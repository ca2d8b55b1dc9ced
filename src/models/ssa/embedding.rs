//! Lag embedding of a series into its trajectory (Hankel) matrix.

use crate::error::{ForecastError, Result};

/// `L × K` trajectory matrix whose column `j` is `series[j..j + L]`.
///
/// Stored row-major; entry `(i, j)` equals `series[i + j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl TrajectoryMatrix {
    /// Embed `series` with window length `window`.
    ///
    /// Requires `1 < window < series.len()`, which also guarantees at least
    /// two lagged columns.
    ///
    /// # Example
    /// ```
    /// use ssa_forecast::models::ssa::TrajectoryMatrix;
    ///
    /// let x = TrajectoryMatrix::embed(&[1.0, 2.0, 3.0, 4.0], 2).unwrap();
    /// assert_eq!(x.shape(), (2, 3));
    /// assert_eq!(x.column(1), vec![2.0, 3.0]);
    /// ```
    pub fn embed(series: &[f64], window: usize) -> Result<Self> {
        let n = series.len();
        if window <= 1 {
            return Err(ForecastError::InvalidConfiguration(format!(
                "window length must exceed 1, got {}",
                window
            )));
        }
        if n < window + 1 {
            return Err(ForecastError::InvalidConfiguration(format!(
                "series of length {} is too short for window length {}",
                n, window
            )));
        }

        let cols = n - window + 1;
        let mut data = Vec::with_capacity(window * cols);
        for i in 0..window {
            data.extend_from_slice(&series[i..i + cols]);
        }

        Ok(Self {
            rows: window,
            cols,
            data,
        })
    }

    /// Number of rows `L`.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of lagged vectors `K`.
    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.cols + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn column(&self, j: usize) -> Vec<f64> {
        (0..self.rows).map(|i| self.get(i, j)).collect()
    }

    /// Lag-covariance matrix `X·Xᵗ` (symmetric, `L × L`).
    pub fn lag_covariance(&self) -> Vec<Vec<f64>> {
        let mut s = vec![vec![0.0; self.rows]; self.rows];
        for i in 0..self.rows {
            for k in i..self.rows {
                let v: f64 = self
                    .row(i)
                    .iter()
                    .zip(self.row(k))
                    .map(|(a, b)| a * b)
                    .sum();
                s[i][k] = v;
                s[k][i] = v;
            }
        }
        s
    }

    /// `Xᵗ·u` for a vector of length `L`.
    pub fn transpose_mul(&self, u: &[f64]) -> Vec<f64> {
        debug_assert_eq!(u.len(), self.rows);
        let mut out = vec![0.0; self.cols];
        for (i, &ui) in u.iter().enumerate() {
            for (o, &x) in out.iter_mut().zip(self.row(i)) {
                *o += ui * x;
            }
        }
        out
    }
}

/// Diagonal averaging of an `L × K` matrix given as the sum of rank-one
/// terms `Σ σ_i u_i v_iᵗ`, returning a series of length `L + K - 1`.
///
/// Each output value is the mean of the matrix entries on its anti-diagonal,
/// which turns the low-rank approximation back into a series.
pub fn hankelize(components: &[(f64, &[f64], &[f64])], rows: usize, cols: usize) -> Vec<f64> {
    let n = rows + cols - 1;
    let mut sums = vec![0.0; n];
    let mut counts = vec![0usize; n];

    for i in 0..rows {
        for j in 0..cols {
            let value: f64 = components
                .iter()
                .map(|(sigma, u, v)| sigma * u[i] * v[j])
                .sum();
            sums[i + j] += value;
            counts[i + j] += 1;
        }
    }

    sums.iter()
        .zip(&counts)
        .map(|(s, &c)| s / c as f64)
        .collect()
}
