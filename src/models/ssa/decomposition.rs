//! Spectral decomposition of the trajectory matrix.
//!
//! The left singular vectors of `X` are the eigenvectors of the symmetric
//! lag-covariance `X·Xᵗ`, which is small (`L × L`). It is diagonalised with
//! the cyclic Jacobi method:
//!
//! - every sweep visits the off-diagonal pairs `(p, q)`, `p < q`, in row
//!   order and applies the rotation that zeroes `a[p][q]`;
//! - the solve is converged once the off-diagonal Frobenius norm is at most
//!   `tolerance · ‖A‖_F` (or exactly zero);
//! - after `max_sweeps` sweeps without convergence the solve fails with
//!   [`ForecastError::NumericalInstability`].
//!
//! Eigenpairs are sorted by descending eigenvalue with a stable sort, so ties
//! keep their diagonal order and the output is fully deterministic.

use tracing::debug;

use super::config::RankSelection;
use super::embedding::TrajectoryMatrix;
use crate::error::{ForecastError, Result};

/// Eigen-decomposition of a symmetric matrix.
#[derive(Debug, Clone)]
pub struct SymmetricEigen {
    /// Eigenvalues, descending.
    pub values: Vec<f64>,
    /// Unit eigenvectors, `vectors[i]` pairs with `values[i]`.
    pub vectors: Vec<Vec<f64>>,
    /// Number of sweeps performed.
    pub sweeps: usize,
}

/// A singular triple `(σ, u, v)` of the trajectory matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SingularTriple {
    pub sigma: f64,
    /// Left singular vector, length `L`.
    pub u: Vec<f64>,
    /// Right singular vector, length `K`.
    pub v: Vec<f64>,
}

/// Leading singular triples selected for the recurrence.
#[derive(Debug, Clone)]
pub struct SpectralBasis {
    /// Selected triples, strongest first.
    pub triples: Vec<SingularTriple>,
    /// All singular values, descending.
    pub singular_values: Vec<f64>,
    /// Share of the total squared singular values carried by the selection.
    pub explained_energy: f64,
}

impl SpectralBasis {
    pub fn rank(&self) -> usize {
        self.triples.len()
    }
}

fn frobenius_norm(a: &[Vec<f64>]) -> f64 {
    a.iter()
        .flat_map(|row| row.iter())
        .map(|x| x * x)
        .sum::<f64>()
        .sqrt()
}

fn off_diagonal_norm(a: &[Vec<f64>]) -> f64 {
    let mut sum = 0.0;
    for (i, row) in a.iter().enumerate() {
        for (j, x) in row.iter().enumerate() {
            if i != j {
                sum += x * x;
            }
        }
    }
    sum.sqrt()
}

/// Diagonalise a symmetric matrix with cyclic Jacobi rotations.
///
/// # Example
/// ```
/// use ssa_forecast::models::ssa::symmetric_eigen;
///
/// let a = vec![vec![2.0, 1.0], vec![1.0, 2.0]];
/// let eig = symmetric_eigen(&a, 50, 1e-12).unwrap();
/// assert!((eig.values[0] - 3.0).abs() < 1e-10);
/// assert!((eig.values[1] - 1.0).abs() < 1e-10);
/// ```
pub fn symmetric_eigen(
    matrix: &[Vec<f64>],
    max_sweeps: usize,
    tolerance: f64,
) -> Result<SymmetricEigen> {
    let n = matrix.len();
    if n == 0 {
        return Err(ForecastError::EmptyData);
    }
    if matrix.iter().any(|row| row.len() != n) {
        return Err(ForecastError::DimensionMismatch {
            expected: n,
            got: matrix.iter().map(|r| r.len()).find(|&l| l != n).unwrap_or(n),
        });
    }
    if matrix.iter().flatten().any(|x| !x.is_finite()) {
        return Err(ForecastError::NumericalInstability(
            "matrix contains non-finite values".to_string(),
        ));
    }

    let mut a: Vec<Vec<f64>> = matrix.to_vec();
    let mut v: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { 0.0 }).collect())
        .collect();

    let scale = frobenius_norm(&a);
    let threshold = tolerance * scale;
    let mut sweeps = 0;
    let mut converged = off_diagonal_norm(&a) <= threshold;

    while !converged && sweeps < max_sweeps {
        for p in 0..n - 1 {
            for q in p + 1..n {
                let apq = a[p][q];
                if apq == 0.0 {
                    continue;
                }

                let theta = (a[q][q] - a[p][p]) / (2.0 * apq);
                let t = if theta == 0.0 {
                    1.0
                } else {
                    theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt())
                };
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;

                // A ← A·J (columns p, q)
                for row in a.iter_mut() {
                    let akp = row[p];
                    let akq = row[q];
                    row[p] = c * akp - s * akq;
                    row[q] = s * akp + c * akq;
                }
                // A ← Jᵗ·A (rows p, q)
                for k in 0..n {
                    let apk = a[p][k];
                    let aqk = a[q][k];
                    a[p][k] = c * apk - s * aqk;
                    a[q][k] = s * apk + c * aqk;
                }
                a[p][q] = 0.0;
                a[q][p] = 0.0;

                for row in v.iter_mut() {
                    let vkp = row[p];
                    let vkq = row[q];
                    row[p] = c * vkp - s * vkq;
                    row[q] = s * vkp + c * vkq;
                }
            }
        }
        sweeps += 1;
        converged = off_diagonal_norm(&a) <= threshold;
    }

    if !converged {
        return Err(ForecastError::NumericalInstability(format!(
            "Jacobi eigen-solve did not converge within {} sweeps (off-diagonal norm {:e})",
            max_sweeps,
            off_diagonal_norm(&a)
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    // Stable: equal eigenvalues keep their diagonal order.
    order.sort_by(|&i, &j| {
        a[j][j]
            .partial_cmp(&a[i][i])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let values = order.iter().map(|&i| a[i][i]).collect();
    let vectors = order
        .iter()
        .map(|&i| v.iter().map(|row| row[i]).collect())
        .collect();

    Ok(SymmetricEigen {
        values,
        vectors,
        sweeps,
    })
}

/// Singular values at or below this fraction of the leading one count as zero.
pub const NUMERICAL_RANK_TOLERANCE: f64 = 1e-6;

/// Number of components chosen by `rule` for the given singular values.
///
/// `Energy` picks the smallest prefix whose squared singular values first
/// exceed the threshold share of the total. `SpectralGap` stops at the first
/// component followed by a numerically zero singular value, or else at the
/// largest ratio `σ_r / σ_{r+1}` (ties keep the smaller rank). Both are
/// capped at `L - 1` components and never select fewer than one. A zero
/// spectrum selects one component.
pub fn select_rank(singular_values: &[f64], rule: RankSelection) -> usize {
    let l = singular_values.len();
    let cap = l.saturating_sub(1).max(1);
    match rule {
        RankSelection::Fixed(r) => r.min(l),
        RankSelection::Energy(threshold) => {
            let total: f64 = singular_values.iter().map(|s| s * s).sum();
            if total <= 0.0 {
                return 1;
            }

            let mut cumulative = 0.0;
            for (i, s) in singular_values.iter().enumerate() {
                cumulative += s * s;
                if cumulative / total > threshold || i + 1 >= cap {
                    return i + 1;
                }
            }
            cap
        }
        RankSelection::SpectralGap => {
            let leading = singular_values.first().copied().unwrap_or(0.0);
            if leading <= 0.0 {
                return 1;
            }
            let floor = leading * NUMERICAL_RANK_TOLERANCE;

            let mut best = (1, 0.0);
            for r in 1..=cap {
                let next = singular_values.get(r).copied().unwrap_or(0.0);
                if next <= floor {
                    return r;
                }
                let gap = singular_values[r - 1] / next;
                if gap > best.1 {
                    best = (r, gap);
                }
            }
            best.0
        }
    }
}

/// Decompose the trajectory matrix and keep the leading components.
pub fn decompose(
    trajectory: &TrajectoryMatrix,
    rule: RankSelection,
    max_sweeps: usize,
    tolerance: f64,
) -> Result<SpectralBasis> {
    let covariance = trajectory.lag_covariance();
    let eigen = symmetric_eigen(&covariance, max_sweeps, tolerance)?;

    // Round-off can leave tiny negative eigenvalues on a PSD matrix.
    let singular_values: Vec<f64> = eigen.values.iter().map(|&e| e.max(0.0).sqrt()).collect();
    let rank = select_rank(&singular_values, rule);

    let total: f64 = singular_values.iter().map(|s| s * s).sum();
    let selected: f64 = singular_values[..rank].iter().map(|s| s * s).sum();
    let explained_energy = if total > 0.0 { selected / total } else { 1.0 };

    let triples = eigen
        .vectors
        .into_iter()
        .zip(&singular_values)
        .take(rank)
        .map(|(u, &sigma)| {
            let v = if sigma > 0.0 {
                trajectory
                    .transpose_mul(&u)
                    .into_iter()
                    .map(|x| x / sigma)
                    .collect()
            } else {
                vec![0.0; trajectory.cols()]
            };
            SingularTriple { sigma, u, v }
        })
        .collect();

    debug!(
        window = trajectory.rows(),
        lags = trajectory.cols(),
        sweeps = eigen.sweeps,
        rank,
        explained_energy,
        "spectral decomposition complete"
    );

    Ok(SpectralBasis {
        triples,
        singular_values,
        explained_energy,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mat_vec(a: &[Vec<f64>], x: &[f64]) -> Vec<f64> {
        a.iter()
            .map(|row| row.iter().zip(x).map(|(r, v)| r * v).sum())
            .collect()
    }

    #[test]
    fn eigen_of_diagonal_matrix_needs_no_sweeps() {
        let a = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 3.0, 0.0],
            vec![0.0, 0.0, 2.0],
        ];
        let eig = symmetric_eigen(&a, 10, 1e-12).unwrap();
        assert_eq!(eig.sweeps, 0);
        assert_eq!(eig.values, vec![3.0, 2.0, 1.0]);
        assert_eq!(eig.vectors[0], vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn eigenpairs_satisfy_definition() {
        let a = vec![
            vec![4.0, 1.0, -2.0, 2.0],
            vec![1.0, 2.0, 0.0, 1.0],
            vec![-2.0, 0.0, 3.0, -2.0],
            vec![2.0, 1.0, -2.0, -1.0],
        ];
        let eig = symmetric_eigen(&a, 100, 1e-14).unwrap();

        for (lambda, u) in eig.values.iter().zip(&eig.vectors) {
            let au = mat_vec(&a, u);
            for (x, y) in au.iter().zip(u) {
                assert_relative_eq!(*x, lambda * y, epsilon = 1e-9);
            }
            let norm: f64 = u.iter().map(|x| x * x).sum();
            assert_relative_eq!(norm, 1.0, epsilon = 1e-12);
        }

        // Descending order and trace preservation
        for w in eig.values.windows(2) {
            assert!(w[0] >= w[1]);
        }
        let trace: f64 = eig.values.iter().sum();
        assert_relative_eq!(trace, 8.0, epsilon = 1e-10);
    }

    #[test]
    fn eigenvectors_are_orthogonal() {
        let a = vec![
            vec![2.0, -1.0, 0.0],
            vec![-1.0, 2.0, -1.0],
            vec![0.0, -1.0, 2.0],
        ];
        let eig = symmetric_eigen(&a, 100, 1e-14).unwrap();
        for i in 0..3 {
            for j in i + 1..3 {
                let dot: f64 = eig.vectors[i]
                    .iter()
                    .zip(&eig.vectors[j])
                    .map(|(x, y)| x * y)
                    .sum();
                assert_relative_eq!(dot, 0.0, epsilon = 1e-12);
            }
        }
        assert_relative_eq!(eig.values[0], 2.0 + 2.0_f64.sqrt(), epsilon = 1e-10);
        assert_relative_eq!(eig.values[2], 2.0 - 2.0_f64.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn ties_keep_diagonal_order() {
        let a = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 5.0, 0.0],
            vec![0.0, 0.0, 1.0],
        ];
        let eig = symmetric_eigen(&a, 10, 1e-12).unwrap();
        assert_eq!(eig.vectors[1], vec![1.0, 0.0, 0.0]);
        assert_eq!(eig.vectors[2], vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn sweep_limit_reports_instability() {
        let a = vec![vec![2.0, 1.0], vec![1.0, 2.0]];
        assert!(matches!(
            symmetric_eigen(&a, 0, 1e-12),
            Err(ForecastError::NumericalInstability(_))
        ));
    }

    #[test]
    fn non_finite_input_reports_instability() {
        let a = vec![vec![f64::NAN, 1.0], vec![1.0, 2.0]];
        assert!(matches!(
            symmetric_eigen(&a, 10, 1e-12),
            Err(ForecastError::NumericalInstability(_))
        ));
    }

    #[test]
    fn energy_rank_selection() {
        let sv = [3.0, 2.0, 1.0, 0.5];
        // energies 9, 4, 1, 0.25 of 14.25
        assert_eq!(select_rank(&sv, RankSelection::Energy(0.5)), 1);
        assert_eq!(select_rank(&sv, RankSelection::Energy(0.9)), 2);
        assert_eq!(select_rank(&sv, RankSelection::Energy(0.95)), 3);
        // capped at L - 1
        assert_eq!(select_rank(&sv, RankSelection::Energy(1.0)), 3);
        assert_eq!(select_rank(&sv, RankSelection::Fixed(4)), 4);
        assert_eq!(select_rank(&[0.0, 0.0], RankSelection::Energy(0.9)), 1);
    }

    #[test]
    fn energy_rule_needs_share_above_threshold() {
        // energies 3 and 1 of 4: the first share equals 0.75 exactly
        let sv = [3.0_f64.sqrt(), 1.0, 0.0];
        assert_eq!(select_rank(&sv, RankSelection::Energy(0.75)), 2);
        assert_eq!(select_rank(&sv, RankSelection::Energy(0.74)), 1);
    }

    #[test]
    fn spectral_gap_stops_at_numerical_rank() {
        // exact rank two even though the first gap is larger
        let sv = [100.0, 1.0, 1e-9, 0.0];
        assert_eq!(select_rank(&sv, RankSelection::SpectralGap), 2);
        assert_eq!(select_rank(&[5.0, 0.0, 0.0], RankSelection::SpectralGap), 1);
        assert_eq!(select_rank(&[0.0, 0.0], RankSelection::SpectralGap), 1);
    }

    #[test]
    fn spectral_gap_cuts_at_largest_ratio() {
        // signal pair above a flat noise floor
        let sv = [10.0, 9.5, 0.8, 0.7, 0.65, 0.6, 0.55];
        assert_eq!(select_rank(&sv, RankSelection::SpectralGap), 2);
        // a flat full-rank spectrum is capped at L - 1
        let flat = [1.0, 1.0, 1.0, 1.0];
        assert_eq!(select_rank(&flat, RankSelection::SpectralGap), 1);
        let rising_gap = [8.0, 4.0, 2.0, 0.1];
        assert_eq!(select_rank(&rising_gap, RankSelection::SpectralGap), 3);
    }

    #[test]
    fn decompose_linear_series_keeps_trend_pair() {
        let series: Vec<f64> = (0..30).map(|t| t as f64).collect();
        let x = TrajectoryMatrix::embed(&series, 3).unwrap();

        let gap = decompose(&x, RankSelection::SpectralGap, 100, 1e-12).unwrap();
        assert_eq!(gap.rank(), 2);
        // most of the energy sits in the level component alone
        let energy = decompose(&x, RankSelection::Energy(0.95), 100, 1e-12).unwrap();
        assert_eq!(energy.rank(), 1);
    }

    #[test]
    fn decompose_constant_series_is_rank_one() {
        let series = vec![5.0; 12];
        let x = TrajectoryMatrix::embed(&series, 4).unwrap();
        let basis = decompose(&x, RankSelection::Energy(0.95), 100, 1e-12).unwrap();

        assert_eq!(basis.rank(), 1);
        assert_relative_eq!(basis.explained_energy, 1.0, epsilon = 1e-10);
        let expected_sigma = 5.0 * ((4 * 9) as f64).sqrt();
        assert_relative_eq!(basis.triples[0].sigma, expected_sigma, epsilon = 1e-8);
        for &ui in &basis.triples[0].u {
            assert_relative_eq!(ui.abs(), 0.5, epsilon = 1e-10);
        }
    }

    #[test]
    fn decompose_reconstructs_trajectory() {
        let series: Vec<f64> = (0..20).map(|i| (i as f64 * 0.7).sin() + 0.1 * i as f64).collect();
        let x = TrajectoryMatrix::embed(&series, 5).unwrap();
        let basis = decompose(&x, RankSelection::Fixed(5), 100, 1e-14).unwrap();

        // Full rank: Σ σ u vᵗ reproduces X
        for i in 0..x.rows() {
            for j in 0..x.cols() {
                let value: f64 = basis
                    .triples
                    .iter()
                    .map(|t| t.sigma * t.u[i] * t.v[j])
                    .sum();
                assert_relative_eq!(value, x.get(i, j), epsilon = 1e-8);
            }
        }
    }
}
