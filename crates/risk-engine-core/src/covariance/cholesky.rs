use nalgebra::{DMatrix, SymmetricEigen};
use serde::{Deserialize, Serialize};

use super::matrix::{CorrelationMatrix, CovarianceMatrix};
use crate::error::RiskEngineError;
use crate::EngineResult;

/// Relative size below which a pivot is treated as zero.
const PIVOT_TOLERANCE: f64 = 1e-12;

/// Relative size of an off-diagonal residual tolerated under a zero pivot.
const RESIDUAL_TOLERANCE: f64 = 1e-10;

/// Smallest eigenvalue kept by [`PsdRepair::ClipEigenvalues`].
pub const EIGENVALUE_FLOOR: f64 = 1e-10;

/// What to do when a correlation matrix is not positive semi-definite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PsdRepair {
    /// Fail with [`RiskEngineError::NotPositiveSemiDefinite`].
    #[default]
    Strict,
    /// Rebuild the correlation matrix with eigenvalues raised to
    /// [`EIGENVALUE_FLOOR`], then restore the unit diagonal.
    ClipEigenvalues,
}

/// Lower-triangular `L` with `L·Lᵗ = Σ`, stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CholeskyFactor {
    dim: usize,
    data: Vec<f64>,
}

impl CholeskyFactor {
    /// The 1×1 factor of a single variance `σ²`.
    pub fn from_volatility(volatility: f64) -> Self {
        CholeskyFactor {
            dim: 1,
            data: vec![volatility],
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.dim + j]
    }

    /// `L·Lᵗ`, row-major.
    pub fn reconstruct(&self) -> Vec<Vec<f64>> {
        let n = self.dim;
        (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| (0..=i.min(j)).map(|k| self.get(i, k) * self.get(j, k)).sum())
                    .collect()
            })
            .collect()
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.chunks(self.dim).map(|r| r.to_vec()).collect()
    }
}

/// Sequential (row-by-row) Cholesky factorization.
///
/// A pivot below `-tolerance` means the matrix is not PSD. A pivot within
/// tolerance of zero is accepted as a singular direction: the column below
/// it is zeroed, provided the remaining residuals are also zero.
pub fn factorize(cov: &CovarianceMatrix) -> EngineResult<CholeskyFactor> {
    let n = cov.dim();
    let scale = (0..n)
        .map(|i| cov.get(i, i).abs())
        .fold(0.0_f64, f64::max)
        .max(f64::MIN_POSITIVE);
    let pivot_tol = PIVOT_TOLERANCE * scale;
    let residual_tol = RESIDUAL_TOLERANCE * scale;

    let mut l = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[i * n + k] * l[j * n + k];
            }

            if i == j {
                let pivot = cov.get(i, i) - sum;
                if pivot < -pivot_tol {
                    return Err(RiskEngineError::NotPositiveSemiDefinite { index: i, pivot });
                }
                l[i * n + i] = if pivot <= pivot_tol { 0.0 } else { pivot.sqrt() };
            } else {
                let residual = cov.get(i, j) - sum;
                let ljj = l[j * n + j];
                if ljj == 0.0 {
                    if residual.abs() > residual_tol {
                        return Err(RiskEngineError::NotPositiveSemiDefinite {
                            index: j,
                            pivot: 0.0,
                        });
                    }
                    l[i * n + j] = 0.0;
                } else {
                    l[i * n + j] = residual / ljj;
                }
            }
        }
    }

    Ok(CholeskyFactor { dim: n, data: l })
}

/// Nearest-PSD style repair: clip the spectrum, then rescale to unit diagonal.
///
/// Returns the repaired matrix and the smallest eigenvalue of the input.
pub fn clip_eigenvalues(corr: &CorrelationMatrix) -> (CorrelationMatrix, f64) {
    let n = corr.dim();
    let eigen = SymmetricEigen::new(DMatrix::from_row_slice(n, n, corr.as_slice()));
    let min_eigenvalue = eigen.eigenvalues.iter().copied().fold(f64::INFINITY, f64::min);

    let clipped = eigen.eigenvalues.map(|l| l.max(EIGENVALUE_FLOOR));
    let rebuilt =
        &eigen.eigenvectors * DMatrix::from_diagonal(&clipped) * eigen.eigenvectors.transpose();

    let mut data = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            data[i * n + j] = if i == j {
                1.0
            } else {
                let v = rebuilt[(i, j)] / (rebuilt[(i, i)] * rebuilt[(j, j)]).sqrt();
                v.clamp(-1.0, 1.0)
            };
        }
    }
    // symmetrize rounding noise
    for i in 0..n {
        for j in (i + 1)..n {
            let avg = 0.5 * (data[i * n + j] + data[j * n + i]);
            data[i * n + j] = avg;
            data[j * n + i] = avg;
        }
    }

    (CorrelationMatrix::from_trusted(n, data), min_eigenvalue)
}
