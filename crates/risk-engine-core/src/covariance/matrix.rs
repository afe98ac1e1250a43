use serde::{Deserialize, Serialize};

use crate::error::RiskEngineError;
use crate::EngineResult;

/// Maximum tolerated `|ρ[i][j] − ρ[j][i]|`.
pub const SYMMETRY_TOLERANCE: f64 = 1e-9;

const DIAGONAL_TOLERANCE: f64 = 1e-9;

/// Validated correlation matrix, stored row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    dim: usize,
    data: Vec<f64>,
}

impl CorrelationMatrix {
    /// Build from rows, checking shape, unit diagonal, symmetry and range.
    pub fn new(rows: &[Vec<f64>]) -> EngineResult<Self> {
        let dim = rows.len();
        if dim == 0 {
            return Err(RiskEngineError::config(
                "correlation",
                "Matrix must have at least one row",
            ));
        }
        for (i, row) in rows.iter().enumerate() {
            if row.len() != dim {
                return Err(RiskEngineError::config(
                    format!("correlation[{i}]"),
                    format!("Expected {dim} columns, got {}", row.len()),
                ));
            }
        }

        for i in 0..dim {
            let diag = rows[i][i];
            if !((diag - 1.0).abs() <= DIAGONAL_TOLERANCE) {
                return Err(RiskEngineError::config(
                    format!("correlation[{i}][{i}]"),
                    format!("Diagonal must be 1, got {diag}"),
                ));
            }
            for j in (i + 1)..dim {
                let (a, b) = (rows[i][j], rows[j][i]);
                if !a.is_finite() || !(-1.0..=1.0).contains(&a) {
                    return Err(RiskEngineError::config(
                        format!("correlation[{i}][{j}]"),
                        format!("Must be in [-1, 1], got {a}"),
                    ));
                }
                if !b.is_finite() || !(-1.0..=1.0).contains(&b) {
                    return Err(RiskEngineError::config(
                        format!("correlation[{j}][{i}]"),
                        format!("Must be in [-1, 1], got {b}"),
                    ));
                }
                if (a - b).abs() > SYMMETRY_TOLERANCE {
                    return Err(RiskEngineError::config(
                        format!("correlation[{i}][{j}]"),
                        format!("Matrix is not symmetric: {a} vs {b}"),
                    ));
                }
            }
        }

        let mut data = Vec::with_capacity(dim * dim);
        for row in rows {
            data.extend_from_slice(row);
        }
        Ok(CorrelationMatrix { dim, data })
    }

    pub fn identity(dim: usize) -> Self {
        let mut data = vec![0.0; dim * dim];
        for i in 0..dim {
            data[i * dim + i] = 1.0;
        }
        CorrelationMatrix { dim, data }
    }

    /// Wrap an already-repaired matrix without re-running the range checks.
    pub(crate) fn from_trusted(dim: usize, data: Vec<f64>) -> Self {
        CorrelationMatrix { dim, data }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.dim + j]
    }

    pub(crate) fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.chunks(self.dim).map(|r| r.to_vec()).collect()
    }
}

/// `Σ[i][j] = ρ[i][j]·σ[i]·σ[j]`. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CovarianceMatrix {
    dim: usize,
    data: Vec<f64>,
}

impl CovarianceMatrix {
    pub fn build(volatilities: &[f64], correlation: &CorrelationMatrix) -> EngineResult<Self> {
        let dim = correlation.dim();
        if volatilities.len() != dim {
            return Err(RiskEngineError::config(
                "volatilities",
                format!(
                    "Expected {dim} volatilities to match the correlation matrix, got {}",
                    volatilities.len()
                ),
            ));
        }
        if let Some(i) = volatilities
            .iter()
            .position(|s| !s.is_finite() || *s < 0.0)
        {
            return Err(RiskEngineError::config(
                format!("volatilities[{i}]"),
                format!("Must be finite and >= 0, got {}", volatilities[i]),
            ));
        }

        let mut data = vec![0.0; dim * dim];
        for i in 0..dim {
            for j in 0..dim {
                data[i * dim + j] = correlation.get(i, j) * volatilities[i] * volatilities[j];
            }
        }
        Ok(CovarianceMatrix { dim, data })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.dim + j]
    }

    pub fn variances(&self) -> Vec<f64> {
        (0..self.dim).map(|i| self.get(i, i)).collect()
    }

    /// `wᵗ Σ w`.
    pub fn quadratic_form(&self, weights: &[f64]) -> EngineResult<f64> {
        if weights.len() != self.dim {
            return Err(RiskEngineError::config(
                "weights",
                format!(
                    "Expected {} weights to match the covariance matrix, got {}",
                    self.dim,
                    weights.len()
                ),
            ));
        }
        let mut total = 0.0;
        for i in 0..self.dim {
            for j in 0..self.dim {
                total += weights[i] * weights[j] * self.get(i, j);
            }
        }
        Ok(total)
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.chunks(self.dim).map(|r| r.to_vec()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two(rho: f64) -> Vec<Vec<f64>> {
        vec![vec![1.0, rho], vec![rho, 1.0]]
    }

    #[test]
    fn test_valid_correlation_accepted() {
        let corr = CorrelationMatrix::new(&two_by_two(0.4)).unwrap();
        assert_eq!(corr.dim(), 2);
        assert_eq!(corr.get(0, 1), 0.4);
        assert_eq!(corr.to_rows(), two_by_two(0.4));
    }

    #[test]
    fn test_out_of_range_entry_rejected() {
        let err = CorrelationMatrix::new(&two_by_two(1.5)).unwrap_err();
        assert!(err.is_configuration_error());
        assert!(err.to_string().contains("[-1, 1]"), "{err}");
    }

    #[test]
    fn test_asymmetric_rejected() {
        let rows = vec![vec![1.0, 0.3], vec![0.2, 1.0]];
        let err = CorrelationMatrix::new(&rows).unwrap_err();
        assert!(err.to_string().contains("symmetric"), "{err}");
    }

    #[test]
    fn test_near_symmetric_within_tolerance_accepted() {
        let rows = vec![vec![1.0, 0.3], vec![0.3 + 1e-12, 1.0]];
        assert!(CorrelationMatrix::new(&rows).is_ok());
    }

    #[test]
    fn test_bad_diagonal_rejected() {
        let rows = vec![vec![0.9, 0.3], vec![0.3, 1.0]];
        assert!(CorrelationMatrix::new(&rows).is_err());
    }

    #[test]
    fn test_non_square_rejected() {
        let rows = vec![vec![1.0, 0.3, 0.1], vec![0.3, 1.0]];
        assert!(CorrelationMatrix::new(&rows).is_err());
        assert!(CorrelationMatrix::new(&[]).is_err());
    }

    #[test]
    fn test_covariance_entries() {
        let corr = CorrelationMatrix::new(&two_by_two(0.4)).unwrap();
        let cov = CovarianceMatrix::build(&[0.012, 0.009], &corr).unwrap();
        assert!((cov.get(0, 0) - 0.000144).abs() < 1e-18);
        assert!((cov.get(1, 1) - 0.000081).abs() < 1e-18);
        assert!((cov.get(0, 1) - 0.4 * 0.012 * 0.009).abs() < 1e-18);
        assert_eq!(cov.get(0, 1), cov.get(1, 0));
    }

    #[test]
    fn test_quadratic_form_two_asset() {
        let corr = CorrelationMatrix::new(&two_by_two(0.4)).unwrap();
        let cov = CovarianceMatrix::build(&[0.012, 0.009], &corr).unwrap();
        let var = cov.quadratic_form(&[0.6, 0.4]).unwrap();
        assert!((var - 8.5536e-5).abs() < 1e-15, "var={var}");
    }

    #[test]
    fn test_volatility_count_mismatch() {
        let corr = CorrelationMatrix::identity(3);
        assert!(CovarianceMatrix::build(&[0.1, 0.2], &corr).is_err());
    }

    #[test]
    fn test_negative_volatility_rejected() {
        let corr = CorrelationMatrix::identity(2);
        assert!(CovarianceMatrix::build(&[0.1, -0.2], &corr).is_err());
    }
}
