pub mod cholesky;
pub mod matrix;

pub use cholesky::{factorize, CholeskyFactor, PsdRepair};
pub use matrix::{CorrelationMatrix, CovarianceMatrix};

use tracing::{debug, warn};

use crate::error::RiskEngineError;
use crate::EngineResult;

/// Covariance matrix and its Cholesky factor for one set of assets.
#[derive(Debug, Clone)]
pub struct CovarianceModel {
    correlation: CorrelationMatrix,
    covariance: CovarianceMatrix,
    factor: CholeskyFactor,
    repaired_min_eigenvalue: Option<f64>,
}

impl CovarianceModel {
    /// Validate `correlation`, build `Σ` and factorize it.
    ///
    /// With [`PsdRepair::Strict`] a non-PSD matrix is an error. With
    /// [`PsdRepair::ClipEigenvalues`] the correlation matrix is repaired once
    /// and factorized again; [`CovarianceModel::repair_applied`] then reports
    /// the offending eigenvalue.
    pub fn new(
        volatilities: &[f64],
        correlation: &[Vec<f64>],
        repair: PsdRepair,
    ) -> EngineResult<Self> {
        let correlation = CorrelationMatrix::new(correlation)?;
        Self::from_correlation(volatilities, correlation, repair)
    }

    pub fn from_correlation(
        volatilities: &[f64],
        correlation: CorrelationMatrix,
        repair: PsdRepair,
    ) -> EngineResult<Self> {
        let covariance = CovarianceMatrix::build(volatilities, &correlation)?;
        match factorize(&covariance) {
            Ok(factor) => {
                debug!(assets = covariance.dim(), "covariance factorized");
                Ok(CovarianceModel {
                    correlation,
                    covariance,
                    factor,
                    repaired_min_eigenvalue: None,
                })
            }
            Err(RiskEngineError::NotPositiveSemiDefinite { index, pivot })
                if repair == PsdRepair::ClipEigenvalues =>
            {
                let (repaired, min_eigenvalue) = cholesky::clip_eigenvalues(&correlation);
                warn!(
                    index,
                    pivot, min_eigenvalue, "correlation matrix not PSD, clipping eigenvalues"
                );
                let covariance = CovarianceMatrix::build(volatilities, &repaired)?;
                let factor = factorize(&covariance)?;
                Ok(CovarianceModel {
                    correlation: repaired,
                    covariance,
                    factor,
                    repaired_min_eigenvalue: Some(min_eigenvalue),
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Single asset: `Σ = [σ²]`, `L = [σ]`.
    pub fn single(volatility: f64) -> EngineResult<Self> {
        Self::from_correlation(&[volatility], CorrelationMatrix::identity(1), PsdRepair::Strict)
    }

    pub fn dim(&self) -> usize {
        self.covariance.dim()
    }

    pub fn correlation(&self) -> &CorrelationMatrix {
        &self.correlation
    }

    pub fn covariance(&self) -> &CovarianceMatrix {
        &self.covariance
    }

    pub fn factor(&self) -> &CholeskyFactor {
        &self.factor
    }

    /// Smallest eigenvalue of the original correlation matrix, when a repair ran.
    pub fn repair_applied(&self) -> Option<f64> {
        self.repaired_min_eigenvalue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inconsistent() -> Vec<Vec<f64>> {
        vec![
            vec![1.0, 0.9, -0.9],
            vec![0.9, 1.0, 0.9],
            vec![-0.9, 0.9, 1.0],
        ]
    }

    #[test]
    fn test_strict_policy_surfaces_error() {
        let err = CovarianceModel::new(&[0.1, 0.1, 0.1], &inconsistent(), PsdRepair::Strict)
            .unwrap_err();
        assert!(matches!(err, RiskEngineError::NotPositiveSemiDefinite { .. }));
    }

    #[test]
    fn test_clip_policy_repairs() {
        let model =
            CovarianceModel::new(&[0.1, 0.1, 0.1], &inconsistent(), PsdRepair::ClipEigenvalues)
                .unwrap();
        assert!(model.repair_applied().unwrap() < 0.0);
        assert_eq!(model.dim(), 3);
    }

    #[test]
    fn test_valid_matrix_not_repaired() {
        let model = CovarianceModel::new(
            &[0.012, 0.009],
            &[vec![1.0, 0.4], vec![0.4, 1.0]],
            PsdRepair::ClipEigenvalues,
        )
        .unwrap();
        assert!(model.repair_applied().is_none());
        assert_eq!(model.correlation().get(0, 1), 0.4);
    }

    #[test]
    fn test_range_error_precedes_factorization() {
        let err = CovarianceModel::new(
            &[0.1, 0.1],
            &[vec![1.0, 1.5], vec![1.5, 1.0]],
            PsdRepair::ClipEigenvalues,
        )
        .unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_single_asset_model() {
        let model = CovarianceModel::single(0.02).unwrap();
        assert!((model.factor().get(0, 0) - 0.02).abs() < 1e-15);
        assert!((model.covariance().get(0, 0) - 0.0004).abs() < 1e-18);
    }
}
