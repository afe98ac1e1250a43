use crate::error::RiskEngineError;
use crate::types::SampledReturns;
use crate::EngineResult;

/// Weighted portfolio return per sample: `R_p[k] = Σ_i w_i·R_i[k]`.
pub fn aggregate(returns: &SampledReturns, weights: &[f64]) -> EngineResult<Vec<f64>> {
    if weights.len() != returns.assets() {
        return Err(RiskEngineError::config(
            "weights",
            format!(
                "Expected {} weights (one per sampled asset), got {}",
                returns.assets(),
                weights.len()
            ),
        ));
    }

    let mut portfolio = vec![0.0; returns.samples()];
    for (row, w) in returns.rows().zip(weights) {
        for (p, r) in portfolio.iter_mut().zip(row) {
            *p += w * r;
        }
    }
    Ok(portfolio)
}

/// `Σ_i w_i·μ_i`.
pub fn weighted_mean(means: &[f64], weights: &[f64]) -> EngineResult<f64> {
    if means.len() != weights.len() {
        return Err(RiskEngineError::config(
            "weights",
            format!("Expected {} weights, got {}", means.len(), weights.len()),
        ));
    }
    Ok(means.iter().zip(weights).map(|(m, w)| m * w).sum())
}
