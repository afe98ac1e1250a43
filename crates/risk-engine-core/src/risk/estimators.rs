//! Closed-form and empirical VaR / variance estimators.
//!
//! Every function here is pure and operates on samples produced upstream.
//! Confidence levels are percentages in the open interval `(0, 100)`.

use statrs::distribution::{ContinuousCDF, Normal};

use super::statistics::{mean, percentile_sorted, population_variance, sorted_copy};
use crate::covariance::{CorrelationMatrix, CovarianceMatrix};
use crate::error::RiskEngineError;
use crate::types::{Money, Rate};
use crate::EngineResult;

/// Rounded one-sided quantiles conventionally quoted for VaR.
const Z_TABLE: [(f64, f64); 5] = [
    (90.0, 1.282),
    (95.0, 1.645),
    (97.5, 1.960),
    (99.0, 2.326),
    (99.5, 2.576),
];

pub fn validate_confidence(confidence: f64) -> EngineResult<()> {
    if !confidence.is_finite() || confidence <= 0.0 || confidence >= 100.0 {
        return Err(RiskEngineError::config(
            "confidence",
            format!("Must be a percentage in (0, 100), got {confidence}"),
        ));
    }
    Ok(())
}

/// One-sided standard normal quantile for `confidence` percent.
///
/// The standard desk levels return their rounded table value (95 → 1.645);
/// anything else uses the exact normal inverse CDF.
pub fn z_score(confidence: f64) -> EngineResult<f64> {
    validate_confidence(confidence)?;
    if let Some(&(_, z)) = Z_TABLE.iter().find(|(c, _)| (c - confidence).abs() < 1e-9) {
        return Ok(z);
    }
    let standard = Normal::new(0.0, 1.0).map_err(|e| {
        RiskEngineError::config("distribution", format!("Invalid Normal parameters: {e}"))
    })?;
    Ok(standard.inverse_cdf(confidence / 100.0))
}

/// The quantile a pipeline uses: a caller's override, or [`z_score`].
pub fn resolve_z(confidence: f64, z_override: Option<f64>) -> EngineResult<f64> {
    match z_override {
        Some(z) => {
            validate_confidence(confidence)?;
            if !z.is_finite() {
                return Err(RiskEngineError::config(
                    "z_score",
                    format!("Must be finite, got {z}"),
                ));
            }
            Ok(z)
        }
        None => z_score(confidence),
    }
}

/// Parametric VaR `V·(z·σ − μ)` under normally distributed returns.
pub fn analytical_var(value: Money, mu: Rate, sigma: Rate, z: f64) -> Money {
    value * (z * sigma - mu)
}

/// Losses `−V·R` for each return.
pub fn losses(value: Money, returns: &[Rate]) -> Vec<Money> {
    returns.iter().map(|r| -value * r).collect()
}

fn check_losses(losses: &[Money]) -> EngineResult<()> {
    if losses.is_empty() {
        return Err(RiskEngineError::config(
            "losses",
            "At least one loss observation is required",
        ));
    }
    if let Some(k) = losses.iter().position(|l| !l.is_finite()) {
        return Err(RiskEngineError::NumericOverflow {
            stage: "risk estimation".into(),
            detail: format!("non-finite loss at sample {k}"),
        });
    }
    Ok(())
}

/// The `confidence`-th percentile of `losses` (linear interpolation).
pub fn empirical_var(losses: &[Money], confidence: f64) -> EngineResult<Money> {
    validate_confidence(confidence)?;
    check_losses(losses)?;
    Ok(percentile_sorted(&sorted_copy(losses), confidence))
}

/// Mean of the losses at or beyond the empirical VaR.
pub fn expected_shortfall(losses: &[Money], confidence: f64) -> EngineResult<Money> {
    validate_confidence(confidence)?;
    check_losses(losses)?;
    let sorted = sorted_copy(losses);
    let var = percentile_sorted(&sorted, confidence);
    let tail: Vec<f64> = sorted.iter().copied().filter(|l| *l >= var).collect();
    Ok(if tail.is_empty() { var } else { mean(&tail) })
}

/// `wᵗ Σ w` with `Σ[i][j] = ρ[i][j]·σ[i]·σ[j]`.
pub fn analytical_variance(
    weights: &[f64],
    volatilities: &[Rate],
    correlation: &CorrelationMatrix,
) -> EngineResult<f64> {
    CovarianceMatrix::build(volatilities, correlation)?.quadratic_form(weights)
}

/// Sample variance with the population divisor `n`.
pub fn empirical_variance(samples: &[f64]) -> EngineResult<f64> {
    if samples.is_empty() {
        return Err(RiskEngineError::config(
            "samples",
            "At least one observation is required",
        ));
    }
    Ok(population_variance(samples))
}
