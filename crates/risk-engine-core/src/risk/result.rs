use serde::{Deserialize, Serialize};
use tracing::debug;

use super::estimators::{
    analytical_var, empirical_variance, expected_shortfall, losses, validate_confidence,
};
use super::statistics::{build_histogram, percentile_sorted, sorted_copy, summarize_sorted};
use super::statistics::{HistogramBin, SummaryStatistics};
use crate::error::RiskEngineError;
use crate::types::{Money, Rate};
use crate::EngineResult;

/// Bins used for the loss histogram.
pub const LOSS_HISTOGRAM_BINS: usize = 60;

/// Analytical and Monte Carlo risk figures for one return series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskResult {
    pub portfolio_value: Money,
    /// Confidence level in percent.
    pub confidence: f64,
    pub z_score: f64,
    /// `V·(z·σ − μ)`.
    pub analytical_var: Money,
    /// `confidence`-th percentile of the simulated losses.
    pub empirical_var: Money,
    /// `empirical_var − analytical_var`; non-zero beyond noise when returns are not normal.
    pub var_difference: Money,
    pub expected_shortfall: Money,
    pub analytical_variance: f64,
    pub empirical_variance: f64,
    /// Return below which the normal tail starts: `μ − z·σ`.
    pub tail_cutoff_return: Rate,
    /// Expected single-period return of the model.
    pub theoretical_mean: Rate,
    /// Statistics of the simulated return series.
    pub summary: SummaryStatistics,
    pub loss_histogram: Vec<HistogramBin>,
}

/// Model moments that the simulated series is compared against.
#[derive(Debug, Clone, Copy)]
pub struct AnalyticalMoments {
    pub mean: Rate,
    pub variance: f64,
}

/// Shared estimation stage: analytical figures from `moments`, empirical
/// figures from `returns`.
pub fn estimate_risk(
    returns: &[Rate],
    value: Money,
    moments: AnalyticalMoments,
    confidence: f64,
    z: f64,
) -> EngineResult<RiskResult> {
    validate_confidence(confidence)?;
    if returns.is_empty() {
        return Err(RiskEngineError::config(
            "returns",
            "At least one simulated return is required",
        ));
    }
    if let Some(k) = returns.iter().position(|r| !r.is_finite()) {
        return Err(RiskEngineError::NumericOverflow {
            stage: "risk estimation".into(),
            detail: format!("non-finite return at sample {k}"),
        });
    }

    let sigma = moments.variance.max(0.0).sqrt();
    let analytical = analytical_var(value, moments.mean, sigma, z);

    let loss = losses(value, returns);
    let sorted_losses = sorted_copy(&loss);
    let empirical = percentile_sorted(&sorted_losses, confidence);
    let shortfall = expected_shortfall(&loss, confidence)?;

    let sorted_returns = sorted_copy(returns);
    let summary = summarize_sorted(&sorted_returns);
    let empirical_variance = empirical_variance(returns)?;

    debug!(
        samples = returns.len(),
        analytical_var = analytical,
        empirical_var = empirical,
        "risk estimated"
    );

    Ok(RiskResult {
        portfolio_value: value,
        confidence,
        z_score: z,
        analytical_var: analytical,
        empirical_var: empirical,
        var_difference: empirical - analytical,
        expected_shortfall: shortfall,
        analytical_variance: moments.variance,
        empirical_variance,
        tail_cutoff_return: moments.mean - z * sigma,
        theoretical_mean: moments.mean,
        summary,
        loss_histogram: build_histogram(&sorted_losses, LOSS_HISTOGRAM_BINS),
    })
}
