use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::covariance::{CorrelationMatrix, CovarianceMatrix};
use crate::error::RiskEngineError;
use crate::types::{with_metadata, ComputationOutput, Rate};
use crate::EngineResult;

/// Two-asset portfolio volatility as a function of correlation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationSweepInput {
    /// `[σ1, σ2]`
    pub volatilities: Vec<Rate>,
    /// `[w1, w2]`
    pub weights: Vec<f64>,
    #[serde(default = "default_rho_min")]
    pub rho_min: f64,
    #[serde(default = "default_rho_max")]
    pub rho_max: f64,
    #[serde(default = "default_points")]
    pub points: usize,
}

fn default_rho_min() -> f64 {
    -1.0
}

fn default_rho_max() -> f64 {
    1.0
}

fn default_points() -> usize {
    11
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationSweepPoint {
    pub rho: f64,
    pub portfolio_variance: f64,
    pub portfolio_volatility: Rate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationSweepOutput {
    pub points: Vec<CorrelationSweepPoint>,
    /// `|w1|σ1 + |w2|σ2`: the ρ = 1 volatility for long-only weights.
    pub undiversified_volatility: Rate,
    /// Smallest volatility on the grid and the ρ where it occurs.
    pub min_volatility: Rate,
    pub min_volatility_rho: f64,
}

/// `points` equally spaced values on `[lo, hi]`, both ends included.
fn linspace(lo: f64, hi: f64, points: usize) -> Vec<f64> {
    if points == 1 {
        return vec![lo];
    }
    let step = (hi - lo) / (points - 1) as f64;
    (0..points)
        .map(|i| if i + 1 == points { hi } else { lo + step * i as f64 })
        .collect()
}

fn validate(input: &CorrelationSweepInput) -> EngineResult<()> {
    if input.volatilities.len() != 2 {
        return Err(RiskEngineError::config(
            "volatilities",
            format!("Expected 2 volatilities, got {}", input.volatilities.len()),
        ));
    }
    if input.weights.len() != 2 {
        return Err(RiskEngineError::config(
            "weights",
            format!("Expected 2 weights, got {}", input.weights.len()),
        ));
    }
    if let Some(w) = input.weights.iter().find(|w| !w.is_finite()) {
        return Err(RiskEngineError::config(
            "weights",
            format!("Must be finite, got {w}"),
        ));
    }
    for (name, rho) in [("rho_min", input.rho_min), ("rho_max", input.rho_max)] {
        if !rho.is_finite() || !(-1.0..=1.0).contains(&rho) {
            return Err(RiskEngineError::config(
                name,
                format!("Must lie in [-1, 1], got {rho}"),
            ));
        }
    }
    if input.rho_min > input.rho_max {
        return Err(RiskEngineError::config(
            "rho_min",
            "Must not exceed rho_max",
        ));
    }
    if input.points == 0 {
        return Err(RiskEngineError::config("points", "Must be at least 1"));
    }
    Ok(())
}

/// Evaluate `σ_p(ρ)` across a grid of correlations.
pub fn run_correlation_sweep(
    input: &CorrelationSweepInput,
) -> EngineResult<ComputationOutput<CorrelationSweepOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    validate(input)?;

    let points = linspace(input.rho_min, input.rho_max, input.points)
        .into_iter()
        .map(|rho| {
            let corr = CorrelationMatrix::new(&[vec![1.0, rho], vec![rho, 1.0]])?;
            let cov = CovarianceMatrix::build(&input.volatilities, &corr)?;
            let variance = cov.quadratic_form(&input.weights)?.max(0.0);
            Ok(CorrelationSweepPoint {
                rho,
                portfolio_variance: variance,
                portfolio_volatility: variance.sqrt(),
            })
        })
        .collect::<EngineResult<Vec<_>>>()?;

    let undiversified_volatility = input
        .weights
        .iter()
        .zip(&input.volatilities)
        .map(|(w, s)| w.abs() * s)
        .sum();

    let (min_volatility, min_volatility_rho) = points
        .iter()
        .map(|p| (p.portfolio_volatility, p.rho))
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .unwrap_or((0.0, input.rho_min));

    if input.weights.iter().any(|w| *w < 0.0) {
        warnings.push("short weights: volatility is no longer increasing in rho".into());
    }

    let output = CorrelationSweepOutput {
        points,
        undiversified_volatility,
        min_volatility,
        min_volatility_rho,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Two-Asset Portfolio Volatility vs Correlation",
        &serde_json::json!({
            "volatilities": input.volatilities,
            "weights": input.weights,
            "rho_range": [input.rho_min, input.rho_max],
            "points": input.points,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_input() -> CorrelationSweepInput {
        CorrelationSweepInput {
            volatilities: vec![0.012, 0.009],
            weights: vec![0.6, 0.4],
            rho_min: -1.0,
            rho_max: 1.0,
            points: 11,
        }
    }

    #[test]
    fn test_grid_endpoints_match_closed_form() {
        let out = run_correlation_sweep(&base_input()).unwrap().result;
        assert_eq!(out.points.len(), 11);
        let first = &out.points[0];
        let last = &out.points[10];
        assert_eq!(first.rho, -1.0);
        assert_eq!(last.rho, 1.0);
        // ρ = −1: |0.6·0.012 − 0.4·0.009| = 0.0036
        assert!((first.portfolio_volatility - 0.0036).abs() < 1e-12);
        // ρ = 1: 0.6·0.012 + 0.4·0.009 = 0.0108
        assert!((last.portfolio_volatility - 0.0108).abs() < 1e-12);
        assert!((out.undiversified_volatility - 0.0108).abs() < 1e-15);
    }

    #[test]
    fn test_volatility_increasing_in_rho_for_long_weights() {
        let out = run_correlation_sweep(&base_input()).unwrap();
        let vols: Vec<f64> = out.result.points.iter().map(|p| p.portfolio_volatility).collect();
        assert!(vols.windows(2).all(|w| w[1] > w[0]));
        assert_eq!(out.result.min_volatility_rho, -1.0);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_reference_point() {
        let mut input = base_input();
        input.rho_min = 0.4;
        input.rho_max = 0.4;
        input.points = 1;
        let out = run_correlation_sweep(&input).unwrap().result;
        assert!((out.points[0].portfolio_variance - 8.5536e-5).abs() < 1e-15);
    }

    #[test]
    fn test_perfect_hedge_clamped_to_zero() {
        let input = CorrelationSweepInput {
            volatilities: vec![0.01, 0.01],
            weights: vec![0.5, 0.5],
            rho_min: -1.0,
            rho_max: -1.0,
            points: 1,
        };
        let out = run_correlation_sweep(&input).unwrap().result;
        assert!(out.points[0].portfolio_variance >= 0.0);
        assert!(out.points[0].portfolio_volatility < 1e-12);
    }

    #[test]
    fn test_invalid_inputs() {
        let mut input = base_input();
        input.rho_max = 1.5;
        assert!(run_correlation_sweep(&input).unwrap_err().is_configuration_error());

        let mut input = base_input();
        input.volatilities = vec![0.01];
        assert!(run_correlation_sweep(&input).is_err());

        let mut input = base_input();
        input.points = 0;
        assert!(run_correlation_sweep(&input).is_err());

        let mut input = base_input();
        input.rho_min = 0.5;
        input.rho_max = -0.5;
        assert!(run_correlation_sweep(&input).is_err());
    }

    #[test]
    fn test_defaults_from_json() {
        let input: CorrelationSweepInput =
            serde_json::from_str(r#"{"volatilities": [0.2, 0.1], "weights": [0.5, 0.5]}"#)
                .unwrap();
        assert_eq!(input.points, 11);
        assert_eq!(input.rho_min, -1.0);
        assert_eq!(input.rho_max, 1.0);
    }

    #[test]
    fn test_linspace() {
        let g = linspace(-1.0, 1.0, 11);
        assert_eq!(g.len(), 11);
        assert!((g[5]).abs() < 1e-15);
        assert_eq!(g[10], 1.0);
    }
}
