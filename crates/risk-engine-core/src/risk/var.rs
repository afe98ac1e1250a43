use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::estimators::resolve_z;
use super::result::{estimate_risk, AnalyticalMoments, RiskResult};
use crate::config::{DistributionFamily, ParameterBasis, SimulationConfig};
use crate::covariance::CovarianceModel;
use crate::error::RiskEngineError;
use crate::sampling::sample;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::EngineResult;

/// Input for single-asset Value-at-Risk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarInput {
    pub portfolio_value: Money,
    /// Expected return, quoted on `basis`.
    pub drift: Rate,
    /// Return volatility, quoted on `basis`.
    pub volatility: Rate,
    #[serde(default)]
    pub basis: ParameterBasis,
    /// Confidence level in percent.
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_score: Option<f64>,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

fn default_confidence() -> f64 {
    95.0
}

/// One-period VaR of a single position, analytical against Monte Carlo.
///
/// Normal returns draw `μ + σ·Z`; Student-t returns draw
/// `μ + σ·t/sqrt(ν/(ν−2))` so the simulated variance still equals `σ²` and
/// only the tail shape differs.
pub fn run_value_at_risk(input: &VarInput) -> EngineResult<ComputationOutput<RiskResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if !input.portfolio_value.is_finite() {
        return Err(RiskEngineError::config("portfolio_value", "Must be finite"));
    }
    if input.portfolio_value <= 0.0 {
        warnings.push("non-positive portfolio value: VaR sign is inverted".into());
    }
    if !input.drift.is_finite() {
        return Err(RiskEngineError::config("drift", "Must be finite"));
    }
    if !input.volatility.is_finite() || input.volatility < 0.0 {
        return Err(RiskEngineError::config(
            "volatility",
            format!("Must be finite and >= 0, got {}", input.volatility),
        ));
    }
    input.simulation.validate()?;
    let z = resolve_z(input.confidence, input.z_score)?;

    let (mu, sigma) = input.basis.to_periodic(input.drift, input.volatility)?;
    let model = CovarianceModel::single(sigma)?;
    let sampled = sample(
        model.factor(),
        &[mu],
        input.simulation.num_simulations as usize,
        input.simulation.seed,
        &input.simulation.distribution,
    )?;
    let returns = sampled.into_series();

    let moments = AnalyticalMoments {
        mean: mu,
        variance: sigma * sigma,
    };
    let result = estimate_risk(&returns, input.portfolio_value, moments, input.confidence, z)?;

    if let DistributionFamily::StudentT { degrees_of_freedom } = input.simulation.distribution {
        warnings.push(format!(
            "analytical VaR assumes normal returns; Monte Carlo VaR uses Student-t (nu = {degrees_of_freedom}), difference {:.2}",
            result.var_difference
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Value-at-Risk: parametric normal vs Monte Carlo percentile",
        &serde_json::json!({
            "basis": input.basis,
            "periodic_drift": mu,
            "periodic_volatility": sigma,
            "confidence": input.confidence,
            "z_score": z,
            "num_simulations": input.simulation.num_simulations,
            "seed": input.simulation.seed,
            "distribution": input.simulation.distribution.label(),
        }),
        warnings,
        elapsed,
        result,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_input() -> VarInput {
        VarInput {
            portfolio_value: 1_000_000.0,
            drift: 0.05,
            volatility: 0.20,
            basis: ParameterBasis::default(),
            confidence: 95.0,
            z_score: None,
            simulation: SimulationConfig::default()
                .with_simulations(100_000)
                .with_seed(42),
        }
    }

    fn student_t(nu: f64) -> DistributionFamily {
        DistributionFamily::StudentT {
            degrees_of_freedom: nu,
        }
    }

    #[test]
    fn test_normal_reference_case() {
        let out = run_value_at_risk(&reference_input()).unwrap();
        let r = &out.result;
        assert!((r.analytical_var - 20_526.5).abs() < 1.0, "var={}", r.analytical_var);
        assert!(
            (r.empirical_var - r.analytical_var).abs() / r.analytical_var < 0.02,
            "mc={} analytical={}",
            r.empirical_var,
            r.analytical_var
        );
        assert!(out.warnings.is_empty());
        assert!((r.theoretical_mean - 0.05 / 252.0).abs() < 1e-15);
    }

    #[test]
    fn test_student_t_keeps_variance_changes_tail() {
        let mut input = reference_input();
        input.simulation.distribution = student_t(5.0);
        let out = run_value_at_risk(&input).unwrap();
        let r = &out.result;
        let target = (0.20 / 252f64.sqrt()).powi(2);
        assert!((r.empirical_variance - target).abs() / target < 0.05);
        assert!(r.summary.kurtosis > 1.0, "kurtosis={}", r.summary.kurtosis);
        // At 95% a unit-variance t(5) quantile sits below the normal one.
        assert!(r.var_difference < 0.0, "diff={}", r.var_difference);
        assert!(out.warnings.iter().any(|w| w.contains("Student-t")));
    }

    #[test]
    fn test_student_t_tail_exceeds_normal_at_high_confidence() {
        let mut input = reference_input();
        input.confidence = 99.5;
        input.simulation.distribution = student_t(5.0);
        let t = run_value_at_risk(&input).unwrap().result;
        input.simulation.distribution = DistributionFamily::Normal;
        let n = run_value_at_risk(&input).unwrap().result;
        assert!(t.empirical_var > n.empirical_var, "t={} n={}", t.empirical_var, n.empirical_var);
    }

    #[test]
    fn test_monotonic_in_volatility_and_confidence() {
        let base = run_value_at_risk(&reference_input()).unwrap().result;

        let mut input = reference_input();
        input.volatility = 0.30;
        let wider = run_value_at_risk(&input).unwrap().result;
        assert!(wider.analytical_var > base.analytical_var);
        assert!(wider.empirical_var > base.empirical_var);

        let mut input = reference_input();
        input.confidence = 99.0;
        let deeper = run_value_at_risk(&input).unwrap().result;
        assert!(deeper.analytical_var > base.analytical_var);
        assert!(deeper.empirical_var > base.empirical_var);
    }

    #[test]
    fn test_invalid_degrees_of_freedom() {
        for nu in [1.0, 2.0] {
            let mut input = reference_input();
            input.simulation.distribution = student_t(nu);
            let err = run_value_at_risk(&input).unwrap_err();
            assert!(matches!(err, RiskEngineError::InvalidDegreesOfFreedom { .. }));
            assert!(err.is_configuration_error());
        }
    }

    #[test]
    fn test_periodic_basis_skips_conversion() {
        let mut input = reference_input();
        input.basis = ParameterBasis::Periodic;
        input.drift = 0.05 / 252.0;
        input.volatility = 0.20 / 252f64.sqrt();
        input.simulation.num_simulations = 1_000;
        let periodic = run_value_at_risk(&input).unwrap().result;

        let mut annual = reference_input();
        annual.simulation.num_simulations = 1_000;
        let annual = run_value_at_risk(&annual).unwrap().result;
        assert!((periodic.analytical_var - annual.analytical_var).abs() < 1e-6);
    }

    #[test]
    fn test_json_defaults() {
        let input: VarInput = serde_json::from_str(
            r#"{"portfolio_value": 1000000, "drift": 0.05, "volatility": 0.2}"#,
        )
        .unwrap();
        assert_eq!(input.confidence, 95.0);
        assert_eq!(input.basis, ParameterBasis::default());
        assert_eq!(input.simulation.seed, 42);
    }

    #[test]
    fn test_bad_confidence_rejected() {
        let mut input = reference_input();
        input.confidence = 100.0;
        assert!(run_value_at_risk(&input).unwrap_err().is_configuration_error());
    }

    #[test]
    fn test_non_finite_z_override_rejected() {
        let mut input = reference_input();
        input.z_score = Some(f64::NAN);
        match run_value_at_risk(&input) {
            Err(RiskEngineError::Configuration { field, .. }) => assert_eq!(field, "z_score"),
            other => panic!("expected z_score configuration error, got {other:?}"),
        }
    }
}
