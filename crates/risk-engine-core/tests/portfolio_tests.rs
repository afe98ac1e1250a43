use risk_engine_core::config::{Asset, DistributionFamily, PortfolioSpec, SimulationConfig};
use risk_engine_core::covariance::PsdRepair;
use risk_engine_core::portfolio::{
    run_correlation_sweep, run_portfolio_risk, CorrelationSweepInput, PortfolioRiskInput,
};
use risk_engine_core::RiskEngineError;

fn reference_json() -> &'static str {
    r#"{
        "portfolio": {
            "assets": [
                {"name": "equity", "drift": 0.0002, "volatility": 0.012},
                {"name": "credit", "drift": 0.00015, "volatility": 0.009}
            ],
            "correlation": [[1.0, 0.4], [0.4, 1.0]],
            "weights": [0.6, 0.4]
        },
        "portfolio_value": 1000000,
        "simulation": {"num_simulations": 50000, "seed": 7}
    }"#
}

// ---------------------------------------------------------------------------
// Correlated portfolio risk
// ---------------------------------------------------------------------------

#[test]
fn test_reference_portfolio_from_json() {
    let input: PortfolioRiskInput = serde_json::from_str(reference_json()).unwrap();
    assert_eq!(input.confidence, 95.0);
    assert_eq!(input.psd_repair, PsdRepair::Strict);

    let out = run_portfolio_risk(&input).unwrap();
    let r = &out.result.risk;
    assert!((r.analytical_variance - 8.5536e-5).abs() < 1e-15);
    assert!(
        (r.empirical_variance - 8.5536e-5).abs() < 5e-6,
        "empirical variance {}",
        r.empirical_variance
    );
    assert_eq!(out.result.assets[0].name, "equity");
    assert_eq!(out.result.assets[1].name, "credit");
    assert!(out.warnings.is_empty(), "{:?}", out.warnings);
}

#[test]
fn test_envelope_serializes() {
    let input: PortfolioRiskInput = serde_json::from_str(reference_json()).unwrap();
    let out = run_portfolio_risk(&input).unwrap();
    let v = serde_json::to_value(&out).unwrap();
    assert!(v["result"]["risk"]["empirical_var"].is_number());
    assert_eq!(v["assumptions"]["seed"], 7);
    assert_eq!(v["metadata"]["precision"], "ieee754_f64");
}

#[test]
fn test_bit_identical_reruns() {
    let input: PortfolioRiskInput = serde_json::from_str(reference_json()).unwrap();
    let a = serde_json::to_value(run_portfolio_risk(&input).unwrap().result).unwrap();
    let b = serde_json::to_value(run_portfolio_risk(&input).unwrap().result).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_diversification_lowers_var() {
    let mut input: PortfolioRiskInput = serde_json::from_str(reference_json()).unwrap();
    input.simulation.num_simulations = 20_000;
    let base = run_portfolio_risk(&input).unwrap().result.risk;

    input.portfolio.correlation = vec![vec![1.0, -0.4], vec![-0.4, 1.0]];
    let hedged = run_portfolio_risk(&input).unwrap().result.risk;
    assert!(hedged.analytical_var < base.analytical_var);
    assert!(hedged.empirical_var < base.empirical_var);
}

#[test]
fn test_single_asset_portfolio() {
    let input = PortfolioRiskInput {
        portfolio: PortfolioSpec {
            assets: vec![Asset::new(0.0, 0.01)],
            correlation: vec![vec![1.0]],
            weights: vec![1.0],
        },
        portfolio_value: 100.0,
        confidence: 99.0,
        z_score: None,
        simulation: SimulationConfig::default().with_simulations(20_000),
        psd_repair: PsdRepair::Strict,
    };
    let r = run_portfolio_risk(&input).unwrap().result.risk;
    assert!((r.analytical_var - 100.0 * 2.326 * 0.01).abs() < 1e-9);
    assert!((r.empirical_var - r.analytical_var).abs() / r.analytical_var < 0.05);
}

#[test]
fn test_invalid_portfolio_inputs() {
    let mut input: PortfolioRiskInput = serde_json::from_str(reference_json()).unwrap();
    input.portfolio.correlation = vec![vec![1.0, 1.5], vec![1.5, 1.0]];
    assert!(run_portfolio_risk(&input).unwrap_err().is_configuration_error());

    let mut input: PortfolioRiskInput = serde_json::from_str(reference_json()).unwrap();
    input.simulation.distribution = DistributionFamily::StudentT {
        degrees_of_freedom: 2.0,
    };
    let err = run_portfolio_risk(&input).unwrap_err();
    assert!(matches!(err, RiskEngineError::InvalidDegreesOfFreedom { .. }));

    let mut input: PortfolioRiskInput = serde_json::from_str(reference_json()).unwrap();
    input.simulation.num_simulations = 0;
    assert!(run_portfolio_risk(&input).unwrap_err().is_configuration_error());
}

// ---------------------------------------------------------------------------
// Correlation sweep
// ---------------------------------------------------------------------------

#[test]
fn test_sweep_matches_portfolio_volatility() {
    let input: PortfolioRiskInput = serde_json::from_str(reference_json()).unwrap();
    let portfolio = run_portfolio_risk(&input).unwrap().result;

    let sweep = run_correlation_sweep(&CorrelationSweepInput {
        volatilities: vec![0.012, 0.009],
        weights: vec![0.6, 0.4],
        rho_min: -1.0,
        rho_max: 1.0,
        points: 11,
    })
    .unwrap()
    .result;
    // Grid point 7 is rho = 0.4.
    let point = &sweep.points[7];
    assert!((point.rho - 0.4).abs() < 1e-12);
    assert!((point.portfolio_volatility - portfolio.portfolio_volatility).abs() < 1e-12);
}
