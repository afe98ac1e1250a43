use clap::Args;
use serde_json::Value;

use risk_engine_core::config::{Asset, PortfolioSpec};
use risk_engine_core::covariance::PsdRepair;
use risk_engine_core::portfolio::risk::{self, PortfolioRiskInput};

use super::SimulationArgs;
use crate::input;

/// Arguments for correlated multi-asset portfolio risk
#[derive(Args)]
pub struct PortfolioRiskArgs {
    /// Path to JSON input file (required for a full correlation matrix)
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated per-period drifts, one per asset
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub drifts: Option<Vec<f64>>,

    /// Comma-separated per-period volatilities, one per asset
    #[arg(long, value_delimiter = ',')]
    pub volatilities: Option<Vec<f64>>,

    /// Comma-separated holding weights
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub weights: Option<Vec<f64>>,

    /// Pairwise correlation applied to every asset pair
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub rho: f64,

    /// Portfolio value
    #[arg(long, default_value = "1000000")]
    pub portfolio_value: f64,

    /// Confidence level in percent
    #[arg(long, default_value = "95")]
    pub confidence: f64,

    /// Override the normal quantile used for parametric VaR
    #[arg(long)]
    pub z: Option<f64>,

    /// Clip negative eigenvalues instead of failing on a non-PSD correlation matrix
    #[arg(long)]
    pub repair_psd: bool,

    #[command(flatten)]
    pub simulation: SimulationArgs,
}

/// Equicorrelation matrix with `rho` off the diagonal.
fn constant_correlation(n: usize, rho: f64) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| (0..n).map(|j| if i == j { 1.0 } else { rho }).collect())
        .collect()
}

pub fn run_portfolio_risk(args: PortfolioRiskArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let loaded: Option<PortfolioRiskInput> = input::load(args.input.as_deref())?;
    let risk_input = if let Some(data) = loaded {
        data
    } else {
        let drifts = args
            .drifts
            .ok_or("--drifts is required (or provide --input)")?;
        let volatilities = args
            .volatilities
            .ok_or("--volatilities is required (or provide --input)")?;
        if drifts.len() != volatilities.len() {
            return Err(format!(
                "--drifts has {} values but --volatilities has {}",
                drifts.len(),
                volatilities.len()
            )
            .into());
        }
        let n = drifts.len();
        let weights = args
            .weights
            .unwrap_or_else(|| vec![1.0 / n as f64; n]);
        let assets = drifts
            .into_iter()
            .zip(volatilities)
            .map(|(mu, sigma)| Asset::new(mu, sigma))
            .collect();

        PortfolioRiskInput {
            portfolio: PortfolioSpec {
                assets,
                correlation: constant_correlation(n, args.rho),
                weights,
            },
            portfolio_value: args.portfolio_value,
            confidence: args.confidence,
            z_score: args.z,
            simulation: args.simulation.to_config(),
            psd_repair: if args.repair_psd {
                PsdRepair::ClipEigenvalues
            } else {
                PsdRepair::Strict
            },
        }
    };

    let result = risk::run_portfolio_risk(&risk_input)?;
    Ok(serde_json::to_value(result)?)
}
