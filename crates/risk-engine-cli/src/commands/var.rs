use clap::Args;
use serde_json::Value;

use risk_engine_core::config::ParameterBasis;
use risk_engine_core::risk::var::{self, VarInput};

use super::SimulationArgs;
use crate::input;

/// Arguments for single-asset Value-at-Risk
#[derive(Args)]
pub struct VarArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Position value
    #[arg(long, default_value = "1000000")]
    pub portfolio_value: f64,

    /// Expected return (annual unless --periodic)
    #[arg(long, allow_hyphen_values = true)]
    pub drift: Option<f64>,

    /// Return volatility (annual unless --periodic)
    #[arg(long)]
    pub volatility: Option<f64>,

    /// Periods per year for annual inputs
    #[arg(long, default_value = "252")]
    pub periods_per_year: u32,

    /// Treat --drift and --volatility as already per period
    #[arg(long)]
    pub periodic: bool,

    /// Confidence level in percent
    #[arg(long, default_value = "95")]
    pub confidence: f64,

    /// Override the normal quantile used for parametric VaR
    #[arg(long)]
    pub z: Option<f64>,

    #[command(flatten)]
    pub simulation: SimulationArgs,
}

pub fn run_var(args: VarArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let var_input: VarInput = if let Some(data) = input::load(args.input.as_deref())? {
        data
    } else {
        let basis = if args.periodic {
            ParameterBasis::Periodic
        } else {
            ParameterBasis::Annual {
                periods_per_year: args.periods_per_year,
            }
        };
        VarInput {
            portfolio_value: args.portfolio_value,
            drift: args
                .drift
                .ok_or("--drift is required (or provide --input)")?,
            volatility: args
                .volatility
                .ok_or("--volatility is required (or provide --input)")?,
            basis,
            confidence: args.confidence,
            z_score: args.z,
            simulation: args.simulation.to_config(),
        }
    };

    let result = var::run_value_at_risk(&var_input)?;
    Ok(serde_json::to_value(result)?)
}
