use clap::Args;
use serde_json::Value;

use risk_engine_core::portfolio::sensitivity::{self, CorrelationSweepInput};

use crate::input;

/// Arguments for the two-asset correlation sweep
#[derive(Args)]
pub struct CorrelationSweepArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Two comma-separated volatilities
    #[arg(long, value_delimiter = ',', default_value = "0.012,0.009")]
    pub volatilities: Vec<f64>,

    /// Two comma-separated weights
    #[arg(
        long,
        value_delimiter = ',',
        allow_hyphen_values = true,
        default_value = "0.6,0.4"
    )]
    pub weights: Vec<f64>,

    #[arg(long, default_value = "-1", allow_hyphen_values = true)]
    pub rho_min: f64,

    #[arg(long, default_value = "1", allow_hyphen_values = true)]
    pub rho_max: f64,

    /// Grid points, endpoints included
    #[arg(long, default_value = "11")]
    pub points: usize,
}

pub fn run_correlation_sweep(
    args: CorrelationSweepArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let loaded: Option<CorrelationSweepInput> = input::load(args.input.as_deref())?;
    let sweep_input = if let Some(data) = loaded {
        data
    } else {
        CorrelationSweepInput {
            volatilities: args.volatilities,
            weights: args.weights,
            rho_min: args.rho_min,
            rho_max: args.rho_max,
            points: args.points,
        }
    };

    let result = sensitivity::run_correlation_sweep(&sweep_input)?;
    Ok(serde_json::to_value(result)?)
}
