use clap::Args;
use serde_json::Value;

use risk_engine_core::paths::summary::{self, GbmInput};

use super::SimulationArgs;
use crate::input;

/// Arguments for GBM price-path simulation
#[derive(Args)]
pub struct GbmArgs {
    /// Path to JSON input file
    #[arg(long)]
    pub input: Option<String>,

    /// Initial price S0
    #[arg(long, default_value = "100")]
    pub initial_price: f64,

    /// Annual drift
    #[arg(long, default_value = "0.08", allow_hyphen_values = true)]
    pub drift: f64,

    /// Annual volatility
    #[arg(long, default_value = "0.25")]
    pub volatility: f64,

    /// Horizon in years
    #[arg(long, default_value = "1")]
    pub horizon: f64,

    /// Time steps over the horizon
    #[arg(long, default_value = "252")]
    pub steps: u32,

    /// Report P(S_T < threshold)
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Number of full paths to include in the output
    #[arg(long, default_value = "10")]
    pub sample_paths: usize,

    #[command(flatten)]
    pub simulation: SimulationArgs,
}

pub fn run_gbm(args: GbmArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let gbm_input: GbmInput = if let Some(data) = input::load(args.input.as_deref())? {
        data
    } else {
        let mut simulation = args.simulation.to_config();
        simulation.horizon = args.horizon;
        simulation.steps = args.steps;
        GbmInput {
            initial_price: args.initial_price,
            drift: args.drift,
            volatility: args.volatility,
            threshold: args.threshold,
            sample_paths: args.sample_paths,
            simulation,
        }
    };

    let result = summary::run_gbm_simulation(&gbm_input)?;
    Ok(serde_json::to_value(result)?)
}
