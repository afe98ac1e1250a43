pub mod correlation_sweep;
pub mod gbm;
pub mod portfolio_risk;
pub mod var;

use clap::Args;

use risk_engine_core::config::{DistributionFamily, SimulationConfig};

/// Sampling flags shared by the Monte Carlo commands
#[derive(Args, Debug, Clone)]
pub struct SimulationArgs {
    /// Number of simulated samples or paths
    #[arg(long, default_value = "10000")]
    pub simulations: u32,

    /// Random seed; identical seeds reproduce identical results
    #[arg(long, default_value = "42")]
    pub seed: u64,

    /// Student-t degrees of freedom (normal returns when omitted)
    #[arg(long)]
    pub dof: Option<f64>,
}

impl SimulationArgs {
    pub fn to_config(&self) -> SimulationConfig {
        let distribution = match self.dof {
            Some(nu) => DistributionFamily::StudentT {
                degrees_of_freedom: nu,
            },
            None => DistributionFamily::Normal,
        };
        SimulationConfig::default()
            .with_simulations(self.simulations)
            .with_seed(self.seed)
            .with_distribution(distribution)
    }
}
