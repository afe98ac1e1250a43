pub mod aggregate;
#[cfg(feature = "simulation")]
pub mod risk;
pub mod sensitivity;

pub use aggregate::{aggregate, weighted_mean};
#[cfg(feature = "simulation")]
pub use risk::{run_portfolio_risk, AssetStatistics, PortfolioRiskInput, PortfolioRiskOutput};
pub use sensitivity::{
    run_correlation_sweep, CorrelationSweepInput, CorrelationSweepOutput, CorrelationSweepPoint,
};
