pub mod estimators;
pub mod result;
pub mod statistics;
#[cfg(feature = "simulation")]
pub mod var;

pub use estimators::{
    analytical_var, analytical_variance, empirical_var, empirical_variance, expected_shortfall,
    losses, resolve_z, z_score,
};
pub use result::{estimate_risk, AnalyticalMoments, RiskResult};
pub use statistics::{HistogramBin, Percentiles, SummaryStatistics};
#[cfg(feature = "simulation")]
pub use var::{run_value_at_risk, VarInput};
