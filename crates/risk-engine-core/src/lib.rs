pub mod config;
pub mod covariance;
pub mod error;
pub mod portfolio;
pub mod risk;
pub mod types;

#[cfg(feature = "simulation")]
pub mod random;

#[cfg(feature = "simulation")]
pub mod sampling;

#[cfg(feature = "simulation")]
pub mod paths;

pub use error::RiskEngineError;
pub use types::*;

/// Standard result type for all risk-engine operations
pub type EngineResult<T> = Result<T, RiskEngineError>;
