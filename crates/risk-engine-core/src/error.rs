use thiserror::Error;

#[derive(Debug, Error)]
pub enum RiskEngineError {
    #[error("Configuration error in {field}: {reason}")]
    Configuration { field: String, reason: String },

    #[error("Invalid degrees of freedom: nu = {nu} (Student-t variance requires nu > 2)")]
    InvalidDegreesOfFreedom { nu: f64 },

    #[error("Matrix is not positive semi-definite: pivot {pivot:e} at row {index}")]
    NotPositiveSemiDefinite { index: usize, pivot: f64 },

    #[error("Numeric overflow in {stage}: {detail}")]
    NumericOverflow { stage: String, detail: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RiskEngineError {
    /// Shorthand for a [`RiskEngineError::Configuration`] on a named field.
    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        RiskEngineError::Configuration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for every error raised by input validation, before any sampling.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            RiskEngineError::Configuration { .. } | RiskEngineError::InvalidDegreesOfFreedom { .. }
        )
    }
}

impl From<serde_json::Error> for RiskEngineError {
    fn from(e: serde_json::Error) -> Self {
        RiskEngineError::Serialization(e.to_string())
    }
}
