use serde::{Deserialize, Serialize};

/// Monetary amounts (portfolio value, losses).
pub type Money = f64;

/// Returns, drifts and volatilities as decimals (0.05 = 5%). Never percentages.
pub type Rate = f64;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "ieee754_f64".to_string(),
        },
    }
}

/// Single-period return samples, one row per asset.
///
/// Row-major: `data[asset * samples + k]` is draw `k` of `asset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampledReturns {
    assets: usize,
    samples: usize,
    data: Vec<f64>,
}

impl SampledReturns {
    pub fn from_rows(assets: usize, samples: usize, data: Vec<f64>) -> Option<Self> {
        if data.len() != assets * samples {
            return None;
        }
        Some(SampledReturns {
            assets,
            samples,
            data,
        })
    }

    pub fn assets(&self) -> usize {
        self.assets
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    /// All draws of one asset.
    pub fn asset(&self, index: usize) -> &[f64] {
        &self.data[index * self.samples..(index + 1) * self.samples]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks(self.samples.max(1))
    }

    /// The first (or only) asset's series, consuming the matrix.
    pub fn into_series(mut self) -> Vec<f64> {
        self.data.truncate(self.samples);
        self.data
    }
}
