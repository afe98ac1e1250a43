use serde::{Deserialize, Serialize};

use crate::error::RiskEngineError;
use crate::types::Rate;
use crate::EngineResult;

/// Trading days used when converting annual parameters to daily ones.
pub const TRADING_DAYS_PER_YEAR: u32 = 252;

/// Family of single-period return shocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DistributionFamily {
    #[default]
    Normal,
    StudentT { degrees_of_freedom: f64 },
}

impl DistributionFamily {
    /// Reject Student-t shapes whose variance is undefined or infinite.
    pub fn validate(&self) -> EngineResult<()> {
        match *self {
            DistributionFamily::Normal => Ok(()),
            DistributionFamily::StudentT { degrees_of_freedom } => {
                if degrees_of_freedom.is_finite() && degrees_of_freedom > 2.0 {
                    Ok(())
                } else {
                    Err(RiskEngineError::InvalidDegreesOfFreedom {
                        nu: degrees_of_freedom,
                    })
                }
            }
        }
    }

    pub fn label(&self) -> String {
        match self {
            DistributionFamily::Normal => "Normal".to_string(),
            DistributionFamily::StudentT { degrees_of_freedom } => {
                format!("Student-t (nu = {degrees_of_freedom})")
            }
        }
    }
}

/// How drift and volatility inputs are quoted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParameterBasis {
    /// Annual figures, scaled to one period by `periods_per_year`.
    Annual {
        #[serde(default = "default_periods_per_year")]
        periods_per_year: u32,
    },
    /// Already per-period.
    Periodic,
}

impl Default for ParameterBasis {
    fn default() -> Self {
        ParameterBasis::Annual {
            periods_per_year: TRADING_DAYS_PER_YEAR,
        }
    }
}

fn default_periods_per_year() -> u32 {
    TRADING_DAYS_PER_YEAR
}

impl ParameterBasis {
    /// Convert `(drift, volatility)` to one period: `μ/n` and `σ/sqrt(n)`.
    pub fn to_periodic(&self, drift: Rate, volatility: Rate) -> EngineResult<(Rate, Rate)> {
        match *self {
            ParameterBasis::Periodic => Ok((drift, volatility)),
            ParameterBasis::Annual { periods_per_year } => {
                if periods_per_year == 0 {
                    return Err(RiskEngineError::config(
                        "periods_per_year",
                        "Must be at least 1",
                    ));
                }
                let n = periods_per_year as f64;
                Ok((drift / n, volatility / n.sqrt()))
            }
        }
    }
}

/// One asset of a portfolio, quoted per period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Expected return per period.
    pub drift: Rate,
    /// Standard deviation of return per period.
    pub volatility: Rate,
}

impl Asset {
    pub fn new(drift: Rate, volatility: Rate) -> Self {
        Asset {
            name: None,
            drift,
            volatility,
        }
    }
}

/// Assets, their correlation structure and the holding weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSpec {
    pub assets: Vec<Asset>,
    /// Row-major correlation matrix, one row per asset.
    pub correlation: Vec<Vec<f64>>,
    /// Holding weights; need not sum to one.
    pub weights: Vec<f64>,
}

impl PortfolioSpec {
    /// Two assets with a single correlation coefficient.
    pub fn two_asset(first: Asset, second: Asset, rho: f64, weights: [f64; 2]) -> Self {
        PortfolioSpec {
            assets: vec![first, second],
            correlation: vec![vec![1.0, rho], vec![rho, 1.0]],
            weights: weights.to_vec(),
        }
    }

    pub fn drifts(&self) -> Vec<Rate> {
        self.assets.iter().map(|a| a.drift).collect()
    }

    pub fn volatilities(&self) -> Vec<Rate> {
        self.assets.iter().map(|a| a.volatility).collect()
    }

    pub fn asset_name(&self, index: usize) -> String {
        self.assets
            .get(index)
            .and_then(|a| a.name.clone())
            .unwrap_or_else(|| format!("asset_{index}"))
    }

    /// Weighted drift `Σ w_i μ_i`.
    pub fn portfolio_drift(&self) -> Rate {
        self.assets
            .iter()
            .zip(&self.weights)
            .map(|(a, w)| w * a.drift)
            .sum()
    }

    /// Shape and sign checks. Correlation entries are checked when the
    /// correlation matrix is built.
    pub fn validate(&self) -> EngineResult<()> {
        if self.assets.is_empty() {
            return Err(RiskEngineError::config(
                "assets",
                "At least one asset is required",
            ));
        }
        for (i, asset) in self.assets.iter().enumerate() {
            if !asset.drift.is_finite() {
                return Err(RiskEngineError::config(
                    format!("assets[{i}].drift"),
                    "Must be finite",
                ));
            }
            if !asset.volatility.is_finite() || asset.volatility < 0.0 {
                return Err(RiskEngineError::config(
                    format!("assets[{i}].volatility"),
                    format!("Must be finite and >= 0, got {}", asset.volatility),
                ));
            }
        }
        if self.weights.len() != self.assets.len() {
            return Err(RiskEngineError::config(
                "weights",
                format!(
                    "Expected {} weights (one per asset), got {}",
                    self.assets.len(),
                    self.weights.len()
                ),
            ));
        }
        if let Some(i) = self.weights.iter().position(|w| !w.is_finite()) {
            return Err(RiskEngineError::config(
                format!("weights[{i}]"),
                "Must be finite",
            ));
        }
        Ok(())
    }
}

/// Sampling controls shared by every Monte Carlo run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of simulated samples or paths.
    #[serde(default = "default_num_simulations")]
    pub num_simulations: u32,
    /// Seed for the random source. Identical seeds reproduce identical draws.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Time horizon for path simulation, in years.
    #[serde(default = "default_horizon")]
    pub horizon: f64,
    /// Number of time steps over the horizon (`dt = horizon / steps`).
    #[serde(default = "default_steps")]
    pub steps: u32,
    #[serde(default)]
    pub distribution: DistributionFamily,
}

fn default_num_simulations() -> u32 {
    10_000
}

fn default_seed() -> u64 {
    42
}

fn default_horizon() -> f64 {
    1.0
}

fn default_steps() -> u32 {
    TRADING_DAYS_PER_YEAR
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            num_simulations: default_num_simulations(),
            seed: default_seed(),
            horizon: default_horizon(),
            steps: default_steps(),
            distribution: DistributionFamily::Normal,
        }
    }
}

impl SimulationConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_simulations(mut self, num_simulations: u32) -> Self {
        self.num_simulations = num_simulations;
        self
    }

    pub fn with_distribution(mut self, distribution: DistributionFamily) -> Self {
        self.distribution = distribution;
        self
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.num_simulations == 0 {
            return Err(RiskEngineError::config(
                "num_simulations",
                "Must be at least 1",
            ));
        }
        self.distribution.validate()
    }

    /// Extra checks for path simulation.
    pub fn validate_time_grid(&self) -> EngineResult<()> {
        if !self.horizon.is_finite() || self.horizon <= 0.0 {
            return Err(RiskEngineError::config(
                "horizon",
                format!("Must be finite and > 0, got {}", self.horizon),
            ));
        }
        if self.steps == 0 {
            return Err(RiskEngineError::config("steps", "Must be at least 1"));
        }
        Ok(())
    }

    pub fn dt(&self) -> f64 {
        self.horizon / self.steps as f64
    }
}
