use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::gbm::{simulate_with, GbmParams};
use crate::config::{DistributionFamily, SimulationConfig};
use crate::error::RiskEngineError;
use crate::random::RandomSource;
use crate::risk::statistics::{build_histogram, sorted_copy, summarize_sorted};
use crate::risk::statistics::{HistogramBin, SummaryStatistics};
use crate::types::{with_metadata, ComputationOutput};
use crate::EngineResult;

const TERMINAL_HISTOGRAM_BINS: usize = 60;

/// Input for a GBM price-path simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbmInput {
    pub initial_price: f64,
    /// Annual drift `μ`.
    pub drift: f64,
    /// Annual volatility `σ`.
    pub volatility: f64,
    /// Optional price level `K` for `P(S_T < K)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    /// Number of leading paths to return in full.
    #[serde(default = "default_sample_paths")]
    pub sample_paths: usize,
    /// `num_simulations` paths over `horizon` years in `steps` steps.
    #[serde(default)]
    pub simulation: SimulationConfig,
}

fn default_sample_paths() -> usize {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdProbability {
    pub threshold: f64,
    pub probability: f64,
}

/// Terminal-price summary plus a few full paths for charting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GbmOutput {
    pub empirical_mean: f64,
    /// Population standard deviation of `S_T`.
    pub empirical_std_dev: f64,
    pub median: f64,
    /// `S0·exp(μT)`.
    pub theoretical_mean: f64,
    /// `S0·exp((μ − σ²/2)T)`.
    pub theoretical_median: f64,
    /// `S0·exp(μT)·sqrt(exp(σ²T) − 1)`.
    pub theoretical_std_dev: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability_below: Option<ThresholdProbability>,
    pub terminal: SummaryStatistics,
    pub terminal_histogram: Vec<HistogramBin>,
    pub time_grid: Vec<f64>,
    /// First `sample_paths` paths, each `steps + 1` prices long.
    pub sample_paths: Vec<Vec<f64>>,
    pub num_paths: usize,
}

/// Simulate GBM paths and summarize the terminal distribution.
pub fn run_gbm_simulation(input: &GbmInput) -> EngineResult<ComputationOutput<GbmOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let cfg = &input.simulation;
    if cfg.num_simulations == 0 {
        return Err(RiskEngineError::config(
            "num_simulations",
            "Must be at least 1",
        ));
    }
    cfg.validate_time_grid()?;
    if let Some(k) = input.threshold {
        if !k.is_finite() {
            return Err(RiskEngineError::config("threshold", "Must be finite"));
        }
    }
    cfg.distribution.validate()?;
    if cfg.distribution != DistributionFamily::Normal {
        warnings.push(format!(
            "distribution {} ignored: GBM increments are always normal",
            cfg.distribution.label()
        ));
    }

    let params = GbmParams {
        initial_price: input.initial_price,
        drift: input.drift,
        volatility: input.volatility,
        horizon: cfg.horizon,
        steps: cfg.steps as usize,
        n_paths: cfg.num_simulations as usize,
    };
    let paths = simulate_with(&params, &mut RandomSource::seeded(cfg.seed))?;

    let terminal = paths.terminal();
    let sorted = sorted_copy(terminal);
    let stats = summarize_sorted(&sorted);

    let (s0, mu, sigma, t) = (input.initial_price, input.drift, input.volatility, cfg.horizon);
    let theoretical_mean = s0 * (mu * t).exp();
    let theoretical_median = s0 * ((mu - 0.5 * sigma * sigma) * t).exp();
    let theoretical_std_dev = theoretical_mean * ((sigma * sigma * t).exp() - 1.0).sqrt();

    let probability_below = input.threshold.map(|k| ThresholdProbability {
        threshold: k,
        probability: terminal.iter().filter(|s| **s < k).count() as f64 / terminal.len() as f64,
    });

    let shown = input.sample_paths.min(paths.n_paths());
    if shown < input.sample_paths {
        warnings.push(format!(
            "sample_paths capped at {shown} (only {} paths simulated)",
            paths.n_paths()
        ));
    }
    let sample_paths = (0..shown).map(|j| paths.path(j)).collect();

    let output = GbmOutput {
        empirical_mean: stats.mean,
        empirical_std_dev: stats.std_dev,
        median: stats.median,
        theoretical_mean,
        theoretical_median,
        theoretical_std_dev,
        probability_below,
        terminal_histogram: build_histogram(&sorted, TERMINAL_HISTOGRAM_BINS),
        terminal: stats,
        time_grid: paths.time_grid(),
        sample_paths,
        num_paths: paths.n_paths(),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Geometric Brownian Motion (log-Euler) Monte Carlo",
        &serde_json::json!({
            "initial_price": input.initial_price,
            "drift": input.drift,
            "volatility": input.volatility,
            "horizon": cfg.horizon,
            "steps": cfg.steps,
            "dt": params.dt(),
            "num_paths": cfg.num_simulations,
            "seed": cfg.seed,
        }),
        warnings,
        elapsed,
        output,
    ))
}
