//! Geometric Brownian Motion price paths.
//!
//! Log-Euler stepping `S_t = S_{t-1}·exp((μ − σ²/2)·dt + σ·dW_t)` is exact in
//! distribution for GBM, so the terminal slice is lognormal for any step
//! count. All `steps × n_paths` Wiener increments are drawn up front, one
//! step row at a time, and consumed in order.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RiskEngineError;
use crate::random::RandomSource;
use crate::EngineResult;

/// Simulated prices, `steps + 1` rows by `n_paths` columns. Row 0 is the
/// initial price on every path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePaths {
    steps: usize,
    n_paths: usize,
    dt: f64,
    data: Vec<f64>,
}

impl PricePaths {
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Prices of every path at step `t` (0 ..= steps).
    pub fn row(&self, t: usize) -> &[f64] {
        &self.data[t * self.n_paths..(t + 1) * self.n_paths]
    }

    pub fn initial(&self) -> &[f64] {
        self.row(0)
    }

    /// `S_T` for every path.
    pub fn terminal(&self) -> &[f64] {
        self.row(self.steps)
    }

    /// One path through time.
    pub fn path(&self, j: usize) -> Vec<f64> {
        (0..=self.steps).map(|t| self.data[t * self.n_paths + j]).collect()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks(self.n_paths)
    }

    /// Time of each row: `0, dt, 2·dt, ..., T`.
    pub fn time_grid(&self) -> Vec<f64> {
        (0..=self.steps).map(|t| t as f64 * self.dt).collect()
    }
}

/// GBM parameters; drift and volatility are annualised when `horizon` is in years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GbmParams {
    pub initial_price: f64,
    pub drift: f64,
    pub volatility: f64,
    pub horizon: f64,
    pub steps: usize,
    pub n_paths: usize,
}

impl GbmParams {
    pub fn validate(&self) -> EngineResult<()> {
        if !self.initial_price.is_finite() || self.initial_price <= 0.0 {
            return Err(RiskEngineError::config(
                "initial_price",
                format!("Must be finite and > 0, got {}", self.initial_price),
            ));
        }
        if !self.drift.is_finite() {
            return Err(RiskEngineError::config("drift", "Must be finite"));
        }
        if !self.volatility.is_finite() || self.volatility < 0.0 {
            return Err(RiskEngineError::config(
                "volatility",
                format!("Must be finite and >= 0, got {}", self.volatility),
            ));
        }
        if !self.horizon.is_finite() || self.horizon <= 0.0 {
            return Err(RiskEngineError::config(
                "horizon",
                format!("Must be finite and > 0, got {}", self.horizon),
            ));
        }
        if self.steps == 0 {
            return Err(RiskEngineError::config("steps", "Must be at least 1"));
        }
        if self.n_paths == 0 {
            return Err(RiskEngineError::config("n_paths", "Must be at least 1"));
        }
        Ok(())
    }

    pub fn dt(&self) -> f64 {
        self.horizon / self.steps as f64
    }
}

/// One time step on every path: `next[j] = prev[j]·exp(drift_dt + σ·dW[j])`.
fn step_prices(previous: &[f64], shocks: &[f64], drift_dt: f64, sigma: f64, next: &mut [f64]) {
    for ((n, p), dw) in next.iter_mut().zip(previous).zip(shocks) {
        *n = p * (drift_dt + sigma * dw).exp();
    }
}

/// Simulate paths drawing from `source`.
pub fn simulate_with(params: &GbmParams, source: &mut RandomSource) -> EngineResult<PricePaths> {
    params.validate()?;
    let GbmParams {
        initial_price,
        drift,
        volatility,
        steps,
        n_paths,
        ..
    } = *params;
    let dt = params.dt();

    let dw = source.normals(0.0, dt.sqrt(), steps * n_paths)?;
    let drift_dt = (drift - 0.5 * volatility * volatility) * dt;

    let mut data = vec![0.0; (steps + 1) * n_paths];
    data[..n_paths].fill(initial_price);

    for t in 1..=steps {
        let (done, rest) = data.split_at_mut(t * n_paths);
        let previous = &done[(t - 1) * n_paths..];
        let next = &mut rest[..n_paths];
        let shocks = &dw[(t - 1) * n_paths..t * n_paths];
        step_prices(previous, shocks, drift_dt, volatility, next);

        if let Some(j) = next.iter().position(|s| !s.is_finite()) {
            return Err(RiskEngineError::NumericOverflow {
                stage: "gbm path simulation".into(),
                detail: format!("non-finite price at step {t}, path {j}"),
            });
        }
    }

    debug!(steps, n_paths, dt, seed = source.seed(), "gbm paths simulated");

    Ok(PricePaths {
        steps,
        n_paths,
        dt,
        data,
    })
}

/// Seeded entry point: a fresh [`RandomSource`] per call.
pub fn simulate(
    initial_price: f64,
    drift: f64,
    volatility: f64,
    horizon: f64,
    steps: usize,
    n_paths: usize,
    seed: u64,
) -> EngineResult<PricePaths> {
    let params = GbmParams {
        initial_price,
        drift,
        volatility,
        horizon,
        steps,
        n_paths,
    };
    simulate_with(&params, &mut RandomSource::seeded(seed))
}
