//! Explicitly seeded random source.
//!
//! Every sampling stage receives a `RandomSource` by mutable reference; there
//! is no process-wide generator. Two sources built from the same seed yield
//! the same draw sequence.

use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use statrs::distribution::{Normal, StudentsT};

use crate::error::RiskEngineError;
use crate::EngineResult;

pub struct RandomSource {
    rng: StdRng,
    seed: u64,
}

impl RandomSource {
    pub fn seeded(seed: u64) -> Self {
        RandomSource {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Draw one value from any `f64` distribution.
    pub fn draw<D: Distribution<f64>>(&mut self, dist: &D) -> f64 {
        self.rng.sample(dist)
    }

    /// Draw `n` values in sequence.
    pub fn draw_n<D: Distribution<f64>>(&mut self, dist: &D, n: usize) -> Vec<f64> {
        (0..n).map(|_| self.rng.sample(dist)).collect()
    }

    /// `n` independent draws from `Normal(mean, std_dev)`.
    pub fn normals(&mut self, mean: f64, std_dev: f64, n: usize) -> EngineResult<Vec<f64>> {
        let dist = normal(mean, std_dev)?;
        Ok(self.draw_n(&dist, n))
    }

    /// `n` independent standard normal draws.
    pub fn standard_normals(&mut self, n: usize) -> EngineResult<Vec<f64>> {
        self.normals(0.0, 1.0, n)
    }

    /// `n` independent draws from a standard Student-t with `nu` degrees of freedom.
    pub fn student_t(&mut self, nu: f64, n: usize) -> EngineResult<Vec<f64>> {
        let dist = student_t(nu)?;
        Ok(self.draw_n(&dist, n))
    }
}

pub(crate) fn normal(mean: f64, std_dev: f64) -> EngineResult<Normal> {
    Normal::new(mean, std_dev).map_err(|e| {
        RiskEngineError::config("distribution", format!("Invalid Normal parameters: {e}"))
    })
}

pub(crate) fn student_t(nu: f64) -> EngineResult<StudentsT> {
    StudentsT::new(0.0, 1.0, nu).map_err(|e| {
        RiskEngineError::config("distribution", format!("Invalid Student-t parameters: {e}"))
    })
}
