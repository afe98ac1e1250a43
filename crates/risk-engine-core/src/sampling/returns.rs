use statrs::distribution::{Normal, StudentsT};
use tracing::debug;

use crate::config::DistributionFamily;
use crate::covariance::CholeskyFactor;
use crate::error::RiskEngineError;
use crate::random::{self, RandomSource};
use crate::types::SampledReturns;
use crate::EngineResult;

/// A source of zero-mean, unit-variance shocks.
///
/// The sampler correlates whatever the family produces through the Cholesky
/// factor, so any family with unit variance keeps the target covariance.
pub trait VariateFamily {
    /// Draw `n` independent unit-variance variates.
    fn unit_variates(&self, source: &mut RandomSource, n: usize) -> Vec<f64>;

    fn label(&self) -> String;
}

pub struct NormalFamily {
    dist: Normal,
}

impl NormalFamily {
    pub fn new() -> EngineResult<Self> {
        Ok(NormalFamily {
            dist: random::normal(0.0, 1.0)?,
        })
    }
}

impl VariateFamily for NormalFamily {
    fn unit_variates(&self, source: &mut RandomSource, n: usize) -> Vec<f64> {
        source.draw_n(&self.dist, n)
    }

    fn label(&self) -> String {
        "Normal".into()
    }
}

/// Student-t shocks divided by `sqrt(ν/(ν−2))`, the standard deviation of
/// `t(ν)`, so their variance is one for every `ν > 2`.
pub struct StudentTFamily {
    nu: f64,
    dist: StudentsT,
    scale: f64,
}

impl StudentTFamily {
    pub fn new(nu: f64) -> EngineResult<Self> {
        if !nu.is_finite() || nu <= 2.0 {
            return Err(RiskEngineError::InvalidDegreesOfFreedom { nu });
        }
        Ok(StudentTFamily {
            nu,
            dist: random::student_t(nu)?,
            scale: variance_correction(nu).sqrt().recip(),
        })
    }

    pub fn degrees_of_freedom(&self) -> f64 {
        self.nu
    }
}

impl VariateFamily for StudentTFamily {
    fn unit_variates(&self, source: &mut RandomSource, n: usize) -> Vec<f64> {
        (0..n).map(|_| source.draw(&self.dist) * self.scale).collect()
    }

    fn label(&self) -> String {
        format!("Student-t (nu = {})", self.nu)
    }
}

/// Variance of a standard Student-t: `ν/(ν−2)`.
pub fn variance_correction(nu: f64) -> f64 {
    nu / (nu - 2.0)
}

pub fn family_for(distribution: &DistributionFamily) -> EngineResult<Box<dyn VariateFamily>> {
    match *distribution {
        DistributionFamily::Normal => Ok(Box::new(NormalFamily::new()?)),
        DistributionFamily::StudentT { degrees_of_freedom } => {
            Ok(Box::new(StudentTFamily::new(degrees_of_freedom)?))
        }
    }
}

/// Correlated samples `R = means ⊕ L·Z`.
///
/// `Z` is drawn one asset row at a time (all `n` draws of asset 0, then
/// asset 1, ...), which fixes the draw order for a given seed.
pub fn sample_with(
    factor: &CholeskyFactor,
    means: &[f64],
    n: usize,
    source: &mut RandomSource,
    family: &dyn VariateFamily,
) -> EngineResult<SampledReturns> {
    let dim = factor.dim();
    if means.len() != dim {
        return Err(RiskEngineError::config(
            "means",
            format!("Expected {dim} means to match the covariance factor, got {}", means.len()),
        ));
    }
    if n == 0 {
        return Err(RiskEngineError::config("num_simulations", "Must be at least 1"));
    }

    let mut z = Vec::with_capacity(dim * n);
    for _ in 0..dim {
        z.extend(family.unit_variates(source, n));
    }

    let mut out = vec![0.0; dim * n];
    for i in 0..dim {
        let row = &mut out[i * n..(i + 1) * n];
        for j in 0..=i {
            let l = factor.get(i, j);
            if l == 0.0 {
                continue;
            }
            for (r, zk) in row.iter_mut().zip(&z[j * n..(j + 1) * n]) {
                *r += l * zk;
            }
        }
        for r in row.iter_mut() {
            *r += means[i];
        }
    }

    if let Some(k) = out.iter().position(|r| !r.is_finite()) {
        return Err(RiskEngineError::NumericOverflow {
            stage: "return sampling".into(),
            detail: format!("non-finite return for asset {} at sample {}", k / n, k % n),
        });
    }

    debug!(
        assets = dim,
        samples = n,
        family = %family.label(),
        seed = source.seed(),
        "returns sampled"
    );

    SampledReturns::from_rows(dim, n, out).ok_or_else(|| {
        RiskEngineError::NumericOverflow {
            stage: "return sampling".into(),
            detail: "sample matrix shape mismatch".into(),
        }
    })
}

/// Seeded entry point: a fresh [`RandomSource`] per call.
pub fn sample(
    factor: &CholeskyFactor,
    means: &[f64],
    n: usize,
    seed: u64,
    distribution: &DistributionFamily,
) -> EngineResult<SampledReturns> {
    let family = family_for(distribution)?;
    let mut source = RandomSource::seeded(seed);
    sample_with(factor, means, n, &mut source, family.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::covariance::CovarianceModel;
    use crate::covariance::PsdRepair;
    use crate::risk::statistics::{mean, population_variance, summarize};

    const SEED: u64 = 42;

    fn two_asset_model() -> CovarianceModel {
        CovarianceModel::new(
            &[0.012, 0.009],
            &[vec![1.0, 0.4], vec![0.4, 1.0]],
            PsdRepair::Strict,
        )
        .unwrap()
    }

    fn sample_correlation(a: &[f64], b: &[f64]) -> f64 {
        let (ma, mb) = (mean(a), mean(b));
        let cov = a.iter().zip(b).map(|(x, y)| (x - ma) * (y - mb)).sum::<f64>() / a.len() as f64;
        cov / (population_variance(a).sqrt() * population_variance(b).sqrt())
    }

    #[test]
    fn test_normal_correlated_moments() {
        let model = two_asset_model();
        let r = sample(model.factor(), &[0.0002, 0.00015], 50_000, 7, &DistributionFamily::Normal)
            .unwrap();
        assert_eq!(r.assets(), 2);
        assert_eq!(r.samples(), 50_000);
        let (a, b) = (r.asset(0), r.asset(1));
        assert!((population_variance(a).sqrt() - 0.012).abs() < 0.0003);
        assert!((population_variance(b).sqrt() - 0.009).abs() < 0.0003);
        let rho = sample_correlation(a, b);
        assert!((rho - 0.4).abs() < 0.02, "rho={rho}");
        assert!((mean(a) - 0.0002).abs() < 0.0002);
    }

    #[test]
    fn test_bit_identical_reproduction() {
        let model = two_asset_model();
        let means = [0.0002, 0.00015];
        let a = sample(model.factor(), &means, 1_000, SEED, &DistributionFamily::Normal).unwrap();
        let b = sample(model.factor(), &means, 1_000, SEED, &DistributionFamily::Normal).unwrap();
        assert_eq!(a, b);
        let c = sample(model.factor(), &means, 1_000, SEED + 1, &DistributionFamily::Normal)
            .unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_student_t_variance_matches_target() {
        let sigma = 0.20 / 252f64.sqrt();
        let factor = CholeskyFactor::from_volatility(sigma);
        let t = DistributionFamily::StudentT {
            degrees_of_freedom: 5.0,
        };
        let r = sample(&factor, &[0.0], 200_000, SEED, &t).unwrap().into_series();
        let var = population_variance(&r);
        let target = sigma * sigma;
        assert!(
            (var - target).abs() / target < 0.05,
            "var={var} target={target}"
        );
    }

    #[test]
    fn test_student_t_heavier_tails_than_normal() {
        let factor = CholeskyFactor::from_volatility(0.0126);
        let normal = sample(&factor, &[0.0], 100_000, SEED, &DistributionFamily::Normal)
            .unwrap()
            .into_series();
        let t = sample(
            &factor,
            &[0.0],
            100_000,
            SEED,
            &DistributionFamily::StudentT {
                degrees_of_freedom: 5.0,
            },
        )
        .unwrap()
        .into_series();
        let k_normal = summarize(&normal).unwrap().kurtosis;
        let k_t = summarize(&t).unwrap().kurtosis;
        assert!(k_t > k_normal + 1.0, "kurtosis t={k_t} normal={k_normal}");
    }

    #[test]
    fn test_invalid_degrees_of_freedom() {
        let factor = CholeskyFactor::from_volatility(0.01);
        for nu in [2.0, 1.0] {
            let dist = DistributionFamily::StudentT {
                degrees_of_freedom: nu,
            };
            let err = sample(&factor, &[0.0], 10, SEED, &dist).unwrap_err();
            assert!(matches!(err, RiskEngineError::InvalidDegreesOfFreedom { .. }));
        }
    }

    #[test]
    fn test_single_asset_matches_rescale_rule() {
        // R = μ + σ·t/sqrt(ν/(ν−2)) with the same draws.
        let (mu, sigma, nu) = (0.0002, 0.0126, 5.0);
        let factor = CholeskyFactor::from_volatility(sigma);
        let family = StudentTFamily::new(nu).unwrap();
        let r = sample_with(&factor, &[mu], 100, &mut RandomSource::seeded(SEED), &family)
            .unwrap()
            .into_series();
        let raw = RandomSource::seeded(SEED).student_t(nu, 100).unwrap();
        for (got, t) in r.iter().zip(&raw) {
            let expected = mu + sigma * t / (nu / (nu - 2.0)).sqrt();
            assert!((got - expected).abs() < 1e-15, "{got} vs {expected}");
        }
    }

    #[test]
    fn test_means_length_mismatch() {
        let model = two_asset_model();
        assert!(sample(model.factor(), &[0.0], 10, SEED, &DistributionFamily::Normal).is_err());
    }

    #[test]
    fn test_zero_samples_rejected() {
        let factor = CholeskyFactor::from_volatility(0.01);
        assert!(sample(&factor, &[0.0], 0, SEED, &DistributionFamily::Normal).is_err());
    }
}
