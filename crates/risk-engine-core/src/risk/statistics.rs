use serde::{Deserialize, Serialize};

use crate::error::RiskEngineError;
use crate::EngineResult;

/// Percentile summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub p1: f64,
    pub p5: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
    pub p99: f64,
}

/// A single histogram bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: u32,
    pub frequency: f64,
}

/// Descriptive statistics of a sample (population conventions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub skewness: f64,
    /// Excess kurtosis (0 for a normal distribution).
    pub kurtosis: f64,
    pub percentiles: Percentiles,
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population variance (divisor `n`).
pub fn population_variance(values: &[f64]) -> f64 {
    let m = mean(values);
    values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64
}

/// Sort a copy of `values` ascending.
pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Percentile of a **sorted** slice using linear interpolation between order
/// statistics (rank `p/100·(n−1)`).
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

pub fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Build a histogram with `num_bins` equal-width bins over a **sorted** slice.
pub fn build_histogram(sorted: &[f64], num_bins: usize) -> Vec<HistogramBin> {
    if sorted.is_empty() || num_bins == 0 {
        return Vec::new();
    }
    let min_val = sorted[0];
    let max_val = sorted[sorted.len() - 1];

    if (max_val - min_val).abs() < f64::EPSILON {
        return vec![HistogramBin {
            lower: min_val,
            upper: max_val,
            count: sorted.len() as u32,
            frequency: 1.0,
        }];
    }

    let bin_width = (max_val - min_val) / num_bins as f64;
    let n = sorted.len() as f64;

    let mut bins: Vec<HistogramBin> = (0..num_bins)
        .map(|i| HistogramBin {
            lower: min_val + i as f64 * bin_width,
            upper: if i == num_bins - 1 {
                max_val
            } else {
                min_val + (i + 1) as f64 * bin_width
            },
            count: 0,
            frequency: 0.0,
        })
        .collect();

    for &val in sorted {
        let idx = (((val - min_val) / bin_width).floor() as usize).min(num_bins - 1);
        bins[idx].count += 1;
    }
    for bin in &mut bins {
        bin.frequency = bin.count as f64 / n;
    }
    bins
}

/// Descriptive statistics for `values`; the input is left untouched.
pub fn summarize(values: &[f64]) -> EngineResult<SummaryStatistics> {
    if values.is_empty() {
        return Err(RiskEngineError::config(
            "samples",
            "At least one observation is required",
        ));
    }
    let sorted = sorted_copy(values);
    Ok(summarize_sorted(&sorted))
}

pub(crate) fn summarize_sorted(sorted: &[f64]) -> SummaryStatistics {
    let n = sorted.len() as f64;
    let mean = mean(sorted);
    let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();

    let (skewness, kurtosis) = if std_dev > f64::EPSILON {
        let m3 = sorted.iter().map(|v| ((v - mean) / std_dev).powi(3)).sum::<f64>() / n;
        let m4 = sorted.iter().map(|v| ((v - mean) / std_dev).powi(4)).sum::<f64>() / n;
        (m3, m4 - 3.0)
    } else {
        (0.0, 0.0)
    };

    SummaryStatistics {
        count: sorted.len(),
        mean,
        std_dev,
        median: median_sorted(sorted),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        skewness,
        kurtosis,
        percentiles: Percentiles {
            p1: percentile_sorted(sorted, 1.0),
            p5: percentile_sorted(sorted, 5.0),
            p25: percentile_sorted(sorted, 25.0),
            p50: percentile_sorted(sorted, 50.0),
            p75: percentile_sorted(sorted, 75.0),
            p95: percentile_sorted(sorted, 95.0),
            p99: percentile_sorted(sorted, 99.0),
        },
    }
}
