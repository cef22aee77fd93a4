//! Descriptive statistics over price samples.
//!
//! Callers pass only present (non-missing) values. Empty input yields `None`.

use serde::Serialize;

use crate::core::constants::defaults;

/// Summary statistics of one sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Descriptive {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    pub p95: f64,
    /// Sample standard deviation, `None` below two values
    pub stdev: Option<f64>,
}

/// Compute all descriptive statistics in one go
pub fn describe(values: &[f64]) -> Option<Descriptive> {
    let sorted = sorted_copy(values);
    let (min, max) = (*sorted.first()?, *sorted.last()?);

    Some(Descriptive {
        count: sorted.len(),
        mean: mean(values)?,
        median: quantile_sorted(&sorted, 0.5)?,
        min,
        max,
        p95: quantile_sorted(&sorted, defaults::PERCENTILE)?,
        stdev: sample_std(values),
    })
}

/// Arithmetic mean, kept within the sample's [min, max]
///
/// Summation error can push the quotient one ulp past the extremes when all
/// values are equal; the clamp restores `min <= mean <= max`.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let (mut lo, mut hi, mut sum) = (f64::INFINITY, f64::NEG_INFINITY, 0.0);
    for &v in values {
        lo = lo.min(v);
        hi = hi.max(v);
        sum += v;
    }
    Some((sum / values.len() as f64).clamp(lo, hi))
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Quantile with linear interpolation between closest ranks
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    quantile_sorted(&sorted_copy(values), q)
}

/// Same as [`quantile`] for input that is already sorted ascending
pub fn quantile_sorted(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let q = q.clamp(0.0, 1.0);
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    let (a, b) = (sorted[lo], sorted[hi]);
    // rounding must not leave the bracketing pair
    Some((a + (b - a) * frac).clamp(a, b))
}

/// Sample standard deviation (n - 1 denominator)
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = values.iter().sum::<f64>() / values.len() as f64;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (values.len() - 1) as f64).sqrt())
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Pearson correlation of paired samples.
///
/// `None` with fewer than two pairs or when either side has zero variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let mx = xs[..n].iter().sum::<f64>() / n as f64;
    let my = ys[..n].iter().sum::<f64>() / n as f64;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        let (dx, dy) = (x - mx, y - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}
