//! Descriptive statistics over plain `f64` slices.
//!
//! Callers are expected to have removed missing values already; every function
//! returns `None` when the statistic is undefined for the given sample.

use statrs::distribution::{ContinuousCDF, StudentsT};

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (denominator `n - 1`), defined as 0 for `n = 1`.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    let m = mean(values)?;
    if n == 1 {
        return Some(0.0);
    }
    let ss: f64 = values.iter().map(|v| (v - m) * (v - m)).sum();
    Some((ss / (n as f64 - 1.0)).sqrt())
}

pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Quantile with linear interpolation between order statistics.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Pearson correlation coefficient.
///
/// `None` when fewer than two pairs are given or either side has zero variance.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len();
    if n < 2 || y.len() != n {
        return None;
    }
    let mx = mean(x)?;
    let my = mean(y)?;

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mx;
        let dy = yi - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    let denom = (sxx * syy).sqrt();
    if !denom.is_finite() || denom <= f64::MIN_POSITIVE {
        return None;
    }
    Some((sxy / denom).clamp(-1.0, 1.0))
}

/// Two-sided p-value for `H0: ρ = 0` given a sample correlation `r` over `n` pairs.
///
/// Uses the Student t statistic `t = r √((n-2)/(1-r²))` with `n - 2` degrees
/// of freedom. With two pairs the correlation is always ±1 and carries no
/// evidence, so the p-value is 1.
pub fn correlation_p_value(r: f64, n: usize) -> f64 {
    if n < 3 || !r.is_finite() {
        return 1.0;
    }
    let r2 = r * r;
    if r2 >= 1.0 {
        return 0.0;
    }
    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r2)).sqrt();

    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0),
        Err(_) => 1.0,
    }
}

/// Root-mean-square and mean absolute difference between two series.
pub fn rmse_mae(observed: &[f64], expected: &[f64]) -> Option<(f64, f64)> {
    if observed.is_empty() || observed.len() != expected.len() {
        return None;
    }
    let n = observed.len() as f64;
    let mut sq = 0.0;
    let mut abs = 0.0;
    for (o, e) in observed.iter().zip(expected) {
        let d = o - e;
        sq += d * d;
        abs += d.abs();
    }
    Some(((sq / n).sqrt(), abs / n))
}
