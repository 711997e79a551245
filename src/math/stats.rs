//! Small numeric helpers shared by the scoring engines.
//!
//! Every function tolerates empty input and returns a neutral value
//! instead of NaN.

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by n).
pub fn population_std(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Least-squares slope of `ys` against `xs`. Zero when fewer than two
/// points or when all x are equal.
pub fn linear_slope(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return 0.0;
    }
    let xm = mean(&xs[..n]);
    let ym = mean(&ys[..n]);
    let mut num = 0.0;
    let mut den = 0.0;
    for i in 0..n {
        num += (xs[i] - xm) * (ys[i] - ym);
        den += (xs[i] - xm) * (xs[i] - xm);
    }
    safe_div(num, den, 0.0)
}

/// Slope of `ys` against their indices 0..n.
pub fn index_slope(ys: &[f64]) -> f64 {
    let xs: Vec<f64> = (0..ys.len()).map(|i| i as f64).collect();
    linear_slope(&xs, ys)
}

/// Pearson correlation over the common prefix. Zero when the denominator
/// vanishes.
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n == 0 {
        return 0.0;
    }
    let mx = mean(&x[..n]);
    let my = mean(&y[..n]);
    let mut sxy = 0.0;
    let mut sx2 = 0.0;
    let mut sy2 = 0.0;
    for i in 0..n {
        let dx = x[i] - mx;
        let dy = y[i] - my;
        sxy += dx * dy;
        sx2 += dx * dx;
        sy2 += dy * dy;
    }
    let den = (sx2 * sy2).sqrt();
    safe_div(sxy, den, 0.0)
}

/// Spearman-Brown prophecy for a split-half correlation. Returns -1 for
/// the degenerate r = -1 case.
pub fn spearman_brown(r: f64) -> f64 {
    if 1.0 + r == 0.0 {
        return -1.0;
    }
    2.0 * r / (1.0 + r)
}

pub fn safe_div(num: f64, den: f64, fallback: f64) -> f64 {
    if den == 0.0 || !den.is_finite() {
        return fallback;
    }
    let out = num / den;
    if out.is_finite() { out } else { fallback }
}

pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        return lo;
    }
    value.max(lo).min(hi)
}

pub fn logistic(x: f64, center: f64, steepness: f64) -> f64 {
    1.0 / (1.0 + (-steepness * (x - center)).exp())
}

pub fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}
