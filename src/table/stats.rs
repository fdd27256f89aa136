//! Small numeric helpers over column values.

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample variance (n - 1 denominator).
pub fn variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some(ss / (values.len() - 1) as f64)
}

/// Sample standard deviation.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    variance(values).map(f64::sqrt)
}

pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let mut iter = values.iter().copied();
    let first = iter.next()?;
    Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
}

/// Pearson correlation over rows where both sides are present.
pub fn correlation(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mx = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let my = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx).powi(2);
        syy += (y - my).powi(2);
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some(sxy / (sxx.sqrt() * syy.sqrt()))
}

/// `value` is within `tolerance` (relative) of `reference`.
///
/// A zero reference only matches an exact zero.
pub fn approx_eq(value: f64, reference: f64, tolerance: f64) -> bool {
    if reference == 0.0 {
        return value == 0.0;
    }
    (value - reference).abs() < tolerance * reference.abs()
}

/// min/max ratio of two magnitudes, 0 when either is zero.
pub fn ratio(a: f64, b: f64) -> f64 {
    let (a, b) = (a.abs(), b.abs());
    let hi = a.max(b);
    if hi == 0.0 {
        return 0.0;
    }
    a.min(b) / hi
}

/// Digits after the decimal point in the shortest rendering of `v`.
pub fn decimal_places(v: f64) -> usize {
    let s = format!("{}", v);
    s.split_once('.').map(|(_, frac)| frac.len()).unwrap_or(0)
}

/// Trailing zeros of the integer part, used as a roundness signal.
pub fn trailing_zeros(v: f64) -> u32 {
    if v.fract() != 0.0 || v == 0.0 || !v.is_finite() {
        return 0;
    }
    let mut n = v.abs();
    let mut zeros = 0;
    while n >= 10.0 && (n % 10.0) == 0.0 {
        n /= 10.0;
        zeros += 1;
    }
    zeros
}
