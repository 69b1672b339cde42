//! Floating-point helpers shared by the semirings and the scoring stages.

/// Numerically stable `ln(Σ exp(x))`.
///
/// Subtracts the maximum before exponentiating so that very negative
/// log-probabilities do not underflow to zero. An empty slice, or one whose
/// entries are all `-inf`, sums to `-inf`; any NaN operand yields NaN.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    if values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY || max == f64::INFINITY {
        // All mass is zero, or one operand already dominates everything.
        return max;
    }
    let sum: f64 = values.iter().map(|&v| (v - max).exp()).sum();
    max + sum.ln()
}

/// Closeness test with the same shape as `|a - b| <= atol + rtol * |b|`.
///
/// Identical values (including matching infinities) always compare equal;
/// NaN never does.
pub fn approx_eq(a: f64, b: f64, rtol: f64, atol: f64) -> bool {
    if a == b {
        return true;
    }
    if a.is_nan() || b.is_nan() || a.is_infinite() || b.is_infinite() {
        return false;
    }
    (a - b).abs() <= atol + rtol * b.abs()
}
