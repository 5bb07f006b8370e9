//! Log-domain reductions.
//!
//! Log-likelihood maps routinely contain `-inf` entries (impossible
//! candidates). The naive `m + ln Σ exp(v - m)` turns those into NaN when
//! `m = -inf`, so the shift only ever uses the largest *finite* value.

/// `ln Σ exp(v)` over `values`.
///
/// - `-inf` and NaN entries contribute no mass.
/// - Returns `-inf` when no entry is finite.
/// - Returns `+inf` if any entry is `+inf`.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    if values.iter().any(|v| *v == f64::INFINITY) {
        return f64::INFINITY;
    }

    let m = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    if !m.is_finite() {
        return f64::NEG_INFINITY;
    }

    let sum: f64 = values
        .iter()
        .filter(|v| v.is_finite())
        .map(|v| (v - m).exp())
        .sum();
    m + sum.ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_direct_sum_for_small_values() {
        let v = [0.1, -1.0, 2.0];
        let direct: f64 = v.iter().map(|x: &f64| x.exp()).sum::<f64>().ln();
        assert!((log_sum_exp(&v) - direct).abs() < 1e-12);
    }

    #[test]
    fn neg_infinity_contributes_nothing() {
        let v = [f64::NEG_INFINITY, 0.0, f64::NEG_INFINITY];
        assert!((log_sum_exp(&v) - 0.0).abs() < 1e-15);
    }

    #[test]
    fn all_neg_infinity_is_neg_infinity() {
        let v = [f64::NEG_INFINITY, f64::NEG_INFINITY];
        assert_eq!(log_sum_exp(&v), f64::NEG_INFINITY);
        assert_eq!(log_sum_exp(&[]), f64::NEG_INFINITY);
    }

    #[test]
    fn large_magnitudes_do_not_overflow() {
        let v = [-1000.0, -1000.0];
        let out = log_sum_exp(&v);
        assert!((out - (-1000.0 + 2f64.ln())).abs() < 1e-9);

        let v = [800.0, 799.0];
        assert!(log_sum_exp(&v).is_finite());
    }
}
