//! Legendre polynomials through the three-term recurrence
//! `(n+1) P_{n+1}(x) = (2n+1) x P_n(x) - n P_{n-1}(x)`.

use super::{LongFloat, long};

/// `P_0(x) ..= P_max_order(x)`.
pub fn legendre_values(x: f64, max_order: usize) -> Vec<f64> {
    let mut values = Vec::with_capacity(max_order + 1);
    values.push(1.0);
    if max_order == 0 {
        return values;
    }
    values.push(x);

    for n in 1..max_order {
        let order = n as f64;
        let next = ((2.0 * order + 1.0) * x * values[n] - order * values[n - 1]) / (order + 1.0);
        values.push(next);
    }

    values
}

/// Double-double variant of [`legendre_values`] used when accumulating moments.
pub fn legendre_values_long(x: LongFloat, max_order: usize) -> Vec<LongFloat> {
    let mut values = Vec::with_capacity(max_order + 1);
    values.push(long(1.0));
    if max_order == 0 {
        return values;
    }
    values.push(x);

    for n in 1..max_order {
        let order = n as f64;
        let next = (long(2.0 * order + 1.0) * x * values[n] - long(order) * values[n - 1])
            / long(order + 1.0);
        values.push(next);
    }

    values
}

/// `(P_n(x), P'_n(x))` for interior points `|x| < 1`.
pub fn legendre_and_derivative(n: usize, x: f64) -> (f64, f64) {
    if n == 0 {
        return (1.0, 0.0);
    }

    let values = legendre_values(x, n);
    let p_n = values[n];
    let p_n_minus_1 = values[n - 1];
    let derivative = n as f64 * (x * p_n - p_n_minus_1) / (x * x - 1.0);

    (p_n, derivative)
}

pub fn legendre_and_derivative_long(n: usize, x: LongFloat) -> (LongFloat, LongFloat) {
    if n == 0 {
        return (long(1.0), long(0.0));
    }

    let values = legendre_values_long(x, n);
    let p_n = values[n];
    let derivative = long(n as f64) * (x * p_n - values[n - 1]) / (x * x - long(1.0));

    (p_n, derivative)
}

#[cfg(test)]
mod tests {
    use super::{legendre_and_derivative, legendre_values, legendre_values_long};
    use crate::numerics::special::long;

    #[test]
    fn low_orders_match_closed_forms() {
        let x = 0.3;
        let values = legendre_values(x, 4);

        assert_eq!(values.len(), 5);
        assert_scalar_close("P0", 1.0, values[0], 1e-15, 0.0);
        assert_scalar_close("P1", x, values[1], 1e-15, 0.0);
        assert_scalar_close("P2", 0.5 * (3.0 * x * x - 1.0), values[2], 1e-15, 0.0);
        assert_scalar_close("P3", 0.5 * (5.0 * x * x * x - 3.0 * x), values[3], 1e-15, 0.0);
        assert_scalar_close(
            "P4",
            (35.0 * x.powi(4) - 30.0 * x * x + 3.0) / 8.0,
            values[4],
            1e-15,
            0.0,
        );
    }

    #[test]
    fn all_orders_are_one_at_forward_peak() {
        for value in legendre_values_long(long(1.0), 12) {
            assert_scalar_close("P_n(1)", 1.0, f64::from(value), 1e-15, 0.0);
        }
    }

    #[test]
    fn derivative_matches_closed_form() {
        let x = -0.4;
        let (p3, dp3) = legendre_and_derivative(3, x);
        assert_scalar_close("P3", 0.5 * (5.0 * x * x * x - 3.0 * x), p3, 1e-15, 0.0);
        assert_scalar_close("P3'", 0.5 * (15.0 * x * x - 3.0), dp3, 1e-14, 0.0);
    }

    fn assert_scalar_close(label: &str, expected: f64, actual: f64, abs_tol: f64, rel_tol: f64) {
        let abs_diff = (actual - expected).abs();
        let rel_diff = abs_diff / expected.abs().max(1.0);
        assert!(
            abs_diff <= abs_tol || rel_diff <= rel_tol,
            "{label} expected={expected:.15e} actual={actual:.15e} abs_diff={abs_diff:.15e}"
        );
    }
}
