//! Power moments `M_k = ∫ x^k f(x) dx` from Legendre expansion coefficients.
//!
//! Expanding `x^k = Σ_l c(k,l) P_l(x)` gives `M_k = Σ_l f_l c(k,l)` where the
//! coefficients follow
//!
//! ```text
//! c(0,0) = 1
//! c(k,0) = c(k-1,1) / 3
//! c(k,l) = l/(2l-1) c(k-1,l-1) + (l+1)/(2l+3) c(k-1,l+1)
//! ```

use super::{LongFloat, long};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GaussMomentsError {
    #[error("gauss moments require at least 2 legendre moments, got {actual}")]
    InsufficientMoments { actual: usize },
}

/// Convert Legendre moments `f_0 .. f_{n-1}` into Gauss moments `M_0 .. M_{n-1}`.
pub fn gauss_moments_from_legendre(
    legendre_moments: &[LongFloat],
) -> Result<Vec<LongFloat>, GaussMomentsError> {
    let count = legendre_moments.len();
    if count < 2 {
        return Err(GaussMomentsError::InsufficientMoments { actual: count });
    }

    let coefficients = power_expansion_coefficients(count);
    let moments = coefficients
        .iter()
        .enumerate()
        .map(|(k, row)| {
            let mut moment = long(0.0);
            // c(k,l) vanishes for l > k and for l of opposite parity to k.
            for l in (k % 2..=k).step_by(2) {
                moment += legendre_moments[l] * row[l];
            }
            moment
        })
        .collect();

    Ok(moments)
}

/// Rows `c(k, 0..=count)` for `k < count`; the extra column keeps `c(k-1, l+1)` in range.
fn power_expansion_coefficients(count: usize) -> Vec<Vec<LongFloat>> {
    let width = count + 1;
    let mut rows = vec![vec![long(0.0); width]; count];
    rows[0][0] = long(1.0);

    for k in 1..count {
        rows[k][0] = rows[k - 1][1] / long(3.0);
        for l in 1..width {
            let degree = l as f64;
            let mut value = long(degree / (2.0 * degree - 1.0)) * rows[k - 1][l - 1];
            if l + 1 < width {
                value += long((degree + 1.0) / (2.0 * degree + 3.0)) * rows[k - 1][l + 1];
            }
            rows[k][l] = value;
        }
    }

    rows
}
