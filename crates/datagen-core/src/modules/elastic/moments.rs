//! Legendre moments of the coupled elastic distribution above the cutoff angle.
//!
//! `M_l = ∫_{mu_c}^{1} P_l(mu) f(mu) dmu / ∫_{mu_c}^{1} f(mu) dmu`, so `M_0 = 1`.
//! The tabulated part is piecewise linear and integrated exactly segment by
//! segment. The screened Rutherford tail `A / (eta + y)^2`, `y = 1 - mu`, is
//! handled in `y` throughout so nothing is lost to `1 - mu` cancellation,
//! either by the closed-form power-moment recursion or by geometric-panel
//! quadrature.

use crate::distribution::{CoupledElasticDistribution, CoupledElasticPdf, CoupledError};
use crate::numerics::special::{
    LongFloat, LongGaussLegendreRule, legendre_values, legendre_values_long, long,
};

// Below this `delta / eta` the power moments come from their Taylor series.
const SERIES_RATIO_LIMIT: f64 = 0.5;
const SERIES_TOLERANCE: f64 = 1e-34;
const MAX_SERIES_TERMS: usize = 200;
const LOG_SERIES_TOLERANCE: f64 = 1e-34;
const MAX_LOG_SERIES_TERMS: usize = 60;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MomentsError {
    #[error(transparent)]
    Coupled(#[from] CoupledError),
    #[error(
        "elastic distribution at {energy} MeV has no probability above the cutoff angle cosine {cutoff_angle_cosine}"
    )]
    ZeroMass {
        energy: f64,
        cutoff_angle_cosine: f64,
    },
}

/// How the screened Rutherford tail contributes to the moments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RutherfordMomentsMethod {
    /// Closed-form recursion on the power moments of `1 / (eta + y)^2`.
    #[default]
    Recursion,
    /// Gauss-Legendre quadrature on geometric panels, sized from the precision.
    NumericalIntegration,
}

pub trait ElasticMomentsEvaluator {
    /// Normalized Legendre moments `M_0..=M_order` at `energy`.
    fn evaluate_elastic_moments(
        &self,
        energy: f64,
        order: usize,
        precision: f64,
    ) -> Result<Vec<LongFloat>, MomentsError>;
}

#[derive(Debug, Clone)]
pub struct CoupledElasticMomentsEvaluator {
    distribution: CoupledElasticDistribution,
    cutoff_angle_cosine: f64,
    rutherford_method: RutherfordMomentsMethod,
}

impl CoupledElasticMomentsEvaluator {
    pub fn new(distribution: CoupledElasticDistribution, cutoff_angle_cosine: f64) -> Self {
        Self {
            distribution,
            cutoff_angle_cosine,
            rutherford_method: RutherfordMomentsMethod::default(),
        }
    }

    pub fn with_rutherford_moments_method(mut self, method: RutherfordMomentsMethod) -> Self {
        self.rutherford_method = method;
        self
    }

    pub fn distribution(&self) -> &CoupledElasticDistribution {
        &self.distribution
    }

    pub fn cutoff_angle_cosine(&self) -> f64 {
        self.cutoff_angle_cosine
    }

    pub fn rutherford_moments_method(&self) -> RutherfordMomentsMethod {
        self.rutherford_method
    }

    /// `f_R(mu; eta) P_n(mu)` with the tail renormalized for `screening_constant`.
    pub fn evaluate_legendre_expanded_rutherford(
        &self,
        angle_cosine: f64,
        energy: f64,
        screening_constant: f64,
        n: usize,
    ) -> Result<f64, MomentsError> {
        let pdf = self.distribution.at_energy(energy)?;
        let value = pdf.evaluate_rutherford_with(angle_cosine, screening_constant);
        Ok(value * legendre_values(angle_cosine, n)[n])
    }

    /// `f(mu) P_n(mu)` for the full coupled pdf.
    pub fn evaluate_legendre_expanded_pdf(
        &self,
        angle_cosine: f64,
        energy: f64,
        n: usize,
    ) -> Result<f64, MomentsError> {
        let pdf = self.distribution.at_energy(energy)?;
        Ok(pdf.evaluate(angle_cosine) * legendre_values(angle_cosine, n)[n])
    }

    fn tabular_moments(&self, pdf: &CoupledElasticPdf, order: usize, sums: &mut [LongFloat]) {
        let peak = pdf.peak_angle_cosine();
        let tabular = pdf.tabular();
        if self.cutoff_angle_cosine >= peak || tabular.norm() <= 0.0 {
            return;
        }

        let rule = LongGaussLegendreRule::new(order / 2 + 2);
        let scale = long(pdf.cutoff_ratio()) / long(tabular.norm());
        let (angles, values) = (tabular.x(), tabular.y());
        for i in 0..angles.len().saturating_sub(1) {
            let lower = angles[i].max(self.cutoff_angle_cosine);
            let upper = angles[i + 1].min(peak);
            if upper <= lower {
                continue;
            }

            let (x0, y0) = (long(angles[i]), long(values[i]));
            let slope = (long(values[i + 1]) - y0) / (long(angles[i + 1]) - x0);
            for (mu, weight) in rule.mapped(long(lower), long(upper)) {
                let density = scale * (y0 + slope * (mu - x0));
                accumulate(sums, weight * density, &legendre_values_long(mu, order));
            }
        }
    }

    fn rutherford_moments(
        &self,
        pdf: &CoupledElasticPdf,
        order: usize,
        precision: f64,
        sums: &mut [LongFloat],
    ) {
        let eta = pdf.screening_constant();
        let lower_angle = self.cutoff_angle_cosine.max(pdf.peak_angle_cosine());
        if !pdf.has_rutherford_tail() || !eta.is_finite() || eta <= 0.0 || lower_angle >= 1.0 {
            return;
        }

        let eta = long(eta);
        let delta = long(1.0) - long(lower_angle);
        let mass = long(pdf.rutherford_amplitude()) * delta / (eta * (eta + delta));
        let moments = match self.rutherford_method {
            RutherfordMomentsMethod::Recursion => {
                screened_rutherford_moments_by_recursion(eta, delta, order)
            }
            RutherfordMomentsMethod::NumericalIntegration => {
                screened_rutherford_moments_by_integration(eta, delta, order, precision)
            }
        };
        accumulate(sums, mass, &moments);
    }
}

impl ElasticMomentsEvaluator for CoupledElasticMomentsEvaluator {
    fn evaluate_elastic_moments(
        &self,
        energy: f64,
        order: usize,
        precision: f64,
    ) -> Result<Vec<LongFloat>, MomentsError> {
        let pdf = self.distribution.at_energy(energy)?;

        let mut sums = vec![long(0.0); order + 1];
        self.tabular_moments(&pdf, order, &mut sums);
        self.rutherford_moments(&pdf, order, precision, &mut sums);

        let mass = sums[0];
        let mass_value = f64::from(mass);
        if mass_value <= 0.0 || !mass_value.is_finite() {
            return Err(MomentsError::ZeroMass {
                energy,
                cutoff_angle_cosine: self.cutoff_angle_cosine,
            });
        }
        Ok(sums.into_iter().map(|sum| sum / mass).collect())
    }
}

/// Normalized moments `M_0..=M_order` of `1 / (eta + y)^2` on `y ∈ [0, delta]`,
/// `mu = 1 - y`.
///
/// With `r = delta / eta` and `y = delta s` the moments are combinations of
/// `a_k = ∫_0^1 s^k / (1 + r s)^2 ds` weighted by the coefficients of
/// `P_l(1 - delta s)` in powers of `s`.
pub fn screened_rutherford_moments_by_recursion(
    screening_constant: LongFloat,
    delta: LongFloat,
    order: usize,
) -> Vec<LongFloat> {
    let ratio = delta / screening_constant;
    let power_moments = scaled_power_moments(ratio, order);
    let mass = power_moments[0];

    shifted_legendre_coefficients(delta, order)
        .iter()
        .map(|coefficients| {
            let mut sum = long(0.0);
            for (coefficient, moment) in coefficients.iter().zip(&power_moments) {
                sum += *coefficient * *moment;
            }
            sum / mass
        })
        .collect()
}

/// Same moments as [`screened_rutherford_moments_by_recursion`] from
/// double-double Gauss-Legendre quadrature.
///
/// Panels double in width from `[0, eta]`, so the pole at `y = -eta` stays at
/// least three half-widths from every panel centre. The node count is fixed
/// from that bound: the error falls by at least `4` per node beyond `order / 2`.
pub fn screened_rutherford_moments_by_integration(
    screening_constant: LongFloat,
    delta: LongFloat,
    order: usize,
    precision: f64,
) -> Vec<LongFloat> {
    let precision = if precision > 0.0 && precision < 1.0 {
        precision
    } else {
        f64::EPSILON
    };
    let nodes = ((order as f64 + (1.0 / precision).ln() / 4.0_f64.ln()) / 2.0).ceil() as usize + 1;
    let rule = LongGaussLegendreRule::new(nodes);

    let mut sums = vec![long(0.0); order + 1];
    let mut lower = long(0.0);
    let mut upper = if screening_constant < delta {
        screening_constant
    } else {
        delta
    };
    loop {
        for (y, weight) in rule.mapped(lower, upper) {
            let distance = screening_constant + y;
            let density = weight / (distance * distance);
            accumulate(&mut sums, density, &legendre_values_long(long(1.0) - y, order));
        }
        if upper >= delta {
            break;
        }
        lower = upper;
        let doubled = upper * long(2.0);
        upper = if doubled < delta { doubled } else { delta };
    }

    let mass = sums[0];
    sums.into_iter().map(|sum| sum / mass).collect()
}

fn accumulate(sums: &mut [LongFloat], weight: LongFloat, values: &[LongFloat]) {
    for (sum, value) in sums.iter_mut().zip(values) {
        *sum += weight * *value;
    }
}

/// `a_k = ∫_0^1 s^k / (1 + r s)^2 ds` for `k = 0..=order`.
fn scaled_power_moments(ratio: LongFloat, order: usize) -> Vec<LongFloat> {
    if ratio <= SERIES_RATIO_LIMIT {
        // a_k = Σ_m (m + 1) (-r)^m / (k + m + 1)
        return (0..=order)
            .map(|k| {
                let mut sum = long(0.0);
                let mut power = long(1.0);
                for m in 0..MAX_SERIES_TERMS {
                    let term = power * long((m + 1) as f64) / long((k + m + 1) as f64);
                    sum += term;
                    if term.abs() <= sum.abs() * SERIES_TOLERANCE {
                        break;
                    }
                    power *= -ratio;
                }
                sum
            })
            .collect();
    }

    // b_k = ∫_0^1 s^k / (1 + r s) ds, b_k = (1/k - b_{k-1}) / r,
    // a_k = (b_{k-1} - a_{k-1}) / r.
    let mut moments = Vec::with_capacity(order + 1);
    let mut a = long(1.0) / (long(1.0) + ratio);
    let mut b = log_one_plus(ratio) / ratio;
    moments.push(a);
    for k in 1..=order {
        a = (b - a) / ratio;
        b = (long(1.0) / long(k as f64) - b) / ratio;
        moments.push(a);
    }
    moments
}

/// Coefficients in `s` of `P_l(1 - delta s)` for `l = 0..=order`.
fn shifted_legendre_coefficients(delta: LongFloat, order: usize) -> Vec<Vec<LongFloat>> {
    let mut rows = vec![vec![long(1.0)]];
    if order == 0 {
        return rows;
    }
    rows.push(vec![long(1.0), -delta]);

    for l in 1..order {
        let scale = long((2 * l + 1) as f64);
        let mut next = vec![long(0.0); l + 2];
        for (k, coefficient) in rows[l].iter().enumerate() {
            next[k] += scale * *coefficient;
            next[k + 1] -= scale * delta * *coefficient;
        }
        for (k, coefficient) in rows[l - 1].iter().enumerate() {
            next[k] -= long(l as f64) * *coefficient;
        }
        let divisor = long((l + 1) as f64);
        rows.push(next.into_iter().map(|value| value / divisor).collect());
    }
    rows
}

/// `ln(1 + x)` for `x > 0` in double-double, reduced to `m 2^k` with
/// `m ∈ [1/√2, √2]` and summed as `2 atanh((m - 1) / (m + 1))`.
fn log_one_plus(x: LongFloat) -> LongFloat {
    let value = long(1.0) + x;
    let exponent = value.hi().log2().round();
    let mantissa = value * long((-exponent).exp2());

    let z = (mantissa - long(1.0)) / (mantissa + long(1.0));
    let z_squared = z * z;
    let mut power = z;
    let mut sum = long(0.0);
    for j in 0..MAX_LOG_SERIES_TERMS {
        let term = power / long((2 * j + 1) as f64);
        sum += term;
        if term.abs() <= sum.abs() * LOG_SERIES_TOLERANCE {
            break;
        }
        power *= z_squared;
    }

    twofloat::consts::LN_2 * long(exponent) + long(2.0) * sum
}
