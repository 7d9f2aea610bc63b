//! Gauss-Radau quadrature with a fixed node at `x = 1` built from Legendre
//! moments, following the orthogonal polynomial construction of Sloan
//! (SAND83-7094, appendix B).
//!
//! The free nodes are the roots of the polynomials `Q_i` orthogonal with respect
//! to the Radau moments `R_n = G_n - G_{n+1}`, where `G_n` are the Gauss (power)
//! moments of the weighting function. `Q_i` obeys the three-term recurrence
//! `Q_i(x) = (x - a_i) Q_{i-1}(x) - b_{i-1} Q_{i-2}(x)`.

use super::gauss_moments::{GaussMomentsError, gauss_moments_from_legendre};
use super::legendre::legendre_values;
use super::{LongFloat, long};
use faer::{Col, Mat};

const ROOT_BRACKET_WIDTH: f64 = 1e-30;
const MAX_BISECTION_STEPS: usize = 200;
// Relative size below which `N_i` is rounding left over from the moment conversion.
const NORMALIZATION_NOISE: f64 = 1e-26;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum RadauError {
    #[error("radau quadrature needs at least one node")]
    NoNodesRequested,
    #[error("{nodes} radau nodes require at least {required} legendre moments, got {actual}")]
    InsufficientMoments {
        nodes: usize,
        required: usize,
        actual: usize,
    },
    #[error("legendre moments leave no probability away from x = 1 (radau moment {value})")]
    DegenerateMoments { value: f64 },
    #[error(transparent)]
    GaussMoments(#[from] GaussMomentsError),
}

/// Nodes and weights of a Radau rule; the last node is always `x = 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct RadauRule {
    pub nodes: Vec<f64>,
    pub weights: Vec<f64>,
    pub requested_nodes: usize,
}

impl RadauRule {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True when fewer nodes than requested could be supported by the moments.
    pub fn is_truncated(&self) -> bool {
        self.nodes.len() < self.requested_nodes
    }

    /// `Σ_i w_i P_k(x_i) - M_k` for every supplied Legendre moment `M_k`.
    pub fn moment_residuals(&self, legendre_moments: &[f64]) -> Vec<f64> {
        let order_count = legendre_moments.len();
        if order_count == 0 {
            return Vec::new();
        }

        let columns: Vec<Vec<f64>> = self
            .nodes
            .iter()
            .map(|node| legendre_values(*node, order_count - 1))
            .collect();
        let vandermonde = Mat::from_fn(order_count, columns.len(), |row, column| {
            columns[column][row]
        });
        let weights = Col::from_fn(self.weights.len(), |index| self.weights[index]);
        let moments = Col::from_fn(order_count, |index| legendre_moments[index]);

        let discrete = &vandermonde * &weights;
        let residuals = &discrete - &moments;
        (0..order_count).map(|row| residuals[row]).collect()
    }
}

pub trait RadauQuadratureApi {
    fn radau_nodes_and_weights(&self, number_of_nodes: usize) -> Result<RadauRule, RadauError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SloanRadauQuadrature {
    legendre_moments: Vec<LongFloat>,
}

/// Orthogonal polynomial recurrence state shared by root finding and weights.
struct Recurrence {
    means: Vec<LongFloat>,
    variances: Vec<LongFloat>,
    normalization_factors: Vec<LongFloat>,
}

impl Recurrence {
    /// `Q_order(x)` through the three-term recurrence.
    fn polynomial(&self, x: LongFloat, order: usize) -> LongFloat {
        if order == 0 {
            return long(1.0);
        }

        let mut previous = long(1.0);
        let mut current = x - self.means[1];
        for k in 2..=order {
            let next = (x - self.means[k]) * current - self.variances[k - 1] * previous;
            previous = current;
            current = next;
        }
        current
    }

    /// Bisect the roots of `Q_order` between the roots of `Q_{order-1}`.
    ///
    /// Returns `None` when the polynomial does not have the sign pattern of an
    /// orthogonal polynomial on `[-1, 1]`.
    fn roots(&self, previous_roots: &[LongFloat], order: usize) -> Option<Vec<LongFloat>> {
        let mut bounds = Vec::with_capacity(order + 1);
        bounds.push(long(-1.0));
        bounds.extend_from_slice(&previous_roots[..order - 1]);
        bounds.push(long(1.0));

        if self.polynomial(long(1.0), order) <= long(0.0) {
            return None;
        }
        let sign_at_minus_one = if order % 2 == 0 { long(1.0) } else { long(-1.0) };
        if self.polynomial(long(-1.0), order) * sign_at_minus_one < long(0.0) {
            return None;
        }

        let mut roots = Vec::with_capacity(order);
        for k in 0..order {
            let mut lower = bounds[k];
            let mut upper = bounds[k + 1];
            let mut at_lower = self.polynomial(lower, order);
            let at_upper = self.polynomial(upper, order);
            if at_lower * at_upper > long(0.0) {
                return None;
            }

            let mut root = (lower + upper) / long(2.0);
            for _ in 0..MAX_BISECTION_STEPS {
                root = (lower + upper) / long(2.0);
                if root == lower || root == upper || (upper - lower) <= long(ROOT_BRACKET_WIDTH) {
                    break;
                }

                let remainder = self.polynomial(root, order);
                let product = remainder * at_lower;
                if product > long(0.0) {
                    lower = root;
                    at_lower = remainder;
                } else if product < long(0.0) {
                    upper = root;
                } else {
                    break;
                }
            }
            roots.push(root);
        }

        Some(roots)
    }
}

impl SloanRadauQuadrature {
    pub fn new(legendre_moments: &[LongFloat]) -> Self {
        Self {
            legendre_moments: legendre_moments.to_vec(),
        }
    }

    pub fn from_f64(legendre_moments: &[f64]) -> Self {
        Self {
            legendre_moments: legendre_moments.iter().copied().map(long).collect(),
        }
    }

    pub fn legendre_moments(&self) -> &[LongFloat] {
        &self.legendre_moments
    }

    /// `R_n = G_n - G_{n+1}` for `n < L - 1` where `L` is the Legendre moment count.
    pub fn radau_moments(&self) -> Result<Vec<LongFloat>, RadauError> {
        let gauss = gauss_moments_from_legendre(&self.legendre_moments)?;
        Ok(gauss.windows(2).map(|pair| pair[0] - pair[1]).collect())
    }

    /// Find the `number_of_nodes`-point rule, the last node being `x = 1`.
    ///
    /// When the moments support fewer nodes the largest supported rule is returned
    /// and a warning is logged.
    pub fn radau_nodes_and_weights(&self, number_of_nodes: usize) -> Result<RadauRule, RadauError> {
        if number_of_nodes == 0 {
            return Err(RadauError::NoNodesRequested);
        }
        let required = (2 * number_of_nodes - 1).max(2);
        if self.legendre_moments.len() < required {
            return Err(RadauError::InsufficientMoments {
                nodes: number_of_nodes,
                required,
                actual: self.legendre_moments.len(),
            });
        }

        let radau_moments = self.radau_moments()?;
        if radau_moments[0] <= long(0.0) {
            return Err(RadauError::DegenerateMoments {
                value: f64::from(radau_moments[0]),
            });
        }
        if number_of_nodes == 1 || radau_moments.len() < 2 {
            return Ok(self.forward_only_rule(number_of_nodes));
        }

        let moment_count = radau_moments.len();
        let mut root_count = (moment_count - 1) / 2 + 1;
        let mut coefficient_count = moment_count - root_count + 1;

        let mut coefficients = vec![vec![long(0.0); coefficient_count]; coefficient_count];
        let mut ratios = vec![long(0.0); coefficient_count];
        let mut recurrence = Recurrence {
            means: vec![long(0.0); coefficient_count + 1],
            variances: vec![long(0.0); coefficient_count],
            normalization_factors: vec![long(0.0); coefficient_count],
        };

        coefficients[0][0] = long(1.0);
        recurrence.normalization_factors[0] =
            normalization_factor(&coefficients, &radau_moments, 0);

        let mut i = 1;
        while i < root_count {
            ratios[i] = normalization_ratio(
                &coefficients,
                &recurrence.normalization_factors,
                &radau_moments,
                i,
            );
            recurrence.means[i] = mean_coefficient(&ratios, i);
            update_coefficients(&mut coefficients, &recurrence, i);
            recurrence.normalization_factors[i] =
                normalization_factor(&coefficients, &radau_moments, i);
            recurrence.variances[i] =
                recurrence.normalization_factors[i] / recurrence.normalization_factors[i - 1];

            // A non-positive variance would produce a negative weight; one at
            // rounding level means the moments have no more support points.
            let noise_floor =
                normalization_scale(&coefficients, &radau_moments, i) * NORMALIZATION_NOISE;
            if recurrence.variances[i] <= long(0.0)
                || recurrence.normalization_factors[i] <= noise_floor
            {
                tracing::debug!(order = i, "radau variance is not positive; truncating order");
                root_count = i;
                coefficient_count = i + 1;
            }
            i += 1;
        }

        if coefficient_count > root_count {
            let last = coefficient_count - 1;
            ratios[last] = normalization_ratio(
                &coefficients,
                &recurrence.normalization_factors,
                &radau_moments,
                last,
            );
            recurrence.means[last] = mean_coefficient(&ratios, last);
        }

        let first_moment_ratio = self.legendre_moments[1] / self.legendre_moments[0];
        let mut roots: Vec<Vec<LongFloat>> = vec![Vec::new(); coefficient_count + 1];

        if recurrence.means[1] >= first_moment_ratio {
            root_count = 1;
            roots[1] = vec![
                -recurrence.normalization_factors[0] / (long(2.0) * self.legendre_moments[0]),
            ];
        } else {
            roots[1] = vec![recurrence.means[1]];

            let mut order = 2;
            while order < coefficient_count {
                match recurrence.roots(&roots[order - 1], order) {
                    Some(found) => roots[order] = found,
                    None => {
                        coefficient_count = order;
                        root_count = order;
                    }
                }
                order += 1;
            }

            // An odd expansion can sometimes support one more root through an
            // estimated extra mean coefficient.
            if coefficient_count == root_count && root_count > 1 {
                recurrence.means[root_count] = estimate_extra_mean_coefficient(
                    &recurrence,
                    self.legendre_moments[0],
                    root_count,
                );
                match recurrence.roots(&roots[root_count - 1], root_count) {
                    Some(found) => roots[root_count] = found,
                    None => root_count -= 1,
                }
            }
        }

        let free_nodes = if number_of_nodes > root_count + 1 {
            tracing::warn!(
                wanted = number_of_nodes,
                available = root_count + 1,
                "radau moments only support {} of the {} nodes wanted",
                root_count + 1,
                number_of_nodes
            );
            root_count
        } else {
            number_of_nodes - 1
        };

        let mut nodes: Vec<LongFloat> = roots[free_nodes][..free_nodes].to_vec();
        nodes.push(long(1.0));

        let mut weights = Vec::with_capacity(nodes.len());
        let mut sum_of_weights = long(0.0);
        for node in &nodes[..free_nodes] {
            let mut christoffel = long(0.0);
            for k in 0..free_nodes {
                let polynomial = recurrence.polynomial(*node, k);
                christoffel += polynomial * polynomial / recurrence.normalization_factors[k];
            }
            let weight = long(1.0) / (christoffel * (long(1.0) - *node)) / self.legendre_moments[0];
            sum_of_weights += weight;
            weights.push(weight);
        }
        if sum_of_weights > long(1.0) {
            tracing::warn!(
                sum = f64::from(sum_of_weights),
                "radau weights of the free nodes exceed unity; the forward weight is non-physical"
            );
        }
        weights.push(long(1.0) - sum_of_weights);

        Ok(RadauRule {
            nodes: nodes.into_iter().map(f64::from).collect(),
            weights: weights.into_iter().map(f64::from).collect(),
            requested_nodes: number_of_nodes,
        })
    }

    fn forward_only_rule(&self, number_of_nodes: usize) -> RadauRule {
        if number_of_nodes > 1 {
            tracing::warn!(
                wanted = number_of_nodes,
                "radau moments only support the forward node"
            );
        }
        RadauRule {
            nodes: vec![1.0],
            weights: vec![1.0],
            requested_nodes: number_of_nodes,
        }
    }
}

impl RadauQuadratureApi for SloanRadauQuadrature {
    fn radau_nodes_and_weights(&self, number_of_nodes: usize) -> Result<RadauRule, RadauError> {
        SloanRadauQuadrature::radau_nodes_and_weights(self, number_of_nodes)
    }
}

/// `N_i = Σ_{k<=i} a_{i,k} R_{k+i}`.
fn normalization_factor(
    coefficients: &[Vec<LongFloat>],
    radau_moments: &[LongFloat],
    i: usize,
) -> LongFloat {
    let mut factor = long(0.0);
    for k in 0..=i {
        factor += coefficients[i][k] * radau_moments[k + i];
    }
    factor
}

/// `Σ_{k<=i} |a_{i,k} R_{k+i}|`, the scale of the terms cancelling in `N_i`.
fn normalization_scale(
    coefficients: &[Vec<LongFloat>],
    radau_moments: &[LongFloat],
    i: usize,
) -> LongFloat {
    let mut scale = long(0.0);
    for k in 0..=i {
        scale += (coefficients[i][k] * radau_moments[k + i]).abs();
    }
    scale
}

/// `L_i / N_{i-1}` with `L_i = Σ_{k<i} a_{i-1,k} R_{k+i}`.
fn normalization_ratio(
    coefficients: &[Vec<LongFloat>],
    normalization_factors: &[LongFloat],
    radau_moments: &[LongFloat],
    i: usize,
) -> LongFloat {
    let mut factor = long(0.0);
    for k in 0..i {
        factor += coefficients[i - 1][k] * radau_moments[k + i];
    }
    factor / normalization_factors[i - 1]
}

fn mean_coefficient(ratios: &[LongFloat], i: usize) -> LongFloat {
    if i == 1 {
        ratios[1]
    } else {
        ratios[i] - ratios[i - 1]
    }
}

fn update_coefficients(coefficients: &mut [Vec<LongFloat>], recurrence: &Recurrence, i: usize) {
    let mean = recurrence.means[i];
    coefficients[i][i] = long(1.0);

    if i == 1 {
        coefficients[1][0] = -mean * coefficients[0][0];
        return;
    }

    let variance = recurrence.variances[i - 1];
    coefficients[i][0] = -mean * coefficients[i - 1][0] - variance * coefficients[i - 2][0];
    for k in 1..i {
        coefficients[i][k] = coefficients[i - 1][k - 1]
            - mean * coefficients[i - 1][k]
            - variance * coefficients[i - 2][k];
    }
}

fn estimate_extra_mean_coefficient(
    recurrence: &Recurrence,
    zeroth_moment: LongFloat,
    root_count: usize,
) -> LongFloat {
    let plus_one = long(1.0);
    let minus_one = long(-1.0);
    let ratio_at_plus_one = recurrence.polynomial(plus_one, root_count - 2)
        / recurrence.polynomial(plus_one, root_count - 1);
    let ratio_at_minus_one = recurrence.polynomial(minus_one, root_count - 2)
        / recurrence.polynomial(minus_one, root_count - 1);

    let mut polynomial = recurrence.polynomial(plus_one, 1);
    let mut parameter = zeroth_moment - recurrence.normalization_factors[0] / polynomial;
    for k in 2..root_count {
        let previous = polynomial;
        polynomial = recurrence.polynomial(plus_one, k);
        parameter -= recurrence.normalization_factors[k] / (previous * polynomial);
    }

    -recurrence.variances[root_count - 1] / long(2.0) * (ratio_at_plus_one + ratio_at_minus_one)
        - recurrence.normalization_factors[root_count - 1]
            / (long(2.0) * polynomial * polynomial * parameter)
}
