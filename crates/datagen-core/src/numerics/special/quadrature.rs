//! Gauss-Legendre rules on `[-1, 1]` with Newton-refined nodes.

use super::legendre::{legendre_and_derivative, legendre_and_derivative_long};
use super::{LongFloat, long};
use std::f64::consts::PI;

const NEWTON_TOLERANCE: f64 = 1e-15;
const MAX_NEWTON_STEPS: usize = 100;
// Each Newton step doubles the correct digits of an f64 node.
const LONG_NEWTON_STEPS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct GaussLegendreRule {
    nodes: Vec<f64>,
    weights: Vec<f64>,
}

impl GaussLegendreRule {
    /// `order`-point rule, exact for polynomials up to degree `2 order - 1`.
    /// An order of zero is promoted to the one-point midpoint rule.
    pub fn new(order: usize) -> Self {
        let order = order.max(1);
        let mut nodes = vec![0.0; order];
        let mut weights = vec![0.0; order];

        // Roots are symmetric; refine the upper half and mirror it.
        for i in 0..order.div_ceil(2) {
            let mut x = (PI * (i as f64 + 0.75) / (order as f64 + 0.5)).cos();
            let mut derivative = 1.0;
            for _ in 0..MAX_NEWTON_STEPS {
                let (value, slope) = legendre_and_derivative(order, x);
                derivative = slope;
                let step = value / slope;
                x -= step;
                if step.abs() < NEWTON_TOLERANCE {
                    break;
                }
            }
            let (_, slope) = legendre_and_derivative(order, x);
            if slope.is_finite() && slope != 0.0 {
                derivative = slope;
            }

            let weight = 2.0 / ((1.0 - x * x) * derivative * derivative);
            nodes[i] = -x;
            nodes[order - 1 - i] = x;
            weights[i] = weight;
            weights[order - 1 - i] = weight;
        }

        if order % 2 == 1 {
            nodes[order / 2] = 0.0;
        }

        Self { nodes, weights }
    }

    pub fn order(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Nodes and weights mapped onto `[lower, upper]`.
    pub fn mapped(&self, lower: f64, upper: f64) -> impl Iterator<Item = (f64, f64)> + '_ {
        let mid = 0.5 * (lower + upper);
        let half_width = 0.5 * (upper - lower);
        self.nodes
            .iter()
            .zip(&self.weights)
            .map(move |(node, weight)| (mid + half_width * node, half_width * weight))
    }

    pub fn integrate<F>(&self, lower: f64, upper: f64, f: F) -> f64
    where
        F: Fn(f64) -> f64,
    {
        self.mapped(lower, upper).map(|(x, w)| w * f(x)).sum()
    }

    /// The same rule with nodes and weights polished in double-double.
    pub fn refined(&self) -> LongGaussLegendreRule {
        let order = self.order();
        let (nodes, weights) = self
            .nodes
            .iter()
            .map(|node| {
                let mut x = long(*node);
                for _ in 0..LONG_NEWTON_STEPS {
                    let (value, slope) = legendre_and_derivative_long(order, x);
                    if slope == long(0.0) {
                        break;
                    }
                    x -= value / slope;
                }
                let (_, slope) = legendre_and_derivative_long(order, x);
                (x, long(2.0) / ((long(1.0) - x * x) * slope * slope))
            })
            .unzip();

        LongGaussLegendreRule { nodes, weights }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LongGaussLegendreRule {
    nodes: Vec<LongFloat>,
    weights: Vec<LongFloat>,
}

impl LongGaussLegendreRule {
    pub fn new(order: usize) -> Self {
        GaussLegendreRule::new(order).refined()
    }

    pub fn order(&self) -> usize {
        self.nodes.len()
    }

    pub fn mapped(
        &self,
        lower: LongFloat,
        upper: LongFloat,
    ) -> impl Iterator<Item = (LongFloat, LongFloat)> + '_ {
        let mid = (lower + upper) / long(2.0);
        let half_width = (upper - lower) / long(2.0);
        self.nodes
            .iter()
            .zip(&self.weights)
            .map(move |(node, weight)| (mid + half_width * *node, half_width * *weight))
    }
}
