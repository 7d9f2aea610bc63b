//! One dimensional tabulated distributions.

use std::fmt::Debug;
use std::marker::PhantomData;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum TabularError {
    #[error("tabular distribution needs at least one point")]
    Empty,
    #[error("tabular distribution has {x_len} independent values but {y_len} dependent values")]
    LengthMismatch { x_len: usize, y_len: usize },
    #[error("independent values must be strictly increasing (index {index}, value {value})")]
    NotIncreasing { index: usize, value: f64 },
}

/// Interpolation between two tabulated points.
pub trait OneDInterpolation: Debug + Clone + Copy + Default + Send + Sync + 'static {
    const NAME: &'static str;

    fn interpolate(x0: f64, x1: f64, x: f64, y0: f64, y1: f64) -> f64;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinLin;

impl OneDInterpolation for LinLin {
    const NAME: &'static str = "Lin-Lin";

    fn interpolate(x0: f64, x1: f64, x: f64, y0: f64, y1: f64) -> f64 {
        if x1 == x0 {
            return y0;
        }
        y0 + (x - x0) * (y1 - y0) / (x1 - x0)
    }
}

/// Log-Log interpolation, falling back to Lin-Lin whenever a value is not
/// strictly positive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogLog;

impl OneDInterpolation for LogLog {
    const NAME: &'static str = "Log-Log";

    fn interpolate(x0: f64, x1: f64, x: f64, y0: f64, y1: f64) -> f64 {
        if x0 <= 0.0 || x <= 0.0 || y0 <= 0.0 || y1 <= 0.0 || x1 == x0 {
            return LinLin::interpolate(x0, x1, x, y0, y1);
        }
        let log_y = y0.ln() + (x / x0).ln() * (y1 / y0).ln() / (x1 / x0).ln();
        log_y.exp()
    }
}

/// Tabulated `y(x)` with strictly increasing `x`, zero outside `[x_0, x_n]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TabularDistribution<P: OneDInterpolation> {
    x: Vec<f64>,
    y: Vec<f64>,
    cdf: Vec<f64>,
    _policy: PhantomData<P>,
}

impl<P: OneDInterpolation> TabularDistribution<P> {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Result<Self, TabularError> {
        if x.is_empty() {
            return Err(TabularError::Empty);
        }
        if x.len() != y.len() {
            return Err(TabularError::LengthMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        if let Some(index) = x.windows(2).position(|pair| pair[1] <= pair[0]) {
            return Err(TabularError::NotIncreasing {
                index: index + 1,
                value: x[index + 1],
            });
        }

        // Trapezoidal running integral; exact for Lin-Lin tables.
        let mut cdf = Vec::with_capacity(x.len());
        cdf.push(0.0);
        for i in 1..x.len() {
            let area = 0.5 * (y[i] + y[i - 1]) * (x[i] - x[i - 1]);
            cdf.push(cdf[i - 1] + area);
        }

        Ok(Self {
            x,
            y,
            cdf,
            _policy: PhantomData,
        })
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    pub fn lower_bound(&self) -> f64 {
        self.x[0]
    }

    pub fn upper_bound(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    pub fn interpolation_name(&self) -> &'static str {
        P::NAME
    }

    /// Index `i` with `x[i] <= value <= x[i + 1]`, for values inside the domain.
    fn interval(&self, value: f64) -> usize {
        self.x
            .partition_point(|x| *x <= value)
            .saturating_sub(1)
            .min(self.x.len().saturating_sub(2))
    }

    pub fn evaluate(&self, value: f64) -> f64 {
        if value < self.lower_bound() || value > self.upper_bound() {
            return 0.0;
        }
        if self.x.len() == 1 {
            return self.y[0];
        }

        let i = self.interval(value);
        P::interpolate(self.x[i], self.x[i + 1], value, self.y[i], self.y[i + 1])
    }

    /// Integral of the table over its whole domain.
    pub fn norm(&self) -> f64 {
        self.cdf[self.cdf.len() - 1]
    }

    pub fn evaluate_pdf(&self, value: f64) -> f64 {
        let norm = self.norm();
        if norm <= 0.0 {
            return 0.0;
        }
        self.evaluate(value) / norm
    }

    pub fn evaluate_cdf(&self, value: f64) -> f64 {
        let norm = self.norm();
        if norm <= 0.0 || value <= self.lower_bound() {
            return 0.0;
        }
        if value >= self.upper_bound() {
            return 1.0;
        }

        let i = self.interval(value);
        let y_value = LinLin::interpolate(self.x[i], self.x[i + 1], value, self.y[i], self.y[i + 1]);
        (self.cdf[i] + 0.5 * (self.y[i] + y_value) * (value - self.x[i])) / norm
    }

    /// Inverse of [`Self::evaluate_cdf`] under Lin-Lin interpolation.
    pub fn inverse_cdf(&self, cdf_value: f64) -> f64 {
        let norm = self.norm();
        if self.x.len() == 1 || norm <= 0.0 || cdf_value <= 0.0 {
            return self.lower_bound();
        }
        if cdf_value >= 1.0 {
            return self.upper_bound();
        }

        let target = cdf_value * norm;
        let i = self
            .cdf
            .partition_point(|c| *c <= target)
            .saturating_sub(1)
            .min(self.x.len() - 2);
        let slope = (self.y[i + 1] - self.y[i]) / (self.x[i + 1] - self.x[i]);
        let remaining = target - self.cdf[i];
        let p0 = self.y[i];
        let discriminant = (p0 * p0 + 2.0 * slope * remaining).max(0.0);
        let denominator = p0 + discriminant.sqrt();
        if denominator <= 0.0 {
            return self.x[i];
        }

        (self.x[i] + 2.0 * remaining / denominator).min(self.x[i + 1])
    }
}
