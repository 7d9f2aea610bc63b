//! Interpolation strategies between angular distributions tabulated at two
//! energies. Each strategy fixes how the energy fraction is measured, how the
//! angle cosine is processed before it is interpolated, and how pdf values are
//! combined on a shared angle grid.

use crate::common::constants::ANGLE_COSINE_NUDGE;
use crate::domain::TwoDInterpolationPolicy;
use std::fmt::Debug;

pub trait TwoDInterpolation: Debug + Clone + Copy + Default + Send + Sync + 'static {
    const POLICY: TwoDInterpolationPolicy;

    /// Position of `energy` inside `[lower, upper]`, in `[0, 1]`.
    fn energy_fraction(lower: f64, upper: f64, energy: f64) -> f64;

    fn process_angle(angle_cosine: f64) -> f64;

    fn recover_angle(processed: f64) -> f64;

    /// `d(processed)/d(angle_cosine)`.
    fn process_angle_derivative(angle_cosine: f64) -> f64;

    fn interpolate_pdf(lower: f64, upper: f64, fraction: f64) -> f64;
}

fn linear_fraction(lower: f64, upper: f64, energy: f64) -> f64 {
    if upper == lower {
        return 0.0;
    }
    (energy - lower) / (upper - lower)
}

fn log_fraction(lower: f64, upper: f64, energy: f64) -> f64 {
    if lower <= 0.0 || energy <= 0.0 || upper == lower {
        return linear_fraction(lower, upper, energy);
    }
    (energy / lower).ln() / (upper / lower).ln()
}

fn linear_pdf(lower: f64, upper: f64, fraction: f64) -> f64 {
    lower + fraction * (upper - lower)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinLinLin;

impl TwoDInterpolation for LinLinLin {
    const POLICY: TwoDInterpolationPolicy = TwoDInterpolationPolicy::LinLinLin;

    fn energy_fraction(lower: f64, upper: f64, energy: f64) -> f64 {
        linear_fraction(lower, upper, energy)
    }

    fn process_angle(angle_cosine: f64) -> f64 {
        angle_cosine
    }

    fn recover_angle(processed: f64) -> f64 {
        processed
    }

    fn process_angle_derivative(_angle_cosine: f64) -> f64 {
        1.0
    }

    fn interpolate_pdf(lower: f64, upper: f64, fraction: f64) -> f64 {
        linear_pdf(lower, upper, fraction)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinLinLog;

impl TwoDInterpolation for LinLinLog {
    const POLICY: TwoDInterpolationPolicy = TwoDInterpolationPolicy::LinLinLog;

    fn energy_fraction(lower: f64, upper: f64, energy: f64) -> f64 {
        log_fraction(lower, upper, energy)
    }

    fn process_angle(angle_cosine: f64) -> f64 {
        angle_cosine
    }

    fn recover_angle(processed: f64) -> f64 {
        processed
    }

    fn process_angle_derivative(_angle_cosine: f64) -> f64 {
        1.0
    }

    fn interpolate_pdf(lower: f64, upper: f64, fraction: f64) -> f64 {
        linear_pdf(lower, upper, fraction)
    }
}

/// Log in energy and pdf, with the angle cosine mapped to
/// `ln(1 + nudge - mu)` so forward peaked tables interpolate smoothly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogNudgedLogCosLog;

impl TwoDInterpolation for LogNudgedLogCosLog {
    const POLICY: TwoDInterpolationPolicy = TwoDInterpolationPolicy::LogLogLog;

    fn energy_fraction(lower: f64, upper: f64, energy: f64) -> f64 {
        log_fraction(lower, upper, energy)
    }

    fn process_angle(angle_cosine: f64) -> f64 {
        (1.0 + ANGLE_COSINE_NUDGE - angle_cosine).ln()
    }

    fn recover_angle(processed: f64) -> f64 {
        1.0 + ANGLE_COSINE_NUDGE - processed.exp()
    }

    fn process_angle_derivative(angle_cosine: f64) -> f64 {
        -1.0 / (1.0 + ANGLE_COSINE_NUDGE - angle_cosine)
    }

    fn interpolate_pdf(lower: f64, upper: f64, fraction: f64) -> f64 {
        if lower <= 0.0 || upper <= 0.0 {
            return linear_pdf(lower, upper, fraction);
        }
        (lower.ln() + fraction * (upper / lower).ln()).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::{LinLinLin, LinLinLog, LogNudgedLogCosLog, TwoDInterpolation};

    #[test]
    fn energy_fraction_is_linear_or_logarithmic() {
        assert_eq!(LinLinLin::energy_fraction(1.0, 3.0, 2.0), 0.5);
        assert!((LinLinLog::energy_fraction(1e-3, 1e-1, 1e-2) - 0.5).abs() < 1e-15);
        assert!((LogNudgedLogCosLog::energy_fraction(1.0, 100.0, 10.0) - 0.5).abs() < 1e-15);
    }

    #[test]
    fn nudged_angle_processing_inverts() {
        for angle in [-1.0, 0.0, 0.9, 0.999999] {
            let processed = LogNudgedLogCosLog::process_angle(angle);
            let recovered = LogNudgedLogCosLog::recover_angle(processed);
            assert!((recovered - angle).abs() < 1e-12, "angle {angle}");
        }
        assert!(LogNudgedLogCosLog::process_angle(1.0).is_finite());
    }

    #[test]
    fn log_pdf_interpolation_is_geometric() {
        let value = LogNudgedLogCosLog::interpolate_pdf(1.0, 100.0, 0.5);
        assert!((value - 10.0).abs() < 1e-12);
        assert_eq!(LogNudgedLogCosLog::interpolate_pdf(0.0, 2.0, 0.5), 1.0);
        assert_eq!(LinLinLog::interpolate_pdf(1.0, 3.0, 0.5), 2.0);
    }
}
