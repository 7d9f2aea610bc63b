//! Angular grid and pdf of the cutoff elastic distribution at an arbitrary
//! energy, built from the distributions tabulated at the neighbouring energies.
//!
//! Every (grid policy, interpolation policy) pair is a monomorphized
//! [`angular_grid_and_pdf`]; [`resolve_angular_grid_fn`] picks the pair once
//! and hands back a plain function pointer.

use super::interpolation::{LinLinLin, LinLinLog, LogNudgedLogCosLog, TwoDInterpolation};
use super::tabular::{LinLin, OneDInterpolation, TabularDistribution, TabularError};
use crate::domain::{BivariateGridPolicy, EnergyTable, MissingEnergyKey, TwoDInterpolationPolicy};
use std::fmt::Debug;

const MAX_CORRELATED_BISECTION_STEPS: usize = 100;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BivariateError {
    #[error("no angular distributions are tabulated")]
    EmptyTables,
    #[error("energy {energy} MeV is outside the angular energy grid [{lower}, {upper}]")]
    EnergyOutOfRange { energy: f64, lower: f64, upper: f64 },
    #[error(transparent)]
    MissingEnergyKey(#[from] MissingEnergyKey),
    #[error("angular distribution at {energy} MeV is malformed: {source}")]
    Tabular {
        energy: f64,
        #[source]
        source: TabularError,
    },
}

/// Borrowed angle and pdf tables sharing one key set.
#[derive(Debug, Clone, Copy)]
pub struct AngularTables<'a> {
    pub angles: &'a EnergyTable,
    pub pdfs: &'a EnergyTable,
}

impl<'a> AngularTables<'a> {
    pub fn new(angles: &'a EnergyTable, pdfs: &'a EnergyTable) -> Self {
        Self { angles, pdfs }
    }

    fn distribution(&self, energy: f64) -> Result<TabularDistribution<LinLin>, BivariateError> {
        let angles = self.angles.at(energy)?;
        let pdf = self.pdfs.at(energy)?;
        TabularDistribution::new(angles.to_vec(), pdf.to_vec())
            .map_err(|source| BivariateError::Tabular { energy, source })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AngularGridAndPdf {
    pub angles: Vec<f64>,
    pub pdf: Vec<f64>,
}

/// Energy-bracketing distribution used by a grid policy.
#[derive(Debug, Clone)]
pub struct EnergyBin {
    pub energy: f64,
    pub distribution: TabularDistribution<LinLin>,
}

/// How the pdf at an angle is combined from the two bracketing distributions.
pub trait TwoDGrid: Debug + Clone + Copy + Default + Send + Sync + 'static {
    const POLICY: BivariateGridPolicy;

    fn evaluate_pdf<I: TwoDInterpolation>(
        lower: &EnergyBin,
        upper: &EnergyBin,
        energy: f64,
        angle_cosine: f64,
        tolerance: f64,
    ) -> f64;
}

/// Interpolates pdf values taken at the same angle cosine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Direct;

impl TwoDGrid for Direct {
    const POLICY: BivariateGridPolicy = BivariateGridPolicy::Direct;

    fn evaluate_pdf<I: TwoDInterpolation>(
        lower: &EnergyBin,
        upper: &EnergyBin,
        energy: f64,
        angle_cosine: f64,
        _tolerance: f64,
    ) -> f64 {
        let fraction = I::energy_fraction(lower.energy, upper.energy, energy);
        I::interpolate_pdf(
            lower.distribution.evaluate(angle_cosine),
            upper.distribution.evaluate(angle_cosine),
            fraction,
        )
    }
}

/// Interpolates the processed angles reached at a common cdf value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Correlated;

impl Correlated {
    fn processed_angle<I: TwoDInterpolation>(
        lower: &EnergyBin,
        upper: &EnergyBin,
        fraction: f64,
        cdf_value: f64,
    ) -> (f64, f64, f64) {
        let lower_angle = lower.distribution.inverse_cdf(cdf_value);
        let upper_angle = upper.distribution.inverse_cdf(cdf_value);
        let processed = (1.0 - fraction) * I::process_angle(lower_angle)
            + fraction * I::process_angle(upper_angle);
        (processed, lower_angle, upper_angle)
    }
}

impl TwoDGrid for Correlated {
    const POLICY: BivariateGridPolicy = BivariateGridPolicy::Correlated;

    fn evaluate_pdf<I: TwoDInterpolation>(
        lower: &EnergyBin,
        upper: &EnergyBin,
        energy: f64,
        angle_cosine: f64,
        tolerance: f64,
    ) -> f64 {
        let fraction = I::energy_fraction(lower.energy, upper.energy, energy);
        let min_angle = lower
            .distribution
            .lower_bound()
            .min(upper.distribution.lower_bound());
        let max_angle = lower
            .distribution
            .upper_bound()
            .max(upper.distribution.upper_bound());
        if angle_cosine < min_angle || angle_cosine > max_angle {
            return 0.0;
        }

        let (min_processed, ..) = Self::processed_angle::<I>(lower, upper, fraction, 0.0);
        let (max_processed, ..) = Self::processed_angle::<I>(lower, upper, fraction, 1.0);

        let target = I::process_angle(angle_cosine);
        let increasing = max_processed >= min_processed;
        let scale = target.abs().max(1.0);

        let mut lower_cdf = 0.0;
        let mut upper_cdf = 1.0;
        let mut cdf_value = 0.5;
        let mut angles = (angle_cosine, angle_cosine);
        for _ in 0..MAX_CORRELATED_BISECTION_STEPS {
            cdf_value = 0.5 * (lower_cdf + upper_cdf);
            let (processed, lower_angle, upper_angle) =
                Self::processed_angle::<I>(lower, upper, fraction, cdf_value);
            angles = (lower_angle, upper_angle);

            let difference = processed - target;
            if difference.abs() <= tolerance * scale {
                break;
            }
            if (difference < 0.0) == increasing {
                lower_cdf = cdf_value;
            } else {
                upper_cdf = cdf_value;
            }
        }
        tracing::trace!(energy, angle_cosine, cdf_value, "correlated cdf inversion");

        // p(mu) = dc/dmu = g'(mu) / ((1 - f) g'(mu_lo) / p_lo + f g'(mu_hi) / p_hi)
        let mut slope = 0.0;
        for (weight, bin, angle) in [
            (1.0 - fraction, lower, angles.0),
            (fraction, upper, angles.1),
        ] {
            if weight == 0.0 {
                continue;
            }
            let pdf = bin.distribution.evaluate_pdf(angle);
            if pdf <= 0.0 {
                return 0.0;
            }
            slope += weight * I::process_angle_derivative(angle) / pdf;
        }
        if slope == 0.0 {
            return 0.0;
        }

        I::process_angle_derivative(angle_cosine) / slope
    }
}

/// Truncate `angles`/`pdf` at `cutoff_angle_cosine`, closing the grid with the
/// cutoff itself. A cutoff at or beyond the last angle keeps the full grid.
pub fn truncate_at_cutoff(
    angles: &[f64],
    pdf: &[f64],
    cutoff_angle_cosine: f64,
) -> AngularGridAndPdf {
    let Some(last) = angles.last() else {
        return AngularGridAndPdf::default();
    };
    if cutoff_angle_cosine >= *last {
        return AngularGridAndPdf {
            angles: angles.to_vec(),
            pdf: pdf.to_vec(),
        };
    }

    let kept = angles.partition_point(|angle| *angle < cutoff_angle_cosine);
    let mut truncated = AngularGridAndPdf {
        angles: angles[..kept].to_vec(),
        pdf: pdf[..kept].to_vec(),
    };

    let cutoff_pdf = if kept == 0 {
        pdf[0]
    } else {
        LinLin::interpolate(
            angles[kept - 1],
            angles[kept],
            cutoff_angle_cosine,
            pdf[kept - 1],
            pdf[kept],
        )
    };
    truncated.angles.push(cutoff_angle_cosine);
    truncated.pdf.push(cutoff_pdf);
    truncated
}

fn truncated_grid(angles: &[f64], cutoff_angle_cosine: f64) -> Vec<f64> {
    match angles.last() {
        Some(last) if cutoff_angle_cosine < *last => {
            let kept = angles.partition_point(|angle| *angle < cutoff_angle_cosine);
            let mut grid = angles[..kept].to_vec();
            grid.push(cutoff_angle_cosine);
            grid
        }
        _ => angles.to_vec(),
    }
}

/// Angular grid and pdf at `energy` for grid policy `G` and interpolation `I`.
///
/// A tabulated energy returns its own distribution. Otherwise the angle grid of
/// the nearer bracketing energy is used (the lower one on ties) and the pdf is
/// evaluated on it through `G` and `I`.
pub fn angular_grid_and_pdf<I: TwoDInterpolation, G: TwoDGrid>(
    tables: &AngularTables<'_>,
    energy: f64,
    cutoff_angle_cosine: f64,
    evaluation_tolerance: f64,
) -> Result<AngularGridAndPdf, BivariateError> {
    if tables.angles.contains_key(energy) {
        let angles = tables.angles.at(energy)?;
        let pdf = tables.pdfs.at(energy)?;
        return Ok(truncate_at_cutoff(angles, pdf, cutoff_angle_cosine));
    }

    let (Some((lower_energy, _)), Some((upper_energy, _))) = (
        tables.angles.entry(0),
        tables.angles.entry(tables.angles.len().saturating_sub(1)),
    ) else {
        return Err(BivariateError::EmptyTables);
    };
    if energy < lower_energy || energy > upper_energy {
        return Err(BivariateError::EnergyOutOfRange {
            energy,
            lower: lower_energy,
            upper: upper_energy,
        });
    }

    let upper_index = tables
        .angles
        .keys()
        .position(|key| key > energy)
        .unwrap_or(tables.angles.len() - 1)
        .max(1);
    let (lower_key, upper_key) = match (
        tables.angles.entry(upper_index - 1),
        tables.angles.entry(upper_index),
    ) {
        (Some((lower, _)), Some((upper, _))) => (lower, upper),
        _ => return Err(BivariateError::EmptyTables),
    };

    let lower = EnergyBin {
        energy: lower_key,
        distribution: tables.distribution(lower_key)?,
    };
    let upper = EnergyBin {
        energy: upper_key,
        distribution: tables.distribution(upper_key)?,
    };

    let nearest = if energy - lower_key <= upper_key - energy {
        &lower
    } else {
        &upper
    };
    let angles = truncated_grid(nearest.distribution.x(), cutoff_angle_cosine);
    let pdf = angles
        .iter()
        .map(|angle| G::evaluate_pdf::<I>(&lower, &upper, energy, *angle, evaluation_tolerance))
        .collect();

    Ok(AngularGridAndPdf { angles, pdf })
}

pub type AngularGridFn = fn(
    &AngularTables<'_>,
    f64,
    f64,
    f64,
) -> Result<AngularGridAndPdf, BivariateError>;

const ANGULAR_GRID_DISPATCH: [[AngularGridFn; 3]; 2] = [
    [
        angular_grid_and_pdf::<LogNudgedLogCosLog, Direct> as AngularGridFn,
        angular_grid_and_pdf::<LinLinLin, Direct> as AngularGridFn,
        angular_grid_and_pdf::<LinLinLog, Direct> as AngularGridFn,
    ],
    [
        angular_grid_and_pdf::<LogNudgedLogCosLog, Correlated> as AngularGridFn,
        angular_grid_and_pdf::<LinLinLin, Correlated> as AngularGridFn,
        angular_grid_and_pdf::<LinLinLog, Correlated> as AngularGridFn,
    ],
];

/// Resolve a policy pair into its angular grid evaluator. Unit-base policies
/// evaluate like their plain counterparts since every table spans the same
/// angle domain.
pub fn resolve_angular_grid_fn(
    grid_policy: BivariateGridPolicy,
    interp_policy: TwoDInterpolationPolicy,
) -> AngularGridFn {
    let row = usize::from(grid_policy.is_correlated());
    let column = match interp_policy {
        TwoDInterpolationPolicy::LogLogLog => 0,
        TwoDInterpolationPolicy::LinLinLin => 1,
        TwoDInterpolationPolicy::LinLinLog => 2,
    };
    ANGULAR_GRID_DISPATCH[row][column]
}

#[cfg(test)]
mod tests {
    use super::{
        AngularTables, BivariateError, Correlated, Direct, angular_grid_and_pdf,
        resolve_angular_grid_fn, truncate_at_cutoff,
    };
    use crate::distribution::interpolation::{LinLinLin, LogNudgedLogCosLog};
    use crate::domain::{BivariateGridPolicy, EnergyTable, TwoDInterpolationPolicy};

    fn tables() -> (EnergyTable, EnergyTable) {
        let angles = EnergyTable::from_entries([
            (1.0, vec![-1.0, 0.0, 0.999999]),
            (3.0, vec![-1.0, 0.5, 0.999999]),
        ]);
        let pdfs = EnergyTable::from_entries([
            (1.0, vec![0.5, 0.5, 0.5]),
            (3.0, vec![0.1, 0.3, 2.0]),
        ]);
        (angles, pdfs)
    }

    #[test]
    fn tabulated_energy_is_truncated_at_cutoff() {
        let (angles, pdfs) = tables();
        let result = angular_grid_and_pdf::<LinLinLin, Direct>(
            &AngularTables::new(&angles, &pdfs),
            1.0,
            0.9,
            1e-7,
        )
        .expect("tabulated energy should evaluate");

        assert_eq!(result.angles, vec![-1.0, 0.0, 0.9]);
        assert_eq!(result.pdf.len(), 3);
        assert!((result.pdf[2] - 0.5).abs() < 1e-15);

        let full = truncate_at_cutoff(&[-1.0, 0.999999], &[0.5, 0.5], 1.0);
        assert_eq!(full.angles, vec![-1.0, 0.999999]);
    }

    #[test]
    fn direct_lin_lin_lin_averages_at_midpoint() {
        let (angles, pdfs) = tables();
        let result = angular_grid_and_pdf::<LinLinLin, Direct>(
            &AngularTables::new(&angles, &pdfs),
            2.0,
            1.0,
            1e-7,
        )
        .expect("midpoint should evaluate");

        // Tie between the bins picks the lower energy's grid.
        assert_eq!(result.angles, vec![-1.0, 0.0, 0.999999]);
        assert!((result.pdf[0] - 0.3).abs() < 1e-15);
        // Upper table at 0.0 is 0.1 + (0.3 - 0.1) * 2 / 3.
        let upper_at_zero = 0.1 + 0.2 * (1.0 / 1.5);
        assert!((result.pdf[1] - 0.5 * (0.5 + upper_at_zero)).abs() < 1e-15);
        assert!((result.pdf[2] - 1.25).abs() < 1e-12);
    }

    #[test]
    fn nearer_bin_supplies_the_grid() {
        let (angles, pdfs) = tables();
        let result = angular_grid_and_pdf::<LogNudgedLogCosLog, Direct>(
            &AngularTables::new(&angles, &pdfs),
            2.9,
            1.0,
            1e-7,
        )
        .expect("energy should evaluate");
        assert_eq!(result.angles, vec![-1.0, 0.5, 0.999999]);
        assert!(result.pdf.iter().all(|value| *value > 0.0));
    }

    #[test]
    fn correlated_between_identical_tables_keeps_the_pdf() {
        let angles = EnergyTable::from_entries([
            (1.0, vec![-1.0, 0.2, 0.999999]),
            (10.0, vec![-1.0, 0.2, 0.999999]),
        ]);
        let pdfs = EnergyTable::from_entries([
            (1.0, vec![0.25, 0.5, 0.8]),
            (10.0, vec![0.25, 0.5, 0.8]),
        ]);
        let tables = AngularTables::new(&angles, &pdfs);
        let norm = 0.5 * (0.25 + 0.5) * 1.2 + 0.5 * (0.5 + 0.8) * 0.799999;

        for interp in [
            TwoDInterpolationPolicy::LinLinLin,
            TwoDInterpolationPolicy::LinLinLog,
            TwoDInterpolationPolicy::LogLogLog,
        ] {
            let evaluate = resolve_angular_grid_fn(BivariateGridPolicy::UnitBaseCorrelated, interp);
            let result = evaluate(&tables, 3.0, 1.0, 1e-12).expect("energy should evaluate");
            assert_eq!(result.angles, vec![-1.0, 0.2, 0.999999]);
            for (value, expected) in result.pdf.iter().zip([0.25, 0.5, 0.8]) {
                assert!(
                    (value - expected / norm).abs() < 1e-6,
                    "{interp}: {value} vs {}",
                    expected / norm
                );
            }
        }
    }

    #[test]
    fn correlated_is_zero_outside_the_support() {
        let (angles, pdfs) = tables();
        let value = angular_grid_and_pdf::<LinLinLin, Correlated>(
            &AngularTables::new(&angles, &pdfs),
            2.0,
            1.0,
            1e-7,
        )
        .expect("energy should evaluate");
        assert!(value.pdf.iter().all(|pdf| pdf.is_finite() && *pdf >= 0.0));
    }

    #[test]
    fn energies_outside_the_grid_are_rejected() {
        let (angles, pdfs) = tables();
        let error = angular_grid_and_pdf::<LinLinLin, Direct>(
            &AngularTables::new(&angles, &pdfs),
            5.0,
            1.0,
            1e-7,
        )
        .expect_err("energy is above the grid");
        assert!(matches!(error, BivariateError::EnergyOutOfRange { energy, .. } if energy == 5.0));
    }
}
