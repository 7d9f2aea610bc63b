//! Coupled elastic distribution: the tabulated cutoff distribution below the
//! peak angle cosine joined to an analytic screened Rutherford tail above it.
//!
//! At energy `E` with cutoff ratio `r = sigma_cutoff / sigma_total`, peak
//! `mu_p` and `d = 1 - mu_p` the pdf on `[-1, 1]` is
//!
//! ```text
//! r p_tab(mu) / ∫ p_tab                     for mu <= mu_p
//! (1 - r) eta (eta + d) / d / (eta + 1 - mu)^2   for mu > mu_p
//! ```

use super::bivariate::{AngularGridFn, AngularTables, BivariateError};
use super::elastic_traits::ElasticElectronTraits;
use super::reaction::ElasticCrossSectionReaction;
use super::tabular::{LinLin, TabularDistribution, TabularError};
use crate::domain::{CoupledElasticSamplingMethod, EnergyTable};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoupledError {
    #[error(transparent)]
    Bivariate(#[from] BivariateError),
    #[error("angular distribution at {energy} MeV is malformed: {source}")]
    Tabular {
        energy: f64,
        #[source]
        source: TabularError,
    },
    #[error("total elastic cross section vanishes at {energy} MeV")]
    ZeroTotalCrossSection { energy: f64 },
    #[error("cutoff angular distribution at {energy} MeV has no probability")]
    EmptyCutoffDistribution { energy: f64 },
}

/// Parts of a [`CoupledElasticDistribution`].
#[derive(Debug, Clone)]
pub struct CoupledElasticInput {
    pub angles: EnergyTable,
    pub pdfs: EnergyTable,
    pub angular_grid_fn: AngularGridFn,
    pub evaluation_tolerance: f64,
    pub cutoff_reaction: ElasticCrossSectionReaction,
    pub total_reaction: ElasticCrossSectionReaction,
    /// Energy below which the screened Rutherford cross section is zero.
    pub rutherford_threshold_energy: f64,
    pub traits: ElasticElectronTraits,
    pub sampling_method: CoupledElasticSamplingMethod,
}

#[derive(Debug, Clone)]
pub struct CoupledElasticDistribution {
    input: CoupledElasticInput,
}

/// Coupled pdf frozen at one energy.
#[derive(Debug, Clone)]
pub struct CoupledElasticPdf {
    energy: f64,
    tabular: TabularDistribution<LinLin>,
    cutoff_ratio: f64,
    screening_constant: f64,
}

impl CoupledElasticDistribution {
    pub fn new(input: CoupledElasticInput) -> Self {
        Self { input }
    }

    pub fn sampling_method(&self) -> CoupledElasticSamplingMethod {
        self.input.sampling_method
    }

    pub fn traits(&self) -> &ElasticElectronTraits {
        &self.input.traits
    }

    /// `sigma_cutoff / sigma_total` at `energy`, exactly 1 below the screened
    /// Rutherford threshold.
    pub fn cutoff_cross_section_ratio(&self, energy: f64) -> Result<f64, CoupledError> {
        let total = self.input.total_reaction.cross_section(energy);
        if total <= 0.0 {
            return Err(CoupledError::ZeroTotalCrossSection { energy });
        }
        if energy < self.input.rutherford_threshold_energy {
            return Ok(1.0);
        }
        let cutoff = self.input.cutoff_reaction.cross_section(energy);
        Ok((cutoff / total).clamp(0.0, 1.0))
    }

    pub fn at_energy(&self, energy: f64) -> Result<CoupledElasticPdf, CoupledError> {
        let tables = AngularTables::new(&self.input.angles, &self.input.pdfs);
        let grid = (self.input.angular_grid_fn)(
            &tables,
            energy,
            1.0,
            self.input.evaluation_tolerance,
        )?;
        let tabular = TabularDistribution::<LinLin>::new(grid.angles, grid.pdf)
            .map_err(|source| CoupledError::Tabular { energy, source })?;

        let cutoff_ratio = self.cutoff_cross_section_ratio(energy)?;
        if cutoff_ratio > 0.0 && tabular.norm() <= 0.0 {
            return Err(CoupledError::EmptyCutoffDistribution { energy });
        }

        let moliere = self.input.traits.moliere_screening_constant(energy);
        let screening_constant = match self.input.sampling_method {
            CoupledElasticSamplingMethod::OneDUnion => moliere,
            CoupledElasticSamplingMethod::TwoDUnion
            | CoupledElasticSamplingMethod::ModifiedTwoDUnion => {
                continuity_screening_constant(&tabular, cutoff_ratio).unwrap_or_else(|| {
                    tracing::debug!(
                        energy,
                        cutoff_ratio,
                        "pdf continuity gives no screening constant, using Moliere"
                    );
                    moliere
                })
            }
        };

        Ok(CoupledElasticPdf {
            energy,
            tabular,
            cutoff_ratio,
            screening_constant,
        })
    }
}

/// `eta` matching the Rutherford tail to the cutoff pdf at the peak angle.
fn continuity_screening_constant(
    tabular: &TabularDistribution<LinLin>,
    cutoff_ratio: f64,
) -> Option<f64> {
    let peak = tabular.upper_bound();
    let delta = 1.0 - peak;
    if cutoff_ratio >= 1.0 || delta <= 0.0 {
        return None;
    }

    let peak_pdf = cutoff_ratio * tabular.evaluate_pdf(peak);
    let denominator = (1.0 - cutoff_ratio) - peak_pdf * delta;
    let eta = peak_pdf * delta * delta / denominator;
    (denominator > 0.0 && eta.is_finite() && eta > 0.0).then_some(eta)
}

impl CoupledElasticPdf {
    pub fn energy(&self) -> f64 {
        self.energy
    }

    pub fn tabular(&self) -> &TabularDistribution<LinLin> {
        &self.tabular
    }

    pub fn cutoff_ratio(&self) -> f64 {
        self.cutoff_ratio
    }

    pub fn screening_constant(&self) -> f64 {
        self.screening_constant
    }

    pub fn peak_angle_cosine(&self) -> f64 {
        self.tabular.upper_bound()
    }

    pub fn has_rutherford_tail(&self) -> bool {
        self.cutoff_ratio < 1.0 && self.peak_angle_cosine() < 1.0
    }

    /// `A` in the tail pdf `A / (eta + 1 - mu)^2`.
    pub fn rutherford_amplitude(&self) -> f64 {
        self.rutherford_amplitude_with(self.screening_constant)
    }

    /// Tail amplitude normalized to `1 - r` for an arbitrary screening constant.
    pub fn rutherford_amplitude_with(&self, screening_constant: f64) -> f64 {
        if !self.has_rutherford_tail() {
            return 0.0;
        }
        let eta = screening_constant;
        let delta = 1.0 - self.peak_angle_cosine();
        (1.0 - self.cutoff_ratio) * eta * (eta + delta) / delta
    }

    /// Tabulated part of the pdf, zero above the peak.
    pub fn evaluate_tabular(&self, angle_cosine: f64) -> f64 {
        self.cutoff_ratio * self.tabular.evaluate_pdf(angle_cosine)
    }

    pub fn evaluate_rutherford(&self, angle_cosine: f64) -> f64 {
        self.evaluate_rutherford_with(angle_cosine, self.screening_constant)
    }

    pub fn evaluate_rutherford_with(&self, angle_cosine: f64, screening_constant: f64) -> f64 {
        if angle_cosine <= self.peak_angle_cosine() || angle_cosine > 1.0 {
            return 0.0;
        }
        let distance = screening_constant + 1.0 - angle_cosine;
        self.rutherford_amplitude_with(screening_constant) / (distance * distance)
    }

    pub fn evaluate(&self, angle_cosine: f64) -> f64 {
        if angle_cosine <= self.peak_angle_cosine() {
            self.evaluate_tabular(angle_cosine)
        } else {
            self.evaluate_rutherford(angle_cosine)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CoupledElasticDistribution, CoupledElasticInput, CoupledError};
    use crate::distribution::bivariate::resolve_angular_grid_fn;
    use crate::distribution::elastic_traits::ElasticElectronTraits;
    use crate::distribution::reaction::ElasticCrossSectionReaction;
    use crate::domain::{
        BivariateGridPolicy, CoupledElasticSamplingMethod, EnergyTable, TwoDInterpolationPolicy,
    };
    use crate::numerics::HashBasedGridSearcher;
    use std::sync::Arc;

    fn distribution(
        cutoff: Vec<f64>,
        total: Vec<f64>,
        method: CoupledElasticSamplingMethod,
    ) -> CoupledElasticDistribution {
        let grid: Arc<[f64]> = vec![1e-3, 1.0].into();
        let searcher = Arc::new(HashBasedGridSearcher::new(grid.clone(), 1));
        let reaction = |values: Vec<f64>| {
            ElasticCrossSectionReaction::new(grid.clone(), values.into(), 0, searcher.clone())
                .expect("reaction should build")
        };

        CoupledElasticDistribution::new(CoupledElasticInput {
            angles: EnergyTable::from_entries([
                (1e-3, vec![-1.0, 0.999999]),
                (1.0, vec![-1.0, 0.999999]),
            ]),
            pdfs: EnergyTable::from_entries([(1e-3, vec![0.5, 0.5]), (1.0, vec![0.5, 0.5])]),
            angular_grid_fn: resolve_angular_grid_fn(
                BivariateGridPolicy::Direct,
                TwoDInterpolationPolicy::LinLinLin,
            ),
            evaluation_tolerance: 1e-7,
            cutoff_reaction: reaction(cutoff),
            total_reaction: reaction(total),
            rutherford_threshold_energy: 1e-3,
            traits: ElasticElectronTraits::new(13),
            sampling_method: method,
        })
    }

    #[test]
    fn tail_is_continuous_at_the_peak() {
        let coupled = distribution(
            vec![9.0, 9.0],
            vec![10.0, 10.0],
            CoupledElasticSamplingMethod::ModifiedTwoDUnion,
        );
        let pdf = coupled.at_energy(0.5).expect("coupled pdf should build");

        assert!((pdf.cutoff_ratio() - 0.9).abs() < 1e-15);
        let peak = pdf.peak_angle_cosine();
        let below = pdf.evaluate_tabular(peak);
        let above = pdf.evaluate_rutherford(peak + 1e-12);
        assert!(((below - above) / below).abs() < 1e-4, "{below} vs {above}");

        // Tail carries the Rutherford share of the probability.
        let eta = pdf.screening_constant();
        let delta = 1.0 - peak;
        let tail_mass = pdf.rutherford_amplitude() * (1.0 / eta - 1.0 / (eta + delta));
        assert!((tail_mass - 0.1).abs() < 1e-12);
    }

    #[test]
    fn one_d_union_uses_moliere_screening() {
        let coupled = distribution(
            vec![9.0, 9.0],
            vec![10.0, 10.0],
            CoupledElasticSamplingMethod::OneDUnion,
        );
        let pdf = coupled.at_energy(1.0).expect("coupled pdf should build");
        let expected = ElasticElectronTraits::new(13).moliere_screening_constant(1.0);
        assert_eq!(pdf.screening_constant(), expected);
    }

    #[test]
    fn pure_cutoff_distribution_has_no_tail() {
        let coupled = distribution(
            vec![10.0, 10.0],
            vec![10.0, 10.0],
            CoupledElasticSamplingMethod::TwoDUnion,
        );
        let pdf = coupled.at_energy(1e-3).expect("coupled pdf should build");
        assert!(!pdf.has_rutherford_tail());
        assert_eq!(pdf.evaluate(0.9999995), 0.0);
        assert!((pdf.evaluate(0.0) - 0.5 / 0.9999995).abs() < 1e-15);
    }

    #[test]
    fn vanishing_total_cross_section_is_an_error() {
        let coupled = distribution(
            vec![0.0, 0.0],
            vec![0.0, 0.0],
            CoupledElasticSamplingMethod::ModifiedTwoDUnion,
        );
        assert!(matches!(
            coupled.at_energy(0.1),
            Err(CoupledError::ZeroTotalCrossSection { .. })
        ));
    }
}
