use super::analog::AngularDistribution;
use super::errors::{ComputationError, ContractViolation, EvaluatorError};
use super::moments::{CoupledElasticMomentsEvaluator, ElasticMomentsEvaluator};
use super::{ElectronElasticDataEvaluator, Notice};
use crate::common::{
    DEFAULT_RUTHERFORD_EVALUATION_TOLERANCE, MOMENT_PRESERVING_PRECISION, MOMENTS_GRID_SEARCHER_BINS,
};
use crate::distribution::{CoupledElasticDistribution, CoupledElasticInput, ElasticElectronTraits};
use crate::domain::EnergyTable;
use crate::numerics::special::{RadauError, SloanRadauQuadrature};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Discrete angles and weights with the forward `mu = 1` node removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscreteAngles {
    pub angles: Vec<f64>,
    /// Renormalized to sum to one.
    pub weights: Vec<f64>,
    /// Weight carried by the removed angles before renormalization.
    pub cross_section_reduction: f64,
}

impl DiscreteAngles {
    /// Notice for a rule that supports fewer than `requested` angles.
    pub fn truncation_notice(&self, energy: f64, requested: usize) -> Option<Notice> {
        (self.angles.len() < requested).then_some(Notice::DiscreteAnglesTruncated {
            energy,
            requested,
            supported: self.angles.len(),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentPreservingData {
    pub cross_section_reduction: Vec<f64>,
    pub angles: EnergyTable,
    pub weights: EnergyTable,
    #[serde(default)]
    pub notices: Vec<Notice>,
}

impl ElectronElasticDataEvaluator {
    /// Discrete angles, weights and cross section reductions at every energy of
    /// `angular`.
    pub fn evaluate_moment_preserving_elastic_data(
        &self,
        angular: &AngularDistribution,
    ) -> Result<MomentPreservingData, EvaluatorError> {
        let moments_evaluator = self.moments_evaluator(angular)?;

        let mut data = MomentPreservingData::default();
        for &energy in &angular.angular_energy_grid {
            let discrete = Self::calculate_discrete_angles_and_weights(
                &moments_evaluator,
                energy,
                self.number_of_moment_preserving_angles,
            )?;
            tracing::debug!(
                energy,
                angles = ?discrete.angles,
                reduction = discrete.cross_section_reduction,
                "moment preserving angles evaluated"
            );
            if let Some(notice) =
                discrete.truncation_notice(energy, self.number_of_moment_preserving_angles)
            {
                data.notices.push(notice);
            }
            data.cross_section_reduction
                .push(discrete.cross_section_reduction);
            data.angles.insert(energy, discrete.angles);
            data.weights.insert(energy, discrete.weights);
        }
        Ok(data)
    }

    /// Coupled cutoff and screened Rutherford moments above the cutoff angle,
    /// built on the angular tables of `angular`.
    pub fn moments_evaluator(
        &self,
        angular: &AngularDistribution,
    ) -> Result<CoupledElasticMomentsEvaluator, EvaluatorError> {
        let searcher = self.grid_searcher(MOMENTS_GRID_SEARCHER_BINS);
        let cutoff_reaction = self.cross_section_reaction(
            Arc::clone(&self.cutoff_cross_section),
            self.cutoff_threshold_index,
            Arc::clone(&searcher),
        )?;
        let total_reaction = self.cross_section_reaction(
            Arc::clone(&self.total_cross_section),
            self.total_threshold_index,
            searcher,
        )?;

        let rutherford =
            self.screened_rutherford_cross_section(DEFAULT_RUTHERFORD_EVALUATION_TOLERANCE)?;
        let rutherford_threshold_energy = self
            .energy_grid
            .get(rutherford.threshold_index)
            .copied()
            .unwrap_or(f64::INFINITY);

        let distribution = CoupledElasticDistribution::new(CoupledElasticInput {
            angles: angular.elastic_angle.clone(),
            pdfs: angular.elastic_pdf.clone(),
            angular_grid_fn: self.angular_grid_fn,
            evaluation_tolerance: self.tabular_evaluation_tol,
            cutoff_reaction,
            total_reaction,
            rutherford_threshold_energy,
            traits: ElasticElectronTraits::new(self.atomic_number),
            sampling_method: self.sampling_method,
        });
        Ok(CoupledElasticMomentsEvaluator::new(
            distribution,
            self.cutoff_angle_cosine,
        ))
    }

    /// Radau rule from the first `2N` Legendre moments, with the forward node
    /// dropped and the remaining `N` weights renormalized.
    ///
    /// A distribution with too little support gives fewer than `N` angles.
    pub fn calculate_discrete_angles_and_weights<M>(
        moments_evaluator: &M,
        energy: f64,
        number_of_moment_preserving_angles: usize,
    ) -> Result<DiscreteAngles, EvaluatorError>
    where
        M: ElasticMomentsEvaluator + ?Sized,
    {
        if number_of_moment_preserving_angles == 0 {
            return Err(ContractViolation::DiscreteIndex { index: 0, len: 0 }.into());
        }
        let number_of_nodes = number_of_moment_preserving_angles + 1;
        let order = 2 * number_of_nodes - 2;

        let legendre_moments = moments_evaluator.evaluate_elastic_moments(
            energy,
            order,
            MOMENT_PRESERVING_PRECISION,
        )?;
        let rule = SloanRadauQuadrature::new(&legendre_moments)
            .radau_nodes_and_weights(number_of_nodes)
            .map_err(|source| -> EvaluatorError {
                match source {
                    RadauError::InsufficientMoments {
                        nodes,
                        required,
                        actual,
                    } => ContractViolation::InsufficientMoments {
                        nodes,
                        required,
                        actual,
                    }
                    .into(),
                    source => ComputationError::Radau { energy, source }.into(),
                }
            })?;
        if rule.len() < 2 {
            return Err(ContractViolation::DiscreteIndex {
                index: number_of_moment_preserving_angles,
                len: rule.len(),
            }
            .into());
        }

        if rule.len() < number_of_nodes {
            tracing::warn!(
                energy,
                requested = number_of_moment_preserving_angles,
                supported = rule.len() - 1,
                "fewer discrete angles than requested"
            );
        }

        let mut angles = rule.nodes;
        let mut weights = rule.weights;
        angles.pop();
        weights.pop();

        let cross_section_reduction: f64 = weights.iter().sum();
        if !(cross_section_reduction > 0.0) {
            return Err(ComputationError::DegenerateDiscreteWeights { energy }.into());
        }
        for weight in &mut weights {
            *weight /= cross_section_reduction;
        }

        Ok(DiscreteAngles {
            angles,
            weights,
            cross_section_reduction,
        })
    }
}
