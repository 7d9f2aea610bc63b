use super::errors::{ContractViolation, EvaluatorError, require};
use super::ElectronElasticDataEvaluator;
use crate::common::DEFAULT_RUTHERFORD_EVALUATION_TOLERANCE;
use crate::distribution::{ElasticCrossSectionReaction, LogLog, TabularDistribution};
use crate::numerics::HashBasedGridSearcher;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Screened Rutherford cross section starting at `threshold_index` on the
/// energy grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RutherfordCrossSection {
    pub cross_section: Vec<f64>,
    pub threshold_index: usize,
}

impl ElectronElasticDataEvaluator {
    pub fn create_cutoff_cross_section_evaluator(
        &self,
    ) -> Result<TabularDistribution<LogLog>, EvaluatorError> {
        self.cross_section_evaluator(&self.cutoff_cross_section, self.cutoff_threshold_index)
    }

    pub fn create_total_cross_section_evaluator(
        &self,
    ) -> Result<TabularDistribution<LogLog>, EvaluatorError> {
        self.cross_section_evaluator(&self.total_cross_section, self.total_threshold_index)
    }

    pub fn create_cutoff_cross_section_reaction(
        &self,
    ) -> Result<ElasticCrossSectionReaction, EvaluatorError> {
        self.cross_section_reaction(
            Arc::clone(&self.cutoff_cross_section),
            self.cutoff_threshold_index,
            self.grid_searcher(self.energy_grid.len() / 10 + 1),
        )
    }

    pub fn create_total_cross_section_reaction(
        &self,
    ) -> Result<ElasticCrossSectionReaction, EvaluatorError> {
        self.cross_section_reaction(
            Arc::clone(&self.total_cross_section),
            self.total_threshold_index,
            self.grid_searcher(self.energy_grid.len() / 10 + 1),
        )
    }

    /// Screened Rutherford part of the stored cross sections on the energy grid.
    pub fn screened_rutherford_cross_section(
        &self,
        evaluation_tolerance: f64,
    ) -> Result<RutherfordCrossSection, EvaluatorError> {
        let len = self.energy_grid.len();
        let total = on_energy_grid(&self.total_cross_section, self.total_threshold_index, len);
        let cutoff = on_energy_grid(&self.cutoff_cross_section, self.cutoff_threshold_index, len);
        Ok(Self::evaluate_screened_rutherford_cross_section(
            &total,
            &cutoff,
            evaluation_tolerance,
        )?)
    }

    /// `total - cutoff`, zeroing every point whose relative difference is below
    /// `evaluation_tolerance`. The threshold lands after the last zeroed point
    /// and everything before it is dropped.
    pub fn evaluate_screened_rutherford_cross_section(
        total_cross_section: &[f64],
        cutoff_cross_section: &[f64],
        evaluation_tolerance: f64,
    ) -> Result<RutherfordCrossSection, ContractViolation> {
        require(!total_cross_section.is_empty(), || {
            ContractViolation::EmptyCrossSection {
                what: "total elastic cross section",
            }
        })?;
        require(total_cross_section.len() == cutoff_cross_section.len(), || {
            ContractViolation::LengthMismatch {
                what: "cutoff elastic cross section",
                expected: total_cross_section.len(),
                actual: cutoff_cross_section.len(),
            }
        })?;

        let mut threshold_index = 0;
        let mut cross_section: Vec<f64> = total_cross_section
            .iter()
            .zip(cutoff_cross_section)
            .enumerate()
            .map(|(index, (total, cutoff))| {
                let difference = total - cutoff;
                let relative_difference = if *total == 0.0 {
                    0.0
                } else {
                    difference / total
                };
                if relative_difference < evaluation_tolerance {
                    threshold_index = index + 1;
                    0.0
                } else {
                    difference
                }
            })
            .collect();
        cross_section.drain(..threshold_index);

        Ok(RutherfordCrossSection {
            cross_section,
            threshold_index,
        })
    }

    pub fn evaluate_default_screened_rutherford_cross_section(
        total_cross_section: &[f64],
        cutoff_cross_section: &[f64],
    ) -> Result<RutherfordCrossSection, ContractViolation> {
        Self::evaluate_screened_rutherford_cross_section(
            total_cross_section,
            cutoff_cross_section,
            DEFAULT_RUTHERFORD_EVALUATION_TOLERANCE,
        )
    }

    pub(super) fn grid_searcher(&self, hash_bins: usize) -> Arc<HashBasedGridSearcher> {
        Arc::new(HashBasedGridSearcher::new(
            Arc::clone(&self.energy_grid),
            hash_bins,
        ))
    }

    pub(super) fn cross_section_reaction(
        &self,
        cross_section: Arc<[f64]>,
        threshold_index: usize,
        grid_searcher: Arc<HashBasedGridSearcher>,
    ) -> Result<ElasticCrossSectionReaction, EvaluatorError> {
        ElasticCrossSectionReaction::new(
            Arc::clone(&self.energy_grid),
            cross_section,
            threshold_index,
            grid_searcher,
        )
        .map_err(|error| ContractViolation::from(error).into())
    }

    fn cross_section_evaluator(
        &self,
        cross_section: &[f64],
        threshold_index: usize,
    ) -> Result<TabularDistribution<LogLog>, EvaluatorError> {
        let energies = self
            .energy_grid
            .get(threshold_index..)
            .unwrap_or_default()
            .to_vec();
        TabularDistribution::new(energies, cross_section.to_vec())
            .map_err(|error| ContractViolation::from(error).into())
    }
}

/// Cross section padded with zeros below its threshold to the full grid length.
fn on_energy_grid(cross_section: &[f64], threshold_index: usize, len: usize) -> Vec<f64> {
    let mut values = vec![0.0; threshold_index.min(len)];
    values.extend_from_slice(cross_section);
    values.truncate(len);
    values
}
