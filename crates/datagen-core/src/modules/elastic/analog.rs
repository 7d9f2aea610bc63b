use super::errors::{ComputationError, ContractViolation, EvaluatorError, require};
use super::ElectronElasticDataEvaluator;
use crate::distribution::AngularTables;
use crate::domain::EnergyTable;
use crate::numerics::special::long;
use serde::{Deserialize, Serialize};

/// Cutoff angular distributions on an angular energy grid. The two tables
/// always share the grid as their key set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AngularDistribution {
    pub angular_energy_grid: Vec<f64>,
    pub elastic_angle: EnergyTable,
    pub elastic_pdf: EnergyTable,
}

impl AngularDistribution {
    fn push(&mut self, energy: f64, angle: Vec<f64>, pdf: Vec<f64>) {
        self.angular_energy_grid.push(energy);
        self.elastic_angle.insert(energy, angle);
        self.elastic_pdf.insert(energy, pdf);
    }
}

impl ElectronElasticDataEvaluator {
    /// Angular distributions between the min and max energy.
    ///
    /// Tabulated energies inside the range are copied. At the bounds the
    /// distribution is either synthesized by bivariate interpolation or the
    /// nearest tabulated energy outside the range is used instead.
    pub fn evaluate_analog_elastic_secondary_distribution(
        &self,
    ) -> Result<AngularDistribution, EvaluatorError> {
        let grid = &self.angular_energy_grid;
        let mut distribution = AngularDistribution::default();
        if grid.is_empty() {
            return Ok(distribution);
        }

        if self.generate_new_distribution_at_min_and_max_energy {
            if !self.elastic_angle.contains_key(self.min_energy) {
                let (angle, pdf) = self.synthesize(self.min_energy)?;
                distribution.push(self.min_energy, angle, pdf);
            }
            for &energy in grid
                .iter()
                .filter(|energy| **energy >= self.min_energy && **energy <= self.max_energy)
            {
                self.copy_tabulated(&mut distribution, energy)?;
            }
            let last_included = distribution.angular_energy_grid.last().copied();
            if last_included.is_none_or(|energy| energy < self.max_energy) {
                let (angle, pdf) = self.synthesize(self.max_energy)?;
                distribution.push(self.max_energy, angle, pdf);
            }
        } else {
            let lower = grid
                .iter()
                .rposition(|energy| *energy <= self.min_energy)
                .unwrap_or(0);
            let upper = grid
                .iter()
                .position(|energy| *energy >= self.max_energy)
                .unwrap_or(grid.len() - 1);
            for &energy in &grid[lower..=upper.max(lower)] {
                self.copy_tabulated(&mut distribution, energy)?;
            }
        }

        tracing::debug!(
            points = distribution.angular_energy_grid.len(),
            synthesized = self.generate_new_distribution_at_min_and_max_energy,
            "analog angular distributions evaluated"
        );
        Ok(distribution)
    }

    /// Angular distributions at every point of `angular_energy_grid`, which must
    /// start at the min energy and end at the max energy.
    pub fn evaluate_analog_elastic_secondary_distribution_in_place(
        &self,
        angular_energy_grid: &[f64],
    ) -> Result<AngularDistribution, EvaluatorError> {
        let front = angular_energy_grid.first().copied().unwrap_or(f64::NAN);
        let back = angular_energy_grid.last().copied().unwrap_or(f64::NAN);
        require(front == self.min_energy && back == self.max_energy, || {
            ContractViolation::GridEndpointMismatch {
                front,
                back,
                min_energy: self.min_energy,
                max_energy: self.max_energy,
            }
        })?;

        let mut distribution = AngularDistribution::default();
        for &energy in angular_energy_grid {
            if self.elastic_angle.contains_key(energy) {
                self.copy_tabulated(&mut distribution, energy)?;
            } else {
                let (angle, pdf) = self.synthesize(energy)?;
                distribution.push(energy, angle, pdf);
            }
        }
        Ok(distribution)
    }

    fn copy_tabulated(
        &self,
        distribution: &mut AngularDistribution,
        energy: f64,
    ) -> Result<(), EvaluatorError> {
        let angle = self.elastic_angle.at(energy)?.to_vec();
        let pdf = self.elastic_pdf.at(energy)?.to_vec();
        distribution.push(energy, angle, pdf);
        Ok(())
    }

    /// Full angular grid and pdf at `energy` from the bound bivariate evaluator.
    fn synthesize(&self, energy: f64) -> Result<(Vec<f64>, Vec<f64>), EvaluatorError> {
        let tables = AngularTables::new(&self.elastic_angle, &self.elastic_pdf);
        let grid = (self.angular_grid_fn)(&tables, energy, 1.0, self.tabular_evaluation_tol)
            .map_err(|source| ComputationError::AngularDistribution { energy, source })?;
        tracing::debug!(energy, points = grid.angles.len(), "synthesized angular distribution");
        Ok((grid.angles, grid.pdf))
    }

    /// Reverse ENDL delta angle cosines `1 - mu` into ascending angle cosines.
    pub fn calculate_elastic_angle_cosine(raw_angle: &[f64], raw_pdf: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let angle = raw_angle
            .iter()
            .rev()
            .map(|raw| f64::from(long(1.0) - long(*raw)))
            .collect();
        let pdf = raw_pdf.iter().rev().copied().collect();
        (angle, pdf)
    }
}
