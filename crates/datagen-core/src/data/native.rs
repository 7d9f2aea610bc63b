use super::{DataSourceError, NativeElasticDataSource, load_json};
use crate::domain::EnergyTable;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeElasticData {
    pub atomic_number: u32,
    pub electron_energy_grid: Vec<f64>,
    pub cutoff_elastic_cross_section: Vec<f64>,
    #[serde(default)]
    pub cutoff_elastic_cross_section_threshold_energy_index: usize,
    pub total_elastic_cross_section: Vec<f64>,
    #[serde(default)]
    pub total_elastic_cross_section_threshold_energy_index: usize,
    pub elastic_angular_energy_grid: Vec<f64>,
    pub cutoff_elastic_angles: EnergyTable,
    pub cutoff_elastic_pdf: EnergyTable,
    pub min_electron_energy: f64,
    pub max_electron_energy: f64,
    pub cutoff_angle_cosine: f64,
    pub number_of_moment_preserving_angles: usize,
    pub electron_tabular_evaluation_tolerance: f64,
    pub electron_two_d_grid_policy: String,
    pub electron_two_d_interp_policy: String,
}

impl NativeElasticDataSource for NativeElasticData {
    fn atomic_number(&self) -> u32 {
        self.atomic_number
    }

    fn electron_energy_grid(&self) -> &[f64] {
        &self.electron_energy_grid
    }

    fn cutoff_elastic_cross_section(&self) -> &[f64] {
        &self.cutoff_elastic_cross_section
    }

    fn cutoff_elastic_cross_section_threshold_energy_index(&self) -> usize {
        self.cutoff_elastic_cross_section_threshold_energy_index
    }

    fn total_elastic_cross_section(&self) -> &[f64] {
        &self.total_elastic_cross_section
    }

    fn total_elastic_cross_section_threshold_energy_index(&self) -> usize {
        self.total_elastic_cross_section_threshold_energy_index
    }

    fn elastic_angular_energy_grid(&self) -> &[f64] {
        &self.elastic_angular_energy_grid
    }

    fn cutoff_elastic_angles(&self) -> &EnergyTable {
        &self.cutoff_elastic_angles
    }

    fn cutoff_elastic_pdf(&self) -> &EnergyTable {
        &self.cutoff_elastic_pdf
    }

    fn min_electron_energy(&self) -> f64 {
        self.min_electron_energy
    }

    fn max_electron_energy(&self) -> f64 {
        self.max_electron_energy
    }

    fn cutoff_angle_cosine(&self) -> f64 {
        self.cutoff_angle_cosine
    }

    fn number_of_moment_preserving_angles(&self) -> usize {
        self.number_of_moment_preserving_angles
    }

    fn electron_tabular_evaluation_tolerance(&self) -> f64 {
        self.electron_tabular_evaluation_tolerance
    }

    fn electron_two_d_grid_policy(&self) -> &str {
        &self.electron_two_d_grid_policy
    }

    fn electron_two_d_interp_policy(&self) -> &str {
        &self.electron_two_d_interp_policy
    }
}

pub fn load_native_elastic_data(
    path: impl AsRef<Path>,
) -> Result<NativeElasticData, DataSourceError> {
    load_json(path.as_ref())
}
