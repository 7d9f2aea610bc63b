use super::{DataSourceError, EndlElasticDataSource, load_json};
use crate::domain::{EnergyTable, MissingEnergyKey};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndlElasticData {
    pub atomic_number: u32,
    pub elastic_energy_grid: Vec<f64>,
    pub cutoff_elastic_cross_section: Vec<f64>,
    pub total_elastic_cross_section: Vec<f64>,
    pub cutoff_elastic_angular_energy_grid: Vec<f64>,
    pub cutoff_elastic_angles: EnergyTable,
    pub cutoff_elastic_pdf: EnergyTable,
}

impl EndlElasticDataSource for EndlElasticData {
    fn atomic_number(&self) -> u32 {
        self.atomic_number
    }

    fn elastic_energy_grid(&self) -> &[f64] {
        &self.elastic_energy_grid
    }

    fn cutoff_elastic_cross_section(&self) -> &[f64] {
        &self.cutoff_elastic_cross_section
    }

    fn total_elastic_cross_section(&self) -> &[f64] {
        &self.total_elastic_cross_section
    }

    fn cutoff_elastic_angular_energy_grid(&self) -> &[f64] {
        &self.cutoff_elastic_angular_energy_grid
    }

    fn cutoff_elastic_angles_at_energy(&self, energy: f64) -> Result<&[f64], MissingEnergyKey> {
        self.cutoff_elastic_angles.at(energy)
    }

    fn cutoff_elastic_pdf_at_energy(&self, energy: f64) -> Result<&[f64], MissingEnergyKey> {
        self.cutoff_elastic_pdf.at(energy)
    }
}

pub fn load_endl_elastic_data(path: impl AsRef<Path>) -> Result<EndlElasticData, DataSourceError> {
    load_json(path.as_ref())
}
