//! Evaluated elastic data containers consumed by the evaluator, plus the JSON
//! documents that back them.

mod endl;
mod native;

pub use endl::{EndlElasticData, load_endl_elastic_data};
pub use native::{NativeElasticData, load_native_elastic_data};

use crate::domain::{EnergyTable, MissingEnergyKey};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Raw ENDL elastic tables. Angular distributions use the delta angle cosine
/// `1 - mu` in descending order of `mu`.
pub trait EndlElasticDataSource {
    fn atomic_number(&self) -> u32;
    fn elastic_energy_grid(&self) -> &[f64];
    fn cutoff_elastic_cross_section(&self) -> &[f64];
    fn total_elastic_cross_section(&self) -> &[f64];
    fn cutoff_elastic_angular_energy_grid(&self) -> &[f64];
    fn cutoff_elastic_angles_at_energy(&self, energy: f64) -> Result<&[f64], MissingEnergyKey>;
    fn cutoff_elastic_pdf_at_energy(&self, energy: f64) -> Result<&[f64], MissingEnergyKey>;
}

/// Pre-processed native electron tables together with the generation settings
/// they were produced with.
pub trait NativeElasticDataSource {
    fn atomic_number(&self) -> u32;
    fn electron_energy_grid(&self) -> &[f64];
    fn cutoff_elastic_cross_section(&self) -> &[f64];
    fn cutoff_elastic_cross_section_threshold_energy_index(&self) -> usize;
    fn total_elastic_cross_section(&self) -> &[f64];
    fn total_elastic_cross_section_threshold_energy_index(&self) -> usize;
    fn elastic_angular_energy_grid(&self) -> &[f64];
    fn cutoff_elastic_angles(&self) -> &EnergyTable;
    fn cutoff_elastic_pdf(&self) -> &EnergyTable;
    fn min_electron_energy(&self) -> f64;
    fn max_electron_energy(&self) -> f64;
    fn cutoff_angle_cosine(&self) -> f64;
    fn number_of_moment_preserving_angles(&self) -> usize;
    fn electron_tabular_evaluation_tolerance(&self) -> f64;
    fn electron_two_d_grid_policy(&self) -> &str;
    fn electron_two_d_interp_policy(&self) -> &str;
}

#[derive(Debug, thiserror::Error)]
pub enum DataSourceError {
    #[error("failed to read elastic data '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse elastic data '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, DataSourceError> {
    let source = fs::read_to_string(path).map_err(|source| DataSourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| DataSourceError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
