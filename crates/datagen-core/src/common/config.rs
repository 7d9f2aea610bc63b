//! Evaluator configuration and its JSON loader.
//!
//! Missing JSON fields fall back to the historic data generation defaults:
//! the full 1e-5 to 1e5 MeV range, a 0.9 cutoff angle cosine with two discrete
//! angles, and unit-base correlated Log-Log-Log interpolation.

use crate::domain::{BivariateGridPolicy, CoupledElasticSamplingMethod, TwoDInterpolationPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EvaluatorConfig {
    pub min_energy: f64,
    pub max_energy: f64,
    pub cutoff_angle_cosine: f64,
    pub number_of_moment_preserving_angles: usize,
    pub tabular_evaluation_tol: f64,
    pub two_d_grid: BivariateGridPolicy,
    pub two_d_interp: TwoDInterpolationPolicy,
    pub sampling_method: CoupledElasticSamplingMethod,
    pub generate_new_distribution_at_min_and_max_energy: bool,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            min_energy: 1e-5,
            max_energy: 1e5,
            cutoff_angle_cosine: 0.9,
            number_of_moment_preserving_angles: 2,
            tabular_evaluation_tol: 1e-7,
            two_d_grid: BivariateGridPolicy::UnitBaseCorrelated,
            two_d_interp: TwoDInterpolationPolicy::LogLogLog,
            sampling_method: CoupledElasticSamplingMethod::ModifiedTwoDUnion,
            generate_new_distribution_at_min_and_max_energy: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("failed to read evaluator config '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse evaluator config '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub fn load_evaluator_config(path: impl AsRef<Path>) -> Result<EvaluatorConfig, ConfigLoadError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&source).map_err(|source| ConfigLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::{ConfigLoadError, EvaluatorConfig, load_evaluator_config};
    use crate::domain::{BivariateGridPolicy, TwoDInterpolationPolicy};
    use std::fs;

    #[test]
    fn partial_json_keeps_defaults() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let path = temp.path().join("config.json");
        fs::write(
            &path,
            r#"{ "cutoffAngleCosine": 0.8, "twoDGrid": "Direct", "twoDInterp": "Lin-Lin-Log" }"#,
        )
        .expect("config should be written");

        let config = load_evaluator_config(&path).expect("config should load");
        assert_eq!(config.cutoff_angle_cosine, 0.8);
        assert_eq!(config.two_d_grid, BivariateGridPolicy::Direct);
        assert_eq!(config.two_d_interp, TwoDInterpolationPolicy::LinLinLog);
        assert_eq!(config.min_energy, EvaluatorConfig::default().min_energy);
        assert_eq!(config.number_of_moment_preserving_angles, 2);
    }

    #[test]
    fn unknown_policy_is_a_parse_error() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{ "twoDGrid": "Histogram" }"#).expect("config should be written");

        let error = load_evaluator_config(&path).expect_err("policy should be rejected");
        assert!(matches!(error, ConfigLoadError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let error = load_evaluator_config(temp.path().join("absent.json"))
            .expect_err("missing file should fail");
        assert!(matches!(error, ConfigLoadError::Read { .. }));
    }
}
