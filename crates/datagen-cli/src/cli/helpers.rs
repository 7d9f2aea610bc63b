use super::CliError;
use anyhow::Context;
use datagen_core::common::{ConfigLoadError, EvaluatorConfig, load_evaluator_config};
use datagen_core::data::{DataSourceError, load_endl_elastic_data, load_native_elastic_data};
use datagen_core::domain::DataGenError;
use datagen_core::modules::elastic::ElectronElasticDataEvaluator;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub(super) enum DataFormat {
    /// Raw ENDL tables with delta angle cosines
    Endl,
    /// Pre-processed native tables
    Native,
}

/// Log to stderr, filtered by `RUST_LOG` and defaulting to warnings.
pub(super) fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub(super) fn load_config(path: &Path) -> Result<EvaluatorConfig, CliError> {
    load_evaluator_config(path).map_err(|error| {
        let datagen_error = match &error {
            ConfigLoadError::Read { .. } => {
                DataGenError::io_system("IO.EVALUATOR_CONFIG", error.to_string())
            }
            ConfigLoadError::Parse { .. } => {
                DataGenError::input_validation("INPUT.EVALUATOR_CONFIG", error.to_string())
            }
        };
        CliError::Compute(datagen_error)
    })
}

pub(super) fn load_evaluator(
    format: DataFormat,
    data_path: &Path,
    config: Option<EvaluatorConfig>,
    basic: bool,
    generate_boundary_distributions: bool,
) -> Result<ElectronElasticDataEvaluator, CliError> {
    let config = config.unwrap_or_default();
    let evaluator = match format {
        DataFormat::Endl => {
            let data = load_endl_elastic_data(data_path).map_err(data_source_error)?;
            ElectronElasticDataEvaluator::from_endl(&data, config)
        }
        DataFormat::Native => {
            let data = load_native_elastic_data(data_path).map_err(data_source_error)?;
            if basic {
                ElectronElasticDataEvaluator::from_native_basic(
                    &data,
                    generate_boundary_distributions,
                )
            } else {
                ElectronElasticDataEvaluator::from_native(&data, config)
            }
        }
    }
    .map_err(DataGenError::from)?;

    tracing::debug!(
        atomic_number = evaluator.atomic_number(),
        min_energy = evaluator.min_energy(),
        max_energy = evaluator.max_energy(),
        advisories = evaluator.advisories().len(),
        "elastic data evaluator constructed"
    );
    Ok(evaluator)
}

fn data_source_error(error: DataSourceError) -> CliError {
    let datagen_error = match &error {
        DataSourceError::Read { .. } => {
            DataGenError::io_system("IO.ELASTIC_DATA", error.to_string())
        }
        DataSourceError::Parse { .. } => {
            DataGenError::input_validation("INPUT.ELASTIC_DATA", error.to_string())
        }
    };
    CliError::Compute(datagen_error)
}

pub(super) fn write_json<T: Serialize>(output: Option<&Path>, value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create output directory '{}'", parent.display())
                })?;
            }
            fs::write(path, rendered + "\n")
                .with_context(|| format!("failed to write output '{}'", path.display()))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{rendered}").context("failed to write output to stdout")?;
        }
    }
    Ok(())
}
