use super::CliError;
use super::helpers::{DataFormat, load_config, load_evaluator, write_json};
use datagen_core::domain::DataGenError;
use serde::Serialize;
use std::path::PathBuf;

#[derive(clap::Args)]
pub(super) struct EvaluateArgs {
    /// Layout of the elastic data file
    #[arg(long, value_enum)]
    format: DataFormat,

    /// Elastic data JSON file
    #[arg(long)]
    data: PathBuf,

    /// Evaluator configuration JSON file
    #[arg(long, conflicts_with = "basic")]
    config: Option<PathBuf>,

    /// Use the settings stored in native data
    #[arg(long)]
    basic: bool,

    /// Synthesize distributions at the min and max energy (with --basic)
    #[arg(long, requires = "basic")]
    generate_boundary_distributions: bool,

    /// Comma separated angular energy grid in MeV; derived from the data when omitted
    #[arg(long, value_delimiter = ',')]
    grid: Vec<f64>,

    /// Output JSON path; stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
pub(super) struct RutherfordArgs {
    /// Layout of the elastic data file
    #[arg(long, value_enum, default_value = "native")]
    format: DataFormat,

    /// Elastic data JSON file
    #[arg(long)]
    data: PathBuf,

    /// Relative difference below which the screened Rutherford part is roundoff
    #[arg(long, default_value_t = datagen_core::common::DEFAULT_RUTHERFORD_EVALUATION_TOLERANCE)]
    tolerance: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RutherfordReport {
    threshold_index: usize,
    threshold_energy: Option<f64>,
    cross_section: Vec<f64>,
}

pub(super) fn run_evaluate_command(args: EvaluateArgs) -> Result<i32, CliError> {
    if args.basic && args.format == DataFormat::Endl {
        return Err(CliError::Usage(
            "--basic requires --format native".to_string(),
        ));
    }

    let config = match &args.config {
        Some(path) => Some(load_config(path)?),
        None => None,
    };
    let evaluator = load_evaluator(
        args.format,
        &args.data,
        config,
        args.basic,
        args.generate_boundary_distributions,
    )?;

    let result = evaluator
        .evaluate_elastic_secondary_distribution(&args.grid)
        .map_err(DataGenError::from)?;
    tracing::info!(
        points = result.angular_energy_grid.len(),
        notices = result.notices.len(),
        "elastic secondary distribution evaluated"
    );

    write_json(args.output.as_deref(), &result)?;
    Ok(0)
}

pub(super) fn run_rutherford_command(args: RutherfordArgs) -> Result<i32, CliError> {
    let evaluator = load_evaluator(args.format, &args.data, None, args.format == DataFormat::Native, false)?;
    let split = evaluator
        .screened_rutherford_cross_section(args.tolerance)
        .map_err(DataGenError::from)?;

    let report = RutherfordReport {
        threshold_index: split.threshold_index,
        threshold_energy: evaluator.energy_grid().get(split.threshold_index).copied(),
        cross_section: split.cross_section,
    };
    write_json(None, &report)?;
    Ok(0)
}
