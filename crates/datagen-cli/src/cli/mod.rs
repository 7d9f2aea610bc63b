mod commands;
mod helpers;

use clap::Parser;
use datagen_core::domain::DataGenError;

pub fn run_from_env() -> i32 {
    helpers::init_logging();
    let args: Vec<String> = std::env::args().skip(1).collect();

    match run(args) {
        Ok(code) => code,
        Err(error) => {
            let datagen_error = error.as_datagen_error();
            eprintln!("{}", datagen_error.diagnostic_line());
            datagen_error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("elastic-datagen".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(
    name = "elastic-datagen",
    version,
    about = "Electron elastic scattering data generator"
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Evaluate angular distributions and moment preserving data
    Evaluate(commands::EvaluateArgs),
    /// Split the elastic cross section into cutoff and screened Rutherford parts
    Rutherford(commands::RutherfordArgs),
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Evaluate(args) => commands::run_evaluate_command(args),
        CliCommand::Rutherford(args) => commands::run_rutherford_command(args),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(DataGenError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<DataGenError> for CliError {
    fn from(error: DataGenError) -> Self {
        Self::Compute(error)
    }
}

impl CliError {
    fn as_datagen_error(&self) -> DataGenError {
        match self {
            Self::Usage(message) => {
                DataGenError::input_validation("INPUT.CLI_USAGE", message.trim_end().to_string())
            }
            Self::Compute(error) => error.clone(),
            Self::Internal(error) => DataGenError::io_system("IO.CLI", format!("{error:#}")),
        }
    }
}
