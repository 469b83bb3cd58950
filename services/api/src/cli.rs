use crate::report::{run_analyze, run_classify, run_estimate, run_project, ForecastCommand};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use waterway::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "waterway-api",
    about = "Serve and query the water consumption and hydric risk forecast engine",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run a forecast operation and print a report
    Forecast {
        #[command(subcommand)]
        command: ForecastCommand,
    },
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the trained model bundle (JSON)
    #[arg(long)]
    pub(crate) model: Option<PathBuf>,
    /// Override the precomputed projections file (.json or .csv)
    #[arg(long)]
    pub(crate) projections: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Forecast { command } => match command {
            ForecastCommand::Project(args) => run_project(args),
            ForecastCommand::Estimate(args) => run_estimate(args),
            ForecastCommand::Classify(args) => run_classify(args),
            ForecastCommand::Analyze(args) => run_analyze(args),
        },
    }
}
