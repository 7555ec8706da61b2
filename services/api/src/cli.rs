use crate::demo::{run_demo, run_weights_check, run_weights_show, CheckArgs, DemoArgs, ShowArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use health_pulse::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Health Pulse",
    about = "Serve and inspect customer health-score weighting from the command line",
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
    /// Inspect or dry-run edits to the health-score weight configuration
    Weights {
        #[command(subcommand)]
        command: WeightsCommand,
    },
    /// Walk through toggling a metric, the 100% rule, and save gating
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum WeightsCommand {
    /// Print the metric catalogue with its total and validity
    Show(ShowArgs),
    /// Apply edits in memory and report whether the result could be saved
    Check(CheckArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// CSV metric catalogue (id,name,description,enabled,weight)
    #[arg(long)]
    pub(crate) metrics_csv: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Weights {
            command: WeightsCommand::Show(args),
        } => run_weights_show(args),
        Command::Weights {
            command: WeightsCommand::Check(args),
        } => run_weights_check(args),
        Command::Demo(args) => run_demo(args).await,
    }
}
