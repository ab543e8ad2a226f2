mod app;
mod cli;
mod data;
mod error;
mod processing;
mod state;

use std::io;
use std::process::ExitCode;

use app::Outcome;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = cli::Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match app::run(&args) {
        Ok(Outcome::Written { rows, destination }) => {
            tracing::info!("Exported {rows} row(s) to {destination}");
            ExitCode::SUCCESS
        }
        Ok(Outcome::NoData) => {
            tracing::warn!(
                "No Temperature or NH3 data points found in the visible range; try adjusting the plot view"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
