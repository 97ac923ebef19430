use crate::cli::ExoFarmCli;
use clap::Parser;

/// Initialise the CLI and logging for the runner.
///
/// Logs at `info` unless `RUST_LOG` says otherwise.
pub fn init() -> ExoFarmCli {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    ExoFarmCli::parse()
}
