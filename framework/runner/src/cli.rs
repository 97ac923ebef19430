use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug, Clone)]
#[command(about, long_about = None)]
pub struct ExoFarmCli {
    /// Root of the project checkout. The other directories default to the standard layout below
    /// this path: `VULCAN/`, `ExoFarm_Research/Config/`, `ExoFarm_Research/Results/Outputs/`.
    #[arg(long, env = "EXOFARM_PROJECT_ROOT", default_value = ".")]
    pub project_root: PathBuf,

    /// Directory containing the VULCAN sources and data folders
    #[arg(long, env = "EXOFARM_VULCAN_DIR")]
    pub vulcan_dir: Option<PathBuf>,

    /// Directory that scenario document paths are resolved against
    #[arg(long, env = "EXOFARM_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Directory of boundary condition files, copied into each workspace as `boundary_conditions`
    #[arg(long)]
    pub boundary_conditions_dir: Option<PathBuf>,

    /// Directory that output files are moved into
    #[arg(long, env = "EXOFARM_RESULTS_DIR")]
    pub results_dir: Option<PathBuf>,

    /// Directory that the per-scenario workspaces are created in
    #[arg(long, env = "EXOFARM_WORK_DIR")]
    pub work_dir: Option<PathBuf>,

    /// Copy each job's log into this directory before its workspace is removed
    #[arg(long)]
    pub keep_logs: Option<PathBuf>,

    /// The interpreter used to run the simulator. Either a path or a name to look up on `PATH`.
    #[arg(long, env = "EXOFARM_PYTHON", default_value = "python3")]
    pub python: String,

    /// The simulator entry point, relative to the workspace
    #[arg(long, default_value = "vulcan.py")]
    pub entrypoint: String,

    /// How to wait for the simulator processes to finish
    #[arg(long, value_enum, default_value_t = StrategyOpt::Poll)]
    pub strategy: StrategyOpt,

    /// Seconds between checks when using the `poll` strategy
    #[arg(long, default_value = "5")]
    pub poll_interval: u64,

    /// Only run the scenario with this id. Can be given multiple times.
    #[arg(long)]
    pub only: Vec<String>,

    /// Run the scenarios listed in this TOML file instead of the built-in list
    #[arg(long)]
    pub scenario_file: Option<PathBuf>,

    /// Where to append the run summary
    #[arg(long, env = "RUN_SUMMARY_PATH", default_value = "run_summary.jsonl")]
    pub run_summary: PathBuf,

    /// Exit successfully even if some scenarios failed
    #[arg(long, default_value = "false")]
    pub allow_failures: bool,

    /// Do not show a progress bar on the CLI.
    ///
    /// This is recommended for CI/CD environments where the progress bar isn't being looked at by
    /// anyone and is just adding noise to the logs.
    #[arg(long, default_value = "false")]
    pub no_progress: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyOpt {
    /// Wait for each job in turn
    Sequential,
    /// Check all jobs periodically
    Poll,
}
