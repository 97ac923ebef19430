mod bin_path;
mod cli;
mod config;
mod definition;
mod harvester;
mod init;
mod job;
mod launcher;
mod progress;
mod reaper;
mod report;
mod run;
mod stager;
mod supervisor;
mod types;

pub mod prelude {
    pub use crate::cli::{ExoFarmCli, StrategyOpt};
    pub use crate::config::{workspace_path, Entrypoint, RunnerConfig, StagingLayout};
    pub use crate::definition::{RunDefinition, RunDefinitionBuilder};
    pub use crate::init::init;
    pub use crate::report::{RunReport, ScenarioReport};
    pub use crate::run::{run, run_scenarios};
    pub use crate::supervisor::SupervisionStrategy;
    pub use crate::types::ExoFarmResult;
    pub use exofarm_core::prelude::*;
}
