use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::bin_path::resolve_program;
use crate::cli::{ExoFarmCli, StrategyOpt};
use crate::supervisor::SupervisionStrategy;
use crate::types::ExoFarmResult;

/// What goes into a workspace.
#[derive(Debug, Clone)]
pub struct StagingLayout {
    /// The simulator source tree.
    pub source_dir: PathBuf,
    /// Top level files in [StagingLayout::source_dir] with these extensions are copied.
    pub source_extensions: Vec<String>,
    /// Files the simulator cannot run without. Copied a second time and loudly reported if
    /// missing.
    pub critical_files: Vec<String>,
    /// Data folders copied recursively from [StagingLayout::source_dir].
    pub data_dirs: Vec<String>,
    /// Shared boundary conditions, copied in as [StagingLayout::boundary_conditions_name].
    pub boundary_conditions_dir: Option<PathBuf>,
    pub boundary_conditions_name: String,
    /// Empty folders the simulator writes into.
    pub empty_dirs: Vec<String>,
}

impl StagingLayout {
    /// The layout VULCAN expects.
    pub fn vulcan(source_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            source_extensions: vec!["py".to_string()],
            critical_files: vec!["vulcan.py".to_string(), "op.py".to_string()],
            data_dirs: vec![
                "thermo".to_string(),
                "atm".to_string(),
                "fastchem_vulcan".to_string(),
            ],
            boundary_conditions_dir: None,
            boundary_conditions_name: "boundary_conditions".to_string(),
            empty_dirs: vec!["output".to_string(), "plot".to_string()],
        }
    }

    pub fn with_boundary_conditions(mut self, dir: impl Into<PathBuf>) -> Self {
        self.boundary_conditions_dir = Some(dir.into());
        self
    }
}

/// The command used to start the simulator. The absolute path of the configuration file is
/// appended as the final argument.
#[derive(Debug, Clone)]
pub struct Entrypoint {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}

impl Entrypoint {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }
}

/// Everything the driver needs to know to run a set of scenarios.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub layout: StagingLayout,
    /// Scenario document paths are resolved against this directory.
    pub config_dir: PathBuf,
    /// Workspaces are created as `temp_run_<id>` in this directory.
    pub work_base_dir: PathBuf,
    pub results_dir: PathBuf,
    /// If set, job logs are copied here before the workspace is removed.
    pub logs_dir: Option<PathBuf>,
    pub entrypoint: Entrypoint,
    pub strategy: SupervisionStrategy,
    /// Files in the workspace `output` folder with this extension are harvested.
    pub artifact_extension: String,
    pub show_progress: bool,
    /// If set, a summary of the run is appended to this file.
    pub run_summary_path: Option<PathBuf>,
}

impl RunnerConfig {
    pub fn new(
        layout: StagingLayout,
        config_dir: impl Into<PathBuf>,
        work_base_dir: impl Into<PathBuf>,
        results_dir: impl Into<PathBuf>,
        entrypoint: Entrypoint,
    ) -> Self {
        Self {
            layout,
            config_dir: config_dir.into(),
            work_base_dir: work_base_dir.into(),
            results_dir: results_dir.into(),
            logs_dir: None,
            entrypoint,
            strategy: SupervisionStrategy::default(),
            artifact_extension: "vul".to_string(),
            show_progress: false,
            run_summary_path: None,
        }
    }

    /// Build the configuration from the command line, filling in the standard project layout
    /// for any directory that wasn't given explicitly.
    pub fn from_cli(cli: &ExoFarmCli) -> ExoFarmResult<Self> {
        let root = cli.project_root.as_path();
        let research = root.join("ExoFarm_Research");

        let vulcan_dir = cli
            .vulcan_dir
            .clone()
            .unwrap_or_else(|| root.join("VULCAN"));
        let config_dir = cli
            .config_dir
            .clone()
            .unwrap_or_else(|| research.join("Config"));
        let boundary_conditions_dir = cli
            .boundary_conditions_dir
            .clone()
            .unwrap_or_else(|| config_dir.join("Boundary_Conditions"));
        let results_dir = cli
            .results_dir
            .clone()
            .unwrap_or_else(|| research.join("Results").join("Outputs"));
        let work_base_dir = cli.work_dir.clone().unwrap_or_else(|| research.clone());

        let entrypoint = Entrypoint::new(resolve_program(&cli.python)?)
            .arg("-u")
            .arg(&cli.entrypoint);

        let strategy = match cli.strategy {
            StrategyOpt::Sequential => SupervisionStrategy::Sequential,
            StrategyOpt::Poll => SupervisionStrategy::Poll {
                interval: Duration::from_secs(cli.poll_interval.max(1)),
            },
        };

        let mut config = Self::new(
            StagingLayout::vulcan(vulcan_dir).with_boundary_conditions(boundary_conditions_dir),
            config_dir,
            work_base_dir,
            results_dir,
            entrypoint,
        );
        config.logs_dir = cli.keep_logs.clone();
        config.strategy = strategy;
        config.show_progress = !cli.no_progress;
        config.run_summary_path = Some(cli.run_summary.clone());

        Ok(config)
    }

    pub fn workspace_path(&self, scenario_id: &str) -> PathBuf {
        workspace_path(&self.work_base_dir, scenario_id)
    }
}

/// The deterministic workspace location for a scenario.
pub fn workspace_path(work_base_dir: &Path, scenario_id: &str) -> PathBuf {
    work_base_dir.join(format!("temp_run_{scenario_id}"))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_cli() -> ExoFarmCli {
        ExoFarmCli {
            project_root: PathBuf::from("/project"),
            vulcan_dir: None,
            config_dir: None,
            boundary_conditions_dir: None,
            results_dir: None,
            work_dir: None,
            keep_logs: None,
            python: "/bin/sh".to_string(),
            entrypoint: "vulcan.py".to_string(),
            strategy: StrategyOpt::Sequential,
            poll_interval: 5,
            only: vec![],
            scenario_file: None,
            run_summary: PathBuf::from("run_summary.jsonl"),
            allow_failures: false,
            no_progress: true,
        }
    }

    #[cfg(unix)]
    #[test]
    fn standard_layout_from_project_root() {
        let config = RunnerConfig::from_cli(&sample_cli()).unwrap();

        assert_eq!(Path::new("/project/VULCAN"), config.layout.source_dir);
        assert_eq!(
            Some(PathBuf::from(
                "/project/ExoFarm_Research/Config/Boundary_Conditions"
            )),
            config.layout.boundary_conditions_dir
        );
        assert_eq!(
            Path::new("/project/ExoFarm_Research/Config"),
            config.config_dir
        );
        assert_eq!(
            Path::new("/project/ExoFarm_Research/Results/Outputs"),
            config.results_dir
        );
        assert_eq!(
            Path::new("/project/ExoFarm_Research/temp_run_A0"),
            config.workspace_path("A0")
        );
        assert_eq!(SupervisionStrategy::Sequential, config.strategy);
        assert!(!config.show_progress);
        assert_eq!(
            vec![OsString::from("-u"), OsString::from("vulcan.py")],
            config.entrypoint.args
        );
    }

    #[cfg(unix)]
    #[test]
    fn explicit_directories_win() {
        let mut cli = sample_cli();
        cli.vulcan_dir = Some(PathBuf::from("/opt/VULCAN"));
        cli.results_dir = Some(PathBuf::from("/data/results"));
        cli.strategy = StrategyOpt::Poll;
        cli.poll_interval = 0;

        let config = RunnerConfig::from_cli(&cli).unwrap();

        assert_eq!(Path::new("/opt/VULCAN"), config.layout.source_dir);
        assert_eq!(Path::new("/data/results"), config.results_dir);
        assert_eq!(
            SupervisionStrategy::Poll {
                interval: Duration::from_secs(1)
            },
            config.strategy
        );
    }

    #[test]
    fn missing_interpreter_is_an_error() {
        let mut cli = sample_cli();
        cli.python = "/no/such/python3".to_string();

        assert!(RunnerConfig::from_cli(&cli).is_err());
    }
}
