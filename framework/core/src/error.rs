use std::path::PathBuf;

/// Everything that can go wrong for a single scenario.
///
/// None of these abort the run. Each is recorded against the scenario it happened to and the
/// scenario moves on to the next stage where that still makes sense. Use
/// [ScenarioError::prevents_launch] to find out whether the job can still be started.
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// The workspace directory could not be created, so nothing else can be staged.
    #[error("Could not create workspace {}: {source}", path.display())]
    Workspace {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A resource could not be copied into the workspace.
    #[error("Failed to stage {}: {source}", path.display())]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// An optional resource was not present in the source tree.
    #[error("{} not found, skipped", path.display())]
    ResourceMissing { path: PathBuf },
    /// One of the files the simulator cannot run without is missing from the source tree.
    #[error("Critical file {file} not found in {}", source_dir.display())]
    CriticalResourceMissing { file: String, source_dir: PathBuf },
    #[error("Invalid configuration: {0}")]
    ConfigValidation(String),
    /// The rendered configuration could not be written into the workspace.
    #[error("Failed to write configuration {}: {source}", path.display())]
    ConfigWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to launch simulator: {0}")]
    Launch(String),
    #[error(
        "Simulator exited unsuccessfully (exit code {})",
        exit_code.map_or("none".to_string(), |c| c.to_string())
    )]
    JobExecution { exit_code: Option<i32> },
    #[error("No output files found in {}", dir.display())]
    NoArtifacts { dir: PathBuf },
    #[error("Failed to move output {}: {source}", path.display())]
    Harvest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to remove workspace {}: {source}", path.display())]
    Cleanup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScenarioError {
    /// Whether the scenario can no longer be launched after this error.
    pub fn prevents_launch(&self) -> bool {
        matches!(
            self,
            ScenarioError::Workspace { .. }
                | ScenarioError::ConfigValidation(_)
                | ScenarioError::ConfigWrite { .. }
                | ScenarioError::Launch(_)
        )
    }

    /// Short, stable name for the error class. Used in run summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            ScenarioError::Workspace { .. } => "workspace_error",
            ScenarioError::Staging { .. } => "staging_error",
            ScenarioError::ResourceMissing { .. } => "resource_missing",
            ScenarioError::CriticalResourceMissing { .. } => "critical_resource_missing",
            ScenarioError::ConfigValidation(_) => "config_validation_error",
            ScenarioError::ConfigWrite { .. } => "config_write_error",
            ScenarioError::Launch(_) => "launch_error",
            ScenarioError::JobExecution { .. } => "job_execution_failure",
            ScenarioError::NoArtifacts { .. } => "harvest_warning",
            ScenarioError::Harvest { .. } => "harvest_error",
            ScenarioError::Cleanup { .. } => "cleanup_error",
        }
    }
}
