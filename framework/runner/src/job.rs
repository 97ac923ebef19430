use std::fs::File;
use std::path::PathBuf;

use exofarm_core::prelude::{JobStatus, ScenarioError, ScenarioSpec, ScenarioStage};
use tokio::process::Child;

use crate::stager::Workspace;

/// A scenario as it moves through the run, from staging to reaping.
///
/// Owns the [Child] process once launched, along with a handle to the log file the process
/// writes to. Both are released as soon as the process has been observed to exit.
#[derive(Debug)]
pub struct Job {
    scenario: ScenarioSpec,
    workspace: Workspace,
    child: Option<Child>,
    log: Option<File>,
    status: JobStatus,
    stage: Option<ScenarioStage>,
    errors: Vec<ScenarioError>,
    config_fingerprint: Option<String>,
    artifacts: Vec<String>,
    workspace_left: Option<PathBuf>,
}

impl Job {
    pub fn new(scenario: ScenarioSpec, workspace: Workspace) -> Self {
        Self {
            scenario,
            workspace,
            child: None,
            log: None,
            status: JobStatus::default(),
            stage: None,
            errors: Vec::new(),
            config_fingerprint: None,
            artifacts: Vec::new(),
            workspace_left: None,
        }
    }

    pub fn id(&self) -> &str {
        self.scenario.id()
    }

    pub fn scenario(&self) -> &ScenarioSpec {
        &self.scenario
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// The furthest stage reached, `None` until the workspace has been staged.
    pub fn stage(&self) -> Option<ScenarioStage> {
        self.stage
    }

    pub fn errors(&self) -> &[ScenarioError] {
        &self.errors
    }

    pub fn artifacts(&self) -> &[String] {
        &self.artifacts
    }

    pub fn workspace_left(&self) -> Option<&PathBuf> {
        self.workspace_left.as_ref()
    }

    pub fn config_fingerprint(&self) -> Option<&str> {
        self.config_fingerprint.as_deref()
    }

    /// Whether anything recorded so far means the simulator must not be started.
    pub fn launch_prevented(&self) -> bool {
        self.errors.iter().any(ScenarioError::prevents_launch)
    }

    pub fn is_running(&self) -> bool {
        self.child.is_some()
    }

    /// Record an error against this scenario and log it.
    pub fn record(&mut self, error: ScenarioError) {
        match &error {
            ScenarioError::CriticalResourceMissing { .. } => {
                log::error!("[{}] !!! {error} !!!", self.id());
            }
            ScenarioError::ResourceMissing { .. } | ScenarioError::NoArtifacts { .. } => {
                log::warn!("[{}] {error}", self.id());
            }
            e if e.prevents_launch() => log::error!("[{}] {error}", self.id()),
            _ => log::warn!("[{}] {error}", self.id()),
        }
        self.errors.push(error);
    }

    pub fn record_all(&mut self, errors: impl IntoIterator<Item = ScenarioError>) {
        for error in errors {
            self.record(error);
        }
    }

    /// Move to the next stage of the lifecycle. Stages never go backwards.
    pub fn advance(&mut self, stage: ScenarioStage) {
        if self.stage.is_some_and(|current| current >= stage) {
            log::trace!("[{}] Already past stage {stage}", self.id());
            return;
        }
        log::debug!("[{}] Stage -> {stage}", self.id());
        self.stage = Some(stage);
    }

    pub(crate) fn set_config_fingerprint(&mut self, fingerprint: String) {
        self.config_fingerprint = Some(fingerprint);
    }

    /// Take ownership of a started process.
    pub(crate) fn set_running(&mut self, child: Child, log: File) {
        self.child = Some(child);
        self.log = Some(log);
        self.status = JobStatus::Running;
        self.advance(ScenarioStage::Launched);
    }

    /// Mark a job that was never started as failed. The reason is already in the error list.
    pub(crate) fn fail_without_launch(&mut self) {
        self.status = JobStatus::Failed { exit_code: None };
    }

    pub(crate) fn child_mut(&mut self) -> Option<&mut Child> {
        self.child.as_mut()
    }

    /// Record the observed exit of the process and release it.
    pub(crate) fn terminate(&mut self, exit_code: Option<i32>) {
        self.status = JobStatus::from_exit_code(exit_code);
        self.child = None;

        match self.status {
            JobStatus::Succeeded => log::info!("[{}] Simulation finished", self.id()),
            _ => self.record(ScenarioError::JobExecution { exit_code }),
        }
        self.advance(ScenarioStage::Terminated);
        self.log = None;
    }

    #[cfg(test)]
    fn holds_log(&self) -> bool {
        self.log.is_some()
    }

    pub(crate) fn add_artifacts(&mut self, artifacts: Vec<String>) {
        self.artifacts.extend(artifacts);
    }

    pub(crate) fn set_workspace_left(&mut self, path: PathBuf) {
        self.workspace_left = Some(path);
    }
}
