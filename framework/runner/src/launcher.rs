//! Starts the simulator for a configured scenario.

use std::fs::File;
use std::path::Path;
use std::process::Stdio;

use exofarm_core::prelude::ScenarioError;
use tokio::process::Command;

use crate::config::Entrypoint;
use crate::job::Job;

/// Start the simulator inside the job's workspace without waiting for it.
///
/// The process runs with the workspace as its working directory and is given the absolute path
/// of the configuration file as its final argument. Standard output and standard error both go to
/// `<workspace>/<id>.log`. The process is not tied to the lifetime of the driver: if the driver
/// stops, the simulator keeps running.
///
/// Must be called from within a Tokio runtime.
pub fn launch(job: &mut Job, entrypoint: &Entrypoint, config_path: &Path) {
    match spawn(job, entrypoint, config_path) {
        Ok((child, log)) => {
            log::info!(
                "[{}] Launched simulator (pid {})",
                job.id(),
                child
                    .id()
                    .map_or_else(|| "unknown".to_string(), |pid| pid.to_string())
            );
            job.set_running(child, log);
        }
        Err(e) => {
            job.record(e);
            job.fail_without_launch();
        }
    }
}

fn spawn(
    job: &Job,
    entrypoint: &Entrypoint,
    config_path: &Path,
) -> Result<(tokio::process::Child, File), ScenarioError> {
    let workspace = job.workspace();
    let log_path = workspace.log_path(job.id());

    let log = File::create(&log_path).map_err(|e| {
        ScenarioError::Launch(format!(
            "could not create log file {}: {e}",
            log_path.display()
        ))
    })?;
    let stdout = log
        .try_clone()
        .map_err(|e| ScenarioError::Launch(format!("could not open log for stdout: {e}")))?;
    let stderr = log
        .try_clone()
        .map_err(|e| ScenarioError::Launch(format!("could not open log for stderr: {e}")))?;

    log::debug!(
        "[{}] Running {} {:?} {} in {}",
        job.id(),
        entrypoint.program.display(),
        entrypoint.args,
        config_path.display(),
        workspace.path().display()
    );

    let child = Command::new(&entrypoint.program)
        .args(&entrypoint.args)
        .arg(config_path)
        .current_dir(workspace.path())
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr))
        .kill_on_drop(false)
        .spawn()
        .map_err(|e| {
            ScenarioError::Launch(format!(
                "could not start {}: {e}",
                entrypoint.program.display()
            ))
        })?;

    Ok((child, log))
}
