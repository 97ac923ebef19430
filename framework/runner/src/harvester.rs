//! Moves simulator output out of a workspace and into the shared results directory.

use std::fs;
use std::path::{Path, PathBuf};

use exofarm_core::prelude::ScenarioError;

use crate::stager::Workspace;

/// What a harvest produced.
#[derive(Debug, Default)]
pub struct Harvest {
    /// File names of the artifacts now in the results directory, sorted.
    pub artifacts: Vec<String>,
    pub errors: Vec<ScenarioError>,
}

/// Move every file with the artifact `extension` from the workspace `output` folder into
/// `results_dir`, replacing any file of the same name already there.
///
/// Runs whatever the job's exit status was, partial output is still worth keeping. Finding
/// nothing to move is recorded as [ScenarioError::NoArtifacts].
pub fn harvest(workspace: &Workspace, results_dir: &Path, extension: &str) -> Harvest {
    let output_dir = workspace.output_dir();
    let mut harvest = Harvest::default();

    let entries = match fs::read_dir(&output_dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("Could not read {}: {e}", output_dir.display());
            harvest
                .errors
                .push(ScenarioError::NoArtifacts { dir: output_dir });
            return harvest;
        }
    };

    let mut candidates = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.to_string_lossy() == extension)
        })
        .collect::<Vec<_>>();
    candidates.sort();

    for path in candidates {
        let Some(file_name) = path.file_name() else {
            continue;
        };
        let destination = results_dir.join(file_name);

        match move_file(&path, &destination) {
            Ok(()) => {
                log::info!("Moved {} to {}", path.display(), destination.display());
                harvest
                    .artifacts
                    .push(file_name.to_string_lossy().into_owned());
            }
            Err(source) => harvest
                .errors
                .push(ScenarioError::Harvest { path, source }),
        }
    }

    if harvest.artifacts.is_empty() && harvest.errors.is_empty() {
        harvest
            .errors
            .push(ScenarioError::NoArtifacts { dir: output_dir });
    }

    harvest
}

/// Replace `destination` with `source`. Falls back to copy and delete when a rename isn't
/// possible, for example across file systems.
fn move_file(source: &Path, destination: &Path) -> std::io::Result<()> {
    if destination.exists() {
        fs::remove_file(destination)?;
    }

    if let Err(e) = fs::rename(source, destination) {
        log::debug!(
            "Rename of {} failed ({e}), copying instead",
            source.display()
        );
        fs::copy(source, destination)?;
        fs::remove_file(source)?;
    }

    Ok(())
}

/// Copy the job log out of the workspace into `logs_dir` so it survives the reap.
pub fn keep_log(
    workspace: &Workspace,
    scenario_id: &str,
    logs_dir: &Path,
) -> Result<PathBuf, ScenarioError> {
    let log_path = workspace.log_path(scenario_id);
    let destination = logs_dir.join(format!("{scenario_id}.log"));

    fs::copy(&log_path, &destination).map_err(|source| ScenarioError::Harvest {
        path: log_path,
        source,
    })?;

    Ok(destination)
}
