use std::fs;
use std::io::ErrorKind;

use exofarm_core::prelude::ScenarioError;

use crate::stager::Workspace;

/// Remove a workspace and everything in it.
///
/// Runs for every scenario that got a workspace, whatever happened to it. A workspace that is
/// already gone counts as removed.
pub fn reap(workspace: &Workspace) -> Result<(), ScenarioError> {
    let path = workspace.path();

    match fs::remove_dir_all(path) {
        Ok(()) => {
            log::debug!("Removed workspace {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ScenarioError::Cleanup {
            path: path.to_path_buf(),
            source,
        }),
    }
}
