use std::io::Write;
use std::path::{Path, PathBuf};

use crate::document::{DocumentError, ScenarioDocument};
use crate::template::{render, VulcanTemplate};

/// The file name VULCAN imports its configuration from.
pub const CFG_FILE_NAME: &str = "vulcan_cfg.py";

#[derive(Debug, thiserror::Error)]
pub enum MaterializeError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A configuration file that has been written into a workspace.
#[derive(Debug, Clone)]
pub struct MaterializedConfig {
    /// Absolute path to the written file.
    pub path: PathBuf,
    /// Name of the output file the simulator has been told to write.
    pub out_name: String,
    pub rendered: String,
}

/// Load the document at `document_path`, render it and write the result into `workspace`.
///
/// The document is fully validated and rendered before anything touches the workspace. The file
/// is written to a temporary file in the workspace and renamed into place, so either the complete
/// configuration is present or none at all.
pub fn materialize(
    document_path: &Path,
    workspace: &Path,
    scenario_id: &str,
) -> Result<MaterializedConfig, MaterializeError> {
    let document = ScenarioDocument::load(document_path)?;
    let rendered = render(&VulcanTemplate::default(), &document.overrides(scenario_id));

    let path = write_atomic(workspace, CFG_FILE_NAME, &rendered)?;
    log::debug!("Wrote {} for {scenario_id}", path.display());

    Ok(MaterializedConfig {
        path,
        out_name: document.out_name(scenario_id),
        rendered,
    })
}

fn write_atomic(dir: &Path, file_name: &str, content: &str) -> Result<PathBuf, MaterializeError> {
    let target = dir.join(file_name);
    let write_err = |source| MaterializeError::Write {
        path: target.clone(),
        source,
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".vulcan_cfg")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(&target).map_err(|e| write_err(e.error))?;

    target.canonicalize().map_err(write_err)
}
