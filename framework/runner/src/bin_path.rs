use std::path::{Path, PathBuf};

use anyhow::bail;
use anyhow::Context;

use crate::types::ExoFarmResult;

/// Resolve the program used to launch the simulator.
///
/// A value containing a path separator is treated as a path and must exist. It is made absolute,
/// since the simulator is started from inside its workspace. Anything else is treated as a
/// program name and looked up in the user's `PATH`.
pub(crate) fn resolve_program(program: &str) -> ExoFarmResult<PathBuf> {
    if program.is_empty() {
        bail!("Simulator interpreter set to empty string");
    }

    if program.contains(std::path::MAIN_SEPARATOR) || program.contains('/') {
        let path = PathBuf::from(program);
        if !path.exists() {
            bail!(
                "Simulator interpreter set to '{path}' but that path doesn't exist",
                path = path.display()
            );
        }
        return path
            .canonicalize()
            .with_context(|| format!("Failed to resolve interpreter path '{}'", path.display()));
    }

    log::debug!("'{program}' is not a path so looking in user's 'PATH'");
    which::which(program).with_context(|| {
        format!(
            "'{program}' not found in PATH. Please install it or set 'EXOFARM_PYTHON' to the correct path."
        )
    })
}

/// Canonicalize a directory, creating it first if it doesn't exist.
pub(crate) fn ensure_dir(path: &Path) -> ExoFarmResult<PathBuf> {
    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory '{}'", path.display()))?;
    path.canonicalize()
        .with_context(|| format!("Failed to resolve directory '{}'", path.display()))
}
