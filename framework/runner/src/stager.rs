//! Creates and populates the isolated working directory for a scenario.

use std::fs;
use std::path::{Path, PathBuf};

use exofarm_core::prelude::ScenarioError;
use walkdir::WalkDir;

use crate::config::StagingLayout;

/// The working directory of a single scenario.
///
/// The path is derived from the scenario id so that two scenarios in the same run never share a
/// workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    path: PathBuf,
}

impl Workspace {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Where the simulator writes its output files.
    pub fn output_dir(&self) -> PathBuf {
        self.path.join("output")
    }

    pub fn log_path(&self, scenario_id: &str) -> PathBuf {
        self.path.join(format!("{scenario_id}.log"))
    }
}

/// Prepare a fresh workspace.
///
/// Anything left at the workspace path by a previous run is removed first. Copying is best
/// effort: every failure is returned in the list of issues and staging carries on, because the
/// simulator itself is the judge of whether something important is missing. Only a failure to
/// create the workspace directory is returned as an error.
pub fn stage(
    workspace: &Workspace,
    layout: &StagingLayout,
    scenario_id: &str,
) -> Result<Vec<ScenarioError>, ScenarioError> {
    let root = workspace.path();

    if root.exists() {
        log::info!(
            "[{scenario_id}] Cleaning existing workspace {}",
            root.display()
        );
        fs::remove_dir_all(root).map_err(|source| ScenarioError::Workspace {
            path: root.to_path_buf(),
            source,
        })?;
    }
    fs::create_dir_all(root).map_err(|source| ScenarioError::Workspace {
        path: root.to_path_buf(),
        source,
    })?;

    log::info!("[{scenario_id}] Setting up workspace {}", root.display());

    let mut issues = Vec::new();

    copy_source_files(layout, root, &mut issues);
    copy_critical_files(layout, root, &mut issues);

    for folder in &layout.data_dirs {
        let src = layout.source_dir.join(folder);
        if src.is_dir() {
            copy_dir_all(&src, &root.join(folder), &mut issues);
        } else {
            issues.push(ScenarioError::ResourceMissing { path: src });
        }
    }

    if let Some(bc_dir) = &layout.boundary_conditions_dir {
        if bc_dir.is_dir() {
            copy_dir_all(
                bc_dir,
                &root.join(&layout.boundary_conditions_name),
                &mut issues,
            );
        } else {
            issues.push(ScenarioError::ResourceMissing {
                path: bc_dir.clone(),
            });
        }
    }

    for folder in &layout.empty_dirs {
        let path = root.join(folder);
        if let Err(source) = fs::create_dir_all(&path) {
            issues.push(ScenarioError::Staging { path, source });
        }
    }

    Ok(issues)
}

fn copy_source_files(layout: &StagingLayout, root: &Path, issues: &mut Vec<ScenarioError>) {
    let entries = match fs::read_dir(&layout.source_dir) {
        Ok(entries) => entries,
        Err(source) => {
            issues.push(ScenarioError::Staging {
                path: layout.source_dir.clone(),
                source,
            });
            return;
        }
    };

    for entry in entries {
        let path = match entry {
            Ok(entry) => entry.path(),
            Err(source) => {
                issues.push(ScenarioError::Staging {
                    path: layout.source_dir.clone(),
                    source,
                });
                continue;
            }
        };

        let wanted = path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| layout.source_extensions.iter().any(|e| e == ext));
        if !wanted {
            continue;
        }

        if let Some(file_name) = path.file_name() {
            if let Err(source) = fs::copy(&path, root.join(file_name)) {
                issues.push(ScenarioError::Staging { path, source });
            }
        }
    }
}

fn copy_critical_files(layout: &StagingLayout, root: &Path, issues: &mut Vec<ScenarioError>) {
    for file in &layout.critical_files {
        let src = layout.source_dir.join(file);
        if src.is_file() {
            if let Err(source) = fs::copy(&src, root.join(file)) {
                issues.push(ScenarioError::Staging { path: src, source });
            }
        } else {
            issues.push(ScenarioError::CriticalResourceMissing {
                file: file.clone(),
                source_dir: layout.source_dir.clone(),
            });
        }
    }
}

/// Recursively copy `src` to `dst`, recording failures and carrying on.
fn copy_dir_all(src: &Path, dst: &Path, issues: &mut Vec<ScenarioError>) {
    for entry in WalkDir::new(src) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err.path().unwrap_or(src).to_path_buf();
                issues.push(ScenarioError::Staging {
                    path,
                    source: err.into(),
                });
                continue;
            }
        };

        // Every entry is below `src`.
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);

        let result = if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
        } else {
            fs::copy(entry.path(), &target).map(|_| ())
        };
        if let Err(source) = result {
            issues.push(ScenarioError::Staging {
                path: entry.path().to_path_buf(),
                source,
            });
        }
    }
}
