use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Static description of one simulation job.
///
/// Created once from the scenario list at start up and never mutated afterwards. The `id` is
/// embedded in the workspace path and the log file name, so it must be unique within a run and
/// restricted to characters that are safe in a file name, see [validate_scenarios].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioSpec {
    id: String,
    /// Path to the declarative configuration document, relative to the config directory unless
    /// absolute.
    #[serde(alias = "yaml", rename = "config")]
    config_path: PathBuf,
    /// Human readable name, only used for display.
    #[serde(default, alias = "name")]
    label: Option<String>,
}

impl ScenarioSpec {
    pub fn new(id: impl Into<String>, config_path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            config_path: config_path.into(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The label if one was given, otherwise the id.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    /// Resolve the config path against `config_dir`. Absolute paths are returned unchanged.
    pub fn resolve_config_path(&self, config_dir: &Path) -> PathBuf {
        if self.config_path.is_absolute() {
            self.config_path.clone()
        } else {
            config_dir.join(&self.config_path)
        }
    }
}

/// Problems with the scenario list as a whole. Any of these aborts the run before anything is
/// staged.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScenarioListError {
    #[error("No scenarios to run")]
    Empty,
    #[error("Scenario id [{0}] is used more than once")]
    DuplicateId(String),
    #[error("Scenario id [{0}] is not valid, only ASCII letters, digits, '_' and '-' are allowed")]
    InvalidId(String),
}

/// Check that the scenario ids are non-empty, file name safe and unique.
pub fn validate_scenarios(scenarios: &[ScenarioSpec]) -> Result<(), ScenarioListError> {
    if scenarios.is_empty() {
        return Err(ScenarioListError::Empty);
    }

    let mut seen = HashSet::with_capacity(scenarios.len());
    for scenario in scenarios {
        let id = scenario.id();
        if id.is_empty()
            || !id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ScenarioListError::InvalidId(id.to_string()));
        }

        if !seen.insert(id) {
            return Err(ScenarioListError::DuplicateId(id.to_string()));
        }
    }

    Ok(())
}
