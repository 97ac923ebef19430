use std::path::Path;

use anyhow::Context;
use exofarm_core::prelude::{validate_scenarios, ScenarioSpec};
use serde::Deserialize;

use crate::cli::ExoFarmCli;
use crate::config::RunnerConfig;
use crate::init::init;
use crate::types::ExoFarmResult;

/// The builder for a run definition.
///
/// This must be used at the start of a scenario suite to define the scenarios that you want to
/// run.
pub struct RunDefinitionBuilder {
    /// The name of the suite, which is recorded in the run summary.
    ///
    /// Recommended value is `env!("CARGO_PKG_NAME")`.
    name: String,
    /// This value is initialised for you and you cannot change it.
    #[doc(hidden)]
    cli: ExoFarmCli,
    /// The built-in scenario list. Replaced by the contents of `--scenario-file` if one is given.
    scenarios: Vec<ScenarioSpec>,
}

pub struct RunDefinition {
    pub name: String,
    pub scenarios: Vec<ScenarioSpec>,
    pub config: RunnerConfig,
    pub allow_failures: bool,
}

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    #[serde(default, rename = "scenario")]
    scenarios: Vec<ScenarioSpec>,
}

impl RunDefinitionBuilder {
    /// Initialise logging and parse the command line, then create a new builder.
    pub fn new_with_init(name: &str) -> Self {
        Self::new(name, init())
    }

    /// Create a new builder from an already parsed command line.
    pub fn new(name: &str, cli: ExoFarmCli) -> Self {
        Self {
            name: name.to_string(),
            cli,
            scenarios: Vec::new(),
        }
    }

    /// Add a scenario to the run. Scenarios are launched in the order they are added.
    pub fn with_scenario(mut self, scenario: ScenarioSpec) -> Self {
        self.scenarios.push(scenario);
        self
    }

    pub fn with_scenarios(mut self, scenarios: impl IntoIterator<Item = ScenarioSpec>) -> Self {
        self.scenarios.extend(scenarios);
        self
    }

    /// Resolve the final scenario list and runner configuration.
    ///
    /// Fails if the scenario list ends up empty or has invalid or duplicate ids, if an `--only`
    /// id doesn't match any scenario, or if the simulator interpreter can't be found.
    pub fn build(self) -> ExoFarmResult<RunDefinition> {
        let mut scenarios = match &self.cli.scenario_file {
            Some(path) => load_scenario_file(path)?,
            None => self.scenarios,
        };

        if !self.cli.only.is_empty() {
            if let Some(unknown) = self
                .cli
                .only
                .iter()
                .find(|id| !scenarios.iter().any(|s| s.id() == id.as_str()))
            {
                anyhow::bail!("No scenario with id [{unknown}] to select with --only");
            }
            scenarios.retain(|s| self.cli.only.iter().any(|id| id == s.id()));
        }

        validate_scenarios(&scenarios).context("Invalid scenario list")?;

        let config = RunnerConfig::from_cli(&self.cli)?;

        Ok(RunDefinition {
            name: self.name,
            scenarios,
            config,
            allow_failures: self.cli.allow_failures,
        })
    }
}

fn load_scenario_file(path: &Path) -> ExoFarmResult<Vec<ScenarioSpec>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file '{}'", path.display()))?;
    let file: ScenarioFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse scenario file '{}'", path.display()))?;

    log::info!(
        "Loaded {} scenario(s) from {}",
        file.scenarios.len(),
        path.display()
    );
    Ok(file.scenarios)
}
