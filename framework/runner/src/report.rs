use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use exofarm_core::prelude::{JobStatus, ScenarioStage};
use exofarm_summary_model::{RecordedError, RunSummary, ScenarioSummary};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::job::Job;

/// The final record for one scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioReport {
    pub id: String,
    pub label: Option<String>,
    pub status: JobStatus,
    pub stage: Option<ScenarioStage>,
    pub artifacts: Vec<String>,
    pub errors: Vec<RecordedError>,
    pub workspace_left: Option<PathBuf>,
    pub config_fingerprint: Option<String>,
}

impl ScenarioReport {
    pub fn succeeded(&self) -> bool {
        self.status.is_success()
    }

    /// Whether an error of the given kind, see [exofarm_core::prelude::ScenarioError::kind], was
    /// recorded.
    pub fn has_error(&self, kind: &str) -> bool {
        self.errors.iter().any(|e| e.kind == kind)
    }
}

impl From<Job> for ScenarioReport {
    fn from(job: Job) -> Self {
        Self {
            id: job.id().to_string(),
            label: job.scenario().label().map(ToString::to_string),
            status: job.status(),
            stage: job.stage(),
            artifacts: job.artifacts().to_vec(),
            errors: job
                .errors()
                .iter()
                .map(|e| RecordedError {
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                })
                .collect(),
            workspace_left: job.workspace_left().cloned(),
            config_fingerprint: job.config_fingerprint().map(ToString::to_string),
        }
    }
}

impl From<ScenarioReport> for ScenarioSummary {
    fn from(report: ScenarioReport) -> Self {
        Self {
            id: report.id,
            label: report.label,
            status: report.status,
            stage: report.stage,
            artifacts: report.artifacts,
            errors: report.errors,
            workspace_left: report.workspace_left,
            config_fingerprint: report.config_fingerprint,
        }
    }
}

/// The outcome of a whole run, one entry per scenario in launch order.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: String,
    pub suite_name: String,
    /// Unix timestamp in seconds.
    pub started_at: i64,
    pub duration: Duration,
    pub scenarios: Vec<ScenarioReport>,
}

impl RunReport {
    pub fn succeeded_count(&self) -> usize {
        self.scenarios.iter().filter(|s| s.succeeded()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.scenarios.len() - self.succeeded_count()
    }

    pub fn scenario(&self, id: &str) -> Option<&ScenarioReport> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    pub fn to_summary(&self, env: HashMap<String, String>) -> RunSummary {
        let mut summary = RunSummary::new(
            self.run_id.clone(),
            self.suite_name.clone(),
            self.started_at,
            env!("CARGO_PKG_VERSION").to_string(),
        );
        summary.set_run_duration(self.duration.as_secs());
        for scenario in &self.scenarios {
            summary.add_scenario(scenario.clone().into());
        }
        for (key, value) in env {
            summary.add_env(key, value);
        }
        summary
    }

    /// Print a table of scenario outcomes to stdout.
    pub fn print_table(&self) {
        println!(
            "\nRun {} of {}: {} succeeded, {} failed in {}s",
            self.run_id,
            self.suite_name,
            self.succeeded_count(),
            self.failed_count(),
            self.duration.as_secs()
        );

        let rows = self.scenarios.iter().map(ScenarioRow::from).collect::<Vec<_>>();
        let mut table = Table::new(&rows);
        table.with(Style::modern());

        println!("{}", table);
    }
}

#[derive(Tabled)]
struct ScenarioRow {
    #[tabled(rename = "Scenario")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Outputs")]
    artifacts: String,
    #[tabled(rename = "Problems")]
    problems: String,
}

impl From<&ScenarioReport> for ScenarioRow {
    fn from(report: &ScenarioReport) -> Self {
        let mut problems = report
            .errors
            .iter()
            .map(|e| e.kind.clone())
            .collect::<Vec<_>>();
        problems.dedup();
        if let Some(path) = &report.workspace_left {
            problems.push(format!("left {}", path.display()));
        }

        Self {
            id: report.id.clone(),
            label: report.label.clone().unwrap_or_default(),
            status: report.status.to_string(),
            artifacts: report.artifacts.join(", "),
            problems: problems.join(", "),
        }
    }
}
