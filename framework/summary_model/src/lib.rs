use exofarm_core::prelude::{JobStatus, ScenarioStage};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use sha3::Digest;
use std::collections::HashMap;
use std::io::{BufRead, Read, Write};
use std::path::PathBuf;

/// Summary of a run of a scenario suite
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    /// The unique run id
    ///
    /// Chosen by the runner. Unique for each run.
    pub run_id: String,
    /// The name of the suite that was run, normally the name of the scenarios binary
    pub suite_name: String,
    /// The time the run started
    ///
    /// This is a Unix timestamp in seconds.
    pub started_at: i64,
    /// Wall-clock duration of the whole run, in seconds
    ///
    /// Covers staging through to the last reap. Since the jobs run concurrently this should be
    /// close to the duration of the slowest job.
    pub run_duration: Option<u64>,
    /// The outcome of every scenario in the run, in launch order
    pub scenarios: Vec<ScenarioSummary>,
    /// Environment variables set for the run
    ///
    /// This won't capture all environment variables. Just the ones that the runner is aware of.
    pub env: HashMap<String, String>,
    /// The version of the runner that was used for this run
    pub exofarm_version: String,
}

/// The outcome of one scenario within a run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioSummary {
    pub id: String,
    pub label: Option<String>,
    /// The final recorded job status
    #[serde(flatten)]
    pub status: JobStatus,
    /// The furthest stage the scenario reached
    pub stage: Option<ScenarioStage>,
    /// File names of the artifacts moved into the results directory
    pub artifacts: Vec<String>,
    /// Every error recorded for this scenario, fatal or not
    pub errors: Vec<RecordedError>,
    /// Set if the workspace could not be removed
    pub workspace_left: Option<PathBuf>,
    /// Fingerprint of the rendered configuration, see [config_fingerprint]
    pub config_fingerprint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordedError {
    pub kind: String,
    pub message: String,
}

impl RunSummary {
    /// Create a new run summary
    pub fn new(
        run_id: String,
        suite_name: String,
        started_at: i64,
        exofarm_version: String,
    ) -> Self {
        Self {
            run_id,
            suite_name,
            started_at,
            run_duration: None,
            scenarios: Vec::new(),
            env: HashMap::with_capacity(0),
            exofarm_version,
        }
    }

    /// Set the run duration
    pub fn set_run_duration(&mut self, run_duration: u64) {
        self.run_duration = Some(run_duration);
    }

    /// Add the outcome of a scenario
    pub fn add_scenario(&mut self, scenario: ScenarioSummary) {
        self.scenarios.push(scenario);
    }

    /// Add an environment variable
    pub fn add_env(&mut self, key: String, value: String) {
        self.env.insert(key, value);
    }

    /// Number of scenarios whose job succeeded
    pub fn succeeded_count(&self) -> usize {
        self.scenarios
            .iter()
            .filter(|s| s.status.is_success())
            .count()
    }

    /// Compute a fingerprint for this run summary
    ///
    /// The fingerprint is intended to identify the configuration used for the run, so two runs
    /// of the same suite with the same rendered configurations share a fingerprint. It uses the
    ///     - Suite name
    ///     - Scenario ids and their configuration fingerprints
    ///     - Selected environment variables
    ///     - Runner version
    ///
    /// The fingerprint is computed using [sha3::Sha3_256].
    pub fn fingerprint(&self) -> String {
        let mut hasher = sha3::Sha3_256::new();
        Digest::update(&mut hasher, self.suite_name.as_bytes());
        self.scenarios
            .iter()
            .sorted_by_key(|s| s.id.as_str())
            .for_each(|s| {
                Digest::update(&mut hasher, s.id.as_bytes());
                if let Some(fingerprint) = &s.config_fingerprint {
                    Digest::update(&mut hasher, fingerprint.as_bytes());
                }
            });
        self.env
            .iter()
            .sorted_by_key(|(k, _)| k.to_owned())
            .for_each(|(k, v)| {
                Digest::update(&mut hasher, k.as_bytes());
                Digest::update(&mut hasher, v.as_bytes());
            });
        Digest::update(&mut hasher, self.exofarm_version.as_bytes());

        format!("{:x}", hasher.finalize())
    }
}

/// Fingerprint a rendered configuration artifact with [sha3::Sha3_256].
pub fn config_fingerprint(rendered: &str) -> String {
    let mut hasher = sha3::Sha3_256::new();
    Digest::update(&mut hasher, rendered.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Append the run summary to a file
///
/// The summary will be serialized to JSON and output as a single line followed by a newline. The
/// recommended file extension is `.jsonl`.
pub fn append_run_summary(run_summary: &RunSummary, path: PathBuf) -> anyhow::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)?;
    store_run_summary(run_summary, &mut file)?;
    let _ = file.write("\n".as_bytes())?;
    Ok(())
}

/// Serialize the run summary to a writer
pub fn store_run_summary<W: Write>(
    run_summary: &RunSummary,
    writer: &mut W,
) -> anyhow::Result<()> {
    serde_json::to_writer(writer, run_summary)?;
    Ok(())
}

/// Load a run summary from a reader
pub fn load_run_summary<R: Read>(reader: R) -> anyhow::Result<RunSummary> {
    let reader = std::io::BufReader::new(reader);
    let run_summary: RunSummary = serde_json::from_reader(reader)?;
    Ok(run_summary)
}

/// Load run summaries from a file
///
/// The file should contain one JSON object per line. This is the format produced by
/// [append_run_summary].
pub fn load_summary_runs(path: PathBuf) -> anyhow::Result<Vec<RunSummary>> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let mut runs = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let run: RunSummary = serde_json::from_str(&line)?;
        runs.push(run);
    }
    Ok(runs)
}
