use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use exofarm_core::prelude::{ScenarioError, ScenarioSpec, ScenarioStage};
use exofarm_summary_model::{append_run_summary, config_fingerprint};
use vulcan_cfg_builder::{materialize, MaterializeError};

use crate::bin_path::ensure_dir;
use crate::config::RunnerConfig;
use crate::definition::RunDefinitionBuilder;
use crate::harvester::{harvest, keep_log};
use crate::job::Job;
use crate::launcher::launch;
use crate::progress::RunProgress;
use crate::reaper::reap;
use crate::report::{RunReport, ScenarioReport};
use crate::stager::{stage, Workspace};
use crate::supervisor::supervise;
use crate::types::ExoFarmResult;

/// Environment variables recorded in the run summary when set.
const RECORDED_ENV: [&str; 6] = [
    "EXOFARM_PROJECT_ROOT",
    "EXOFARM_VULCAN_DIR",
    "EXOFARM_CONFIG_DIR",
    "EXOFARM_RESULTS_DIR",
    "EXOFARM_WORK_DIR",
    "EXOFARM_PYTHON",
];

/// Build the definition, run every scenario and report the outcome.
///
/// Returns an error if the run could not be started, or if any scenario failed and failures
/// were not allowed on the command line.
pub fn run(definition: RunDefinitionBuilder) -> ExoFarmResult<()> {
    let definition = definition.build()?;

    log::info!(
        "Running suite: {} ({} scenarios)",
        definition.name,
        definition.scenarios.len()
    );

    let report = run_scenarios(&definition.name, &definition.scenarios, &definition.config)?;

    report.print_table();

    if let Some(path) = &definition.config.run_summary_path {
        let env = RECORDED_ENV
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)))
            .collect::<HashMap<_, _>>();
        let summary = report.to_summary(env);
        log::debug!("Run summary fingerprint: {}", summary.fingerprint());

        // Don't fail the run because the summary couldn't be written, the results are already
        // in place.
        if let Err(e) = append_run_summary(&summary, path.clone()) {
            log::error!(
                "Failed to append run summary to {}: {e:?}",
                path.display()
            );
        }
    }

    let failed = report.failed_count();
    if failed > 0 {
        if definition.allow_failures {
            log::warn!("{failed} scenario(s) failed");
        } else {
            anyhow::bail!("{failed} of {} scenario(s) failed", report.scenarios.len());
        }
    }

    Ok(())
}

/// Run the scenarios with an explicit configuration.
///
/// Every scenario is staged, configured and launched in list order without waiting, then the
/// driver waits for all of them to finish before harvesting and reaping each one. Problems with a
/// single scenario are recorded in its [ScenarioReport] and never stop the others. Only failures
/// that make the whole run impossible are returned as errors, all of them before anything is
/// launched.
pub fn run_scenarios(
    suite_name: &str,
    scenarios: &[ScenarioSpec],
    config: &RunnerConfig,
) -> ExoFarmResult<RunReport> {
    let run_id = nanoid::nanoid!();
    let started_at = chrono::Utc::now().timestamp();
    let start = Instant::now();

    let results_dir = ensure_dir(&config.results_dir).context("Results directory unavailable")?;
    ensure_dir(&config.work_base_dir).context("Work directory unavailable")?;
    let logs_dir = config
        .logs_dir
        .as_deref()
        .map(ensure_dir)
        .transpose()
        .context("Log directory unavailable")?;

    log::info!(
        "Run {run_id}: results will be written to {}",
        results_dir.display()
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create Tokio runtime")?;

    let jobs = runtime.block_on(async {
        let mut jobs = scenarios
            .iter()
            .map(|scenario| prepare_and_launch(scenario, config))
            .collect::<Vec<_>>();

        let launched = jobs.iter().filter(|job| job.is_running()).count() as u64;
        let progress = RunProgress::new(launched, config.show_progress);
        supervise(&mut jobs, config.strategy, &progress).await;
        progress.finish();

        jobs
    });

    let reports = jobs
        .into_iter()
        .map(|mut job| {
            finish(&mut job, &results_dir, logs_dir.as_deref(), config);
            ScenarioReport::from(job)
        })
        .collect();

    Ok(RunReport {
        run_id,
        suite_name: suite_name.to_string(),
        started_at,
        duration: start.elapsed(),
        scenarios: reports,
    })
}

/// Stage, configure and launch one scenario. Must be called from within the runtime.
fn prepare_and_launch(scenario: &ScenarioSpec, config: &RunnerConfig) -> Job {
    let workspace = Workspace::new(config.workspace_path(scenario.id()));
    let mut job = Job::new(scenario.clone(), workspace);

    log::info!("[{}] Preparing {}", job.id(), scenario.display_name());

    match stage(job.workspace(), &config.layout, scenario.id()) {
        Ok(issues) => {
            job.record_all(issues);
            job.advance(ScenarioStage::Staged);
        }
        Err(e) => {
            job.record(e);
            job.fail_without_launch();
            return job;
        }
    }

    if job.launch_prevented() {
        job.fail_without_launch();
        return job;
    }

    let document_path = scenario.resolve_config_path(&config.config_dir);
    match materialize(&document_path, job.workspace().path(), scenario.id()) {
        Ok(materialized) => {
            log::info!(
                "[{}] Configured, output will be {}",
                job.id(),
                materialized.out_name
            );
            job.set_config_fingerprint(config_fingerprint(&materialized.rendered));
            job.advance(ScenarioStage::Configured);
            launch(&mut job, &config.entrypoint, &materialized.path);
        }
        Err(MaterializeError::Document(e)) => {
            job.record(ScenarioError::ConfigValidation(e.to_string()));
            job.fail_without_launch();
        }
        Err(MaterializeError::Write { path, source }) => {
            job.record(ScenarioError::ConfigWrite { path, source });
            job.fail_without_launch();
        }
    }

    job
}

/// Harvest and reap a job once it can no longer be running.
fn finish(
    job: &mut Job,
    results_dir: &Path,
    logs_dir: Option<&Path>,
    config: &RunnerConfig,
) {
    let staged = job.stage().is_some();

    if staged {
        let harvest = harvest(job.workspace(), results_dir, &config.artifact_extension);
        job.add_artifacts(harvest.artifacts);
        job.record_all(harvest.errors);

        if let Some(logs_dir) = logs_dir {
            if job.stage() >= Some(ScenarioStage::Launched) {
                match keep_log(job.workspace(), job.id(), logs_dir) {
                    Ok(path) => log::debug!("[{}] Kept log at {}", job.id(), path.display()),
                    Err(e) => job.record(e),
                }
            }
        }
        job.advance(ScenarioStage::Harvested);
    }

    match reap(job.workspace()) {
        Ok(()) => {
            if staged {
                job.advance(ScenarioStage::Reaped);
            }
        }
        Err(e) => {
            let path = job.workspace().path().to_path_buf();
            job.record(e);
            log::warn!("[{}] Workspace left behind at {}", job.id(), path.display());
            job.set_workspace_left(path);
        }
    }

    log::info!("[{}] Done: {}", job.id(), job.status());
}
