//! Waits for every launched simulator process to exit.

use std::time::Duration;

use crate::job::Job;
use crate::progress::RunProgress;

/// How the supervisor waits for the running jobs.
///
/// Both strategies return only once every launched job has exited. [SupervisionStrategy::Poll]
/// records exits as they happen, so the progress display and the log reflect completion order.
/// [SupervisionStrategy::Sequential] records them in launch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisionStrategy {
    /// Wait on each job in launch order.
    Sequential,
    /// Check every running job, then sleep for `interval` before checking again.
    Poll { interval: Duration },
}

impl Default for SupervisionStrategy {
    fn default() -> Self {
        SupervisionStrategy::Poll {
            interval: Duration::from_secs(5),
        }
    }
}

/// Block until every launched job has terminated, recording each exit status.
///
/// Jobs that were never launched are skipped. There is no timeout, a simulator that never exits
/// keeps the supervisor waiting.
pub async fn supervise(jobs: &mut [Job], strategy: SupervisionStrategy, progress: &RunProgress) {
    let running = jobs.iter().filter(|job| job.is_running()).count();
    log::info!("Waiting for {running} simulation(s) to finish");

    match strategy {
        SupervisionStrategy::Sequential => wait_in_order(jobs, progress).await,
        SupervisionStrategy::Poll { interval } => poll_until_done(jobs, interval, progress).await,
    }

    log::info!("{} simulation(s) have finished", progress.finished());
}

async fn wait_in_order(jobs: &mut [Job], progress: &RunProgress) {
    for job in jobs.iter_mut() {
        let Some(child) = job.child_mut() else {
            continue;
        };

        let waited = child.wait().await;
        let exit_code = match waited {
            Ok(status) => status.code(),
            Err(e) => {
                log::error!("[{}] Failed to wait for simulator: {e}", job.id());
                None
            }
        };
        job.terminate(exit_code);
        progress.job_finished(job.id());
    }
}

async fn poll_until_done(jobs: &mut [Job], interval: Duration, progress: &RunProgress) {
    loop {
        let mut still_running = 0;

        for job in jobs.iter_mut() {
            let Some(child) = job.child_mut() else {
                continue;
            };

            match child.try_wait() {
                Ok(Some(status)) => {
                    job.terminate(status.code());
                    progress.job_finished(job.id());
                }
                Ok(None) => still_running += 1,
                Err(e) => {
                    log::error!("[{}] Failed to check simulator status: {e}", job.id());
                    job.terminate(None);
                    progress.job_finished(job.id());
                }
            }
        }

        if still_running == 0 {
            break;
        }

        log::debug!("{still_running} simulation(s) still running");
        tokio::time::sleep(interval).await;
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::process::Stdio;

    use exofarm_core::prelude::{JobStatus, ScenarioSpec};
    use tokio::process::Command;

    use super::*;
    use crate::stager::Workspace;

    fn running_job(id: &str, script: &str) -> Job {
        let dir = tempfile::tempdir().unwrap();
        let log = tempfile::tempfile().unwrap();
        let child = Command::new("sh")
            .arg("-c")
            .arg(script)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .spawn()
            .unwrap();

        let mut job = Job::new(ScenarioSpec::new(id, "doc.yml"), Workspace::new(dir.path()));
        job.set_running(child, log);
        job
    }

    #[tokio::test]
    async fn sequential_records_every_exit() {
        let mut jobs = vec![
            running_job("A0", "exit 0"),
            running_job("A1", "exit 3"),
            Job::new(ScenarioSpec::new("A2", "doc.yml"), Workspace::new("/tmp/x")),
        ];
        let progress = RunProgress::new(2, false);

        supervise(&mut jobs, SupervisionStrategy::Sequential, &progress).await;

        assert_eq!(JobStatus::Succeeded, jobs[0].status());
        assert_eq!(JobStatus::Failed { exit_code: Some(3) }, jobs[1].status());
        assert_eq!(JobStatus::Pending, jobs[2].status());
        assert!(jobs.iter().all(|job| !job.is_running()));
        assert_eq!(2, progress.finished());
    }

    #[tokio::test]
    async fn polling_waits_for_slow_jobs() {
        let mut jobs = vec![
            running_job("A0", "sleep 1; exit 0"),
            running_job("A1", "exit 0"),
        ];
        let progress = RunProgress::new(2, false);

        supervise(
            &mut jobs,
            SupervisionStrategy::Poll {
                interval: Duration::from_millis(50),
            },
            &progress,
        )
        .await;

        assert!(jobs.iter().all(|job| job.status() == JobStatus::Succeeded));
        assert_eq!(2, progress.finished());
    }
}
