use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Displays a spinner while the jobs are running to show the user how many have finished.
///
/// Hidden when progress is disabled, so callers don't need to check before updating it.
pub struct RunProgress {
    pb: ProgressBar,
}

impl RunProgress {
    pub fn new(jobs: u64, enabled: bool) -> Self {
        if !enabled {
            return Self {
                pb: ProgressBar::hidden(),
            };
        }

        let pb = ProgressBar::new(jobs);
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {pos}/{len} simulations finished {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(250));

        Self { pb }
    }

    /// A job has finished, successfully or not.
    pub fn job_finished(&self, scenario_id: &str) {
        self.pb.inc(1);
        self.pb.set_message(format!("(last: {scenario_id})"));
    }

    pub fn finished(&self) -> u64 {
        self.pb.position()
    }

    pub fn finish(&self) {
        log::trace!("Progress display shutting down");
        self.pb.finish_and_clear();
    }
}
