use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Status of a simulation job.
///
/// A job is [JobStatus::Pending] until its process has been started and only moves to one of
/// the terminal states once the process has been observed to exit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Pending,
    Running,
    Succeeded,
    /// The exit code is `None` if the process was killed by a signal or was never started.
    Failed { exit_code: Option<i32> },
}

impl JobStatus {
    /// Map a process exit to a terminal status.
    pub fn from_exit_code(exit_code: Option<i32>) -> Self {
        match exit_code {
            Some(0) => JobStatus::Succeeded,
            exit_code => JobStatus::Failed { exit_code },
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Succeeded | JobStatus::Failed { .. })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Succeeded)
    }
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Succeeded => write!(f, "succeeded"),
            JobStatus::Failed {
                exit_code: Some(code),
            } => write!(f, "failed (exit code {code})"),
            JobStatus::Failed { exit_code: None } => write!(f, "failed"),
        }
    }
}

/// The lifecycle of a single scenario. Stages are always entered in this order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStage {
    #[display("staged")]
    Staged,
    #[display("configured")]
    Configured,
    #[display("launched")]
    Launched,
    #[display("terminated")]
    Terminated,
    #[display("harvested")]
    Harvested,
    #[display("reaped")]
    Reaped,
}
