mod error;
mod job;
mod scenario;

pub mod prelude {
    pub use crate::error::ScenarioError;
    pub use crate::job::{JobStatus, ScenarioStage};
    pub use crate::scenario::{validate_scenarios, ScenarioListError, ScenarioSpec};
}
