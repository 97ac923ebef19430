/// Recommended error type for a scenario suite `main` function. Errors of this type abort the whole
/// run, per-scenario problems are reported through [crate::prelude::ScenarioReport] instead.
pub type ExoFarmResult<T> = anyhow::Result<T>;
