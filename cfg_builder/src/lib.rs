//! Build VULCAN configuration files from declarative scenario documents.
//!
//! A scenario document only carries the handful of values that differ between scenarios. It is
//! turned into [Overrides] and rendered over the fixed defaults of [VulcanTemplate]. Rendering
//! with [render] is pure, [materialize] adds loading the document and writing the result into a
//! workspace.
//!
//! ```rust,no_run
//! use std::path::Path;
//! use vulcan_cfg_builder::materialize;
//!
//! let cfg = materialize(
//!     Path::new("planets/earth_sun/input_earth_sun_A1.yml"),
//!     Path::new("temp_run_A1"),
//!     "A1",
//! )
//! .unwrap();
//! println!("{}", cfg.path.display());
//! ```

pub mod document;
mod materialize;
pub mod template;

pub use document::{DocumentError, ScenarioDocument};
pub use materialize::{materialize, MaterializeError, MaterializedConfig, CFG_FILE_NAME};
pub use template::{render, CfgValue, OverrideKey, Overrides, VulcanTemplate};

/// Load a document and render it without writing anything.
pub fn render_document(
    document_path: &std::path::Path,
    scenario_id: &str,
) -> Result<String, DocumentError> {
    let document = ScenarioDocument::load(document_path)?;
    Ok(render(
        &VulcanTemplate::default(),
        &document.overrides(scenario_id),
    ))
}
