use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use vulcan_cfg_builder::render_document;

/// Render a scenario document to a VULCAN configuration file.
///
/// For example: `cargo run --bin vcb -- planets/earth_sun/input_earth_sun_A1.yml --id A1`
#[derive(Parser)]
#[command(about, long_about = None)]
struct Cli {
    /// Path to the YAML scenario document
    document: PathBuf,

    /// Scenario id, used to name the output file when the document does not set `out_name`
    #[arg(long)]
    id: String,

    /// Write to this file instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let rendered = render_document(&cli.document, &cli.id)
        .with_context(|| format!("Failed to render {}", cli.document.display()))?;

    match cli.output {
        Some(output) => {
            std::fs::write(&output, rendered)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            log::info!("Wrote {}", output.display());
        }
        None => print!("{rendered}"),
    }

    Ok(())
}
