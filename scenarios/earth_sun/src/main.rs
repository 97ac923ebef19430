use exofarm_runner::prelude::*;

/// Agricultural intensity on an Earth-like planet around the Sun, from before agriculture to an
/// extreme future.
fn scenarios() -> Vec<ScenarioSpec> {
    [
        ("A0", "Pre-Agri"),
        ("A1", "Current"),
        ("A2", "Moderate"),
        ("A3", "Extreme"),
    ]
    .into_iter()
    .map(|(id, label)| {
        ScenarioSpec::new(id, format!("planets/earth_sun/input_earth_sun_{id}.yml"))
            .with_label(label)
    })
    .collect()
}

fn main() -> ExoFarmResult<()> {
    let builder =
        RunDefinitionBuilder::new_with_init(env!("CARGO_PKG_NAME")).with_scenarios(scenarios());

    run(builder)
}
