use exofarm_runner::prelude::*;

fn main() -> ExoFarmResult<()> {
    let builder = RunDefinitionBuilder::new_with_init(env!("CARGO_PKG_NAME")).with_scenarios(
        (0..4).map(|i| {
            ScenarioSpec::new(
                format!("Trappist_A{i}"),
                format!("planets/earth_trappist/input_earth_trappist_A{i}.yml"),
            )
        }),
    );

    run(builder)
}
