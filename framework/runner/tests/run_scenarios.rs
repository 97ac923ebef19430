#![cfg(unix)]

mod common;

use std::fs;
use std::time::{Duration, Instant};

use common::Project;
use exofarm_runner::prelude::{
    run_scenarios, Entrypoint, JobStatus, ScenarioSpec, ScenarioStage, SupervisionStrategy,
};
use pretty_assertions::assert_eq;

#[test]
fn single_scenario_is_harvested_and_reaped() {
    let project = Project::new();
    let scenarios = vec![ScenarioSpec::new(
        "A1",
        project.document("input_earth_sun_A1.yml", None),
    )];

    let report = run_scenarios("earth_sun", &scenarios, &project.config()).unwrap();

    let a1 = report.scenario("A1").unwrap();
    assert_eq!(JobStatus::Succeeded, a1.status, "{:?}", a1.errors);
    assert_eq!(Some(ScenarioStage::Reaped), a1.stage);
    assert_eq!(vec!["out_A1.vul".to_string()], a1.artifacts);
    assert!(a1.errors.is_empty(), "{:?}", a1.errors);
    assert!(a1.config_fingerprint.is_some());
    assert_eq!(Some("out_A1.vul\n".to_string()), project.result("out_A1.vul"));
    assert!(!project.workspace("A1").exists());
    assert_eq!(0, report.failed_count());
}

#[test]
fn scenario_without_output_does_not_affect_the_others() {
    let project = Project::new();
    let scenarios = vec![
        ScenarioSpec::new("A0", project.document("a0.yml", None)),
        ScenarioSpec::new("A1", project.document("a1.yml", Some("noout_A1.vul"))),
        ScenarioSpec::new("A2", project.document("a2.yml", None)),
        ScenarioSpec::new("A3", project.document("a3.yml", None)),
    ];

    let report = run_scenarios("earth_sun", &scenarios, &project.config()).unwrap();

    for id in ["A0", "A2", "A3"] {
        let name = format!("out_{id}.vul");
        assert_eq!(Some(format!("{name}\n")), project.result(&name));
        assert_eq!(vec![name], report.scenario(id).unwrap().artifacts);
    }

    let a1 = report.scenario("A1").unwrap();
    assert_eq!(JobStatus::Succeeded, a1.status);
    assert!(a1.artifacts.is_empty());
    assert!(a1.has_error("harvest_warning"));

    for id in ["A0", "A1", "A2", "A3"] {
        assert!(!project.workspace(id).exists(), "workspace for {id} left");
    }
    assert_eq!(
        vec!["A0", "A1", "A2", "A3"],
        report
            .scenarios
            .iter()
            .map(|s| s.id.as_str())
            .collect::<Vec<_>>()
    );
}

#[test]
fn failed_simulation_is_still_harvested_and_reaped() {
    let project = Project::new();
    let scenarios = vec![
        ScenarioSpec::new("A0", project.document("a0.yml", None)),
        ScenarioSpec::new("A1", project.document("a1.yml", Some("fail_A1.vul"))),
    ];

    let report = run_scenarios("earth_sun", &scenarios, &project.config()).unwrap();

    let a1 = report.scenario("A1").unwrap();
    assert_eq!(JobStatus::Failed { exit_code: Some(3) }, a1.status);
    assert_eq!(Some(ScenarioStage::Reaped), a1.stage);
    assert!(a1.has_error("job_execution_failure"));
    assert!(a1.has_error("harvest_warning"));
    assert!(!project.workspace("A1").exists());

    assert_eq!(JobStatus::Succeeded, report.scenario("A0").unwrap().status);
    assert_eq!(1, report.failed_count());
}

#[test]
fn rerun_replaces_previous_results() {
    let project = Project::new();
    let scenarios = vec![ScenarioSpec::new("A1", project.document("a1.yml", None))];

    fs::create_dir_all(project.results_dir()).unwrap();
    fs::write(project.results_dir().join("out_A1.vul"), "stale").unwrap();
    // Left over from an interrupted run
    let stale_output = project.workspace("A1").join("output");
    fs::create_dir_all(&stale_output).unwrap();
    fs::write(stale_output.join("old_A1.vul"), "stale").unwrap();

    let report = run_scenarios("earth_sun", &scenarios, &project.config()).unwrap();

    assert_eq!(Some("out_A1.vul\n".to_string()), project.result("out_A1.vul"));
    assert_eq!(None, project.result("old_A1.vul"));
    assert_eq!(
        vec!["out_A1.vul".to_string()],
        report.scenario("A1").unwrap().artifacts
    );

    let again = run_scenarios("earth_sun", &scenarios, &project.config()).unwrap();
    assert_eq!(0, again.failed_count());
    assert_eq!(Some("out_A1.vul\n".to_string()), project.result("out_A1.vul"));
    assert_ne!(report.run_id, again.run_id);
}

#[test]
fn invalid_document_skips_launch_only_for_that_scenario() {
    let project = Project::new();
    let scenarios = vec![
        ScenarioSpec::new("A0", project.broken_document("a0.yml")),
        ScenarioSpec::new("A1", project.document("a1.yml", None)),
        ScenarioSpec::new("A2", "planets/does_not_exist.yml"),
    ];

    let report = run_scenarios("earth_sun", &scenarios, &project.config()).unwrap();

    for id in ["A0", "A2"] {
        let scenario = report.scenario(id).unwrap();
        assert_eq!(JobStatus::Failed { exit_code: None }, scenario.status);
        assert!(scenario.has_error("config_validation_error"));
        assert!(!scenario.has_error("job_execution_failure"));
        assert_eq!(Some(ScenarioStage::Reaped), scenario.stage);
        assert!(scenario.config_fingerprint.is_none());
        assert!(!project.workspace(id).exists());
    }

    assert_eq!(JobStatus::Succeeded, report.scenario("A1").unwrap().status);
    assert!(project.result("out_A1.vul").is_some());
}

#[test]
fn missing_critical_file_is_reported_and_the_job_still_runs() {
    let project = Project::new();
    fs::remove_file(project.vulcan_dir().join("op.py")).unwrap();
    let scenarios = vec![ScenarioSpec::new("A1", project.document("a1.yml", None))];

    let report = run_scenarios("earth_sun", &scenarios, &project.config()).unwrap();

    let a1 = report.scenario("A1").unwrap();
    assert!(a1.has_error("critical_resource_missing"));
    // The fake simulator refuses to run without op.py
    assert_eq!(JobStatus::Failed { exit_code: Some(4) }, a1.status);
    assert!(!project.workspace("A1").exists());
}

#[test]
fn jobs_run_concurrently() {
    let project = Project::new();
    let scenarios = (0..4)
        .map(|i| {
            ScenarioSpec::new(
                format!("A{i}"),
                project.document(&format!("a{i}.yml"), Some(&format!("slow_A{i}.vul"))),
            )
        })
        .collect::<Vec<_>>();

    let start = Instant::now();
    let report = run_scenarios("earth_sun", &scenarios, &project.config()).unwrap();
    let elapsed = start.elapsed();

    assert_eq!(0, report.failed_count());
    assert!(
        elapsed < Duration::from_secs(3),
        "four one second jobs took {elapsed:?}"
    );
    for i in 0..4 {
        assert!(project.result(&format!("slow_A{i}.vul")).is_some());
    }
}

#[test]
fn sequential_strategy_waits_for_every_job() {
    let project = Project::new();
    let scenarios = vec![
        ScenarioSpec::new("A0", project.document("a0.yml", Some("slow_A0.vul"))),
        ScenarioSpec::new("A1", project.document("a1.yml", None)),
    ];
    let mut config = project.config();
    config.strategy = SupervisionStrategy::Sequential;

    let report = run_scenarios("earth_sun", &scenarios, &config).unwrap();

    assert_eq!(0, report.failed_count());
    assert!(project.result("slow_A0.vul").is_some());
    assert!(project.result("out_A1.vul").is_some());
}

#[test]
fn logs_are_kept_when_asked() {
    let project = Project::new();
    let scenarios = vec![ScenarioSpec::new("A1", project.document("a1.yml", None))];
    let mut config = project.config();
    let logs = project.path().join("logs");
    config.logs_dir = Some(logs.clone());

    run_scenarios("earth_sun", &scenarios, &config).unwrap();

    let log = fs::read_to_string(logs.join("A1.log")).unwrap();
    assert!(log.contains("fake vulcan running with"), "{log}");
    assert!(log.contains("vulcan_cfg.py"), "{log}");
}

#[test]
fn launch_failure_is_harvested_and_reaped() {
    let project = Project::new();
    let scenarios = vec![ScenarioSpec::new("A1", project.document("a1.yml", None))];
    let mut config = project.config();
    config.entrypoint = Entrypoint::new(project.path().join("no_such_python"));

    let report = run_scenarios("earth_sun", &scenarios, &config).unwrap();

    let a1 = report.scenario("A1").unwrap();
    assert_eq!(JobStatus::Failed { exit_code: None }, a1.status);
    assert!(a1.has_error("launch_error"), "{:?}", a1.errors);
    assert!(a1.has_error("harvest_warning"));
    assert!(!a1.has_error("job_execution_failure"));
    assert_eq!(Some(ScenarioStage::Reaped), a1.stage);
    assert!(a1.config_fingerprint.is_some());
    assert_eq!(None, a1.workspace_left);
    assert!(!project.workspace("A1").exists());
}

#[test]
fn workspace_that_cannot_be_removed_is_left_and_reported() {
    let project = Project::new();
    let scenarios = vec![
        ScenarioSpec::new("A0", project.document("a0.yml", None)),
        ScenarioSpec::new("A1", project.document("a1.yml", Some("vanish_A1.vul"))),
    ];

    let report = run_scenarios("earth_sun", &scenarios, &project.config()).unwrap();

    let a1 = report.scenario("A1").unwrap();
    assert_eq!(JobStatus::Succeeded, a1.status);
    assert!(a1.has_error("cleanup_error"), "{:?}", a1.errors);
    assert!(a1.has_error("harvest_warning"));
    assert_eq!(Some(ScenarioStage::Harvested), a1.stage);
    assert_eq!(Some(project.workspace("A1")), a1.workspace_left);
    assert!(project.workspace("A1").is_file());

    let a0 = report.scenario("A0").unwrap();
    assert_eq!(JobStatus::Succeeded, a0.status);
    assert_eq!(Some(ScenarioStage::Reaped), a0.stage);
    assert_eq!(None, a0.workspace_left);
}

#[test]
fn workspace_that_cannot_be_created_skips_only_that_scenario() {
    let project = Project::new();
    let scenarios = vec![
        ScenarioSpec::new("A0", project.document("a0.yml", None)),
        ScenarioSpec::new("A1", project.document("a1.yml", None)),
    ];
    // A regular file where the workspace directory should go
    fs::write(project.workspace("A1"), "not a directory").unwrap();

    let report = run_scenarios("earth_sun", &scenarios, &project.config()).unwrap();

    let a1 = report.scenario("A1").unwrap();
    assert_eq!(JobStatus::Failed { exit_code: None }, a1.status);
    assert!(a1.has_error("workspace_error"), "{:?}", a1.errors);
    assert!(!a1.has_error("config_validation_error"));
    assert!(!a1.has_error("job_execution_failure"));
    assert_eq!(None, a1.stage);
    assert!(a1.config_fingerprint.is_none());
    assert_eq!(None, project.result("out_A1.vul"));
    // Nothing clears the file, so it is reported as left behind
    assert!(a1.has_error("cleanup_error"));
    assert_eq!(Some(project.workspace("A1")), a1.workspace_left);

    assert_eq!(JobStatus::Succeeded, report.scenario("A0").unwrap().status);
    assert_eq!(
        Some("out_A0.vul\n".to_string()),
        project.result("out_A0.vul")
    );
    assert_eq!(1, report.failed_count());
}
