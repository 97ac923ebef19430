#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use exofarm_runner::prelude::{
    Entrypoint, ExoFarmCli, RunnerConfig, StagingLayout, StrategyOpt, SupervisionStrategy,
};
use tempfile::TempDir;

/// Stands in for VULCAN. Reads the output name from the configuration it is given and writes
/// that file, unless the name asks for something else:
/// - `noout_*` exits successfully without writing anything
/// - `fail_*` exits with code 3
/// - `slow_*` sleeps for a second first
/// - `vanish_*` replaces its own workspace with a regular file and exits successfully
const FAKE_VULCAN: &str = r#"#!/bin/sh
cfg="$1"
echo "fake vulcan running with $cfg"
test -f op.py || { echo "op.py missing" >&2; exit 4; }
test -f boundary_conditions/BC_bot_Earth.txt || { echo "no boundary conditions" >&2; exit 4; }
out=$(sed -n "s/^out_name = '\([^']*\)'.*/\1/p" "$cfg")
case "$out" in
  noout_*) echo "converged but nothing saved"; exit 0 ;;
  fail_*) echo "integration diverged" >&2; exit 3 ;;
  slow_*) sleep 1 ;;
  vanish_*) ws=$(pwd); cd ..; rm -rf "$ws"; echo "gone" > "$ws"; exit 0 ;;
esac
echo "$out" > "output/$out"
"#;

pub struct Project {
    pub root: TempDir,
}

impl Project {
    /// A project with the standard layout below a temporary directory.
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("failed to create temp dir");
        let project = Self { root };

        let vulcan = project.vulcan_dir();
        for dir in ["thermo", "atm", "fastchem_vulcan"] {
            fs::create_dir_all(vulcan.join(dir)).unwrap();
        }
        fs::write(vulcan.join("vulcan.py"), FAKE_VULCAN).unwrap();
        fs::write(vulcan.join("op.py"), "# solver\n").unwrap();
        fs::write(vulcan.join("store.py"), "# store\n").unwrap();
        fs::write(vulcan.join("thermo").join("SNCHO_photo_network.txt"), "R1\n").unwrap();
        fs::write(vulcan.join("atm").join("BC_top.txt"), "top\n").unwrap();

        let bc = project.config_dir().join("Boundary_Conditions");
        fs::create_dir_all(&bc).unwrap();
        fs::write(bc.join("BC_bot_Earth.txt"), "bot\n").unwrap();

        project
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn vulcan_dir(&self) -> PathBuf {
        self.path().join("VULCAN")
    }

    pub fn config_dir(&self) -> PathBuf {
        self.path().join("ExoFarm_Research").join("Config")
    }

    pub fn results_dir(&self) -> PathBuf {
        self.path()
            .join("ExoFarm_Research")
            .join("Results")
            .join("Outputs")
    }

    pub fn work_dir(&self) -> PathBuf {
        self.path().join("ExoFarm_Research")
    }

    pub fn workspace(&self, id: &str) -> PathBuf {
        self.work_dir().join(format!("temp_run_{id}"))
    }

    /// Write a scenario document below the config directory and return its relative path.
    pub fn document(&self, name: &str, out_name: Option<&str>) -> PathBuf {
        let relative = PathBuf::from("planets").join(name);
        let path = self.config_dir().join(&relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, document_yaml(out_name)).unwrap();
        relative
    }

    /// A document that fails validation.
    pub fn broken_document(&self, name: &str) -> PathBuf {
        let relative = PathBuf::from("planets").join(name);
        let path = self.config_dir().join(&relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let yaml =
            document_yaml(None).replace("  network: thermo/SNCHO_photo_network.txt\n", "");
        fs::write(&path, yaml).unwrap();
        relative
    }

    /// Configuration that runs the fake simulator the way VULCAN is run.
    pub fn config(&self) -> RunnerConfig {
        let mut config = RunnerConfig::new(
            StagingLayout::vulcan(self.vulcan_dir())
                .with_boundary_conditions(self.config_dir().join("Boundary_Conditions")),
            self.config_dir(),
            self.work_dir(),
            self.results_dir(),
            Entrypoint::new("sh").arg("-u").arg("vulcan.py"),
        );
        config.strategy = SupervisionStrategy::Poll {
            interval: Duration::from_millis(50),
        };
        config
    }

    pub fn cli(&self) -> ExoFarmCli {
        ExoFarmCli {
            project_root: self.path().to_path_buf(),
            vulcan_dir: None,
            config_dir: None,
            boundary_conditions_dir: None,
            results_dir: None,
            work_dir: None,
            keep_logs: None,
            python: "sh".to_string(),
            entrypoint: "vulcan.py".to_string(),
            strategy: StrategyOpt::Sequential,
            poll_interval: 1,
            only: vec![],
            scenario_file: None,
            run_summary: self.path().join("run_summary.jsonl"),
            allow_failures: false,
            no_progress: true,
        }
    }

    pub fn result(&self, name: &str) -> Option<String> {
        fs::read_to_string(self.results_dir().join(name)).ok()
    }
}

fn document_yaml(out_name: Option<&str>) -> String {
    let out_name = out_name
        .map(|name| format!("  out_name: {name}\n"))
        .unwrap_or_default();

    format!(
        r#"chemistry:
  network: thermo/SNCHO_photo_network.txt
  bot_BC_flux_file: boundary_conditions/BC_bot_Earth.txt
{out_name}  use_photo: true
  use_botflux: true
atmosphere:
  atm_file: atm/atm_Earth_Jan_Kzz.txt
  const_mix:
    N2: 0.78
    O2: 0.20
  nz: 100
  P_b: 1.0e6
  P_t: 0.05
  atm_type: file
  Kzz_prof: file
star:
  sflux_file: atm/stellar_flux/Gueymard_solar.txt
  r_star: 1.0
planet:
  Rp: 6.371e8
  gs: 980.0
  orbit_radius: 1.0
  sl_angle: 58.0
  f_diurnal: 0.5
  rocky: true
"#
    )
}
