//! The declarative scenario document.
//!
//! A document describes the physical and numerical parameters of one scenario. It is written in
//! YAML, for example:
//!
//! ```yaml
//! chemistry:
//!   network: thermo/SNCHO_photo_network.txt
//!   bot_BC_flux_file: boundary_conditions/BC_bot_Earth_A1.txt
//!   use_photo: true
//!   use_botflux: true
//! atmosphere:
//!   atm_file: atm/atm_Earth_Jan_Kzz.txt
//!   const_mix: { N2: 0.78, O2: 0.20, CO2: 0.0004 }
//!   nz: 100
//!   P_b: 1.0e6
//!   P_t: 0.05
//!   atm_type: file
//!   Kzz_prof: file
//! star:
//!   sflux_file: atm/stellar_flux/Gueymard_solar.txt
//!   r_star: 1.0
//! planet:
//!   Rp: 6.371e8
//!   gs: 980.0
//!   orbit_radius: 1.0
//!   sl_angle: 58.0
//!   f_diurnal: 0.5
//!   rocky: true
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::template::{CfgValue, OverrideKey, Overrides};

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScenarioDocument {
    pub chemistry: Chemistry,
    pub atmosphere: Atmosphere,
    pub star: Star,
    pub planet: Planet,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Chemistry {
    pub network: String,
    #[serde(rename = "bot_BC_flux_file")]
    pub bot_bc_flux_file: String,
    #[serde(default, rename = "top_BC_flux_file")]
    pub top_bc_flux_file: Option<String>,
    /// Defaults to `out_<scenario id>.vul`.
    #[serde(default)]
    pub out_name: Option<String>,
    pub use_photo: bool,
    pub use_botflux: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Atmosphere {
    pub atm_file: String,
    pub const_mix: BTreeMap<String, f64>,
    pub nz: u32,
    #[serde(rename = "P_b")]
    pub p_bottom: f64,
    #[serde(rename = "P_t")]
    pub p_top: f64,
    pub atm_type: String,
    #[serde(rename = "Kzz_prof")]
    pub kzz_prof: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Star {
    pub sflux_file: String,
    pub r_star: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Planet {
    #[serde(rename = "Rp")]
    pub rp: f64,
    pub gs: f64,
    pub orbit_radius: f64,
    /// Stellar zenith angle in degrees.
    pub sl_angle: f64,
    pub f_diurnal: f64,
    pub rocky: bool,
}

const DEFAULT_TOP_BC_FLUX_FILE: &str = "atm/BC_top.txt";

impl ScenarioDocument {
    /// Read, parse and validate a document.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let document: Self =
            serde_yaml::from_str(&content).map_err(|source| DocumentError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        document.validate()?;

        Ok(document)
    }

    pub fn validate(&self) -> Result<(), DocumentError> {
        non_empty("chemistry.network", &self.chemistry.network)?;
        non_empty("chemistry.bot_BC_flux_file", &self.chemistry.bot_bc_flux_file)?;
        if let Some(top) = &self.chemistry.top_bc_flux_file {
            non_empty("chemistry.top_BC_flux_file", top)?;
        }
        if let Some(out_name) = &self.chemistry.out_name {
            if !out_name.ends_with(".vul") || out_name.contains(['/', '\\']) {
                return Err(invalid(
                    "chemistry.out_name",
                    format!("expected a file name ending in .vul, got '{out_name}'"),
                ));
            }
        }

        non_empty("atmosphere.atm_file", &self.atmosphere.atm_file)?;
        non_empty("atmosphere.atm_type", &self.atmosphere.atm_type)?;
        non_empty("atmosphere.Kzz_prof", &self.atmosphere.kzz_prof)?;
        if self.atmosphere.nz == 0 {
            return Err(invalid("atmosphere.nz", "must be at least 1".to_string()));
        }
        positive("atmosphere.P_t", self.atmosphere.p_top)?;
        positive("atmosphere.P_b", self.atmosphere.p_bottom)?;
        if self.atmosphere.p_bottom <= self.atmosphere.p_top {
            return Err(invalid(
                "atmosphere.P_b",
                format!(
                    "bottom pressure {} must be greater than top pressure {}",
                    self.atmosphere.p_bottom, self.atmosphere.p_top
                ),
            ));
        }
        for (species, ratio) in &self.atmosphere.const_mix {
            if !ratio.is_finite() || *ratio < 0.0 {
                return Err(invalid(
                    "atmosphere.const_mix",
                    format!("mixing ratio for {species} must be a non-negative number"),
                ));
            }
        }

        non_empty("star.sflux_file", &self.star.sflux_file)?;
        positive("star.r_star", self.star.r_star)?;

        positive("planet.Rp", self.planet.rp)?;
        positive("planet.gs", self.planet.gs)?;
        positive("planet.orbit_radius", self.planet.orbit_radius)?;
        if !self.planet.sl_angle.is_finite() {
            return Err(invalid("planet.sl_angle", "must be a number".to_string()));
        }
        if !(self.planet.f_diurnal > 0.0 && self.planet.f_diurnal <= 1.0) {
            return Err(invalid(
                "planet.f_diurnal",
                format!("must be in (0, 1], got {}", self.planet.f_diurnal),
            ));
        }

        Ok(())
    }

    /// The output file name VULCAN will write for this scenario.
    pub fn out_name(&self, scenario_id: &str) -> String {
        self.chemistry
            .out_name
            .clone()
            .unwrap_or_else(|| format!("out_{scenario_id}.vul"))
    }

    /// Convert the document into template overrides.
    pub fn overrides(&self, scenario_id: &str) -> Overrides {
        let top_bc = self
            .chemistry
            .top_bc_flux_file
            .clone()
            .unwrap_or_else(|| DEFAULT_TOP_BC_FLUX_FILE.to_string());

        Overrides::from([
            (OverrideKey::Network, CfgValue::Str(self.chemistry.network.clone())),
            (OverrideKey::AtmFile, CfgValue::Str(self.atmosphere.atm_file.clone())),
            (OverrideKey::SfluxFile, CfgValue::Str(self.star.sflux_file.clone())),
            (OverrideKey::TopBcFluxFile, CfgValue::Str(top_bc)),
            (
                OverrideKey::BotBcFluxFile,
                CfgValue::Str(self.chemistry.bot_bc_flux_file.clone()),
            ),
            (OverrideKey::OutName, CfgValue::Str(self.out_name(scenario_id))),
            (OverrideKey::ConstMix, CfgValue::Dict(self.atmosphere.const_mix.clone())),
            (OverrideKey::UsePhoto, CfgValue::Bool(self.chemistry.use_photo)),
            (OverrideKey::RStar, CfgValue::Float(self.star.r_star)),
            (OverrideKey::Rp, CfgValue::Float(self.planet.rp)),
            (OverrideKey::OrbitRadius, CfgValue::Float(self.planet.orbit_radius)),
            (
                OverrideKey::SlAngle,
                CfgValue::Expr(format!("{:?} / 180. * 3.14159", self.planet.sl_angle)),
            ),
            (OverrideKey::FDiurnal, CfgValue::Float(self.planet.f_diurnal)),
            (OverrideKey::Rocky, CfgValue::Bool(self.planet.rocky)),
            (OverrideKey::Nz, CfgValue::Int(i64::from(self.atmosphere.nz))),
            (OverrideKey::PBottom, CfgValue::Float(self.atmosphere.p_bottom)),
            (OverrideKey::PTop, CfgValue::Float(self.atmosphere.p_top)),
            (OverrideKey::AtmType, CfgValue::Str(self.atmosphere.atm_type.clone())),
            (OverrideKey::KzzProf, CfgValue::Str(self.atmosphere.kzz_prof.clone())),
            (OverrideKey::Gs, CfgValue::Float(self.planet.gs)),
            (OverrideKey::UseBotflux, CfgValue::Bool(self.chemistry.use_botflux)),
        ])
    }
}

fn invalid(field: &'static str, reason: String) -> DocumentError {
    DocumentError::Invalid { field, reason }
}

fn non_empty(field: &'static str, value: &str) -> Result<(), DocumentError> {
    if value.trim().is_empty() {
        return Err(invalid(field, "must not be empty".to_string()));
    }
    Ok(())
}

fn positive(field: &'static str, value: f64) -> Result<(), DocumentError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(field, format!("must be a positive number, got {value}")));
    }
    Ok(())
}
