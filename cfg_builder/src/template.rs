use std::collections::BTreeMap;
use std::fmt::Write as _;

/// The configuration keys that a scenario document is allowed to set.
///
/// Everything else in the rendered file comes from the defaults in [VulcanTemplate].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OverrideKey {
    Network,
    AtmFile,
    SfluxFile,
    TopBcFluxFile,
    BotBcFluxFile,
    OutName,
    ConstMix,
    UsePhoto,
    RStar,
    Rp,
    OrbitRadius,
    SlAngle,
    FDiurnal,
    Rocky,
    Nz,
    PBottom,
    PTop,
    AtmType,
    KzzProf,
    Gs,
    UseBotflux,
}

impl OverrideKey {
    pub const ALL: [OverrideKey; 21] = [
        OverrideKey::Network,
        OverrideKey::AtmFile,
        OverrideKey::SfluxFile,
        OverrideKey::TopBcFluxFile,
        OverrideKey::BotBcFluxFile,
        OverrideKey::OutName,
        OverrideKey::ConstMix,
        OverrideKey::UsePhoto,
        OverrideKey::RStar,
        OverrideKey::Rp,
        OverrideKey::OrbitRadius,
        OverrideKey::SlAngle,
        OverrideKey::FDiurnal,
        OverrideKey::Rocky,
        OverrideKey::Nz,
        OverrideKey::PBottom,
        OverrideKey::PTop,
        OverrideKey::AtmType,
        OverrideKey::KzzProf,
        OverrideKey::Gs,
        OverrideKey::UseBotflux,
    ];

    /// The name of the variable in the rendered file.
    pub fn cfg_key(&self) -> &'static str {
        match self {
            OverrideKey::Network => "network",
            OverrideKey::AtmFile => "atm_file",
            OverrideKey::SfluxFile => "sflux_file",
            OverrideKey::TopBcFluxFile => "top_BC_flux_file",
            OverrideKey::BotBcFluxFile => "bot_BC_flux_file",
            OverrideKey::OutName => "out_name",
            OverrideKey::ConstMix => "const_mix",
            OverrideKey::UsePhoto => "use_photo",
            OverrideKey::RStar => "r_star",
            OverrideKey::Rp => "Rp",
            OverrideKey::OrbitRadius => "orbit_radius",
            OverrideKey::SlAngle => "sl_angle",
            OverrideKey::FDiurnal => "f_diurnal",
            OverrideKey::Rocky => "rocky",
            OverrideKey::Nz => "nz",
            OverrideKey::PBottom => "P_b",
            OverrideKey::PTop => "P_t",
            OverrideKey::AtmType => "atm_type",
            OverrideKey::KzzProf => "Kzz_prof",
            OverrideKey::Gs => "gs",
            OverrideKey::UseBotflux => "use_botflux",
        }
    }

    fn from_cfg_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.cfg_key() == key)
    }
}

/// A value written into the configuration file as a Python literal.
#[derive(Debug, Clone, PartialEq)]
pub enum CfgValue {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Mapping of species to mixing ratio.
    Dict(BTreeMap<String, f64>),
    /// Written as is. Used for values that VULCAN evaluates, such as unit conversions.
    Expr(String),
}

impl CfgValue {
    pub fn to_literal(&self) -> String {
        match self {
            CfgValue::Str(s) => format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            CfgValue::Bool(true) => "True".to_string(),
            CfgValue::Bool(false) => "False".to_string(),
            CfgValue::Int(i) => i.to_string(),
            CfgValue::Float(f) => float_literal(*f),
            CfgValue::Dict(entries) => {
                let body = entries
                    .iter()
                    .map(|(k, v)| format!("'{}': {}", k, float_literal(*v)))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{{{body}}}")
            }
            CfgValue::Expr(e) => e.clone(),
        }
    }
}

/// `Debug` formatting keeps a decimal point or exponent, so the value stays a float in Python.
fn float_literal(f: f64) -> String {
    format!("{f:?}")
}

/// The set of overrides for a single scenario.
pub type Overrides = BTreeMap<OverrideKey, CfgValue>;

#[derive(Debug, Clone)]
pub struct Entry {
    pub key: &'static str,
    pub default: &'static str,
    pub comment: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct Section {
    pub title: &'static str,
    pub entries: Vec<Entry>,
}

/// The full VULCAN configuration with every value defaulted.
///
/// The defaults are those used for the terrestrial ExoFarm scenarios: an N2 dominated rocky
/// atmosphere with condensation of H2O and H2SO4 and the Ros2 solver.
#[derive(Debug, Clone)]
pub struct VulcanTemplate {
    pub header: &'static str,
    pub sections: Vec<Section>,
}

macro_rules! entry {
    ($key:literal = $default:literal) => {
        Entry {
            key: $key,
            default: $default,
            comment: None,
        }
    };
    ($key:literal = $default:literal, # $comment:literal) => {
        Entry {
            key: $key,
            default: $default,
            comment: Some($comment),
        }
    };
}

impl Default for VulcanTemplate {
    fn default() -> Self {
        Self {
            header: "Configuration file of VULCAN (generated by vulcan_cfg_builder)",
            sections: vec![
                Section {
                    title: "Setting up the elements included in the network",
                    entries: vec![entry!("atom_list" = "['H', 'O', 'C', 'N', 'S']")],
                },
                Section {
                    title: "Setting up paths and filenames",
                    entries: vec![
                        entry!("network" = "'thermo/SNCHO_photo_network.txt'"),
                        entry!("use_lowT_limit_rates" = "False"),
                        entry!("gibbs_text" = "'thermo/gibbs_text.txt'"),
                        entry!("cross_folder" = "'thermo/photo_cross/'"),
                        entry!("com_file" = "'thermo/all_compose.txt'"),
                        entry!("atm_file" = "'atm/atm_Earth_Jan_Kzz.txt'"),
                        entry!("sflux_file" = "'atm/stellar_flux/Gueymard_solar.txt'"),
                        entry!("top_BC_flux_file" = "'atm/BC_top.txt'"),
                        entry!("bot_BC_flux_file" = "'atm/BC_bot_Earth.txt'"),
                        entry!("vul_ini" = "'output/'"),
                        entry!("output_dir" = "'output/'"),
                        entry!("plot_dir" = "'plot/'"),
                        entry!("movie_dir" = "'plot/movie/'"),
                        entry!("out_name" = "'Earth.vul'"),
                    ],
                },
                Section {
                    title: "Setting up the elemental abundance",
                    entries: vec![
                        entry!("use_solar" = "False"),
                        entry!("O_H" = "6.0618E-4 * 0.85"),
                        entry!("C_H" = "2.7761E-4"),
                        entry!("N_H" = "8.1853E-5"),
                        entry!("S_H" = "1.3183E-5"),
                        entry!("He_H" = "0.09692"),
                        entry!("ini_mix" = "'const_mix'"),
                        entry!("fastchem_met_scale" = "1."),
                        entry!("const_mix" = "{'N2': 0.78, 'O2': 0.20, 'CO2': 4E-4}", # "initialising uniform mixing ratios"),
                    ],
                },
                Section {
                    title: "Setting up photochemistry",
                    entries: vec![
                        entry!("use_photo" = "True"),
                        entry!("r_star" = "1."),
                        entry!("Rp" = "6.3710E8", # "cm"),
                        entry!("orbit_radius" = "1.", # "AU"),
                        entry!("sl_angle" = "58 / 180. * 3.14159"),
                        entry!("f_diurnal" = "0.5"),
                        entry!("scat_sp" = "['N2', 'O2']"),
                        entry!("T_cross_sp" = "['CO2', 'H2O', 'NH3']"),
                        entry!("edd" = "0.5"),
                        entry!("dbin1" = "0.1"),
                        entry!("dbin2" = "2."),
                        entry!("dbin_12trans" = "240."),
                        entry!("ini_update_photo_frq" = "100"),
                        entry!("final_update_photo_frq" = "5"),
                    ],
                },
                Section {
                    title: "Setting up ionchemistry",
                    entries: vec![entry!("use_ion" = "False")],
                },
                Section {
                    title: "Setting up parameters for the atmosphere",
                    entries: vec![
                        entry!("atm_base" = "'N2'"),
                        entry!("rocky" = "True"),
                        entry!("nz" = "100"),
                        entry!("P_b" = "1.E6", # "dyne/cm^2"),
                        entry!("P_t" = "5.E-2"),
                        entry!("use_Kzz" = "True"),
                        entry!("use_moldiff" = "True"),
                        entry!("use_vm_mol" = "False"),
                        entry!("use_vz" = "False"),
                        entry!("atm_type" = "'file'"),
                        entry!("Kzz_prof" = "'file'"),
                        entry!("K_max" = "1e5"),
                        entry!("K_p_lev" = "0.1"),
                        entry!("vz_prof" = "'const'"),
                        entry!("gs" = "980.", # "cm/s^2"),
                        entry!("Tiso" = "1000"),
                        entry!("para_warm" = "[120., 1500., 0.1, 0.02, 1., 1.]"),
                        entry!("para_anaTP" = "para_warm"),
                        entry!("const_Kzz" = "1.E10"),
                        entry!("const_vz" = "0"),
                        entry!("update_frq" = "100"),
                    ],
                },
                Section {
                    title: "Setting up the boundary conditions",
                    entries: vec![
                        entry!("use_topflux" = "False"),
                        entry!("use_botflux" = "True"),
                        entry!("use_fix_sp_bot" = "{'H2O': 0.00894, 'H2O_l_s': 0, 'CO2': 4E-4}"),
                        entry!("diff_esc" = "['H2', 'H']", # "species for diffusion-limit escape at TOA"),
                        entry!("max_flux" = "1e13", # "upper limit for the diffusion-limit fluxes"),
                    ],
                },
                Section {
                    title: "Reactions to be switched off",
                    entries: vec![entry!("remove_list" = "[]", # "in pairs e.g. [1,2]")],
                },
                Section {
                    title: "Condensation",
                    entries: vec![
                        entry!("use_condense" = "True"),
                        entry!("use_settling" = "True"),
                        entry!("use_relax" = "['H2O', 'H2SO4']"),
                        entry!("humidity" = "0.25", # "only for water"),
                        entry!("r_p" = "{'H2O_l_s': 0.01, 'H2SO4_l': 1e-4}", # "particle radius in cm"),
                        entry!("rho_p" = "{'H2O_l_s': 0.9, 'H2SO4_l': 1.8302}", # "particle density in g cm^-3"),
                        entry!("start_conden_time" = "0"),
                        entry!("stop_conden_time" = "5e8"),
                        entry!("condense_sp" = "['H2O', 'H2SO4']"),
                        entry!("non_gas_sp" = "['H2O_l_s', 'H2SO4_l']"),
                        entry!("fix_species" = "['H2O', 'H2O_l_s', 'H2SO4', 'H2SO4_l']"),
                        entry!("fix_species_time" = "stop_conden_time"),
                        entry!("fix_species_from_coldtrap_lev" = "True"),
                        entry!("use_ini_cold_trap" = "True"),
                        entry!("use_sat_surfaceH2O" = "False"),
                    ],
                },
                Section {
                    title: "Steady state check",
                    entries: vec![entry!("st_factor" = "0.5"), entry!("conv_step" = "500")],
                },
                Section {
                    title: "Setting up numerical parameters for the ODE solver",
                    entries: vec![
                        entry!("ode_solver" = "'Ros2'", # "case sensitive"),
                        entry!("use_print_prog" = "True"),
                        entry!("use_print_delta" = "False"),
                        entry!("print_prog_num" = "500"),
                        entry!("dttry" = "1.E-10"),
                        entry!("trun_min" = "1e2"),
                        entry!("runtime" = "1.E22"),
                        entry!("dt_min" = "1.E-14"),
                        entry!("dt_max" = "runtime*1e-5"),
                        entry!("dt_var_max" = "2."),
                        entry!("dt_var_min" = "0.5"),
                        entry!("count_min" = "120"),
                        entry!("count_max" = "5000"),
                        entry!("atol" = "1.E-1"),
                        entry!("mtol" = "1.E-22"),
                        entry!("mtol_conv" = "1.E-16"),
                        entry!("pos_cut" = "0"),
                        entry!("nega_cut" = "-1."),
                        entry!("loss_eps" = "1e12"),
                        entry!("yconv_cri" = "0.01"),
                        entry!("slope_cri" = "1.e-4"),
                        entry!("yconv_min" = "0.1"),
                        entry!("flux_cri" = "0.1"),
                        entry!("flux_atol" = "1."),
                    ],
                },
                Section {
                    title: "Setting up numerical parameters for the Ros2 ODE solver",
                    entries: vec![
                        entry!("rtol" = "1.5"),
                        entry!("post_conden_rtol" = "0.2"),
                        entry!("use_adapt_rtol" = "False"),
                        entry!("rtol_min" = "1e-4"),
                    ],
                },
                Section {
                    title: "Setting up for output and plotting",
                    entries: vec![
                        entry!("plot_TP" = "False"),
                        entry!("use_live_plot" = "False"),
                        entry!("use_live_flux" = "False"),
                        entry!("use_plot_end" = "False"),
                        entry!("use_plot_evo" = "False"),
                        entry!("use_save_movie" = "False"),
                        entry!("use_flux_movie" = "False"),
                        entry!("plot_height" = "False"),
                        entry!("use_PIL" = "True"),
                        entry!("live_plot_frq" = "10"),
                        entry!("save_movie_rate" = "live_plot_frq"),
                        entry!("y_time_freq" = "1"),
                        entry!("plot_spec" = "['H2O', 'H2O_l_s', 'O3', 'CH4', 'NH3', 'N2O']"),
                        entry!("output_humanread" = "False"),
                        entry!("use_shark" = "False"),
                        entry!("save_evolution" = "False"),
                        entry!("save_evo_frq" = "10"),
                    ],
                },
            ],
        }
    }
}

impl VulcanTemplate {
    fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.sections
            .iter()
            .flat_map(|s| s.entries.iter().map(|e| e.key))
    }
}

/// Render the configuration file.
///
/// This is a pure function of its inputs so the same template and overrides always produce the
/// same bytes. Overrides are substituted in place of the default for their key, the layout and
/// order of the file always follow the template.
pub fn render(template: &VulcanTemplate, overrides: &Overrides) -> String {
    let rule = "=".repeat(77);
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "# {rule}");
    let _ = writeln!(out, "# {}", template.header);
    let _ = writeln!(out, "# {rule}");

    for section in &template.sections {
        let _ = writeln!(out);
        let _ = writeln!(out, "# ====== {} ======", section.title);
        for entry in &section.entries {
            let value = OverrideKey::from_cfg_key(entry.key)
                .and_then(|k| overrides.get(&k))
                .map(CfgValue::to_literal);
            let value = value.as_deref().unwrap_or(entry.default);
            match entry.comment {
                Some(comment) => {
                    let _ = writeln!(out, "{} = {}  # {}", entry.key, value, comment);
                }
                None => {
                    let _ = writeln!(out, "{} = {}", entry.key, value);
                }
            }
        }
    }

    out
}
