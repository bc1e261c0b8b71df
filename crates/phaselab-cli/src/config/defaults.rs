use phaselab::core::plot::colormap::{DEFAULT_COLORMAP, DEFAULT_GAMMA};
use phaselab::engine::config::{
    DEFAULT_CHART_DPI, DEFAULT_COLORBAR_LABEL, DEFAULT_LEVELS, DEFAULT_NAME_FIELD,
};
use std::path::PathBuf;

/// Values used when neither the command line nor the config file sets them.
pub struct DefaultsConfig {
    pub results_dir: PathBuf,
    pub format: String,
    pub fold_policy: String,
    pub min_energy: f64,
    pub max_energy: f64,
    pub max_evaluations: usize,
    pub chart_dpi: u32,
    pub min_current: f64,
    pub max_current: f64,
    pub colormap: String,
    pub normalization: String,
    pub gamma: f64,
    pub levels: usize,
    pub name_field: usize,
    pub map_dpi: u32,
    pub colorbar_label: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
            format: "plain".to_string(),
            fold_policy: "single".to_string(),
            min_energy: -0.05,
            max_energy: 0.01,
            max_evaluations: 100_000,
            chart_dpi: DEFAULT_CHART_DPI,
            min_current: -2000.0,
            max_current: 2000.0,
            colormap: DEFAULT_COLORMAP.to_string(),
            normalization: "linear".to_string(),
            gamma: DEFAULT_GAMMA,
            levels: DEFAULT_LEVELS,
            name_field: DEFAULT_NAME_FIELD,
            map_dpi: DEFAULT_CHART_DPI,
            colorbar_label: DEFAULT_COLORBAR_LABEL.to_string(),
        }
    }
}
