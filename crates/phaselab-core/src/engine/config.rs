use crate::core::collapse::FoldPolicy;
use crate::core::fitting::levenberg_marquardt::LmOptions;
use crate::core::models::energy::EnergyWindow;
use crate::core::plot::colormap::{Colormap, Normalization};
use crate::core::plot::render::MapStyle;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_CHART_DPI: u32 = 100;
pub const DEFAULT_LEVELS: usize = 20;
pub const DEFAULT_NAME_FIELD: usize = 8;
pub const DEFAULT_COLORBAR_LABEL: &str = "Current (uA)";

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Layout of a positions input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFormat {
    /// `label x y z` per line.
    #[default]
    Plain,
    /// VASP POSCAR/CONTCAR structure.
    Poscar,
}

impl FromStr for InputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "positions" => Ok(Self::Plain),
            "poscar" | "contcar" | "vasp" => Ok(Self::Poscar),
            other => Err(ConfigError::InvalidParameter {
                name: "format",
                reason: format!("unknown input format '{other}' (expected 'plain' or 'poscar')"),
            }),
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => f.write_str("plain"),
            Self::Poscar => f.write_str("poscar"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DegreeConfig {
    pub format: InputFormat,
    pub fold_policy: FoldPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LjFitConfig {
    pub results_dir: PathBuf,
    pub window: EnergyWindow,
    pub solver: LmOptions,
    pub dpi: u32,
}

impl LjFitConfig {
    /// Chart size in pixels for a 6.4 x 4.8 inch figure.
    pub fn chart_size(&self) -> (u32, u32) {
        (
            (6.4 * self.dpi as f64).round() as u32,
            (4.8 * self.dpi as f64).round() as u32,
        )
    }
}

#[derive(Default)]
pub struct LjFitConfigBuilder {
    results_dir: Option<PathBuf>,
    min_energy: Option<f64>,
    max_energy: Option<f64>,
    max_evaluations: Option<usize>,
    dpi: Option<u32>,
}

impl LjFitConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results_dir(mut self, path: PathBuf) -> Self {
        self.results_dir = Some(path);
        self
    }
    pub fn min_energy(mut self, value: f64) -> Self {
        self.min_energy = Some(value);
        self
    }
    pub fn max_energy(mut self, value: f64) -> Self {
        self.max_energy = Some(value);
        self
    }
    pub fn max_evaluations(mut self, n: usize) -> Self {
        self.max_evaluations = Some(n);
        self
    }
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.dpi = Some(dpi);
        self
    }

    pub fn build(self) -> Result<LjFitConfig, ConfigError> {
        let window = EnergyWindow {
            min: self
                .min_energy
                .ok_or(ConfigError::MissingParameter("min_energy"))?,
            max: self
                .max_energy
                .ok_or(ConfigError::MissingParameter("max_energy"))?,
        };
        if !(window.min < window.max) {
            return Err(ConfigError::InvalidParameter {
                name: "max_energy",
                reason: format!(
                    "energy window is empty ({} .. {})",
                    window.min, window.max
                ),
            });
        }

        let max_evaluations = self
            .max_evaluations
            .ok_or(ConfigError::MissingParameter("max_evaluations"))?;
        if max_evaluations == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "max_evaluations",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(LjFitConfig {
            results_dir: self
                .results_dir
                .ok_or(ConfigError::MissingParameter("results_dir"))?,
            window,
            solver: LmOptions {
                max_evaluations,
                ..LmOptions::default()
            },
            dpi: positive_dpi(self.dpi.unwrap_or(DEFAULT_CHART_DPI))?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SvetConfig {
    pub results_dir: PathBuf,
    pub style: MapStyle,
    pub levels: usize,
    /// `_`-separated field of the file stem used as the entry name.
    pub name_field: usize,
    pub colorbar_label: String,
}

#[derive(Default)]
pub struct SvetConfigBuilder {
    results_dir: Option<PathBuf>,
    min_current: Option<f64>,
    max_current: Option<f64>,
    colormap: Option<Colormap>,
    normalization: Option<Normalization>,
    levels: Option<usize>,
    name_field: Option<usize>,
    dpi: Option<u32>,
    colorbar_label: Option<String>,
}

impl SvetConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results_dir(mut self, path: PathBuf) -> Self {
        self.results_dir = Some(path);
        self
    }
    pub fn min_current(mut self, value: f64) -> Self {
        self.min_current = Some(value);
        self
    }
    pub fn max_current(mut self, value: f64) -> Self {
        self.max_current = Some(value);
        self
    }
    pub fn colormap(mut self, colormap: Colormap) -> Self {
        self.colormap = Some(colormap);
        self
    }
    pub fn normalization(mut self, normalization: Normalization) -> Self {
        self.normalization = Some(normalization);
        self
    }
    pub fn levels(mut self, levels: usize) -> Self {
        self.levels = Some(levels);
        self
    }
    pub fn name_field(mut self, field: usize) -> Self {
        self.name_field = Some(field);
        self
    }
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.dpi = Some(dpi);
        self
    }
    pub fn colorbar_label(mut self, label: impl Into<String>) -> Self {
        self.colorbar_label = Some(label.into());
        self
    }

    pub fn build(self) -> Result<SvetConfig, ConfigError> {
        let min = self
            .min_current
            .ok_or(ConfigError::MissingParameter("min_current"))?;
        let max = self
            .max_current
            .ok_or(ConfigError::MissingParameter("max_current"))?;
        if !(min < max) {
            return Err(ConfigError::InvalidParameter {
                name: "max_current",
                reason: format!("colour range is empty ({min} .. {max})"),
            });
        }

        let normalization = self.normalization.unwrap_or_default();
        if let Normalization::Power { gamma } = normalization {
            if !(gamma > 0.0 && gamma.is_finite()) {
                return Err(ConfigError::InvalidParameter {
                    name: "gamma",
                    reason: format!("must be a positive number, got {gamma}"),
                });
            }
        }

        let levels = self.levels.unwrap_or(DEFAULT_LEVELS);
        if levels == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "levels",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(SvetConfig {
            results_dir: self
                .results_dir
                .ok_or(ConfigError::MissingParameter("results_dir"))?,
            style: MapStyle {
                colormap: self.colormap.unwrap_or_default(),
                normalization,
                min,
                max,
                dpi: positive_dpi(self.dpi.unwrap_or(DEFAULT_CHART_DPI))?,
            },
            levels,
            name_field: self.name_field.unwrap_or(DEFAULT_NAME_FIELD),
            colorbar_label: self
                .colorbar_label
                .unwrap_or_else(|| DEFAULT_COLORBAR_LABEL.to_string()),
        })
    }
}

fn positive_dpi(dpi: u32) -> Result<u32, ConfigError> {
    if dpi == 0 {
        return Err(ConfigError::InvalidParameter {
            name: "dpi",
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(dpi)
}
