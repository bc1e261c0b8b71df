mod defaults;

use crate::cli::{DegreeArgs, FitLjArgs, SvetArgs};
use crate::error::{CliError, Result};
use defaults::DefaultsConfig;
use phaselab::core::collapse::FoldPolicy;
use phaselab::core::plot::colormap::{Colormap, Normalization};
use phaselab::engine::config::{
    DegreeConfig, InputFormat, LjFitConfig, LjFitConfigBuilder, SvetConfig, SvetConfigBuilder,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialDegreeConfig {
    format: Option<String>,
    #[serde(rename = "fold-policy")]
    fold_policy: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialLjFitConfig {
    results: Option<PathBuf>,
    #[serde(rename = "min-energy")]
    min_energy: Option<f64>,
    #[serde(rename = "max-energy")]
    max_energy: Option<f64>,
    #[serde(rename = "max-evaluations")]
    max_evaluations: Option<usize>,
    dpi: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialSvetConfig {
    results: Option<PathBuf>,
    #[serde(rename = "min-current")]
    min_current: Option<f64>,
    #[serde(rename = "max-current")]
    max_current: Option<f64>,
    colormap: Option<String>,
    normalization: Option<String>,
    gamma: Option<f64>,
    levels: Option<usize>,
    #[serde(rename = "name-field")]
    name_field: Option<usize>,
    dpi: Option<u32>,
    #[serde(rename = "colorbar-label")]
    colorbar_label: Option<String>,
}

/// Settings read from the optional TOML file, before command-line overrides.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialAppConfig {
    degree: Option<PartialDegreeConfig>,
    #[serde(rename = "lj-fit")]
    lj_fit: Option<PartialLjFitConfig>,
    svet: Option<PartialSvetConfig>,
}

impl PartialAppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads `path` if given and applies the `-S KEY=VALUE` overrides on top.
    pub fn load(path: Option<&Path>, set_values: &[String]) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        config.apply_set_values(set_values)?;
        Ok(config)
    }

    pub fn resolve_degree(&self, args: &DegreeArgs) -> Result<DegreeConfig> {
        let defaults = DefaultsConfig::default();
        let file = self.degree.as_ref();

        let format = args
            .format
            .as_deref()
            .or(file.and_then(|d| d.format.as_deref()))
            .unwrap_or(defaults.format.as_str());
        let fold_policy = args
            .fold
            .as_deref()
            .or(file.and_then(|d| d.fold_policy.as_deref()))
            .unwrap_or(defaults.fold_policy.as_str());

        Ok(DegreeConfig {
            format: InputFormat::from_str(format).map_err(|e| CliError::Argument(e.to_string()))?,
            fold_policy: FoldPolicy::from_str(fold_policy)
                .map_err(|e| CliError::Argument(e.to_string()))?,
        })
    }

    pub fn resolve_lj_fit(&self, args: &FitLjArgs) -> Result<LjFitConfig> {
        let defaults = DefaultsConfig::default();
        let file = self.lj_fit.as_ref();

        LjFitConfigBuilder::new()
            .results_dir(
                args.results
                    .clone()
                    .or_else(|| file.and_then(|f| f.results.clone()))
                    .unwrap_or(defaults.results_dir),
            )
            .min_energy(
                args.min_energy
                    .or(file.and_then(|f| f.min_energy))
                    .unwrap_or(defaults.min_energy),
            )
            .max_energy(
                args.max_energy
                    .or(file.and_then(|f| f.max_energy))
                    .unwrap_or(defaults.max_energy),
            )
            .max_evaluations(
                args.max_evaluations
                    .or(file.and_then(|f| f.max_evaluations))
                    .unwrap_or(defaults.max_evaluations),
            )
            .dpi(file.and_then(|f| f.dpi).unwrap_or(defaults.chart_dpi))
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    pub fn resolve_svet(&self, args: &SvetArgs) -> Result<SvetConfig> {
        let defaults = DefaultsConfig::default();
        let file = self.svet.as_ref();

        let colormap_name = args
            .colormap
            .as_deref()
            .or(file.and_then(|s| s.colormap.as_deref()))
            .unwrap_or(defaults.colormap.as_str());
        let colormap =
            Colormap::from_str(colormap_name).map_err(|e| CliError::Argument(e.to_string()))?;

        let normalization_name = args
            .normalization
            .as_deref()
            .or(file.and_then(|s| s.normalization.as_deref()))
            .unwrap_or(defaults.normalization.as_str());
        let gamma = args
            .gamma
            .or(file.and_then(|s| s.gamma))
            .unwrap_or(defaults.gamma);
        let normalization = Normalization::parse(normalization_name, gamma)
            .map_err(|e| CliError::Argument(e.to_string()))?;

        SvetConfigBuilder::new()
            .results_dir(
                args.results
                    .clone()
                    .or_else(|| file.and_then(|s| s.results.clone()))
                    .unwrap_or(defaults.results_dir),
            )
            .min_current(
                args.min_current
                    .or(file.and_then(|s| s.min_current))
                    .unwrap_or(defaults.min_current),
            )
            .max_current(
                args.max_current
                    .or(file.and_then(|s| s.max_current))
                    .unwrap_or(defaults.max_current),
            )
            .colormap(colormap)
            .normalization(normalization)
            .levels(
                args.levels
                    .or(file.and_then(|s| s.levels))
                    .unwrap_or(defaults.levels),
            )
            .name_field(file.and_then(|s| s.name_field).unwrap_or(defaults.name_field))
            .dpi(file.and_then(|s| s.dpi).unwrap_or(defaults.map_dpi))
            .colorbar_label(
                file.and_then(|s| s.colorbar_label.clone())
                    .unwrap_or(defaults.colorbar_label),
            )
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "degree.format" => {
                    self.degree.get_or_insert_with(Default::default).format =
                        Some(value_str.to_string());
                }
                "degree.fold-policy" => {
                    self.degree.get_or_insert_with(Default::default).fold_policy =
                        Some(value_str.to_string());
                }
                "lj-fit.results" => {
                    self.lj_fit.get_or_insert_with(Default::default).results =
                        Some(PathBuf::from(value_str));
                }
                "lj-fit.min-energy" => {
                    self.lj_fit.get_or_insert_with(Default::default).min_energy =
                        Some(parse_value(key, value_str)?);
                }
                "lj-fit.max-energy" => {
                    self.lj_fit.get_or_insert_with(Default::default).max_energy =
                        Some(parse_value(key, value_str)?);
                }
                "lj-fit.max-evaluations" => {
                    self.lj_fit
                        .get_or_insert_with(Default::default)
                        .max_evaluations = Some(parse_value(key, value_str)?);
                }
                "lj-fit.dpi" => {
                    self.lj_fit.get_or_insert_with(Default::default).dpi =
                        Some(parse_value(key, value_str)?);
                }
                "svet.results" => {
                    self.svet.get_or_insert_with(Default::default).results =
                        Some(PathBuf::from(value_str));
                }
                "svet.min-current" => {
                    self.svet.get_or_insert_with(Default::default).min_current =
                        Some(parse_value(key, value_str)?);
                }
                "svet.max-current" => {
                    self.svet.get_or_insert_with(Default::default).max_current =
                        Some(parse_value(key, value_str)?);
                }
                "svet.colormap" => {
                    self.svet.get_or_insert_with(Default::default).colormap =
                        Some(value_str.to_string());
                }
                "svet.normalization" => {
                    self.svet.get_or_insert_with(Default::default).normalization =
                        Some(value_str.to_string());
                }
                "svet.gamma" => {
                    self.svet.get_or_insert_with(Default::default).gamma =
                        Some(parse_value(key, value_str)?);
                }
                "svet.levels" => {
                    self.svet.get_or_insert_with(Default::default).levels =
                        Some(parse_value(key, value_str)?);
                }
                "svet.name-field" => {
                    self.svet.get_or_insert_with(Default::default).name_field =
                        Some(parse_value(key, value_str)?);
                }
                "svet.dpi" => {
                    self.svet.get_or_insert_with(Default::default).dpi =
                        Some(parse_value(key, value_str)?);
                }
                "svet.colorbar-label" => {
                    self.svet.get_or_insert_with(Default::default).colorbar_label =
                        Some(value_str.to_string());
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        CliError::Config(format!(
            "Invalid {} value for {}: {}",
            std::any::type_name::<T>(),
            key,
            value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    fn write_config_file(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join("phaselab.toml");
        fs::write(&path, content).unwrap();
        path
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("phaselab").chain(args.iter().copied()))
    }

    #[test]
    fn defaults_apply_without_a_config_file() {
        let cli = parse(&["fit-lj", "-i", "data"]);
        let Commands::FitLj(args) = &cli.command else {
            panic!("Expected 'fit-lj' subcommand");
        };
        let config = PartialAppConfig::load(None, &cli.set_values)
            .unwrap()
            .resolve_lj_fit(args)
            .unwrap();

        assert_eq!(config.results_dir, PathBuf::from("results"));
        assert_eq!(config.window.min, -0.05);
        assert_eq!(config.window.max, 0.01);
        assert_eq!(config.solver.max_evaluations, 100_000);
    }

    #[test]
    fn file_values_fill_in_missing_flags() {
        let dir = tempdir().unwrap();
        let path = write_config_file(
            dir.path(),
            r#"
            [svet]
            min-current = -500.0
            max-current = 800.0
            colormap = "RdBu"
            normalization = "power"
            gamma = 0.5
            name-field = 3
            colorbar-label = "i (uA/cm2)"
            "#,
        );
        let cli = parse(&["svet", "-i", "scans", "--levels", "12"]);
        let Commands::Svet(args) = &cli.command else {
            panic!("Expected 'svet' subcommand");
        };
        let config = PartialAppConfig::load(Some(&path), &cli.set_values)
            .unwrap()
            .resolve_svet(args)
            .unwrap();

        assert_eq!(config.style.min, -500.0);
        assert_eq!(config.style.max, 800.0);
        assert_eq!(config.style.colormap.name(), "RdBu");
        assert_eq!(config.style.normalization, Normalization::Power { gamma: 0.5 });
        assert_eq!(config.levels, 12);
        assert_eq!(config.name_field, 3);
        assert_eq!(config.colorbar_label, "i (uA/cm2)");
    }

    #[test]
    fn cli_args_override_set_values_and_file() {
        let dir = tempdir().unwrap();
        let path = write_config_file(
            dir.path(),
            "[lj-fit]\nmin-energy = -0.2\nmax-evaluations = 50\n",
        );
        let cli = parse(&[
            "fit-lj",
            "-i",
            "data",
            "--min-energy",
            "-0.3",
            "-S",
            "lj-fit.max-evaluations=75",
            "-S",
            "lj-fit.min-energy=-0.25",
        ]);
        let Commands::FitLj(args) = &cli.command else {
            panic!("Expected 'fit-lj' subcommand");
        };
        let config = PartialAppConfig::load(Some(&path), &cli.set_values)
            .unwrap()
            .resolve_lj_fit(args)
            .unwrap();

        assert_eq!(config.window.min, -0.3);
        assert_eq!(config.solver.max_evaluations, 75);
    }

    #[test]
    fn degree_policy_comes_from_set_values() {
        let cli = parse(&["degree", "-i", "pos.txt", "-S", "degree.fold-policy=periodic"]);
        let Commands::Degree(args) = &cli.command else {
            panic!("Expected 'degree' subcommand");
        };
        let config = PartialAppConfig::load(None, &cli.set_values)
            .unwrap()
            .resolve_degree(args)
            .unwrap();
        assert_eq!(config.fold_policy, FoldPolicy::Periodic);
        assert_eq!(config.format, InputFormat::Plain);
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = write_config_file(dir.path(), "[svet]\ncolour-map = \"RdBu\"\n");
        let err = PartialAppConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, CliError::FileParsing { .. }));
    }

    #[test]
    fn malformed_set_values_are_rejected() {
        let mut config = PartialAppConfig::default();
        assert!(matches!(
            config.apply_set_values(&["svet.levels".to_string()]),
            Err(CliError::Config(_))
        ));
        assert!(matches!(
            config.apply_set_values(&["svet.levels=many".to_string()]),
            Err(CliError::Config(_))
        ));
        assert!(matches!(
            config.apply_set_values(&["svet.unknown=1".to_string()]),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn invalid_ranges_surface_as_config_errors() {
        let cli = parse(&["svet", "-i", "scans", "--min-current", "10", "--max-current", "-10"]);
        let Commands::Svet(args) = &cli.command else {
            panic!("Expected 'svet' subcommand");
        };
        let err = PartialAppConfig::default().resolve_svet(args).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn unknown_colormap_is_an_argument_error() {
        let cli = parse(&["svet", "-i", "scans", "--colormap", "viridis"]);
        let Commands::Svet(args) = &cli.command else {
            panic!("Expected 'svet' subcommand");
        };
        let err = PartialAppConfig::default().resolve_svet(args).unwrap_err();
        assert!(matches!(err, CliError::Argument(_)));
    }
}
