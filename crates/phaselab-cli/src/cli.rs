use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Camilo A. F. Salvador",
    version,
    about = "phaselab - materials analysis tools: degree of beta-to-omega collapse, Lennard-Jones fits of pair energies and SVET current maps.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,

    /// Optional configuration file in TOML format.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S svet.levels=30
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", global = true)]
    pub set_values: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the degree of beta-to-omega collapse of a structure.
    Degree(DegreeArgs),
    /// Fit Lennard-Jones 12-6 parameters to pair-energy curves.
    FitLj(FitLjArgs),
    /// Render SVET current-density scans as colour maps.
    Svet(SvetArgs),
}

/// Arguments for the `degree` subcommand.
#[derive(Args, Debug)]
pub struct DegreeArgs {
    /// Positions file (`label x y z` per line) or POSCAR/CONTCAR structure.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Input layout: 'plain' or 'poscar'.
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Also write the report to this file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// How deviations above one tolerance unit are folded: 'single' or 'periodic'.
    #[arg(long, value_name = "POLICY")]
    pub fold: Option<String>,

    /// Print only the summary, not the per-atom lines.
    #[arg(long)]
    pub quiet_atoms: bool,
}

/// Arguments for the `fit-lj` subcommand.
#[derive(Args, Debug)]
pub struct FitLjArgs {
    /// A CSV file with `r,u` columns, or a directory of such files.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Directory receiving fitted data, charts and the report.
    #[arg(short, long, value_name = "DIR")]
    pub results: Option<PathBuf>,

    /// Lower bound (exclusive) of the energies used in the fit, in eV.
    #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
    pub min_energy: Option<f64>,

    /// Upper bound (exclusive) of the energies used in the fit, in eV.
    #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
    pub max_energy: Option<f64>,

    /// Maximum number of model evaluations per fit.
    #[arg(long, value_name = "INT")]
    pub max_evaluations: Option<usize>,
}

/// Arguments for the `svet` subcommand.
#[derive(Args, Debug)]
pub struct SvetArgs {
    /// Directory of SVET CSV exports.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub input: PathBuf,

    /// Directory receiving maps, the colour bar and the report.
    #[arg(short, long, value_name = "DIR")]
    pub results: Option<PathBuf>,

    /// Current mapped to the low end of the colour scale, in uA/cm^2.
    #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
    pub min_current: Option<f64>,

    /// Current mapped to the high end of the colour scale, in uA/cm^2.
    #[arg(long, value_name = "FLOAT", allow_hyphen_values = true)]
    pub max_current: Option<f64>,

    /// Named colormap (PuOr, PuOr_r, RdBu, RdBu_r).
    #[arg(long, value_name = "NAME")]
    pub colormap: Option<String>,

    /// Number of colour bands in the levels map.
    #[arg(long, value_name = "INT")]
    pub levels: Option<usize>,

    /// Colour normalization: 'linear' or 'power'.
    #[arg(long, value_name = "NAME")]
    pub normalization: Option<String>,

    /// Exponent of the power normalization.
    #[arg(long, value_name = "FLOAT")]
    pub gamma: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_work_after_the_subcommand() {
        let cli = Cli::parse_from([
            "phaselab", "degree", "-i", "pos.txt", "-vv", "-j", "4", "-S", "degree.fold-policy=periodic",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.threads, Some(4));
        assert_eq!(cli.set_values, vec!["degree.fold-policy=periodic"]);
        assert!(matches!(cli.command, Commands::Degree(_)));
    }

    #[test]
    fn negative_energies_are_accepted() {
        let cli = Cli::parse_from([
            "phaselab",
            "fit-lj",
            "-i",
            "data",
            "--min-energy",
            "-0.1",
            "--max-energy",
            "0.02",
        ]);
        let Commands::FitLj(args) = cli.command else {
            panic!("Expected 'fit-lj' subcommand");
        };
        assert_eq!(args.min_energy, Some(-0.1));
        assert_eq!(args.max_energy, Some(0.02));
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["phaselab", "-q", "-v", "svet", "-i", "scans"]);
        assert!(result.is_err());
    }
}
