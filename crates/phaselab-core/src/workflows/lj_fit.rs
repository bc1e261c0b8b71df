use crate::core::fitting::lennard_jones::{LjFit, fit_lennard_jones};
use crate::core::io::energy::EnergyCsv;
use crate::core::io::traits::{DataFile, WritableDataFile};
use crate::core::models::energy::EnergyCurve;
use crate::core::plot::render::render_fit_chart;
use crate::engine::batch::{
    FileOutcome, ensure_results_dir, file_stem, list_csv_files, process_files, require_any_success,
};
use crate::engine::config::LjFitConfig;
use crate::engine::error::WorkflowError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Everything produced for one energy data set.
#[derive(Debug, Clone, PartialEq)]
pub struct FitReport {
    pub name: String,
    /// Samples in the input file.
    pub samples_total: usize,
    /// Samples inside the energy window, i.e. those that were fitted.
    pub samples_used: usize,
    pub fit: LjFit,
    pub csv_path: PathBuf,
    pub chart_path: PathBuf,
}

/// Filters `curve` to the configured energy window and fits it.
pub fn fit_curve(curve: &EnergyCurve, config: &LjFitConfig) -> Result<LjFit, WorkflowError> {
    let filtered = curve.filtered(config.window);
    debug!(
        name = %curve.name,
        kept = filtered.len(),
        total = curve.len(),
        "Applied energy window."
    );
    Ok(fit_lennard_jones(&filtered.samples, &config.solver)?)
}

/// Reads, fits and exports one CSV file into `config.results_dir`.
pub fn fit_file(path: &Path, name: &str, config: &LjFitConfig) -> Result<FitReport, WorkflowError> {
    let curve = EnergyCurve::new(name, EnergyCsv::read_from_path(path)?);
    let fit = fit_curve(&curve, config)?;

    let csv_path = config.results_dir.join(format!("{name}.csv"));
    EnergyCsv::write_to_path(&fit.fitted, &csv_path)?;

    let chart_path = config.results_dir.join(format!("{name}.svg"));
    render_fit_chart(
        &chart_path,
        name,
        &fit.fitted,
        &fit.params,
        config.chart_size(),
    )?;

    info!(
        name,
        epsilon = fit.params.epsilon,
        sigma = fit.params.sigma,
        mse = fit.mse,
        "Lennard-Jones fit complete."
    );
    Ok(FitReport {
        name: name.to_string(),
        samples_total: curve.len(),
        samples_used: fit.fitted.len(),
        fit,
        csv_path,
        chart_path,
    })
}

/// Fits a single CSV file, or every CSV file of a directory.
///
/// Per-file failures are returned in the outcomes; the run itself fails only
/// when the input cannot be listed or when every file failed.
#[instrument(skip_all, name = "lj_fit_workflow")]
pub fn run(
    input: &Path,
    config: &LjFitConfig,
    reporter: &ProgressReporter,
) -> Result<Vec<FileOutcome<FitReport>>, WorkflowError> {
    reporter.report(Progress::PhaseStart {
        name: "Preparation",
    });
    ensure_results_dir(&config.results_dir)?;
    if !input.is_dir() {
        reporter.report(Progress::PhaseFinish);
        let name = file_stem(input);
        let report = fit_file(input, &name, config)?;
        return Ok(vec![FileOutcome {
            path: input.to_path_buf(),
            name,
            result: Ok(report),
        }]);
    }
    let files = list_csv_files(input)?;
    reporter.report(Progress::PhaseFinish);
    info!(files = files.len(), "Starting Lennard-Jones batch fit.");

    reporter.report(Progress::PhaseStart { name: "Fitting" });
    let outcomes = process_files(&files, reporter, |path, name| {
        fit_file(path, name, config)
    });
    reporter.report(Progress::PhaseFinish);
    require_any_success(&outcomes)?;

    let fitted = outcomes.iter().filter(|o| o.is_ok()).count();
    info!(fitted, failed = outcomes.len() - fitted, "Batch finished.");
    Ok(outcomes)
}
