use crate::cli::FitLjArgs;
use crate::config::PartialAppConfig;
use crate::error::Result;
use crate::report;
use crate::utils::progress::CliProgressHandler;
use phaselab::engine::progress::ProgressReporter;
use phaselab::workflows;
use tracing::{info, warn};

pub fn run(args: FitLjArgs, config: &PartialAppConfig) -> Result<()> {
    let fit_config = config.resolve_lj_fit(&args)?;
    info!(
        "Fitting Lennard-Jones parameters for {:?} into {:?}",
        &args.input, &fit_config.results_dir
    );

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Starting Lennard-Jones fitting...");
    let outcomes = workflows::lj_fit::run(&args.input, &fit_config, &reporter)?;

    let report_path = fit_config.results_dir.join(report::TEXT_REPORT);
    report::append_report(&report_path, &report::fit_report_lines(&outcomes), "\n")?;

    for outcome in &outcomes {
        match &outcome.result {
            Ok(fit) => println!(
                "✓ {}: e = {:.6} eV, s = {:.6} Å (MSE {:.3e}, {} of {} samples)",
                fit.name,
                fit.fit.params.epsilon,
                fit.fit.params.sigma,
                fit.fit.mse,
                fit.samples_used,
                fit.samples_total
            ),
            Err(e) => {
                warn!("{} was not fitted: {}", outcome.name, e);
                println!("✗ {}: {}", outcome.name, e);
            }
        }
    }
    println!("Report appended to: {}", report_path.display());

    Ok(())
}
