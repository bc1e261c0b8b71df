use crate::cli::DegreeArgs;
use crate::config::PartialAppConfig;
use crate::error::{CliError, Result};
use crate::report;
use crate::utils::progress::CliProgressHandler;
use phaselab::engine::error::WorkflowError;
use phaselab::engine::progress::ProgressReporter;
use phaselab::workflows;
use tracing::info;

pub fn run(args: DegreeArgs, config: &PartialAppConfig) -> Result<()> {
    let degree_config = config.resolve_degree(&args)?;
    info!(
        "Computing degree of collapse for {:?} (format: {}, fold: {})",
        &args.input, degree_config.format, degree_config.fold_policy
    );

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let analysis = workflows::degree::run(&args.input, &degree_config, &reporter).map_err(|e| {
        match e {
            WorkflowError::Positions(source) => CliError::FileParsing {
                path: args.input.clone(),
                source: source.into(),
            },
            WorkflowError::Poscar(source) => CliError::FileParsing {
                path: args.input.clone(),
                source: source.into(),
            },
            other => other.into(),
        }
    })?;

    let text = report::degree_report(&analysis, !args.quiet_atoms);
    print!("{text}");

    if analysis.out_of_band > 0 {
        println!(
            "Warning: {} atom(s) lie more than two tolerance units from the lattice; rerun with --fold periodic to fold them back.",
            analysis.out_of_band
        );
    }

    if let Some(output) = &args.output {
        report::write_text(output, &text)?;
        info!("Report written to {:?}", output);
        println!("Report written to: {}", output.display());
    }

    Ok(())
}
