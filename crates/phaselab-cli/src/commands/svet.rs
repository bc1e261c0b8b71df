use crate::cli::SvetArgs;
use crate::config::PartialAppConfig;
use crate::error::Result;
use crate::report;
use crate::utils::progress::CliProgressHandler;
use phaselab::engine::progress::ProgressReporter;
use phaselab::workflows;
use tracing::info;

pub fn run(args: SvetArgs, config: &PartialAppConfig) -> Result<()> {
    let svet_config = config.resolve_svet(&args)?;
    info!(
        "Rendering SVET maps from {:?} (colormap {}, range {} .. {})",
        &args.input, svet_config.style.colormap, svet_config.style.min, svet_config.style.max
    );

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Starting SVET map rendering...");
    let batch = workflows::svet::run(&args.input, &svet_config, &reporter)?;

    let report_path = svet_config.results_dir.join(report::HTML_REPORT);
    report::append_report(
        &report_path,
        &report::svet_report_lines(&batch),
        "<br />\n",
    )?;

    let rendered = batch.maps.iter().filter(|o| o.is_ok()).count();
    println!(
        "✓ {} of {} map(s) written to: {}",
        rendered,
        batch.maps.len(),
        svet_config.results_dir.display()
    );
    if let Some(contrast) = batch.contrast {
        println!(
            "Suggested colour range: {} to {}",
            contrast.min, contrast.max
        );
    }
    println!("Report appended to: {}", report_path.display());

    Ok(())
}
