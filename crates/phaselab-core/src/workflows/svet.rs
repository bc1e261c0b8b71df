use crate::core::io::scan::ScanCsv;
use crate::core::io::traits::{DataFile, WritableDataFile};
use crate::core::models::scan::{ScanMap, median};
use crate::core::plot::render::{
    RenderError, render_colorbar, render_levels_map, render_scan_map,
};
use crate::engine::batch::{
    FileOutcome, ensure_results_dir, file_stem, list_csv_files, require_any_success,
};
use crate::engine::config::SvetConfig;
use crate::engine::error::WorkflowError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

pub const COLORBAR_FILE: &str = "colorbar.svg";

/// Colour range suggested by the data itself, for tuning the fixed range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContrastSuggestion {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapReport {
    pub name: String,
    pub points: usize,
    pub current_range: (f64, f64),
    pub csv_path: PathBuf,
    pub map_path: PathBuf,
    pub levels_path: PathBuf,
}

#[derive(Debug)]
pub struct SvetBatch {
    pub maps: Vec<FileOutcome<MapReport>>,
    pub contrast: Option<ContrastSuggestion>,
    pub colorbar_path: PathBuf,
}

/// Entry name of an SVET export: the `field`-th `_`-separated part of the file
/// stem, or the whole stem when it has fewer parts.
pub fn entry_name(path: &Path, field: usize) -> String {
    let stem = file_stem(path);
    stem.split('_')
        .nth(field)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .unwrap_or(stem)
}

/// Half the median of the per-map minima and maxima.
pub fn suggest_contrast(maps: &[ScanMap]) -> Option<ContrastSuggestion> {
    let (minima, maxima): (Vec<f64>, Vec<f64>) =
        maps.iter().filter_map(ScanMap::current_range).unzip();
    Some(ContrastSuggestion {
        min: median(&minima)? / 2.0,
        max: median(&maxima)? / 2.0,
    })
}

fn export_map(map: &ScanMap, config: &SvetConfig) -> Result<MapReport, WorkflowError> {
    let current_range = map
        .current_range()
        .ok_or_else(|| RenderError::NoData(map.name.clone()))?;

    let csv_path = config.results_dir.join(format!("{}.csv", map.name));
    ScanCsv::write_to_path(&map.points, &csv_path)?;

    let map_path = config.results_dir.join(format!("{}.svg", map.name));
    render_scan_map(&map_path, map, &config.style)?;

    let levels_path = config.results_dir.join(format!("levels_{}.svg", map.name));
    render_levels_map(&levels_path, map, &config.style, config.levels)?;

    Ok(MapReport {
        name: map.name.clone(),
        points: map.len(),
        current_range,
        csv_path,
        map_path,
        levels_path,
    })
}

/// Loads every SVET export in `input_dir`, renders each one with the shared
/// colour range and writes the common colour bar.
#[instrument(skip_all, name = "svet_workflow")]
pub fn run(
    input_dir: &Path,
    config: &SvetConfig,
    reporter: &ProgressReporter,
) -> Result<SvetBatch, WorkflowError> {
    reporter.report(Progress::PhaseStart {
        name: "Loading Scans",
    });
    ensure_results_dir(&config.results_dir)?;
    let files = list_csv_files(input_dir)?;

    let mut seen = HashSet::new();
    let loaded: Vec<(PathBuf, String, Result<ScanMap, WorkflowError>)> = files
        .into_iter()
        .map(|path| {
            let name = entry_name(&path, config.name_field);
            if !seen.insert(name.clone()) {
                warn!(
                    file = %path.display(),
                    "Entry name '{name}' is shared with an earlier file; its outputs will be overwritten."
                );
            }
            let map = ScanCsv::read_from_path(&path)
                .map(|points| ScanMap::new(name.clone(), points))
                .map_err(WorkflowError::from);
            (path, name, map)
        })
        .collect();
    reporter.report(Progress::PhaseFinish);

    let maps: Vec<ScanMap> = loaded
        .iter()
        .filter_map(|(_, _, map)| map.as_ref().ok().cloned())
        .collect();
    let contrast = suggest_contrast(&maps);
    if let Some(c) = contrast {
        info!(min = c.min, max = c.max, "Suggested contrast range.");
    }

    reporter.report(Progress::PhaseStart {
        name: "Rendering Maps",
    });
    reporter.report(Progress::TaskStart {
        total: loaded.len() as u64,
    });
    let outcomes: Vec<FileOutcome<MapReport>> = loaded
        .into_iter()
        .map(|(path, name, map)| {
            let result = map.and_then(|m| export_map(&m, config));
            if let Err(e) = &result {
                warn!(file = %path.display(), "Skipping {name}: {e}");
            }
            reporter.report(Progress::TaskIncrement { item: name.clone() });
            FileOutcome { path, name, result }
        })
        .collect();
    reporter.report(Progress::TaskFinish);
    require_any_success(&outcomes)?;

    let colorbar_path = config.results_dir.join(COLORBAR_FILE);
    render_colorbar(&colorbar_path, &config.style, &config.colorbar_label)?;
    reporter.report(Progress::PhaseFinish);

    info!(
        rendered = outcomes.iter().filter(|o| o.is_ok()).count(),
        total = outcomes.len(),
        "SVET maps written."
    );
    Ok(SvetBatch {
        maps: outcomes,
        contrast,
        colorbar_path,
    })
}
