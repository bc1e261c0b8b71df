use super::error::WorkflowError;
use super::progress::{Progress, ProgressReporter};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Result of processing one input file of a batch.
#[derive(Debug)]
pub struct FileOutcome<T> {
    pub path: PathBuf,
    pub name: String,
    pub result: Result<T, WorkflowError>,
}

impl<T> FileOutcome<T> {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Creates `dir` (and its parents) if it does not exist yet.
pub fn ensure_results_dir(dir: &Path) -> Result<(), WorkflowError> {
    fs::create_dir_all(dir).map_err(|e| WorkflowError::io(dir, e))
}

/// Every `*.csv` file directly inside `dir`, sorted by file name.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>, WorkflowError> {
    let entries = fs::read_dir(dir).map_err(|e| WorkflowError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| WorkflowError::io(dir, e))?.path();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }

    if files.is_empty() {
        return Err(WorkflowError::NoInputFiles {
            dir: dir.to_path_buf(),
        });
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    debug!(count = files.len(), dir = %dir.display(), "Collected input files.");
    Ok(files)
}

/// The file name without its extension, or the whole path if it has none.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Runs `work` on every file, in parallel when the `parallel` feature is on.
///
/// Outcomes keep the order of `paths`. Failures are logged and returned
/// alongside the successes.
pub fn process_files<T, F>(
    paths: &[PathBuf],
    reporter: &ProgressReporter,
    work: F,
) -> Vec<FileOutcome<T>>
where
    T: Send,
    F: Fn(&Path, &str) -> Result<T, WorkflowError> + Sync + Send,
{
    reporter.report(Progress::TaskStart {
        total: paths.len() as u64,
    });

    let run_one = |path: &PathBuf| {
        let name = file_stem(path);
        let result = work(path, &name);
        if let Err(e) = &result {
            warn!(file = %path.display(), "Skipping {name}: {e}");
        }
        reporter.report(Progress::TaskIncrement { item: name.clone() });
        FileOutcome {
            path: path.clone(),
            name,
            result,
        }
    };

    #[cfg(not(feature = "parallel"))]
    let outcomes: Vec<FileOutcome<T>> = paths.iter().map(run_one).collect();

    #[cfg(feature = "parallel")]
    let outcomes: Vec<FileOutcome<T>> = paths.par_iter().map(run_one).collect();

    reporter.report(Progress::TaskFinish);
    outcomes
}

/// Fails with [`WorkflowError::AllFailed`] when no outcome succeeded.
pub fn require_any_success<T>(outcomes: &[FileOutcome<T>]) -> Result<(), WorkflowError> {
    if outcomes.is_empty() || outcomes.iter().any(FileOutcome::is_ok) {
        return Ok(());
    }
    let first = outcomes
        .iter()
        .find_map(|o| o.result.as_ref().err().map(|e| format!("{}: {e}", o.name)))
        .unwrap_or_default();
    Err(WorkflowError::AllFailed {
        count: outcomes.len(),
        first,
    })
}
