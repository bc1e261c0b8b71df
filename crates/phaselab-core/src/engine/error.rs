use std::path::PathBuf;
use thiserror::Error;

use super::config::ConfigError;
use crate::core::collapse::CollapseError;
use crate::core::fitting::levenberg_marquardt::FitError;
use crate::core::io::energy::EnergyFileError;
use crate::core::io::poscar::PoscarError;
use crate::core::io::positions::PositionsError;
use crate::core::io::scan::ScanFileError;
use crate::core::plot::render::RenderError;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read positions: {0}")]
    Positions(#[from] PositionsError),

    #[error("Failed to read structure: {0}")]
    Poscar(#[from] PoscarError),

    #[error("Failed to read energy data: {0}")]
    EnergyFile(#[from] EnergyFileError),

    #[error("Failed to read scan data: {0}")]
    ScanFile(#[from] ScanFileError),

    #[error(transparent)]
    Collapse(#[from] CollapseError),

    #[error("Fit failed: {0}")]
    Fit(#[from] FitError),

    #[error("Rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No CSV files found in {dir}")]
    NoInputFiles { dir: PathBuf },

    #[error("All {count} input files failed; first error: {first}")]
    AllFailed { count: usize, first: String },
}

impl WorkflowError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
