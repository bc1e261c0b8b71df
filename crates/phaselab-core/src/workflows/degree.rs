use crate::core::collapse::{DegreeCalculator, DegreeSummary, summarize};
use crate::core::io::poscar::PoscarFile;
use crate::core::io::positions::load_atoms_with;
use crate::core::io::traits::DataFile;
use crate::core::models::atom::AtomRecord;
use crate::engine::config::{DegreeConfig, InputFormat};
use crate::engine::error::WorkflowError;
use crate::engine::progress::{Progress, ProgressReporter};
use std::io::BufRead;
use std::path::Path;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct DegreeAnalysis {
    /// Per-atom results in input order, indexed from 1.
    pub atoms: Vec<AtomRecord>,
    pub summary: DegreeSummary,
    /// Atoms with an axis whose raw deviation a single fold leaves out of band.
    pub out_of_band: usize,
}

/// Reads atoms in the given `format` and computes their per-atom metrics.
///
/// Plain listings go through [`load_atoms_with`]; POSCAR positions are
/// converted to fractional coordinates first.
pub fn load_records(
    reader: &mut impl BufRead,
    format: InputFormat,
    calculator: &DegreeCalculator,
) -> Result<Vec<AtomRecord>, WorkflowError> {
    Ok(match format {
        InputFormat::Plain => load_atoms_with(reader, calculator)?,
        InputFormat::Poscar => calculator.records(&PoscarFile::read_from(reader)?.positions),
    })
}

/// Summarizes already computed records and counts the out-of-band atoms.
pub fn analyze(
    atoms: Vec<AtomRecord>,
    calculator: &DegreeCalculator,
) -> Result<DegreeAnalysis, WorkflowError> {
    let summary = summarize(&atoms)?;

    let out_of_band = atoms
        .iter()
        .filter(|atom| calculator.exceeds_single_fold(&atom.position))
        .count();
    if out_of_band > 0 {
        warn!(
            out_of_band,
            fold = %calculator.fold_policy(),
            "Some atoms deviate by more than two tolerance units on at least one axis."
        );
    }

    Ok(DegreeAnalysis {
        atoms,
        summary,
        out_of_band,
    })
}

#[instrument(skip_all, name = "degree_workflow")]
pub fn run_from_reader(
    reader: &mut impl BufRead,
    config: &DegreeConfig,
    reporter: &ProgressReporter,
) -> Result<DegreeAnalysis, WorkflowError> {
    reporter.report(Progress::PhaseStart {
        name: "Reading Positions",
    });
    let calculator = DegreeCalculator::with_fold_policy(config.fold_policy);
    let atoms = load_records(reader, config.format, &calculator)?;
    reporter.report(Progress::PhaseFinish);
    info!(atoms = atoms.len(), format = %config.format, "Positions loaded.");

    reporter.report(Progress::PhaseStart {
        name: "Degree of Collapse",
    });
    let analysis = analyze(atoms, &calculator)?;
    reporter.report(Progress::PhaseFinish);

    info!(
        mean = analysis.summary.mean,
        std_dev = analysis.summary.std_dev,
        "Degree of collapse computed."
    );
    Ok(analysis)
}

/// Opens `path` and runs [`run_from_reader`] on it.
pub fn run(
    path: &Path,
    config: &DegreeConfig,
    reporter: &ProgressReporter,
) -> Result<DegreeAnalysis, WorkflowError> {
    let file = std::fs::File::open(path).map_err(|e| WorkflowError::io(path, e))?;
    let mut reader = std::io::BufReader::new(file);
    run_from_reader(&mut reader, config, reporter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collapse::{CollapseError, FoldPolicy};
    use crate::core::lattice::BETA_DELTA;
    use nalgebra::Point3;
    use std::io::{Cursor, Write};

    const TOLERANCE: f64 = 1e-6;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn plain_input_yields_per_atom_records_and_summary() {
        let input = "Ti 0.0 0.1666667 0.3333333\nTi 0.5 0.5 0.5\n";
        let analysis = run_from_reader(
            &mut Cursor::new(input),
            &DegreeConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(analysis.atoms.len(), 2);
        assert_eq!(analysis.atoms[1].index, 2);
        assert!(f64_approx_equal(analysis.summary.mean, 0.0));
        assert_eq!(analysis.summary.count, 2);
        assert_eq!(analysis.out_of_band, 0);
    }

    #[test]
    fn poscar_input_uses_direct_coordinates() {
        let input = "\
beta Ti
1.0
3.0 0.0 0.0
0.0 3.0 0.0
0.0 0.0 3.0
Ti
1
Direct
0.1666667 0.5 0.8333333
";
        let config = DegreeConfig {
            format: InputFormat::Poscar,
            ..DegreeConfig::default()
        };
        let analysis =
            run_from_reader(&mut Cursor::new(input), &config, &ProgressReporter::new()).unwrap();
        assert_eq!(analysis.atoms.len(), 1);
        assert!(f64_approx_equal(analysis.atoms[0].degree, 0.0));
    }

    #[test]
    fn empty_input_has_no_statistics() {
        let err = run_from_reader(
            &mut Cursor::new("\n\n"),
            &DegreeConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            WorkflowError::Collapse(CollapseError::EmptyInput)
        ));
    }

    #[test]
    fn malformed_line_aborts_the_run() {
        let err = run_from_reader(
            &mut Cursor::new("Ti 0.1 0.2\n"),
            &DegreeConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(err, WorkflowError::Positions(_)));
    }

    #[test]
    fn out_of_band_atoms_are_counted_under_single_fold() {
        let far = 2.5 * BETA_DELTA;
        let positions = [Point3::new(far, 0.0, 0.0), Point3::new(0.0, 0.0, 0.0)];

        let single_fold = DegreeCalculator::default();
        let single = analyze(single_fold.records(&positions), &single_fold).unwrap();
        assert_eq!(single.out_of_band, 1);
        assert!(single.atoms[0].deviation.x < 0.0);

        let periodic_fold = DegreeCalculator::with_fold_policy(FoldPolicy::Periodic);
        let periodic = analyze(periodic_fold.records(&positions), &periodic_fold).unwrap();
        assert_eq!(periodic.out_of_band, 0);
        assert!(f64_approx_equal(periodic.atoms[0].deviation.x, 0.5));
    }

    #[test]
    fn plain_records_match_the_positions_loader() {
        let input = "Ti 0.1 0.2 0.3\nNb 0.7 0.8 0.9\n";
        let calculator = DegreeCalculator::default();
        let records =
            load_records(&mut Cursor::new(input), InputFormat::Plain, &calculator).unwrap();
        let loaded = crate::core::io::positions::load_atoms(&mut Cursor::new(input)).unwrap();
        assert_eq!(records, loaded);
    }

    #[test]
    fn run_reads_from_a_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Ti 0.0 0.0 0.0").unwrap();
        let analysis = run(file.path(), &DegreeConfig::default(), &ProgressReporter::new()).unwrap();
        assert_eq!(analysis.summary.count, 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(
            &dir.path().join("missing.txt"),
            &DegreeConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(err, WorkflowError::Io { .. }));
    }
}
