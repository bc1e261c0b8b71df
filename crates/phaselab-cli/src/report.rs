use crate::error::Result;
use phaselab::engine::batch::FileOutcome;
use phaselab::workflows::degree::DegreeAnalysis;
use phaselab::workflows::lj_fit::FitReport;
use phaselab::workflows::svet::SvetBatch;
use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::debug;

pub const TEXT_REPORT: &str = "report.txt";
pub const HTML_REPORT: &str = "report.html";

const REPORT_START: &str = "--- report log ---";
const REPORT_END: &str = "--- end of report ---";

/// Per-atom lines (`index x y z degree`) followed by the summary.
pub fn degree_report(analysis: &DegreeAnalysis, include_atoms: bool) -> String {
    let mut out = String::new();
    if include_atoms {
        for atom in &analysis.atoms {
            let _ = writeln!(
                out,
                "{} {} {} {} {}",
                atom.index,
                atom.x(),
                atom.y(),
                atom.z(),
                atom.degree
            );
        }
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "The final degree of collapse is: {} +/- {}",
        analysis.summary.mean, analysis.summary.std_dev
    );
    out.push_str("the degree of collapse goes from 0 (beta) to 0.66 (fully-collapsed omega)\n");
    out
}

pub fn fit_report_lines(outcomes: &[FileOutcome<FitReport>]) -> Vec<String> {
    let mut lines = vec![REPORT_START.to_string()];
    for outcome in outcomes {
        lines.push("---".to_string());
        lines.push(format!("Data for {}", outcome.name));
        match &outcome.result {
            Ok(report) => {
                lines.push(format!(
                    "Parameters from the fit: e = {} s = {}",
                    report.fit.params.epsilon, report.fit.params.sigma
                ));
                lines.push(format!("MSE: {}", report.fit.mse));
            }
            Err(e) => lines.push(format!("Fit failed: {e}")),
        }
        lines.push("---".to_string());
    }
    lines.push(REPORT_END.to_string());
    lines
}

pub fn svet_report_lines(batch: &SvetBatch) -> Vec<String> {
    let mut lines = vec![REPORT_START.to_string()];
    if let Some(contrast) = batch.contrast {
        lines.push(format!(
            "Colorscale should be ranged from i = {} to {}",
            contrast.min, contrast.max
        ));
    }
    for outcome in &batch.maps {
        match &outcome.result {
            Ok(map) => {
                lines.push(format!("---Cell map for {} saved", map.name));
                lines.push(format!("---Levels map for {} saved", map.name));
            }
            Err(e) => lines.push(format!("---Skipped {}: {e}", outcome.name)),
        }
    }
    lines.push(format!(
        "Colour bar saved to {}",
        batch.colorbar_path.display()
    ));
    lines.push(REPORT_END.to_string());
    lines
}

/// Appends one report block to `path`, creating the file if needed.
pub fn append_report(path: &Path, lines: &[String], separator: &str) -> Result<()> {
    debug!("Appending report to {:?}", path);
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "\n{}", lines.join(separator))?;
    Ok(())
}

pub fn write_text(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use phaselab::core::collapse::DegreeSummary;
    use phaselab::core::fitting::lennard_jones::{LennardJones, LjFit};
    use phaselab::core::models::atom::AtomRecord;
    use phaselab::engine::error::WorkflowError;
    use phaselab::workflows::svet::ContrastSuggestion;
    use nalgebra::{Point3, Vector3};
    use std::path::PathBuf;

    fn analysis() -> DegreeAnalysis {
        DegreeAnalysis {
            atoms: vec![AtomRecord {
                index: 1,
                position: Point3::new(0.0, 0.5, 0.25),
                deviation: Vector3::new(0.0, 0.0, 0.75),
                degree: 0.25,
            }],
            summary: DegreeSummary {
                mean: 0.25,
                std_dev: 0.0,
                count: 1,
            },
            out_of_band: 0,
        }
    }

    fn fit_outcome(name: &str) -> FileOutcome<FitReport> {
        FileOutcome {
            path: PathBuf::from(format!("{name}.csv")),
            name: name.to_string(),
            result: Ok(FitReport {
                name: name.to_string(),
                samples_total: 10,
                samples_used: 8,
                fit: LjFit {
                    params: LennardJones {
                        epsilon: 0.5,
                        sigma: 2.75,
                    },
                    mse: 0.125,
                    fitted: Vec::new(),
                    evaluations: 12,
                },
                csv_path: PathBuf::from(format!("results/{name}.csv")),
                chart_path: PathBuf::from(format!("results/{name}.svg")),
            }),
        }
    }

    #[test]
    fn degree_report_lists_atoms_then_summary() {
        let text = degree_report(&analysis(), true);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "1 0 0.5 0.25 0.25");
        assert_eq!(lines[2], "The final degree of collapse is: 0.25 +/- 0");
        assert!(lines[3].starts_with("the degree of collapse goes from 0 (beta)"));
    }

    #[test]
    fn degree_report_can_omit_atoms() {
        let text = degree_report(&analysis(), false);
        assert!(text.starts_with("The final degree of collapse is:"));
    }

    #[test]
    fn fit_report_records_parameters_and_failures() {
        let failed = FileOutcome {
            path: PathBuf::from("bad.csv"),
            name: "bad".to_string(),
            result: Err(WorkflowError::NoInputFiles {
                dir: PathBuf::from("bad"),
            }),
        };
        let lines = fit_report_lines(&[fit_outcome("Ti_Ti"), failed]);

        assert_eq!(lines.first().unwrap(), "--- report log ---");
        assert!(lines.contains(&"Data for Ti_Ti".to_string()));
        assert!(lines.contains(&"Parameters from the fit: e = 0.5 s = 2.75".to_string()));
        assert!(lines.contains(&"MSE: 0.125".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("Fit failed:")));
        assert_eq!(lines.last().unwrap(), "--- end of report ---");
    }

    #[test]
    fn svet_report_includes_contrast_suggestion() {
        let batch = SvetBatch {
            maps: Vec::new(),
            contrast: Some(ContrastSuggestion {
                min: -100.0,
                max: 25.0,
            }),
            colorbar_path: PathBuf::from("results/colorbar.svg"),
        };
        let lines = svet_report_lines(&batch);
        assert_eq!(lines[1], "Colorscale should be ranged from i = -100 to 25");
    }

    #[test]
    fn reports_are_appended_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TEXT_REPORT);
        let lines = fit_report_lines(&[fit_outcome("a")]);

        append_report(&path, &lines, "\n").unwrap();
        append_report(&path, &lines, "\n").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("--- report log ---").count(), 2);
    }

    #[test]
    fn html_report_uses_line_breaks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(HTML_REPORT);
        append_report(&path, &["one".to_string(), "two".to_string()], "<br />\n").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("one<br />\ntwo"));
    }
}
