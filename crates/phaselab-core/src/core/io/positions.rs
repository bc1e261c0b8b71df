use crate::core::collapse::DegreeCalculator;
use crate::core::io::traits::DataFile;
use crate::core::models::atom::AtomRecord;
use nalgebra::Point3;
use std::io::{self, BufRead};
use thiserror::Error;

const MIN_FIELDS: usize = 4;
const AXES: [char; 3] = ['x', 'y', 'z'];

#[derive(Debug, Error)]
pub enum PositionsError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: PositionsParseErrorKind,
    },
}

#[derive(Debug, Error, PartialEq)]
pub enum PositionsParseErrorKind {
    #[error("Expected at least 4 fields (label x y z), found {found}")]
    TooFewFields { found: usize },
    #[error("Invalid float for the {axis} coordinate (value: '{value}')")]
    InvalidFloat { axis: char, value: String },
    #[error("Non-finite value for the {axis} coordinate (value: '{value}')")]
    NonFinite { axis: char, value: String },
}

/// A coordinate line as read from a positions file.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionLine {
    /// 1-based line number in the source.
    pub line: usize,
    pub label: String,
    pub position: Point3<f64>,
}

/// Plain atomic-position listings: one atom per line, `label x y z [...]`.
///
/// Fields are separated by any run of whitespace. Blank lines are skipped;
/// every other line must carry a label and three fractional coordinates.
pub struct PositionsFile;

impl PositionsFile {
    fn parse_line(line: &str, line_num: usize) -> Result<PositionLine, PositionsError> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < MIN_FIELDS {
            return Err(PositionsError::Parse {
                line: line_num,
                kind: PositionsParseErrorKind::TooFewFields {
                    found: fields.len(),
                },
            });
        }

        let mut coords = [0.0; 3];
        for (i, axis) in AXES.iter().enumerate() {
            let raw = fields[i + 1];
            let kind = match raw.parse::<f64>() {
                Ok(v) if v.is_finite() => {
                    coords[i] = v;
                    continue;
                }
                Ok(_) => PositionsParseErrorKind::NonFinite {
                    axis: *axis,
                    value: raw.to_string(),
                },
                Err(_) => PositionsParseErrorKind::InvalidFloat {
                    axis: *axis,
                    value: raw.to_string(),
                },
            };
            return Err(PositionsError::Parse {
                line: line_num,
                kind,
            });
        }

        Ok(PositionLine {
            line: line_num,
            label: fields[0].to_string(),
            position: Point3::from(coords),
        })
    }
}

impl DataFile for PositionsFile {
    type Data = Vec<PositionLine>;
    type Error = PositionsError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Data, Self::Error> {
        let mut entries = Vec::new();
        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            if line.trim().is_empty() {
                continue;
            }
            entries.push(Self::parse_line(&line, line_num + 1)?);
        }
        Ok(entries)
    }
}

/// Reads every atom from `reader` and computes its collapse metrics against the
/// beta lattice.
pub fn load_atoms(reader: &mut impl BufRead) -> Result<Vec<AtomRecord>, PositionsError> {
    load_atoms_with(reader, &DegreeCalculator::default())
}

/// Like [`load_atoms`], with an explicit calculator.
///
/// Indices are assigned 1, 2, 3, ... in file order.
pub fn load_atoms_with(
    reader: &mut impl BufRead,
    calculator: &DegreeCalculator,
) -> Result<Vec<AtomRecord>, PositionsError> {
    let positions: Vec<Point3<f64>> = PositionsFile::read_from(reader)?
        .into_iter()
        .map(|entry| entry.position)
        .collect();
    Ok(calculator.records(&positions))
}
