use crate::core::io::traits::DataFile;
use nalgebra::{Matrix3, Point3, Vector3};
use std::io::{self, BufRead};
use thiserror::Error;

const MAX_PREALLOCATED_ATOMS: usize = 4096;

#[derive(Debug, Error)]
pub enum PoscarError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("Unexpected end of file while reading the {expected}")]
    UnexpectedEof { expected: &'static str },
    #[error("Lattice vectors are linearly dependent; cannot convert Cartesian coordinates")]
    SingularLattice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateMode {
    Direct,
    Cartesian,
}

/// A VASP structure (POSCAR/CONTCAR) reduced to what the collapse analysis needs.
#[derive(Debug, Clone, PartialEq)]
pub struct PoscarStructure {
    pub comment: String,
    /// Lattice vectors as rows, already multiplied by the scaling factor (Angstroms).
    pub lattice: Matrix3<f64>,
    /// Species names with their atom counts, in file order. Files without a
    /// species line get `"X"` placeholders.
    pub species: Vec<(String, usize)>,
    /// The coordinate mode declared in the file.
    pub mode: CoordinateMode,
    /// Fractional coordinates of every atom, in file order.
    pub positions: Vec<Point3<f64>>,
}

impl PoscarStructure {
    pub fn atom_count(&self) -> usize {
        self.positions.len()
    }
}

pub struct PoscarFile;

struct LineCursor<L> {
    lines: L,
    line_num: usize,
}

impl<L: Iterator<Item = io::Result<String>>> LineCursor<L> {
    fn advance(&mut self, expected: &'static str) -> Result<(usize, String), PoscarError> {
        match self.lines.next() {
            Some(line) => {
                self.line_num += 1;
                Ok((self.line_num, line?))
            }
            None => Err(PoscarError::UnexpectedEof { expected }),
        }
    }
}

fn parse_floats(line: &str, line_num: usize, count: usize) -> Result<Vec<f64>, PoscarError> {
    let fields: Vec<&str> = line.split_whitespace().take(count).collect();
    if fields.len() < count {
        return Err(PoscarError::Parse {
            line: line_num,
            message: format!("expected {} numbers, found {}", count, fields.len()),
        });
    }
    fields
        .iter()
        .map(|f| match f.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(v),
            Ok(_) => Err(PoscarError::Parse {
                line: line_num,
                message: format!("number '{}' is not finite", f),
            }),
            Err(_) => Err(PoscarError::Parse {
                line: line_num,
                message: format!("invalid number '{}'", f),
            }),
        })
        .collect()
}

fn parse_counts(line: &str, line_num: usize) -> Result<Vec<usize>, PoscarError> {
    line.split_whitespace()
        .map(|f| {
            f.parse::<usize>().map_err(|_| PoscarError::Parse {
                line: line_num,
                message: format!("invalid atom count '{}'", f),
            })
        })
        .collect()
}

fn starts_with_any(line: &str, prefixes: &[char]) -> bool {
    line.trim_start()
        .chars()
        .next()
        .is_some_and(|c| prefixes.contains(&c))
}

impl DataFile for PoscarFile {
    type Data = PoscarStructure;
    type Error = PoscarError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Data, Self::Error> {
        let mut cursor = LineCursor {
            lines: reader.lines(),
            line_num: 0,
        };

        let (_, comment) = cursor.advance("comment line")?;

        let (scale_line_num, scale_line) = cursor.advance("scaling factor")?;
        let scale = parse_floats(&scale_line, scale_line_num, 1)?[0];

        let mut rows = Vec::with_capacity(9);
        for _ in 0..3 {
            let (num, line) = cursor.advance("lattice vectors")?;
            rows.extend(parse_floats(&line, num, 3)?);
        }
        let unscaled = Matrix3::from_row_slice(&rows);

        // A negative scaling factor is the target cell volume.
        let scale = if scale < 0.0 {
            let volume = unscaled.determinant().abs();
            if volume <= f64::EPSILON {
                return Err(PoscarError::SingularLattice);
            }
            (scale.abs() / volume).cbrt()
        } else {
            scale
        };
        let lattice = unscaled * scale;

        let (num, line) = cursor.advance("species or counts line")?;
        let first_is_count = line
            .split_whitespace()
            .next()
            .is_some_and(|f| f.parse::<usize>().is_ok());
        let (names, counts, num) = if first_is_count {
            let counts = parse_counts(&line, num)?;
            (vec!["X".to_string(); counts.len()], counts, num)
        } else {
            let names: Vec<String> = line.split_whitespace().map(str::to_string).collect();
            let (count_num, count_line) = cursor.advance("atom counts")?;
            (names, parse_counts(&count_line, count_num)?, count_num)
        };
        let species: Vec<(String, usize)> = names
            .into_iter()
            .chain(std::iter::repeat("X".to_string()))
            .zip(counts.iter().copied())
            .collect();
        let total = counts
            .iter()
            .try_fold(0usize, |acc, &n| acc.checked_add(n))
            .ok_or_else(|| PoscarError::Parse {
                line: num,
                message: "total atom count overflows".to_string(),
            })?;

        let (_, mut mode_line) = cursor.advance("coordinate mode")?;
        if starts_with_any(&mode_line, &['s', 'S']) {
            mode_line = cursor.advance("coordinate mode")?.1;
        }
        let mode = if starts_with_any(&mode_line, &['c', 'C', 'k', 'K']) {
            CoordinateMode::Cartesian
        } else {
            CoordinateMode::Direct
        };

        let to_fractional = match mode {
            CoordinateMode::Direct => None,
            CoordinateMode::Cartesian => Some(
                lattice
                    .transpose()
                    .try_inverse()
                    .ok_or(PoscarError::SingularLattice)?,
            ),
        };

        // Counts come from the file; the position lines decide how many atoms exist.
        let mut positions = Vec::with_capacity(total.min(MAX_PREALLOCATED_ATOMS));
        for _ in 0..total {
            let (num, line) = cursor.advance("atomic positions")?;
            let v = parse_floats(&line, num, 3)?;
            let coords = Vector3::new(v[0], v[1], v[2]);
            let fractional = match &to_fractional {
                None => coords,
                Some(inverse) => inverse * (coords * scale),
            };
            positions.push(Point3::from(fractional));
        }

        Ok(PoscarStructure {
            comment: comment.trim().to_string(),
            lattice,
            species,
            mode,
            positions,
        })
    }
}
