use crate::core::io::traits::{DataFile, WritableDataFile};
use crate::core::models::scan::ScanPoint;
use serde::Deserialize;
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid value in column '{column}' on data row {row} (value: '{value}')")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("Scan has {found} data rows; at least 3 are required")]
    TooFewRows { found: usize },
}

#[derive(Debug, Deserialize)]
struct RawScanRow {
    #[serde(rename = "X")]
    x: String,
    #[serde(rename = "Y")]
    y: String,
    #[serde(rename = "YPSDInPh_uApsqcm")]
    current: String,
}

/// SVET exports with `X`, `Y` and `YPSDInPh_uApsqcm` columns.
///
/// The first and last data rows of every export are instrument artefacts and
/// are dropped before the values are parsed.
pub struct ScanCsv;

fn parse_cell(value: &str, row: usize, column: &'static str) -> Result<f64, ScanFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| ScanFileError::InvalidValue {
            row,
            column,
            value: value.to_string(),
        })
}

impl DataFile for ScanCsv {
    type Data = Vec<ScanPoint>;
    type Error = ScanFileError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Data, Self::Error> {
        let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let rows = csv_reader
            .deserialize::<RawScanRow>()
            .collect::<Result<Vec<_>, _>>()?;

        if rows.len() < 3 {
            return Err(ScanFileError::TooFewRows { found: rows.len() });
        }

        let last = rows.len() - 1;
        rows.iter()
            .enumerate()
            .take(last)
            .skip(1)
            .map(|(i, raw)| {
                let row = i + 1;
                Ok(ScanPoint {
                    x: parse_cell(&raw.x, row, "X")?,
                    y: parse_cell(&raw.y, row, "Y")?,
                    current: parse_cell(&raw.current, row, "YPSDInPh_uApsqcm")?,
                })
            })
            .collect()
    }
}

impl WritableDataFile<ScanPoint> for ScanCsv {
    fn write_to(records: &[ScanPoint], writer: &mut impl Write) -> Result<(), Self::Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for record in records {
            csv_writer.serialize(record)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const EXPORT: &str = "\
Index,X,Y,Z,YPSDInPh_uApsqcm
0,,,,
1,100,200,0,-15.5
2,150,200,0,22.25
3,100,250,0,3
4,end,,,
";

    #[test]
    fn drops_first_and_last_rows() {
        let points = ScanCsv::read_from(&mut Cursor::new(EXPORT)).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(
            points[0],
            ScanPoint {
                x: 100.0,
                y: 200.0,
                current: -15.5
            }
        );
        assert_eq!(points[2].current, 3.0);
    }

    #[test]
    fn invalid_interior_value_reports_row_and_column() {
        let input = EXPORT.replace("150,200,0,22.25", "150,200,0,n/a");
        let err = ScanCsv::read_from(&mut Cursor::new(input)).unwrap_err();
        match err {
            ScanFileError::InvalidValue { row, column, value } => {
                assert_eq!(row, 3);
                assert_eq!(column, "YPSDInPh_uApsqcm");
                assert_eq!(value, "n/a");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn too_few_rows_is_rejected() {
        let input = "X,Y,YPSDInPh_uApsqcm\n1,2,3\n4,5,6\n";
        let err = ScanCsv::read_from(&mut Cursor::new(input)).unwrap_err();
        assert!(matches!(err, ScanFileError::TooFewRows { found: 2 }));
    }

    #[test]
    fn written_points_can_be_read_back_as_interior_rows() {
        let points = vec![
            ScanPoint { x: 0.0, y: 0.0, current: 0.0 },
            ScanPoint { x: 1.0, y: 2.0, current: -3.5 },
            ScanPoint { x: 9.0, y: 9.0, current: 9.0 },
        ];
        let mut out = Vec::new();
        ScanCsv::write_to(&points, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("X,Y,YPSDInPh_uApsqcm\n"));

        let reread = ScanCsv::read_from(&mut Cursor::new(text)).unwrap();
        assert_eq!(reread, vec![points[1]]);
    }
}
