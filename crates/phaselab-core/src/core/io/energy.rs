use crate::core::io::traits::{DataFile, WritableDataFile};
use crate::core::models::energy::{EnergySample, FittedSample};
use std::io::{self, BufRead, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnergyFileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("No energy samples found (expected columns 'r' and 'u')")]
    Empty,
}

/// CSV files of pair energies with header columns `r` and `u`.
///
/// Additional columns are ignored on read. Fitted results are written as
/// `r,u,u_calc`.
pub struct EnergyCsv;

impl DataFile for EnergyCsv {
    type Data = Vec<EnergySample>;
    type Error = EnergyFileError;

    fn read_from(reader: &mut impl BufRead) -> Result<Self::Data, Self::Error> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let samples = csv_reader
            .deserialize::<EnergySample>()
            .collect::<Result<Vec<_>, _>>()?;
        if samples.is_empty() {
            return Err(EnergyFileError::Empty);
        }
        Ok(samples)
    }
}

impl WritableDataFile<FittedSample> for EnergyCsv {
    fn write_to(records: &[FittedSample], writer: &mut impl Write) -> Result<(), Self::Error> {
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

    #[test]
    fn reads_r_and_u_columns_ignoring_extras() {
        let input = "pair,r,u\nO_O,2.5,0.012\nO_O, 3.0 ,-0.004\n";
        let samples = EnergyCsv::read_from(&mut Cursor::new(input)).unwrap();
        assert_eq!(
            samples,
            vec![
                EnergySample { r: 2.5, u: 0.012 },
                EnergySample { r: 3.0, u: -0.004 },
            ]
        );
    }

    #[test]
    fn header_only_file_is_empty() {
        let err = EnergyCsv::read_from(&mut Cursor::new("r,u\n")).unwrap_err();
        assert!(matches!(err, EnergyFileError::Empty));
    }

    #[test]
    fn missing_column_is_a_csv_error() {
        let err = EnergyCsv::read_from(&mut Cursor::new("r,energy\n1.0,2.0\n")).unwrap_err();
        assert!(matches!(err, EnergyFileError::Csv(_)));
    }

    #[test]
    fn writes_fitted_samples_with_header() {
        let mut out = Vec::new();
        EnergyCsv::write_to(
            &[FittedSample {
                r: 3.0,
                u: -0.01,
                u_calc: -0.011,
            }],
            &mut out,
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("r,u,u_calc"));
        assert_eq!(lines.next(), Some("3.0,-0.01,-0.011"));
    }

    #[test]
    fn write_to_path_creates_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fit.csv");
        EnergyCsv::write_to_path(
            &[FittedSample {
                r: 1.0,
                u: 0.0,
                u_calc: 0.0,
            }],
            &path,
        )
        .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("r,u,u_calc"));
    }
}
