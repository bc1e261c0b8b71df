use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Common interface for the input formats read by the analyses.
///
/// Implementors only parse from a buffered reader; opening files is handled by
/// the provided methods.
pub trait DataFile {
    /// The parsed content of one file.
    type Data;

    /// The error type for parsing and I/O failures.
    type Error: Error + From<io::Error>;

    /// Parses the whole content of `reader`.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is malformed or reading fails.
    fn read_from(reader: &mut impl BufRead) -> Result<Self::Data, Self::Error>;

    /// Opens `path` and parses it with [`DataFile::read_from`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or parsing fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self::Data, Self::Error> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}

/// A [`DataFile`] that can also serialize records of type `R`.
pub trait WritableDataFile<R>: DataFile {
    /// Writes `records` to `writer` in this format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    fn write_to(records: &[R], writer: &mut impl Write) -> Result<(), Self::Error>;

    /// Creates (or truncates) `path` and writes `records` to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(records: &[R], path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(records, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
