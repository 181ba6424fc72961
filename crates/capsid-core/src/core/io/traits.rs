use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Defines the interface for reading and writing the pipeline's tabular
/// artifacts.
///
/// Implementors handle one file layout each; the path-based helpers only
/// open the file and delegate to the stream-based methods.
pub trait TabularFile {
    /// The in-memory value a file holds.
    type Record;

    /// The error type for I/O operations.
    type Error: Error + From<io::Error>;

    /// Reads a record from a byte stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream cannot be read or its layout is
    /// unusable as a whole. Individual malformed cells are tolerated where
    /// the layout allows it.
    fn read_from(reader: impl Read) -> Result<Self::Record, Self::Error>;

    /// Writes a record to a byte stream.
    fn write_to(record: &Self::Record, writer: impl Write) -> Result<(), Self::Error>;

    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self::Record, Self::Error> {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file))
    }

    fn write_to_path<P: AsRef<Path>>(record: &Self::Record, path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        Self::write_to(record, &mut writer)?;
        writer.flush()?;
        Ok(())
    }
}
