//! Buffered sources over files and other readers.

use super::{ByteSource, SourceError};
use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read, Stdin};
use std::path::Path;

/// Byte source over any [`Read`] implementation, buffered.
pub struct ReaderSource<R> {
    reader: BufReader<R>,
    /// Human-readable origin used in error messages.
    origin: String,
    offset: u64,
}

/// Byte source over a file on disk.
pub type FileSource = ReaderSource<File>;

impl<R: Read> ReaderSource<R> {
    /// Wraps `reader`; `origin` names it in error messages.
    pub fn new(reader: R, origin: impl Into<String>) -> Self {
        Self {
            reader: BufReader::new(reader),
            origin: origin.into(),
            offset: 0,
        }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl ReaderSource<File> {
    /// Opens `path` for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "Opened input file");
        Ok(Self::new(file, path.display().to_string()))
    }
}

impl ReaderSource<Stdin> {
    /// Source reading standard input.
    pub fn stdin() -> Self {
        Self::new(io::stdin(), "<stdin>")
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    fn next_byte(&mut self) -> Result<Option<u8>, SourceError> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.offset += 1;
                    return Ok(Some(byte[0]));
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(SourceError::Read {
                        origin: self.origin.clone(),
                        offset: self.offset,
                        source,
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::Other, "device unplugged"))
        }
    }

    #[test]
    fn test_reader_source_counts_offset() {
        let mut source = ReaderSource::new(Cursor::new(vec![0xAAu8, 0x55]), "cursor");
        assert_eq!(source.next_byte().unwrap(), Some(0xAA));
        assert_eq!(source.next_byte().unwrap(), Some(0x55));
        assert_eq!(source.next_byte().unwrap(), None);
        assert_eq!(source.offset(), 2);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let path = std::env::temp_dir().join("bit-entropy-definitely-missing.bin");
        let err = match FileSource::open(&path) {
            Err(e) => e,
            Ok(_) => panic!("opening a missing file should fail"),
        };
        assert!(matches!(err, SourceError::Open { .. }));
        assert!(err.to_string().contains("bit-entropy-definitely-missing.bin"));
    }

    #[test]
    fn test_read_failure_is_reported() {
        let mut source = ReaderSource::new(FailingReader, "flaky");
        let err = source.next_byte().unwrap_err();
        assert!(matches!(err, SourceError::Read { offset: 0, .. }));
        assert!(err.to_string().contains("flaky"));
    }
}
