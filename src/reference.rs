//! Reference sequences.
//!
//! A reference is loaded from a single text record: the first line is a
//! header and is discarded, and every following line is concatenated (with
//! trailing whitespace removed) into one sequence. The sequence is then
//! upper-cased and transcribed (`T` becomes `U`) so that it can be compared
//! directly against called bases.

use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::{self};
use std::ops::Range;
use std::path::Path;

use flate2::read::GzDecoder;

use crate::core::nucleotide;

pub mod reader;

pub use reader::Reader;

/// The extension of gzip-compressed reference files.
const GZIP_EXTENSION: &str = "gz";

/// A transcribed reference sequence.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Reference(String);

impl Reference {
    /// Loads a reference from a buffered reader.
    ///
    /// # Examples
    ///
    /// ```
    /// use eventarray::Reference;
    ///
    /// let data = b">rna0 some description\nacgt\nACGT  \n";
    /// let reference = Reference::from_reader(&data[..])?;
    /// assert_eq!(reference.as_str(), "ACGUACGU");
    /// assert_eq!(reference.len(), 8);
    ///
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn from_reader<T>(inner: T) -> io::Result<Self>
    where
        T: BufRead,
    {
        let mut reader = Reader::new(inner);
        let mut sequence = String::new();

        for (i, result) in reader.lines().enumerate() {
            let line = result?;

            // The header.
            if i == 0 {
                continue;
            }

            nucleotide::transcribe_str_into(line.trim_end(), &mut sequence);
        }

        Ok(Self(sequence))
    }

    /// Loads a reference from a file.
    ///
    /// Files ending in `.gz` are decompressed on the fly.
    pub fn from_path<P>(path: P) -> io::Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some(GZIP_EXTENSION) => Self::from_reader(BufReader::new(GzDecoder::new(file))),
            _ => Self::from_reader(BufReader::new(file)),
        }
    }

    /// Gets the sequence as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Gets the length of the reference.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the reference is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gets the subsequence covering `range`.
    ///
    /// Returns [`None`] if the range does not fall within the reference.
    ///
    /// # Examples
    ///
    /// ```
    /// use eventarray::Reference;
    ///
    /// let reference = Reference::from(String::from("ACGUACGU"));
    /// assert_eq!(reference.slice(2..6), Some("GUAC"));
    /// assert_eq!(reference.slice(6..9), None);
    /// ```
    pub fn slice(&self, range: Range<usize>) -> Option<&str> {
        self.0.get(range)
    }
}

impl From<String> for Reference {
    /// Transcribes an already concatenated sequence.
    fn from(value: String) -> Self {
        let mut sequence = String::with_capacity(value.len());
        nucleotide::transcribe_str_into(&value, &mut sequence);
        Self(sequence)
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use tempdir::TempDir;

    use super::*;

    #[test]
    fn test_header_is_dropped() -> Result<(), Box<dyn std::error::Error>> {
        let reference = Reference::from_reader(&b">ACGT\nGGCC"[..])?;
        assert_eq!(reference.as_str(), "GGCC");
        Ok(())
    }

    #[test]
    fn test_trailing_whitespace_and_crlf() -> Result<(), Box<dyn std::error::Error>> {
        let reference = Reference::from_reader(&b">r\r\nAT \t\r\nTA\r\n"[..])?;
        assert_eq!(reference.as_str(), "AUUA");
        Ok(())
    }

    #[test]
    fn test_empty_body() -> Result<(), Box<dyn std::error::Error>> {
        let reference = Reference::from_reader(&b">only a header\n"[..])?;
        assert!(reference.is_empty());

        let reference = Reference::from_reader(&b""[..])?;
        assert!(reference.is_empty());
        Ok(())
    }

    #[test]
    fn test_from_gzipped_path() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("reference")?;
        let path = dir.path().join("ref.fa.gz");

        let mut encoder = GzEncoder::new(File::create(&path)?, Compression::default());
        encoder.write_all(b">ref\nACGT\nACGT\n")?;
        encoder.finish()?;

        let reference = Reference::from_path(&path)?;
        assert_eq!(reference.as_str(), "ACGUACGU");
        Ok(())
    }

    #[test]
    fn test_from_plain_path() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("reference")?;
        let path = dir.path().join("ref.fa");
        std::fs::write(&path, ">ref\nTTTT\n")?;

        let reference = Reference::from_path(&path)?;
        assert_eq!(reference.as_str(), "UUUU");
        Ok(())
    }
}
