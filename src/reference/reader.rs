//! A line-oriented reader for reference sequence records.

use std::io::BufRead;
use std::io::{self};
use std::iter;

/// The new line character.
const NEW_LINE: char = '\n';

/// The carriage return character.
const CARRIAGE_RETURN: char = '\r';

/// A reference sequence record reader.
///
/// A record is a single header line followed by any number of sequence lines.
#[derive(Clone, Debug)]
pub struct Reader<T>(T)
where
    T: BufRead;

impl<T> Reader<T>
where
    T: BufRead,
{
    /// Creates a reference record reader.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b">seq0\nACGT\nACGT";
    /// let reader = eventarray::reference::Reader::new(&data[..]);
    /// ```
    pub fn new(inner: T) -> Self {
        Self::from(inner)
    }

    /// Gets a reference to the inner reader.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b">seq0\nACGT\nACGT";
    /// let reader = eventarray::reference::Reader::new(&data[..]);
    /// assert_eq!(reader.inner(), &&data[..]);
    /// ```
    pub fn inner(&self) -> &T {
        &self.0
    }

    /// Consumes self and returns the inner reader.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b">seq0\nACGT\nACGT";
    /// let mut reader = eventarray::reference::Reader::new(&data[..]);
    ///
    /// let mut buffer = String::new();
    /// reader.read_line_raw(&mut buffer)?;
    ///
    /// let rest = reader.into_inner();
    /// assert_eq!(rest, b"ACGT\nACGT");
    ///
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn into_inner(self) -> T {
        self.0
    }

    /// Reads a raw, textual line from the underlying reader.
    ///
    /// Line terminators (`\n` and `\r\n`) are stripped.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::io;
    ///
    /// let data = b">seq0\r\nACGT\n";
    /// let mut reader = eventarray::reference::Reader::new(&data[..]);
    ///
    /// let mut buffer = String::new();
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 7);
    /// assert_eq!(buffer, ">seq0");
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 5);
    /// assert_eq!(buffer, "ACGT");
    ///
    /// assert_eq!(reader.read_line_raw(&mut buffer)?, 0);
    ///
    /// # Ok::<(), io::Error>(())
    /// ```
    pub fn read_line_raw(&mut self, buffer: &mut String) -> io::Result<usize> {
        read_line(&mut self.0, buffer)
    }

    /// Returns an iterator over the raw lines in the underlying reader.
    pub fn lines(&mut self) -> impl Iterator<Item = io::Result<String>> + '_ {
        let mut buffer = String::new();

        iter::from_fn(move || {
            match self.read_line_raw(&mut buffer) {
                Ok(0) => None,
                Ok(_) => Some(Ok(buffer.clone())),
                Err(e) => Some(Err(e)),
            }
        })
    }
}

impl<T> From<T> for Reader<T>
where
    T: BufRead,
{
    fn from(inner: T) -> Self {
        Self(inner)
    }
}

/// Reads a line from a buffered reader.
fn read_line<T>(reader: &mut T, buffer: &mut String) -> io::Result<usize>
where
    T: BufRead,
{
    buffer.clear();

    match reader.read_line(buffer) {
        Ok(0) => Ok(0),
        Ok(n) => {
            if buffer.ends_with(NEW_LINE) {
                buffer.pop();

                if buffer.ends_with(CARRIAGE_RETURN) {
                    buffer.pop();
                }
            }

            Ok(n)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_read_line() {
        let data = b"hello\r\nworld!";
        let mut cursor = io::Cursor::new(data);

        let mut buffer = String::new();
        let len = read_line(&mut cursor, &mut buffer).unwrap();
        assert_eq!(buffer, "hello");
        assert_eq!(len, 7);

        let len = read_line(&mut cursor, &mut buffer).unwrap();
        assert_eq!(buffer, "world!");
        assert_eq!(len, 6);
    }

    #[test]
    fn test_lines() -> Result<(), Box<dyn std::error::Error>> {
        let data = b">seq0\nAC\n\nGT";
        let mut reader = Reader::new(&data[..]);
        let lines = reader.lines().collect::<io::Result<Vec<_>>>()?;
        assert_eq!(lines, vec![">seq0", "AC", "", "GT"]);
        Ok(())
    }
}
