//! Dense, memory-mapped `f64` matrices.
//!
//! A matrix file holds `rows * columns` native-endian `f64` values in
//! row-major order with no header, which is the layout written by
//! `numpy.memmap(path, dtype=float, shape=(rows, columns))`. Cells that were
//! never written hold NaN.
//!
//! [`Matrix`] creates and fills a matrix file; [`View`] maps an existing file
//! for reading.

use std::fs::File;
use std::fs::OpenOptions;
use std::io;
use std::ops::Range;
use std::path::Path;

use bytemuck::cast_slice;
use bytemuck::cast_slice_mut;
use memmap2::Mmap;
use memmap2::MmapMut;

/// The size of a single cell in bytes.
pub const CELL_SIZE: usize = std::mem::size_of::<f64>();

/// The value of an unmeasured cell.
pub const MISSING: f64 = f64::NAN;

////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////

/// An error related to a [`Matrix`] or a [`View`].
#[derive(Debug)]
pub enum Error {
    /// An I/O error.
    Io(io::Error),

    /// The requested shape does not fit in memory addresses.
    TooLarge(usize, usize),

    /// A row index past the last row.
    RowOutOfBounds {
        /// The requested row.
        row: usize,

        /// The number of rows.
        rows: usize,
    },

    /// A column span that does not fall within the matrix.
    ColumnsOutOfBounds {
        /// The requested span (the start may be negative).
        span: Range<i64>,

        /// The number of columns.
        columns: usize,
    },

    /// The file size is not a whole number of rows.
    Truncated {
        /// The size of the file in bytes.
        bytes: u64,

        /// The number of columns of each row.
        columns: usize,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::TooLarge(rows, columns) => {
                write!(f, "a matrix of shape ({rows}, {columns}) is too large")
            }
            Error::RowOutOfBounds { row, rows } => {
                write!(f, "row {row} is out of bounds for {rows} rows")
            }
            Error::ColumnsOutOfBounds { span, columns } => write!(
                f,
                "columns {}:{} are out of bounds for {columns} columns",
                span.start, span.end
            ),
            Error::Truncated { bytes, columns } => write!(
                f,
                "file size ({bytes} bytes) is not a whole number of {columns}-column rows"
            ),
        }
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(value: io::Error) -> Self {
        Error::Io(value)
    }
}

/// A [`Result`](std::result::Result) with an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Computes the size in bytes of a matrix with the given shape.
fn size_of_shape(rows: usize, columns: usize) -> Result<usize> {
    rows.checked_mul(columns)
        .and_then(|cells| cells.checked_mul(CELL_SIZE))
        .ok_or(Error::TooLarge(rows, columns))
}

////////////////////////////////////////////////////////////////////////////////////////
// Matrix
////////////////////////////////////////////////////////////////////////////////////////

/// A writable, memory-mapped matrix.
///
/// The shape is fixed at creation.
#[derive(Debug)]
pub struct Matrix {
    /// The mapped cells, or [`None`] for an empty matrix (which cannot be
    /// mapped).
    mmap: Option<MmapMut>,

    /// The number of rows.
    rows: usize,

    /// The number of columns.
    columns: usize,
}

impl Matrix {
    /// Creates (or truncates) the file at `path` and maps a matrix of the
    /// given shape onto it, with every cell set to [`MISSING`].
    ///
    /// # Examples
    ///
    /// ```
    /// use eventarray::matrix::Matrix;
    ///
    /// let path = std::env::temp_dir().join("eventarray-matrix-doctest.dat");
    /// let mut matrix = Matrix::create(&path, 2, 4)?;
    /// matrix.write(1, 1, &[1.0, 2.0])?;
    /// matrix.flush()?;
    ///
    /// assert!(matrix.row(0).iter().all(|v| v.is_nan()));
    /// assert_eq!(matrix.row(1)[1..3], [1.0, 2.0]);
    /// assert!(matrix.write(0, 3, &[1.0, 2.0]).is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn create(path: impl AsRef<Path>, rows: usize, columns: usize) -> Result<Self> {
        let size = size_of_shape(rows, columns)?;

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(size as u64)?;

        let mmap = match size {
            0 => None,
            // SAFETY: the file was just created and is exclusively owned by
            // this matrix for as long as it is mapped.
            _ => {
                let mut mmap = unsafe { MmapMut::map_mut(&file)? };
                cast_slice_mut::<u8, f64>(&mut mmap[..]).fill(MISSING);
                Some(mmap)
            }
        };

        Ok(Self {
            mmap,
            rows,
            columns,
        })
    }

    /// Gets the number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Gets the number of columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Gets the shape as `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.columns)
    }

    /// Gets all cells in row-major order.
    pub fn cells(&self) -> &[f64] {
        match &self.mmap {
            Some(mmap) => cast_slice(&mmap[..]),
            None => &[],
        }
    }

    /// Gets a row.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    pub fn row(&self, row: usize) -> &[f64] {
        assert!(row < self.rows, "row {row} out of bounds");
        &self.cells()[row * self.columns..(row + 1) * self.columns]
    }

    /// Writes `values` into `row`, starting at column `start`.
    ///
    /// Nothing is written unless the whole span `start..start + values.len()`
    /// falls within the matrix.
    pub fn write(&mut self, row: usize, start: i64, values: &[f64]) -> Result<()> {
        let span = start..start.saturating_add(values.len() as i64);

        if row >= self.rows {
            return Err(Error::RowOutOfBounds {
                row,
                rows: self.rows,
            });
        }

        let columns = match (usize::try_from(span.start), usize::try_from(span.end)) {
            (Ok(left), Ok(right)) if right <= self.columns => left..right,
            _ => {
                return Err(Error::ColumnsOutOfBounds {
                    span,
                    columns: self.columns,
                })
            }
        };

        if let Some(mmap) = self.mmap.as_mut() {
            let offset = row * self.columns;
            let cells = cast_slice_mut::<u8, f64>(&mut mmap[..]);
            cells[offset + columns.start..offset + columns.end].copy_from_slice(values);
        }

        Ok(())
    }

    /// Flushes outstanding writes to the file.
    pub fn flush(&self) -> Result<()> {
        if let Some(mmap) = &self.mmap {
            mmap.flush()?;
        }

        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// View
////////////////////////////////////////////////////////////////////////////////////////

/// A read-only, memory-mapped view of a matrix file.
#[derive(Debug)]
pub struct View {
    /// The mapped cells, or [`None`] for an empty file.
    mmap: Option<Mmap>,

    /// The number of rows.
    rows: usize,

    /// The number of columns.
    columns: usize,
}

impl View {
    /// Maps the matrix file at `path`, which has `columns` columns.
    ///
    /// The number of rows is derived from the size of the file.
    pub fn open(path: impl AsRef<Path>, columns: usize) -> Result<Self> {
        let file = File::open(path)?;
        let bytes = file.metadata()?.len();
        let row_size = size_of_shape(1, columns)? as u64;

        if row_size == 0 {
            return match bytes {
                0 => Ok(Self {
                    mmap: None,
                    rows: 0,
                    columns,
                }),
                _ => Err(Error::Truncated { bytes, columns }),
            };
        }

        if bytes % row_size != 0 {
            return Err(Error::Truncated { bytes, columns });
        }

        let rows = (bytes / row_size) as usize;

        let mmap = match bytes {
            0 => None,
            // SAFETY: the file is only read while mapped.
            _ => Some(unsafe { Mmap::map(&file)? }),
        };

        Ok(Self {
            mmap,
            rows,
            columns,
        })
    }

    /// Gets the number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Gets the number of columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Gets all cells in row-major order.
    pub fn cells(&self) -> &[f64] {
        match &self.mmap {
            Some(mmap) => cast_slice(&mmap[..]),
            None => &[],
        }
    }

    /// Gets a row, or [`None`] if it is out of bounds.
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        if row >= self.rows {
            return None;
        }

        Some(&self.cells()[row * self.columns..(row + 1) * self.columns])
    }

    /// Gets a single cell, or [`None`] if it is out of bounds.
    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        if column >= self.columns {
            return None;
        }

        self.row(row).map(|cells| cells[column])
    }
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;

    #[test]
    fn test_create_fills_with_missing() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("matrix")?;
        let path = dir.path().join("out.dat");

        let matrix = Matrix::create(&path, 3, 5)?;
        assert_eq!(matrix.shape(), (3, 5));
        assert_eq!(matrix.cells().len(), 15);
        assert!(matrix.cells().iter().all(|v| v.is_nan()));
        assert_eq!(std::fs::metadata(&path)?.len(), 15 * 8);
        Ok(())
    }

    #[test]
    fn test_write_and_view() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("matrix")?;
        let path = dir.path().join("out.dat");

        let mut matrix = Matrix::create(&path, 2, 4)?;
        matrix.write(0, 0, &[1.0])?;
        matrix.write(1, 2, &[3.0, 4.0])?;
        matrix.flush()?;
        drop(matrix);

        let view = View::open(&path, 4)?;
        assert_eq!(view.rows(), 2);
        assert_eq!(view.get(0, 0), Some(1.0));
        assert!(view.get(0, 1).is_some_and(f64::is_nan));
        assert_eq!(view.row(1).map(|r| r[2..].to_vec()), Some(vec![3.0, 4.0]));
        assert_eq!(view.get(2, 0), None);
        assert_eq!(view.get(0, 4), None);
        Ok(())
    }

    #[test]
    fn test_write_bounds() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("matrix")?;
        let mut matrix = Matrix::create(dir.path().join("out.dat"), 1, 4)?;

        // Exactly up to the last column.
        matrix.write(0, 2, &[1.0, 2.0])?;

        let err = matrix.write(0, 3, &[1.0, 2.0]).unwrap_err();
        assert_eq!(err.to_string(), "columns 3:5 are out of bounds for 4 columns");

        let err = matrix.write(0, -1, &[1.0]).unwrap_err();
        assert!(matches!(err, Error::ColumnsOutOfBounds { .. }));

        let err = matrix.write(1, 0, &[1.0]).unwrap_err();
        assert!(matches!(err, Error::RowOutOfBounds { row: 1, rows: 1 }));

        // Failed writes leave the row untouched.
        assert!(matrix.row(0)[..2].iter().all(|v| v.is_nan()));
        assert_eq!(matrix.row(0)[2..], [1.0, 2.0]);
        Ok(())
    }

    #[test]
    fn test_empty_matrix() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("matrix")?;
        let path = dir.path().join("out.dat");

        let matrix = Matrix::create(&path, 0, 8)?;
        assert!(matrix.cells().is_empty());
        matrix.flush()?;

        let view = View::open(&path, 8)?;
        assert_eq!(view.rows(), 0);
        assert_eq!(view.row(0), None);
        Ok(())
    }

    #[test]
    fn test_truncated_view() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("matrix")?;
        let path = dir.path().join("out.dat");
        std::fs::write(&path, [0u8; 12])?;

        let err = View::open(&path, 1).unwrap_err();
        assert!(matches!(err, Error::Truncated { bytes: 12, columns: 1 }));
        Ok(())
    }
}
