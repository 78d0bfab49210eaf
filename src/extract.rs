//! Assembly of the reference-aligned measurement matrix.
//!
//! An extraction runs in two passes over the same set of containers. The
//! [sizing pass](crate::sizing) counts the qualifying reads so that the
//! output [`Matrix`] can be created with its final shape. The second pass
//! then writes the measurements of each qualifying read into its own row, at
//! the columns covered by its alignment:
//!
//! ```text
//! reference   A  C  G  U  A  C  G  U
//! read (+2)         G  U  A  C
//! row         .  .  m0 m1 m2 m3 .  .
//! ```
//!
//! Any read whose called bases disagree with the reference, or whose span does
//! not fit within the reference, aborts the whole run: either indicates that
//! the reference does not belong to the reads being processed. The output file
//! is left as-is (and should be considered unusable) when a run fails.

use std::ops::Range;
use std::path::PathBuf;

use tracing::info;
use tracing::warn;

use crate::Reference;
use crate::container::Open;
use crate::discovery;
use crate::discovery::Discovery;
use crate::matrix;
use crate::matrix::Matrix;
use crate::record;
use crate::record::Record;
use crate::record::Records;
use crate::sizing;

pub mod config;

pub use config::Config;

/// The number of rows between progress messages.
const PROGRESS_INTERVAL: usize = 100;

////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////

/// The details of a read that could not be placed in the matrix.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    /// The path of the offending container.
    pub path: PathBuf,

    /// The mapped start of the read.
    pub start: i64,

    /// The full reference.
    pub reference: String,

    /// The called bases of the read.
    pub bases: String,

    /// The part of the reference the read was mapped to (clipped to the
    /// reference).
    pub slice: String,
}

impl Diagnostic {
    /// Collects the details of `record` against `reference`.
    fn new(record: &Record, reference: &Reference, span: &Range<i64>) -> Self {
        let len = reference.len() as i64;
        let left = span.start.clamp(0, len) as usize;
        let right = span.end.clamp(0, len) as usize;

        Self {
            path: record.path().to_path_buf(),
            start: record.start(),
            reference: reference.to_string(),
            bases: record.bases().to_string(),
            slice: reference
                .slice(left..right.max(left))
                .unwrap_or_default()
                .to_string(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "path: {}", self.path.display())?;
        writeln!(f, "mapped start: {}", self.start)?;
        writeln!(f, "reference: {}", self.reference)?;
        writeln!(f, "called bases: {}", self.bases)?;
        write!(f, "reference slice: {}", self.slice)
    }
}

/// An error related to an extraction run.
#[derive(Debug)]
pub enum Error {
    /// The reference has no sequence.
    EmptyReference,

    /// An error in the sizing pass.
    Sizing(sizing::Error),

    /// An error discovering containers.
    Discovery(discovery::Error),

    /// An error reading a record.
    Record(record::Error),

    /// An error creating or writing the matrix.
    Matrix(matrix::Error),

    /// The called bases of a read do not match the reference.
    SequenceMismatch(Box<Diagnostic>),

    /// The span of a read does not fall within the reference.
    OutOfBounds {
        /// The details of the read.
        diagnostic: Box<Diagnostic>,

        /// The length of the reference (the number of columns).
        columns: usize,

        /// The attempted column span.
        span: Range<i64>,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::EmptyReference => write!(f, "the reference sequence is empty"),
            Error::Sizing(err) => write!(f, "sizing error: {err}"),
            Error::Discovery(err) => write!(f, "discovery error: {err}"),
            Error::Record(err) => write!(f, "record error: {err}"),
            Error::Matrix(err) => write!(f, "matrix error: {err}"),
            Error::SequenceMismatch(diagnostic) => {
                write!(f, "sequence mismatch\n\n{diagnostic}")
            }
            Error::OutOfBounds {
                diagnostic,
                columns,
                span,
            } => write!(
                f,
                "tried to write out of bounds\n\n{diagnostic}\nslen = {columns}\n\
                 len(reference slice) = {}\nlen(called bases) = {}\nleft:right = {}:{}",
                diagnostic.slice.len(),
                diagnostic.bases.len(),
                span.start,
                span.end
            ),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////
// Summary
////////////////////////////////////////////////////////////////////////////////////////

/// The outcome of a successful extraction run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Summary {
    /// The number of rows in the matrix.
    rows: usize,

    /// The number of rows written.
    written: usize,

    /// The number of containers read by the filling pass.
    scanned: usize,

    /// The number of qualifying reads seen by the filling pass.
    mapped: usize,
}

impl Summary {
    /// Gets the number of rows in the matrix.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Gets the number of rows written.
    ///
    /// This only differs from [`Summary::rows()`] if containers changed
    /// between the two passes.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Gets the number of containers read by the filling pass.
    pub fn scanned(&self) -> usize {
        self.scanned
    }

    /// Gets the number of qualifying reads seen by the filling pass.
    pub fn mapped(&self) -> usize {
        self.mapped
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Extraction
////////////////////////////////////////////////////////////////////////////////////////

/// Runs an extraction, writing the matrix to the configured output path.
///
/// The matrix has one row per qualifying read (capped at the configured
/// maximum number of reads) and one column per reference position.
pub fn run<O>(config: &Config, reference: &Reference, opener: &O) -> Result<Summary>
where
    O: Open,
{
    if reference.is_empty() {
        return Err(Error::EmptyReference);
    }

    let columns = reference.len();
    info!("sequence length: {columns} nucleotides");

    let criteria = config.criteria();
    let discovery = Discovery::new(config.input())
        .max_files(config.max_files())
        .ordered(config.ordered());

    let rows = sizing::count_rows(&discovery, opener, &criteria, config.max_reads())
        .map_err(Error::Sizing)?;

    let mut matrix = Matrix::create(config.output(), rows, columns).map_err(Error::Matrix)?;
    info!("created empty array with shape ({rows}, {columns})");
    info!("filling array with data");

    let paths = discovery
        .discover(opener, criteria.layout())
        .map_err(Error::Discovery)?;
    let mut records = Records::new(&paths, opener, &criteria).quiet();

    let mut row = 0;

    while row < rows {
        let record = match records.next() {
            Some(result) => result.map_err(Error::Record)?,
            None => break,
        };

        place(&mut matrix, row, &record, reference, config.check_sequence())?;
        row += 1;

        if row % PROGRESS_INTERVAL == 0 {
            info!("processed {row}/{rows} mapped reads");
        }
    }

    if row < rows {
        warn!("only {row} of {rows} sized rows were filled; the input changed between passes");
    }

    matrix.flush().map_err(Error::Matrix)?;
    info!("array filled");

    Ok(Summary {
        rows,
        written: row,
        scanned: records.scanned(),
        mapped: records.mapped(),
    })
}

/// Validates `record` against `reference` and writes it into `row`.
fn place(
    matrix: &mut Matrix,
    row: usize,
    record: &Record,
    reference: &Reference,
    check_sequence: bool,
) -> Result<()> {
    let span = record.start()..record.start().saturating_add(record.len() as i64);

    let columns = match (usize::try_from(span.start), usize::try_from(span.end)) {
        (Ok(left), Ok(right)) if right <= reference.len() => left..right,
        _ => {
            return Err(Error::OutOfBounds {
                diagnostic: Box::new(Diagnostic::new(record, reference, &span)),
                columns: reference.len(),
                span,
            })
        }
    };

    if check_sequence && reference.slice(columns) != Some(record.bases()) {
        return Err(Error::SequenceMismatch(Box::new(Diagnostic::new(
            record, reference, &span,
        ))));
    }

    matrix
        .write(row, span.start, record.measurements())
        .map_err(Error::Matrix)
}
