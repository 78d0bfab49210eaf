//! Per-read records.
//!
//! A [`Record`] holds everything needed to place one read into the output
//! matrix: where it starts on the reference, its called bases, and one
//! measurement per called base. Records are read out of containers with a
//! set of [`Criteria`]. Reads that are not aligned to the expected reference
//! and strand (or that lack any of the required values) are perfectly normal
//! and come back as [`Reading::Absent`] rather than as errors.

use std::io;
use std::path::Path;
use std::path::PathBuf;

use crate::container;
use crate::container::Container;
use crate::container::Layout;
use crate::container::Missing;
use crate::core::Strand;
use crate::core::nucleotide;

pub mod kind;
pub mod records;

pub use kind::Kind;
pub use kind::ParseKindError;
pub use records::Records;

////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////

/// An error related to reading a [`Record`].
#[derive(Debug)]
pub enum Error {
    /// The container could not be opened.
    Open(PathBuf, io::Error),

    /// The number of called bases does not match the number of measurements.
    LengthMismatch {
        /// The path of the offending container.
        path: PathBuf,

        /// The number of called bases.
        bases: usize,

        /// The number of measurements.
        measurements: usize,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Open(path, err) => write!(f, "unable to open {}: {err}", path.display()),
            Error::LengthMismatch {
                path,
                bases,
                measurements,
            } => write!(
                f,
                "{}: found {bases} called bases but {measurements} measurements",
                path.display()
            ),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////
// Readings
////////////////////////////////////////////////////////////////////////////////////////

/// The reason a container did not yield a record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Reason {
    /// A required value was missing.
    Missing(Missing),

    /// The read was mapped to a different reference (the stored name).
    ReferenceMismatch(String),

    /// The read was mapped to a different strand (the stored value).
    StrandMismatch(String),
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reason::Missing(missing) => write!(f, "{missing}"),
            Reason::ReferenceMismatch(name) => write!(f, "mapped to reference {name}"),
            Reason::StrandMismatch(strand) => write!(f, "mapped to strand {strand}"),
        }
    }
}

impl From<Missing> for Reason {
    fn from(value: Missing) -> Self {
        Reason::Missing(value)
    }
}

/// The outcome of reading a single container.
#[derive(Clone, Debug, PartialEq)]
pub enum Reading {
    /// The container holds a qualifying read.
    Present(Record),

    /// The container does not hold a qualifying read.
    Absent(Reason),
}

/// A qualifying read.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// The path of the container the read came from.
    path: PathBuf,

    /// The offset into the reference where the measured span begins.
    start: i64,

    /// The transcribed called bases.
    bases: String,

    /// One measurement per called base.
    measurements: Vec<f64>,
}

impl Record {
    /// Creates a new record.
    ///
    /// The called bases are expected to already be transcribed.
    pub fn try_new(
        path: impl Into<PathBuf>,
        start: i64,
        bases: String,
        measurements: Vec<f64>,
    ) -> Result<Self> {
        let path = path.into();

        if bases.len() != measurements.len() {
            return Err(Error::LengthMismatch {
                path,
                bases: bases.len(),
                measurements: measurements.len(),
            });
        }

        Ok(Self {
            path,
            start,
            bases,
            measurements,
        })
    }

    /// Gets the path of the originating container.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the mapped start.
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Gets the transcribed called bases.
    pub fn bases(&self) -> &str {
        &self.bases
    }

    /// Gets the measurements.
    pub fn measurements(&self) -> &[f64] {
        &self.measurements
    }

    /// Gets the number of called bases (and measurements).
    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    /// Returns whether the record is empty.
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// Criteria
////////////////////////////////////////////////////////////////////////////////////////

/// What makes a read qualify, and which measurement to pull out of it.
#[derive(Clone, Debug)]
pub struct Criteria {
    /// The expected reference name.
    reference_name: String,

    /// The expected strand.
    strand: Strand,

    /// The measurement to extract.
    kind: Kind,

    /// Where the values live within each container.
    layout: Layout,
}

impl Criteria {
    /// Creates criteria for reads mapped to the positive strand of
    /// `reference_name` in the default layout.
    pub fn new(reference_name: impl Into<String>, kind: Kind) -> Self {
        Self {
            reference_name: reference_name.into(),
            strand: Strand::Positive,
            kind,
            layout: Layout::default(),
        }
    }

    /// Sets the layout.
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Gets the expected reference name.
    pub fn reference_name(&self) -> &str {
        &self.reference_name
    }

    /// Gets the expected strand.
    pub fn strand(&self) -> Strand {
        self.strand
    }

    /// Gets the measurement kind.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Gets the layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Reads a container that was opened from `path`.
    ///
    /// # Examples
    ///
    /// ```
    /// use eventarray::container::Layout;
    /// use eventarray::container::memory::Read;
    /// use eventarray::record::Criteria;
    /// use eventarray::record::Kind;
    /// use eventarray::record::Reading;
    ///
    /// let container = Read::new("rna0", 2, "GTAC", 1)
    ///     .dwell([1.0, 2.0, 3.0, 4.0])
    ///     .build(&Layout::default());
    ///
    /// let criteria = Criteria::new("rna0", Kind::Dwell);
    /// match criteria.read(&container, "read.fast5")? {
    ///     Reading::Present(record) => {
    ///         assert_eq!(record.start(), 2);
    ///         assert_eq!(record.bases(), "GUAC");
    ///     }
    ///     Reading::Absent(reason) => panic!("unexpected absence: {reason}"),
    /// }
    ///
    /// let criteria = Criteria::new("rna1", Kind::Dwell);
    /// assert!(matches!(criteria.read(&container, "read.fast5")?, Reading::Absent(_)));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn read<C>(&self, container: &C, path: impl Into<PathBuf>) -> Result<Reading>
    where
        C: Container,
    {
        let (start, bases, measurements) = match self.lookup(container) {
            Ok(values) => values,
            Err(reason) => return Ok(Reading::Absent(reason)),
        };

        let mut transcribed = String::with_capacity(bases.len());
        nucleotide::transcribe_bytes_into(&bases, &mut transcribed);

        Record::try_new(path, start, transcribed, measurements).map(Reading::Present)
    }

    /// Looks up the raw values of a qualifying read.
    fn lookup<C>(&self, container: &C) -> std::result::Result<(i64, Vec<u8>, Vec<f64>), Reason>
    where
        C: Container,
    {
        let alignment = self.layout.alignment();

        let chrom = container.text_attribute(&alignment, container::MAPPED_CHROM)?;
        if chrom != self.reference_name {
            return Err(Reason::ReferenceMismatch(chrom));
        }

        let strand = container.text_attribute(&alignment, container::MAPPED_STRAND)?;
        match strand.parse::<Strand>() {
            Ok(parsed) if parsed == self.strand => {}
            _ => return Err(Reason::StrandMismatch(strand)),
        }

        let start = container.integer_attribute(&alignment, container::MAPPED_START)?;

        let events = self.layout.events();
        let bases = container.symbol_column(&events, container::BASE_COLUMN)?;
        let measurements = container.numeric_column(&events, self.kind.column())?;

        Ok((start, bases, measurements))
    }
}
