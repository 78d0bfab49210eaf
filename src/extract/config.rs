//! Configuration of an extraction run.

use std::path::Path;
use std::path::PathBuf;

use crate::container::Layout;
use crate::record::Criteria;
use crate::record::Kind;

/// The configuration of an extraction run.
///
/// Built once (typically from command line arguments) and handed to
/// [`run()`](crate::extract::run()).
///
/// # Examples
///
/// ```
/// use eventarray::extract::Config;
/// use eventarray::record::Kind;
///
/// let config = Config::new("rna0", "reads/", "out/rna0.dat", Kind::Current)
///     .with_max_reads(Some(1000))
///     .with_ordered(true);
///
/// assert_eq!(config.reference_name(), "rna0");
/// assert_eq!(config.max_reads(), Some(1000));
/// assert!(config.ordered());
/// assert!(config.check_sequence());
/// ```
#[derive(Clone, Debug)]
pub struct Config {
    /// The name of the reference reads must be mapped to.
    reference_name: String,

    /// The root directory holding the containers.
    input: PathBuf,

    /// The path of the output matrix.
    output: PathBuf,

    /// The measurement to extract.
    kind: Kind,

    /// The maximum number of rows.
    max_reads: Option<usize>,

    /// The maximum number of files to discover.
    max_files: Option<usize>,

    /// Whether rows are ordered by read number.
    ordered: bool,

    /// Whether called bases are checked against the reference.
    check_sequence: bool,

    /// The layout of the containers.
    layout: Layout,
}

impl Config {
    /// Creates a configuration with the default options.
    pub fn new(
        reference_name: impl Into<String>,
        input: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        kind: Kind,
    ) -> Self {
        Self {
            reference_name: reference_name.into(),
            input: input.into(),
            output: output.into(),
            kind,
            max_reads: None,
            max_files: None,
            ordered: false,
            check_sequence: true,
            layout: Layout::default(),
        }
    }

    /// Sets the maximum number of rows.
    pub fn with_max_reads(mut self, max_reads: Option<usize>) -> Self {
        self.max_reads = max_reads;
        self
    }

    /// Sets the maximum number of files to discover.
    pub fn with_max_files(mut self, max_files: Option<usize>) -> Self {
        self.max_files = max_files;
        self
    }

    /// Sets whether rows are ordered by read number.
    pub fn with_ordered(mut self, ordered: bool) -> Self {
        self.ordered = ordered;
        self
    }

    /// Sets whether called bases are checked against the reference.
    pub fn with_check_sequence(mut self, check_sequence: bool) -> Self {
        self.check_sequence = check_sequence;
        self
    }

    /// Sets the layout of the containers.
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Gets the reference name.
    pub fn reference_name(&self) -> &str {
        &self.reference_name
    }

    /// Gets the input root.
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Gets the output path.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Gets the measurement kind.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Gets the maximum number of rows.
    pub fn max_reads(&self) -> Option<usize> {
        self.max_reads
    }

    /// Gets the maximum number of files.
    pub fn max_files(&self) -> Option<usize> {
        self.max_files
    }

    /// Returns whether rows are ordered by read number.
    pub fn ordered(&self) -> bool {
        self.ordered
    }

    /// Returns whether called bases are checked against the reference.
    pub fn check_sequence(&self) -> bool {
        self.check_sequence
    }

    /// Gets the layout.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Gets the criteria records must meet.
    pub fn criteria(&self) -> Criteria {
        Criteria::new(self.reference_name.clone(), self.kind).with_layout(self.layout.clone())
    }
}
