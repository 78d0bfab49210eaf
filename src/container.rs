//! Per-read containers.
//!
//! Every read produced by a sequencing run is stored in its own hierarchical
//! container. This crate only needs a handful of values out of each
//! container, all of which live at fixed paths described by a [`Layout`]:
//!
//! - the alignment group, holding the `mapped_chrom`, `mapped_strand` and
//!   `mapped_start` attributes,
//! - the events table, holding one row per called base with a `base` symbol
//!   column and the numeric measurement columns,
//! - the raw reads group, whose first member carries the `read_number`
//!   attribute.
//!
//! Access to the underlying storage goes through the [`Container`] and
//! [`Open`] traits. The [`memory`] backend keeps everything in memory, and the
//! `hdf5` backend (behind the `hdf5` feature) reads `.fast5` files.

use std::io;
use std::path::Path;

#[cfg(feature = "hdf5")]
pub mod hdf5;
pub mod memory;

/// The analysis group written by the default resquiggle run.
pub const DEFAULT_ANALYSIS: &str = "RawGenomeCorrected_000";

/// The name of the mapped reference attribute.
pub const MAPPED_CHROM: &str = "mapped_chrom";

/// The name of the mapped strand attribute.
pub const MAPPED_STRAND: &str = "mapped_strand";

/// The name of the mapped start attribute.
pub const MAPPED_START: &str = "mapped_start";

/// The name of the called base column of the events table.
pub const BASE_COLUMN: &str = "base";

/// The name of the acquisition index attribute of a raw read.
pub const READ_NUMBER: &str = "read_number";

/// The path of the raw reads group.
pub const RAW_READS: &str = "/Raw/Reads";

/// A lookup that did not find what it was looking for.
///
/// The inner value is the full path of the missing item (for example,
/// `/Raw/Reads@read_number` for an attribute).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Missing(pub String);

impl Missing {
    /// Creates a missing marker for an attribute of a group.
    pub fn attribute(group: &str, name: &str) -> Self {
        Self(format!("{group}@{name}"))
    }

    /// Creates a missing marker for a column of a table.
    pub fn column(table: &str, name: &str) -> Self {
        Self(format!("{table}[{name}]"))
    }

    /// Creates a missing marker for a group or table.
    pub fn node(path: &str) -> Self {
        Self(path.to_string())
    }
}

impl std::fmt::Display for Missing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "missing: {}", self.0)
    }
}

impl std::error::Error for Missing {}

/// The result of a lookup within a container.
pub type Lookup<T> = std::result::Result<T, Missing>;

/// A hierarchical per-read container.
///
/// Every lookup either succeeds or reports what was [`Missing`]. Lookups never
/// fail in any other way: anything unreadable is treated as missing.
pub trait Container {
    /// Looks up a textual attribute of a group.
    fn text_attribute(&self, group: &str, name: &str) -> Lookup<String>;

    /// Looks up an integer attribute of a group.
    fn integer_attribute(&self, group: &str, name: &str) -> Lookup<i64>;

    /// Lists the names of the members of a group, sorted by name.
    fn members(&self, group: &str) -> Lookup<Vec<String>>;

    /// Reads a single-byte symbol column of a table.
    fn symbol_column(&self, table: &str, column: &str) -> Lookup<Vec<u8>>;

    /// Reads a numeric column of a table, converted to `f64`.
    fn numeric_column(&self, table: &str, column: &str) -> Lookup<Vec<f64>>;
}

/// A facility that opens containers by path.
pub trait Open {
    /// The type of container opened.
    type Container: Container;

    /// Opens the container at `path`.
    fn open(&self, path: &Path) -> io::Result<Self::Container>;
}

/// The internal paths of the values read from a container.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Layout {
    /// The name of the analysis group holding the alignment and events.
    analysis: String,
}

impl Layout {
    /// Creates a layout for the named analysis group.
    ///
    /// # Examples
    ///
    /// ```
    /// use eventarray::container::Layout;
    ///
    /// let layout = Layout::new("RawGenomeCorrected_001");
    /// assert_eq!(
    ///     layout.alignment(),
    ///     "/Analyses/RawGenomeCorrected_001/BaseCalled_template/Alignment"
    /// );
    /// assert_eq!(
    ///     layout.events(),
    ///     "/Analyses/RawGenomeCorrected_001/BaseCalled_template/Events"
    /// );
    /// ```
    pub fn new(analysis: impl Into<String>) -> Self {
        Self {
            analysis: analysis.into(),
        }
    }

    /// Gets the name of the analysis group.
    pub fn analysis(&self) -> &str {
        &self.analysis
    }

    /// Gets the path of the alignment group.
    pub fn alignment(&self) -> String {
        format!("/Analyses/{}/BaseCalled_template/Alignment", self.analysis)
    }

    /// Gets the path of the events table.
    pub fn events(&self) -> String {
        format!("/Analyses/{}/BaseCalled_template/Events", self.analysis)
    }

    /// Gets the path of the raw reads group.
    pub fn raw_reads(&self) -> &'static str {
        RAW_READS
    }

    /// Reads the acquisition index of the read stored in `container`.
    ///
    /// The index is the `read_number` attribute of the first member (by
    /// name) of the raw reads group.
    pub fn read_number<C>(&self, container: &C) -> Lookup<i64>
    where
        C: Container,
    {
        let members = container.members(self.raw_reads())?;
        let first = members
            .first()
            .ok_or_else(|| Missing::node(&format!("{}/*", self.raw_reads())))?;

        container.integer_attribute(&format!("{}/{}", self.raw_reads(), first), READ_NUMBER)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(DEFAULT_ANALYSIS)
    }
}
