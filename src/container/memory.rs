//! An in-memory container backend.
//!
//! Useful for embedding reads that were produced elsewhere and for testing.
//! Groups and tables are addressed by their full paths (for example,
//! `/Raw/Reads/Read_1`); parent groups exist implicitly.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use crate::container;
use crate::container::Layout;
use crate::container::Lookup;
use crate::container::Missing;
use crate::core::Strand;
use crate::record::Kind;

/// The value of an attribute.
#[derive(Clone, Debug, PartialEq)]
enum Value {
    /// A textual value.
    Text(String),

    /// An integer value.
    Integer(i64),
}

/// A column of a table.
#[derive(Clone, Debug, PartialEq)]
enum Column {
    /// A column of single-byte symbols.
    Symbols(Vec<u8>),

    /// A numeric column.
    Numbers(Vec<f64>),
}

/// An in-memory container.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Container {
    /// The attributes of each group.
    groups: BTreeMap<String, BTreeMap<String, Value>>,

    /// The columns of each table.
    tables: BTreeMap<String, BTreeMap<String, Column>>,
}

impl Container {
    /// Adds an (empty) group.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.entry(group.into()).or_default();
        self
    }

    /// Adds a textual attribute to a group, creating the group if needed.
    pub fn with_text_attribute(
        mut self,
        group: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.groups
            .entry(group.into())
            .or_default()
            .insert(name.into(), Value::Text(value.into()));
        self
    }

    /// Adds an integer attribute to a group, creating the group if needed.
    pub fn with_integer_attribute(
        mut self,
        group: impl Into<String>,
        name: impl Into<String>,
        value: i64,
    ) -> Self {
        self.groups
            .entry(group.into())
            .or_default()
            .insert(name.into(), Value::Integer(value));
        self
    }

    /// Adds a symbol column to a table, creating the table if needed.
    pub fn with_symbol_column(
        mut self,
        table: impl Into<String>,
        name: impl Into<String>,
        symbols: impl Into<Vec<u8>>,
    ) -> Self {
        self.tables
            .entry(table.into())
            .or_default()
            .insert(name.into(), Column::Symbols(symbols.into()));
        self
    }

    /// Adds a numeric column to a table, creating the table if needed.
    pub fn with_numeric_column(
        mut self,
        table: impl Into<String>,
        name: impl Into<String>,
        values: impl Into<Vec<f64>>,
    ) -> Self {
        self.tables
            .entry(table.into())
            .or_default()
            .insert(name.into(), Column::Numbers(values.into()));
        self
    }

    /// Gets the attribute `name` of `group`.
    fn attribute(&self, group: &str, name: &str) -> Lookup<&Value> {
        self.groups
            .get(group)
            .ok_or_else(|| Missing::node(group))?
            .get(name)
            .ok_or_else(|| Missing::attribute(group, name))
    }

    /// Gets the column `name` of `table`.
    fn column(&self, table: &str, name: &str) -> Lookup<&Column> {
        self.tables
            .get(table)
            .ok_or_else(|| Missing::node(table))?
            .get(name)
            .ok_or_else(|| Missing::column(table, name))
    }
}

impl container::Container for Container {
    fn text_attribute(&self, group: &str, name: &str) -> Lookup<String> {
        match self.attribute(group, name)? {
            Value::Text(value) => Ok(value.clone()),
            Value::Integer(_) => Err(Missing::attribute(group, name)),
        }
    }

    fn integer_attribute(&self, group: &str, name: &str) -> Lookup<i64> {
        match self.attribute(group, name)? {
            Value::Integer(value) => Ok(*value),
            Value::Text(_) => Err(Missing::attribute(group, name)),
        }
    }

    fn members(&self, group: &str) -> Lookup<Vec<String>> {
        let prefix = format!("{}/", group.trim_end_matches('/'));
        let mut exists = self.groups.contains_key(group);
        let mut members = BTreeSet::new();

        for path in self.groups.keys().chain(self.tables.keys()) {
            if let Some(rest) = path.strip_prefix(&prefix) {
                exists = true;

                if let Some(member) = rest.split('/').next().filter(|m| !m.is_empty()) {
                    members.insert(member.to_string());
                }
            }
        }

        match exists {
            true => Ok(members.into_iter().collect()),
            false => Err(Missing::node(group)),
        }
    }

    fn symbol_column(&self, table: &str, column: &str) -> Lookup<Vec<u8>> {
        match self.column(table, column)? {
            Column::Symbols(symbols) => Ok(symbols.clone()),
            Column::Numbers(_) => Err(Missing::column(table, column)),
        }
    }

    fn numeric_column(&self, table: &str, column: &str) -> Lookup<Vec<f64>> {
        match self.column(table, column)? {
            Column::Numbers(values) => Ok(values.clone()),
            Column::Symbols(_) => Err(Missing::column(table, column)),
        }
    }
}

/// A builder for a container holding one fully resquiggled read.
///
/// # Examples
///
/// ```
/// use eventarray::container::Container as _;
/// use eventarray::container::Layout;
/// use eventarray::container::memory::Read;
///
/// let layout = Layout::default();
/// let container = Read::new("rna0", 2, "GTAC", 7)
///     .dwell([1.0, 2.0, 3.0, 4.0])
///     .build(&layout);
///
/// assert_eq!(
///     container.text_attribute(&layout.alignment(), "mapped_chrom"),
///     Ok(String::from("rna0"))
/// );
/// assert_eq!(layout.read_number(&container), Ok(7));
/// ```
#[derive(Clone, Debug)]
pub struct Read {
    /// The mapped reference name.
    chrom: String,

    /// The mapped strand.
    strand: String,

    /// The mapped start.
    start: i64,

    /// The called bases, as stored (DNA alphabet).
    bases: String,

    /// The acquisition index.
    read_number: i64,

    /// The measurement columns.
    columns: HashMap<Kind, Vec<f64>>,
}

impl Read {
    /// Creates a read mapped to the positive strand of `chrom` at `start`.
    pub fn new(
        chrom: impl Into<String>,
        start: i64,
        bases: impl Into<String>,
        read_number: i64,
    ) -> Self {
        Self {
            chrom: chrom.into(),
            strand: Strand::Positive.to_string(),
            start,
            bases: bases.into(),
            read_number,
            columns: HashMap::new(),
        }
    }

    /// Sets the mapped strand as stored in the container.
    pub fn strand(mut self, strand: impl Into<String>) -> Self {
        self.strand = strand.into();
        self
    }

    /// Sets the dwell (event length) column.
    pub fn dwell(self, values: impl Into<Vec<f64>>) -> Self {
        self.column(Kind::Dwell, values)
    }

    /// Sets the normalized mean current column.
    pub fn current(self, values: impl Into<Vec<f64>>) -> Self {
        self.column(Kind::Current, values)
    }

    /// Sets the normalized current standard deviation column.
    pub fn stdev(self, values: impl Into<Vec<f64>>) -> Self {
        self.column(Kind::Stdev, values)
    }

    /// Sets the column for `kind`.
    pub fn column(mut self, kind: Kind, values: impl Into<Vec<f64>>) -> Self {
        self.columns.insert(kind, values.into());
        self
    }

    /// Builds the container following `layout`.
    pub fn build(self, layout: &Layout) -> Container {
        let alignment = layout.alignment();
        let events = layout.events();

        let mut container = Container::default()
            .with_text_attribute(&alignment, container::MAPPED_CHROM, self.chrom)
            .with_text_attribute(&alignment, container::MAPPED_STRAND, self.strand)
            .with_integer_attribute(&alignment, container::MAPPED_START, self.start)
            .with_symbol_column(&events, container::BASE_COLUMN, self.bases.into_bytes())
            .with_integer_attribute(
                format!("{}/Read_{}", layout.raw_reads(), self.read_number),
                container::READ_NUMBER,
                self.read_number,
            );

        for (kind, values) in self.columns {
            container = container.with_numeric_column(&events, kind.column(), values);
        }

        container
    }
}

/// An in-memory collection of containers, keyed by path.
#[derive(Clone, Debug, Default)]
pub struct Store(HashMap<PathBuf, Container>);

impl Store {
    /// Inserts a container at `path`.
    pub fn insert(&mut self, path: impl Into<PathBuf>, container: Container) {
        self.0.insert(path.into(), container);
    }

    /// Gets the number of containers in the store.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl container::Open for Store {
    type Container = Container;

    fn open(&self, path: &Path) -> io::Result<Self::Container> {
        self.0.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no container stored at {}", path.display()),
            )
        })
    }
}
