//! An HDF5 (`.fast5`) container backend.
//!
//! Events tables are compound datasets. Only the fields needed for a lookup
//! are read: HDF5 converts the stored compound type into a single-field
//! compound type with the same member name.

use std::io;
use std::path::Path;

use hdf5::H5Type;
use hdf5::types::FixedAscii;
use hdf5::types::VarLenAscii;
use hdf5::types::VarLenUnicode;

use crate::container;
use crate::container::Lookup;
use crate::container::Missing;

/// The longest fixed-length string attribute that is read.
const MAX_FIXED_STRING: usize = 256;

/// The called base field of an events table.
#[derive(H5Type, Clone, Copy, Debug)]
#[repr(C)]
struct BaseField {
    /// The called base.
    base: FixedAscii<1>,
}

/// The dwell field of an events table.
#[derive(H5Type, Clone, Copy, Debug)]
#[repr(C)]
struct LengthField {
    /// The number of raw samples assigned to the base.
    length: f64,
}

/// The normalized mean current field of an events table.
#[derive(H5Type, Clone, Copy, Debug)]
#[repr(C)]
struct MeanField {
    /// The normalized mean current.
    norm_mean: f64,
}

/// The normalized current standard deviation field of an events table.
#[derive(H5Type, Clone, Copy, Debug)]
#[repr(C)]
struct StdevField {
    /// The normalized current standard deviation.
    norm_stdev: f64,
}

/// An open HDF5 container.
#[derive(Debug)]
pub struct Container(hdf5::File);

impl Container {
    /// Opens the container at `path` for reading.
    pub fn open(path: &Path) -> io::Result<Self> {
        hdf5::File::open(path)
            .map(Self)
            .map_err(|err| io::Error::other(err.to_string()))
    }

    /// Gets the attribute `name` of the group at `group`.
    fn attribute(&self, group: &str, name: &str) -> Lookup<hdf5::Attribute> {
        self.0
            .group(group)
            .map_err(|_| Missing::node(group))?
            .attr(name)
            .map_err(|_| Missing::attribute(group, name))
    }

    /// Reads a single field out of every row of the table at `table`.
    fn field<T>(&self, table: &str, column: &str) -> Lookup<Vec<T>>
    where
        T: H5Type,
    {
        self.0
            .dataset(table)
            .map_err(|_| Missing::node(table))?
            .read_raw::<T>()
            .map_err(|_| Missing::column(table, column))
    }
}

impl container::Container for Container {
    fn text_attribute(&self, group: &str, name: &str) -> Lookup<String> {
        let attr = self.attribute(group, name)?;

        if let Ok(value) = attr.read_scalar::<VarLenUnicode>() {
            return Ok(value.as_str().to_string());
        }

        if let Ok(value) = attr.read_scalar::<VarLenAscii>() {
            return Ok(value.as_str().to_string());
        }

        attr.read_scalar::<FixedAscii<MAX_FIXED_STRING>>()
            .map(|value| value.as_str().to_string())
            .map_err(|_| Missing::attribute(group, name))
    }

    fn integer_attribute(&self, group: &str, name: &str) -> Lookup<i64> {
        self.attribute(group, name)?
            .read_scalar::<i64>()
            .map_err(|_| Missing::attribute(group, name))
    }

    fn members(&self, group: &str) -> Lookup<Vec<String>> {
        let mut names = self
            .0
            .group(group)
            .map_err(|_| Missing::node(group))?
            .member_names()
            .map_err(|_| Missing::node(group))?;

        names.sort();
        Ok(names)
    }

    fn symbol_column(&self, table: &str, column: &str) -> Lookup<Vec<u8>> {
        match column {
            container::BASE_COLUMN => Ok(self
                .field::<BaseField>(table, column)?
                .into_iter()
                .map(|field| field.base.as_bytes().first().copied().unwrap_or(b'N'))
                .collect()),
            _ => Err(Missing::column(table, column)),
        }
    }

    fn numeric_column(&self, table: &str, column: &str) -> Lookup<Vec<f64>> {
        match column {
            "length" => Ok(self
                .field::<LengthField>(table, column)?
                .into_iter()
                .map(|field| field.length)
                .collect()),
            "norm_mean" => Ok(self
                .field::<MeanField>(table, column)?
                .into_iter()
                .map(|field| field.norm_mean)
                .collect()),
            "norm_stdev" => Ok(self
                .field::<StdevField>(table, column)?
                .into_iter()
                .map(|field| field.norm_stdev)
                .collect()),
            _ => Err(Missing::column(table, column)),
        }
    }
}

/// Opens `.fast5` files as HDF5 containers.
#[derive(Clone, Copy, Debug, Default)]
pub struct Opener;

impl container::Open for Opener {
    type Container = Container;

    fn open(&self, path: &Path) -> io::Result<Self::Container> {
        Container::open(path)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use hdf5::Group;
    use tempdir::TempDir;

    use super::*;
    use crate::container::Container as _;
    use crate::container::Layout;
    use crate::container::Open as _;
    use crate::record::Criteria;
    use crate::record::Kind;
    use crate::record::Reading;
    use crate::record::Record;

    /// A row of a resquiggled events table as it is stored on disk.
    #[derive(H5Type, Clone, Copy, Debug)]
    #[repr(C)]
    struct Event {
        /// The normalized mean current.
        norm_mean: f64,

        /// The normalized current standard deviation.
        norm_stdev: f64,

        /// The first raw sample of the base.
        start: u32,

        /// The number of raw samples of the base.
        length: u32,

        /// The called base.
        base: FixedAscii<1>,
    }

    fn event(
        norm_mean: f64,
        norm_stdev: f64,
        start: u32,
        length: u32,
        base: &[u8],
    ) -> Result<Event, Box<dyn std::error::Error>> {
        Ok(Event {
            norm_mean,
            norm_stdev,
            start,
            length,
            base: FixedAscii::from_ascii(base)?,
        })
    }

    /// Creates every group along `path`, starting at `root`.
    fn create_groups(root: &Group, path: &str) -> hdf5::Result<Group> {
        let mut group = root.clone();
        for name in path.split('/').filter(|name| !name.is_empty()) {
            group = group.create_group(name)?;
        }
        Ok(group)
    }

    /// Writes a single resquiggled read, mapped to `rna0` at position 2.
    fn write_read(
        dir: &TempDir,
        bases: [&[u8]; 4],
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let path = dir.path().join("read.fast5");
        let file = hdf5::File::create(&path)?;
        let layout = Layout::default();

        let template = create_groups(
            &file,
            "/Analyses/RawGenomeCorrected_000/BaseCalled_template",
        )?;
        let alignment = template.create_group("Alignment")?;

        alignment
            .new_attr::<VarLenUnicode>()
            .create(container::MAPPED_CHROM)?
            .write_scalar(&"rna0".parse::<VarLenUnicode>()?)?;
        alignment
            .new_attr::<VarLenAscii>()
            .create(container::MAPPED_STRAND)?
            .write_scalar(&VarLenAscii::from_ascii("+")?)?;
        alignment
            .new_attr::<i64>()
            .create(container::MAPPED_START)?
            .write_scalar(&2i64)?;

        let events = vec![
            event(0.5, 0.05, 0, 12, bases[0])?,
            event(-0.25, 0.1, 12, 7, bases[1])?,
            event(1.5, 0.2, 19, 30, bases[2])?,
            event(0.0, 0.15, 49, 4, bases[3])?,
        ];
        template
            .new_dataset_builder()
            .with_data(events.as_slice())
            .create("Events")?;

        let read = create_groups(&file, &format!("{}/Read_5", layout.raw_reads()))?;
        read.new_attr::<i32>()
            .create(container::READ_NUMBER)?
            .write_scalar(&5i32)?;

        let other = file.create_group("Other")?;
        other
            .new_attr::<FixedAscii<8>>()
            .create("name")?
            .write_scalar(&FixedAscii::<8>::from_ascii(b"rna0")?)?;

        Ok(path)
    }

    fn present(reading: Reading) -> Record {
        match reading {
            Reading::Present(record) => record,
            Reading::Absent(reason) => panic!("unexpected absence: {reason}"),
        }
    }

    #[test]
    fn test_read_every_kind() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("hdf5")?;
        let path = write_read(&dir, [b"G", b"t", b"A", b"C"])?;
        let fast5 = Opener.open(&path)?;

        let record = present(Criteria::new("rna0", Kind::Dwell).read(&fast5, &path)?);
        assert_eq!(record.start(), 2);
        assert_eq!(record.bases(), "GUAC");
        assert_eq!(record.measurements(), &[12.0, 7.0, 30.0, 4.0]);

        let record = present(Criteria::new("rna0", Kind::Current).read(&fast5, &path)?);
        assert_eq!(record.measurements(), &[0.5, -0.25, 1.5, 0.0]);

        let record = present(Criteria::new("rna0", Kind::Stdev).read(&fast5, &path)?);
        assert_eq!(record.measurements(), &[0.05, 0.1, 0.2, 0.15]);

        let reading = Criteria::new("rna1", Kind::Dwell).read(&fast5, &path)?;
        assert!(matches!(reading, Reading::Absent(_)));

        Ok(())
    }

    #[test]
    fn test_empty_base_reads_as_unknown() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("hdf5")?;
        let path = write_read(&dir, [b"G", b"", b"A", b"C"])?;
        let fast5 = Container::open(&path)?;

        let events = Layout::default().events();
        assert_eq!(
            fast5.symbol_column(&events, container::BASE_COLUMN)?,
            b"GNAC"
        );
        Ok(())
    }

    #[test]
    fn test_text_attributes() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("hdf5")?;
        let path = write_read(&dir, [b"G", b"T", b"A", b"C"])?;
        let fast5 = Container::open(&path)?;
        let alignment = Layout::default().alignment();

        assert_eq!(
            fast5.text_attribute(&alignment, container::MAPPED_CHROM)?,
            "rna0"
        );
        assert_eq!(
            fast5.text_attribute(&alignment, container::MAPPED_STRAND)?,
            "+"
        );
        assert_eq!(fast5.text_attribute("/Other", "name")?, "rna0");

        assert_eq!(
            fast5.text_attribute(&alignment, "missing"),
            Err(Missing::attribute(&alignment, "missing"))
        );
        assert_eq!(
            fast5.text_attribute("/Nowhere", "name"),
            Err(Missing::node("/Nowhere"))
        );
        Ok(())
    }

    #[test]
    fn test_read_number() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("hdf5")?;
        let path = write_read(&dir, [b"G", b"T", b"A", b"C"])?;
        let fast5 = Container::open(&path)?;

        assert_eq!(Layout::default().read_number(&fast5)?, 5);
        assert_eq!(fast5.members("/Raw/Reads")?, vec![String::from("Read_5")]);
        Ok(())
    }

    #[test]
    fn test_missing_columns() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("hdf5")?;
        let path = write_read(&dir, [b"G", b"T", b"A", b"C"])?;
        let fast5 = Container::open(&path)?;

        let events = Layout::default().events();
        assert_eq!(
            fast5.numeric_column(&events, "start_sample"),
            Err(Missing::column(&events, "start_sample"))
        );

        let other = Layout::new("RawGenomeCorrected_001").events();
        assert_eq!(
            fast5.numeric_column(&other, "length"),
            Err(Missing::node(&other))
        );
        Ok(())
    }

    #[test]
    fn test_open_missing_file() {
        let dir = TempDir::new("hdf5").unwrap();
        assert!(Opener.open(&dir.path().join("absent.fast5")).is_err());
    }
}
