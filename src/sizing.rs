//! The sizing pass.
//!
//! The output matrix cannot grow once it is created, so the number of
//! qualifying reads is counted ahead of time with a full, read-only pass over
//! the discovered containers.

use tracing::info;

use crate::container::Open;
use crate::discovery;
use crate::discovery::Discovery;
use crate::record;
use crate::record::Criteria;
use crate::record::Records;

/// An error related to the sizing pass.
#[derive(Debug)]
pub enum Error {
    /// An error discovering containers.
    Discovery(discovery::Error),

    /// An error reading a record.
    Record(record::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Discovery(err) => write!(f, "discovery error: {err}"),
            Error::Record(err) => write!(f, "record error: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Counts the number of rows the output matrix needs.
///
/// Discovery is always unordered here (order does not matter for counting).
/// The count is `min(qualifying reads, max_reads)`, and the pass stops as soon
/// as `max_reads` qualifying reads have been seen.
///
/// # Examples
///
/// ```
/// use eventarray::container::memory::Store;
/// use eventarray::discovery::Discovery;
/// use eventarray::record::Criteria;
/// use eventarray::record::Kind;
/// use eventarray::sizing;
///
/// let root = std::env::temp_dir().join("eventarray-sizing-doctest-empty");
/// std::fs::create_dir_all(&root)?;
///
/// let rows = sizing::count_rows(
///     &Discovery::new(&root),
///     &Store::default(),
///     &Criteria::new("rna0", Kind::Dwell),
///     None,
/// )?;
/// assert_eq!(rows, 0);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn count_rows<O>(
    discovery: &Discovery,
    opener: &O,
    criteria: &Criteria,
    max_reads: Option<usize>,
) -> Result<usize>
where
    O: Open,
{
    info!("determining array size");

    let paths = discovery
        .clone()
        .ordered(false)
        .discover(opener, criteria.layout())
        .map_err(Error::Discovery)?;

    let mut rows = 0;

    if max_reads != Some(0) {
        for result in Records::new(&paths, opener, criteria) {
            result.map_err(Error::Record)?;
            rows += 1;

            if max_reads.is_some_and(|max| rows >= max) {
                break;
            }
        }
    }

    info!("{rows} total reads with mapped base calls");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::fs::File;
    use std::path::Path;

    use tempdir::TempDir;

    use super::*;
    use crate::container::Layout;
    use crate::container::memory::Read;
    use crate::container::memory::Store;
    use crate::record::Kind;

    /// Writes `n` placeholder files and stores a read for each; every third
    /// read is mapped to another reference.
    fn fixture(root: &Path, n: usize) -> std::io::Result<Store> {
        let layout = Layout::default();
        let mut store = Store::default();

        for i in 0..n {
            let path = root.join(format!("{}", i % 2)).join(format!("{i:03}.fast5"));
            fs::create_dir_all(path.parent().unwrap())?;
            File::create(&path)?;

            let chrom = if i % 3 == 0 { "other" } else { "rna0" };
            store.insert(
                path,
                Read::new(chrom, 0, "AC", i as i64).dwell([1.0, 2.0]).build(&layout),
            );
        }

        Ok(store)
    }

    #[test]
    fn test_counts_qualifying_reads() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("sizing")?;
        let store = fixture(dir.path(), 10)?;
        let criteria = Criteria::new("rna0", Kind::Dwell);

        // Reads 0, 3, 6 and 9 map elsewhere.
        let rows = count_rows(&Discovery::new(dir.path()), &store, &criteria, None)?;
        assert_eq!(rows, 6);

        // An independent enumeration agrees.
        let paths = Discovery::new(dir.path()).discover(&store, criteria.layout())?;
        let independent = Records::new(&paths, &store, &criteria)
            .quiet()
            .collect::<record::Result<Vec<_>>>()?
            .len();
        assert_eq!(rows, independent);
        Ok(())
    }

    #[test]
    fn test_max_reads_caps_the_count() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("sizing")?;
        let store = fixture(dir.path(), 10)?;
        let criteria = Criteria::new("rna0", Kind::Dwell);
        let discovery = Discovery::new(dir.path());

        assert_eq!(count_rows(&discovery, &store, &criteria, Some(4))?, 4);
        assert_eq!(count_rows(&discovery, &store, &criteria, Some(6))?, 6);
        assert_eq!(count_rows(&discovery, &store, &criteria, Some(100))?, 6);
        assert_eq!(count_rows(&discovery, &store, &criteria, Some(0))?, 0);
        Ok(())
    }

    #[test]
    fn test_max_files_limits_the_scan() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("sizing")?;
        let store = fixture(dir.path(), 10)?;
        let criteria = Criteria::new("rna0", Kind::Dwell);

        // Folder `0` holds reads 0, 2, 4, 6, 8 of which 2, 4, 8 qualify.
        let discovery = Discovery::new(dir.path()).max_files(Some(5));
        assert_eq!(count_rows(&discovery, &store, &criteria, None)?, 3);
        Ok(())
    }
}
