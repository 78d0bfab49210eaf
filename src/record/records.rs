//! An iterator over the qualifying records of a list of containers.

use std::path::Path;
use std::path::PathBuf;

use tracing::debug;
use tracing::info;

use crate::container::Open;
use crate::record::Criteria;
use crate::record::Error;
use crate::record::Reading;
use crate::record::Record;
use crate::record::Result;

/// The number of containers between progress messages.
const PROGRESS_INTERVAL: usize = 100;

/// An iterator over the qualifying [`Record`]s of a list of containers.
///
/// Containers that do not hold a qualifying read are skipped. Every container
/// is opened at most once, in the order given.
#[derive(Debug)]
pub struct Records<'a, O>
where
    O: Open,
{
    /// The remaining container paths.
    paths: std::slice::Iter<'a, PathBuf>,

    /// The opener of containers.
    opener: &'a O,

    /// The criteria records must meet.
    criteria: &'a Criteria,

    /// Whether to suppress progress messages.
    quiet: bool,

    /// The number of containers read so far.
    scanned: usize,

    /// The number of qualifying records found so far.
    mapped: usize,
}

impl<'a, O> Records<'a, O>
where
    O: Open,
{
    /// Creates an iterator over the records held in the containers at `paths`.
    pub fn new(paths: &'a [PathBuf], opener: &'a O, criteria: &'a Criteria) -> Self {
        Self {
            paths: paths.iter(),
            opener,
            criteria,
            quiet: false,
            scanned: 0,
            mapped: 0,
        }
    }

    /// Suppresses the periodic progress messages.
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Gets the number of containers read so far.
    pub fn scanned(&self) -> usize {
        self.scanned
    }

    /// Gets the number of qualifying records yielded so far.
    pub fn mapped(&self) -> usize {
        self.mapped
    }

    /// Reads the container at `path`.
    fn read(&self, path: &Path) -> Result<Reading> {
        let container = self
            .opener
            .open(path)
            .map_err(|err| Error::Open(path.to_path_buf(), err))?;

        self.criteria.read(&container, path)
    }
}

impl<O> Iterator for Records<'_, O>
where
    O: Open,
{
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let path = self.paths.next()?;
            let reading = self.read(path);
            self.scanned += 1;

            let item = match reading {
                Ok(Reading::Present(record)) => {
                    self.mapped += 1;
                    Some(Ok(record))
                }
                Ok(Reading::Absent(reason)) => {
                    debug!("skipping {}: {reason}", path.display());
                    None
                }
                Err(err) => Some(Err(err)),
            };

            if !self.quiet && self.scanned % PROGRESS_INTERVAL == 0 {
                info!(
                    "parsed {} files: {} / {} reads mapped",
                    self.scanned, self.mapped, self.scanned
                );
            }

            if item.is_some() {
                return item;
            }
        }
    }
}
