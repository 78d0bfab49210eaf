//! Discovery and ordering of per-read containers.
//!
//! Containers are expected to live one directory below the input root:
//!
//! ```text
//! root/
//! ├── 0/
//! │   ├── read_1.fast5
//! │   └── read_2.fast5
//! └── 1/
//!     └── read_3.fast5
//! ```
//!
//! Hidden entries (names starting with `.`) are ignored. Entries are visited
//! in name order at each level so that repeated discoveries over the same
//! tree yield the same paths in the same order.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use tracing::info;

use crate::container::Layout;
use crate::container::Missing;
use crate::container::Open;

/// The extension of per-read container files.
pub const EXTENSION: &str = "fast5";

/// The number of files between progress messages.
const PROGRESS_INTERVAL: usize = 100;

////////////////////////////////////////////////////////////////////////////////////////
// Errors
////////////////////////////////////////////////////////////////////////////////////////

/// An error related to discovering containers.
#[derive(Debug)]
pub enum Error {
    /// A directory could not be listed.
    Io(PathBuf, io::Error),

    /// A container could not be opened for ordering.
    Open(PathBuf, io::Error),

    /// A container does not record its read number.
    MissingReadNumber(PathBuf, Missing),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(path, err) => write!(f, "unable to list {}: {err}", path.display()),
            Error::Open(path, err) => write!(f, "unable to open {}: {err}", path.display()),
            Error::MissingReadNumber(path, missing) => {
                write!(f, "no read number in {}: {missing}", path.display())
            }
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

////////////////////////////////////////////////////////////////////////////////////////
// Discovery
////////////////////////////////////////////////////////////////////////////////////////

/// A description of which containers to discover, and in what order.
#[derive(Clone, Debug)]
pub struct Discovery {
    /// The input root.
    root: PathBuf,

    /// The maximum number of files to discover.
    max_files: Option<usize>,

    /// Whether to order the containers by read number.
    ordered: bool,
}

impl Discovery {
    /// Creates an unordered, unbounded discovery under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_files: None,
            ordered: false,
        }
    }

    /// Sets the maximum number of files to discover.
    ///
    /// The cap applies across all subdirectories.
    pub fn max_files(mut self, max_files: Option<usize>) -> Self {
        self.max_files = max_files;
        self
    }

    /// Sets whether containers are ordered by read number.
    pub fn ordered(mut self, ordered: bool) -> Self {
        self.ordered = ordered;
        self
    }

    /// Gets the input root.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    ///
    /// use eventarray::discovery::Discovery;
    ///
    /// let discovery = Discovery::new("reads");
    /// assert_eq!(discovery.root(), Path::new("reads"));
    /// ```
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns whether the discovery orders containers by read number.
    ///
    /// # Examples
    ///
    /// ```
    /// use eventarray::discovery::Discovery;
    ///
    /// let discovery = Discovery::new("reads");
    /// assert!(!discovery.is_ordered());
    ///
    /// let discovery = discovery.ordered(true);
    /// assert!(discovery.is_ordered());
    /// ```
    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    /// Discovers the container paths.
    ///
    /// When ordering is requested, every discovered container is opened once
    /// through `opener` to read its read number (as located by `layout`), and
    /// the paths are sorted by it. Ties keep their discovery order.
    pub fn discover<O>(&self, opener: &O, layout: &Layout) -> Result<Vec<PathBuf>>
    where
        O: Open,
    {
        let paths = self.enumerate()?;
        info!("located {} total files", paths.len());

        if !self.ordered {
            return Ok(paths);
        }

        let mut keyed = Vec::with_capacity(paths.len());

        for path in paths {
            let container = opener
                .open(&path)
                .map_err(|err| Error::Open(path.clone(), err))?;

            let read_number = layout
                .read_number(&container)
                .map_err(|missing| Error::MissingReadNumber(path.clone(), missing))?;

            keyed.push((read_number, path));
        }

        keyed.sort_by_key(|(read_number, _)| *read_number);
        info!("sorted files by read number");

        Ok(keyed.into_iter().map(|(_, path)| path).collect())
    }

    /// Enumerates the container files in name order, honoring the file cap.
    fn enumerate(&self) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::new();

        if self.max_files == Some(0) {
            return Ok(paths);
        }

        for folder in sorted_entries(&self.root)? {
            if !folder.is_dir() {
                continue;
            }

            for file in sorted_entries(&folder)? {
                if !is_container(&file) {
                    continue;
                }

                paths.push(file);

                if paths.len() % PROGRESS_INTERVAL == 0 {
                    info!("located {} files so far", paths.len());
                }

                if self.max_files.is_some_and(|max| paths.len() >= max) {
                    return Ok(paths);
                }
            }
        }

        Ok(paths)
    }
}

/// Lists the non-hidden entries of a directory, sorted by name.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();

    for result in fs::read_dir(dir).map_err(|err| Error::Io(dir.to_path_buf(), err))? {
        let entry = result.map_err(|err| Error::Io(dir.to_path_buf(), err))?;

        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }

        entries.push(entry.path());
    }

    entries.sort();
    Ok(entries)
}

/// Returns whether a path names a container file.
fn is_container(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == EXTENSION)
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use tempdir::TempDir;

    use super::*;
    use crate::container::memory::Read;
    use crate::container::memory::Store;

    /// Creates empty files at the given paths (relative to `root`).
    fn touch(root: &Path, paths: &[&str]) -> io::Result<()> {
        for path in paths {
            let path = root.join(path);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            File::create(path)?;
        }
        Ok(())
    }

    fn names(root: &Path, paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_enumerates_one_level_in_name_order() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let dir = TempDir::new("discovery")?;
        touch(
            dir.path(),
            &[
                "b/2.fast5",
                "b/1.fast5",
                "a/3.fast5",
                "a/notes.txt",
                "a/.hidden.fast5",
                ".cache/4.fast5",
                "top.fast5",
                "a/deeper/5.fast5",
            ],
        )?;

        let paths = Discovery::new(dir.path()).discover(&Store::default(), &Layout::default())?;
        assert_eq!(
            names(dir.path(), &paths),
            vec!["a/3.fast5", "b/1.fast5", "b/2.fast5"]
        );
        Ok(())
    }

    #[test]
    fn test_max_files_is_global() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("discovery")?;
        touch(dir.path(), &["a/1.fast5", "a/2.fast5", "b/3.fast5", "b/4.fast5"])?;

        let store = Store::default();
        let layout = Layout::default();

        let paths = Discovery::new(dir.path())
            .max_files(Some(3))
            .discover(&store, &layout)?;
        assert_eq!(
            names(dir.path(), &paths),
            vec!["a/1.fast5", "a/2.fast5", "b/3.fast5"]
        );

        let paths = Discovery::new(dir.path())
            .max_files(Some(0))
            .discover(&store, &layout)?;
        assert!(paths.is_empty());

        let paths = Discovery::new(dir.path())
            .max_files(Some(10))
            .discover(&store, &layout)?;
        assert_eq!(paths.len(), 4);
        Ok(())
    }

    #[test]
    fn test_ordered_by_read_number() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("discovery")?;
        let files = ["a/1.fast5", "a/2.fast5", "b/3.fast5", "b/4.fast5"];
        touch(dir.path(), &files)?;

        let layout = Layout::default();
        let mut store = Store::default();
        for (file, read_number) in files.iter().zip([40, 10, 30, 10]) {
            store.insert(
                dir.path().join(file),
                Read::new("rna0", 0, "", read_number).build(&layout),
            );
        }

        let paths = Discovery::new(dir.path())
            .ordered(true)
            .discover(&store, &layout)?;
        assert_eq!(
            names(dir.path(), &paths),
            vec!["a/2.fast5", "b/4.fast5", "b/3.fast5", "a/1.fast5"]
        );
        Ok(())
    }

    #[test]
    fn test_ordered_requires_read_number() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new("discovery")?;
        touch(dir.path(), &["a/1.fast5"])?;

        let mut store = Store::default();
        store.insert(
            dir.path().join("a/1.fast5"),
            crate::container::memory::Container::default(),
        );

        let err = Discovery::new(dir.path())
            .ordered(true)
            .discover(&store, &Layout::default())
            .unwrap_err();
        assert!(matches!(err, Error::MissingReadNumber(_, _)));
        Ok(())
    }

    #[test]
    fn test_missing_root() {
        let err = Discovery::new("/definitely/not/a/real/root")
            .discover(&Store::default(), &Layout::default())
            .unwrap_err();
        assert!(matches!(err, Error::Io(_, _)));
    }
}
