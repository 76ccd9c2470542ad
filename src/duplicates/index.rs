//! Incremental duplicate lookup for ingestion.
//!
//! [`SizeIndex`] holds what the library already contains, bucketed by size,
//! plus the set of file names that count as "already handled". Each source
//! candidate is checked against it with the configured [`Comparer`]; a
//! candidate that is accepted is inserted so later candidates of the same
//! run are checked against it too.
//!
//! A comparer matches the index when any of its leaf strategies reports
//! "same" for any indexed file:
//! - `Name` consults the handled-name set
//! - `Size` matches as soon as the candidate's size bucket is non-empty
//! - `Binary` compares the candidate against each file in its size bucket

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;

use crate::compare::{files_identical, CompareError, Comparer};
use crate::scanner::FileEntry;

/// Why a candidate was matched to the index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Match {
    /// Its file name is already handled.
    Name(String),
    /// A file of the same size is indexed.
    Size(PathBuf),
    /// An indexed file has the same content.
    Content(PathBuf),
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => write!(f, "name {name} already handled"),
            Self::Size(path) => write!(f, "same size as {}", path.display()),
            Self::Content(path) => write!(f, "identical to {}", path.display()),
        }
    }
}

/// Size buckets and handled names for one ingestion run.
#[derive(Debug, Clone, Default)]
pub struct SizeIndex {
    by_size: HashMap<u64, Vec<PathBuf>>,
    names: HashSet<String>,
    files: usize,
}

impl SizeIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a file under its size.
    pub fn insert(&mut self, entry: &FileEntry) {
        self.by_size
            .entry(entry.size)
            .or_default()
            .push(entry.path.clone());
        self.files += 1;
    }

    /// Mark a file name as handled.
    pub fn add_name(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    /// Whether a file name is handled.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of indexed files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files
    }

    /// Whether no file is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files == 0
    }

    /// Indexed files of a given size, in insertion order.
    #[must_use]
    pub fn bucket(&self, size: u64) -> &[PathBuf] {
        self.by_size.get(&size).map_or(&[], Vec::as_slice)
    }

    /// Find an indexed file that `comparer` does not consider distinct
    /// from `candidate`.
    ///
    /// Leaf strategies are tried in declaration order and the first match
    /// wins. An indexed file that cannot be read is logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError`] if the candidate itself cannot be read.
    pub fn find_match(
        &self,
        comparer: &Comparer,
        candidate: &FileEntry,
    ) -> Result<Option<Match>, CompareError> {
        for leaf in comparer.leaves() {
            let found = match leaf {
                Comparer::Name => {
                    let name = candidate.file_name();
                    self.has_name(&name).then_some(Match::Name(name))
                }
                Comparer::Size => self
                    .bucket(candidate.size)
                    .first()
                    .map(|existing| Match::Size(existing.clone())),
                Comparer::Binary => self.find_identical(candidate)?,
                Comparer::Composite(_) => None,
            };
            if found.is_some() {
                return Ok(found);
            }
        }
        Ok(None)
    }

    fn find_identical(&self, candidate: &FileEntry) -> Result<Option<Match>, CompareError> {
        for existing in self.bucket(candidate.size) {
            match files_identical(existing, &candidate.path) {
                Ok(true) => return Ok(Some(Match::Content(existing.clone()))),
                Ok(false) => {}
                Err(e) if e.path() == candidate.path.as_path() => return Err(e),
                Err(e) => log::warn!("Skipping indexed file: {e}"),
            }
        }
        Ok(None)
    }
}
