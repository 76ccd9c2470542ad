//! Persistent source → destination mapping.
//!
//! # Overview
//!
//! The library folder holds a small JSON file (by default `files.txt`)
//! recording, for every file ever moved in, where it came from and where it
//! went:
//!
//! ```json
//! {
//!     "/inbox/IMG_20200315_143022.jpg": "/photos/2020/20200315_143022_000.jpg"
//! }
//! ```
//!
//! The store is loaded once per run, mutated in memory and written back
//! whole. Saving goes through a temporary sibling file that is renamed over
//! the original, so a crash mid-write leaves the previous version intact.
//!
//! - [`reconcile`]: drop entries whose destination file has disappeared
//! - [`reorganize`]: move loose canonical files into year/month folders
//! - [`split`]: move files picked by source name, with their mappings, to
//!   another folder

pub mod reconcile;
pub mod reorganize;
pub mod split;

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

pub use reconcile::{sync, SyncReport};
pub use reorganize::{reorganize, ReorganizeError, ReorganizeReport};
pub use split::{relocate, RelocateError, RelocateReport, DEFAULT_SPLIT_PATTERN};

/// Default store file name inside the destination folder.
pub const DEFAULT_STORE_NAME: &str = "files.txt";

/// Errors reading or writing the store.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// The store file exists but is not a JSON object of strings.
    #[error("Mapping store {path} is corrupt: {source}")]
    Corrupt {
        /// Store location
        path: PathBuf,
        /// Parse failure
        #[source]
        source: serde_json::Error,
    },

    /// The store file could not be read or written.
    #[error("Mapping store I/O error for {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
}

/// Source path → destination path, persisted as JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingStore {
    location: PathBuf,
    entries: BTreeMap<String, String>,
}

impl MappingStore {
    /// An empty store that will be saved to `location`.
    #[must_use]
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            entries: BTreeMap::new(),
        }
    }

    /// The store inside a destination folder.
    #[must_use]
    pub fn in_folder(folder: &Path, store_name: &str) -> PathBuf {
        folder.join(store_name)
    }

    /// Load the store at `location`. A missing file gives an empty store.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Corrupt`] if the file is not valid JSON
    /// - [`StoreError::Io`] if the file cannot be read
    pub fn load(location: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let location = location.into();
        let content = match fs::read_to_string(&location) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No mapping store at {}, starting empty", location.display());
                return Ok(Self::new(location));
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: location,
                    source,
                })
            }
        };

        let entries: BTreeMap<String, String> =
            serde_json::from_str(&content).map_err(|source| StoreError::Corrupt {
                path: location.clone(),
                source,
            })?;
        log::debug!(
            "Loaded {} mapping(s) from {}",
            entries.len(),
            location.display()
        );
        Ok(Self { location, entries })
    }

    /// Write the whole store back to its location.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the temporary file cannot be written or
    /// renamed into place.
    pub fn save(&self) -> Result<(), StoreError> {
        let temp = self.temp_location();
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| StoreError::Io { path, source }
        };

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.entries
            .serialize(&mut serializer)
            .map_err(|e| StoreError::Io {
                path: self.location.clone(),
                source: io::Error::other(e),
            })?;

        let mut file = fs::File::create(&temp).map_err(io_err(&temp))?;
        file.write_all(&buf).map_err(io_err(&temp))?;
        file.sync_all().map_err(io_err(&temp))?;
        drop(file);

        if let Err(e) = fs::rename(&temp, &self.location) {
            let _ = fs::remove_file(&temp);
            return Err(io_err(&self.location)(e));
        }
        log::debug!(
            "Saved {} mapping(s) to {}",
            self.entries.len(),
            self.location.display()
        );
        Ok(())
    }

    /// Path of the temporary file used while saving.
    #[must_use]
    pub fn temp_location(&self) -> PathBuf {
        let mut name = self.location.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Where the store is saved.
    #[must_use]
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Destination recorded for a source path.
    #[must_use]
    pub fn get(&self, source: &str) -> Option<&str> {
        self.entries.get(source).map(String::as_str)
    }

    /// Record (or replace) a mapping.
    pub fn insert(&mut self, source: impl Into<String>, destination: impl Into<String>) {
        self.entries.insert(source.into(), destination.into());
    }

    /// Remove a mapping, returning its destination.
    pub fn remove(&mut self, source: &str) -> Option<String> {
        self.entries.remove(source)
    }

    /// Merge mappings in, replacing existing sources.
    pub fn extend<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (source, destination) in pairs {
            self.insert(source, destination);
        }
    }

    /// All mappings, ordered by source path.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// File names of every source and destination path in the store.
    pub fn handled_names(&self) -> impl Iterator<Item = String> + '_ {
        self.entries
            .iter()
            .flat_map(|(k, v)| [file_name_of(k), file_name_of(v)])
            .flatten()
    }

    /// Number of mappings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store has no mappings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Final segment of a stored path string.
pub(crate) fn file_name_of(stored: &str) -> Option<String> {
    Path::new(stored)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
}
