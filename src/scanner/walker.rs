//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing source and
//! destination trees. Traversal is sequential and sorted by file name, so
//! the discovery order (and therefore which file of a duplicate group is
//! kept) is stable within one run.
//!
//! # Example
//!
//! ```no_run
//! use photosort::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! // Destination layout: root files plus YYYY/ and YYYY/MM/ folders
//! let walker = Walker::new(Path::new("/photos/library"), WalkerConfig::date_tree());
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files", files.len());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use walkdir::{DirEntry, WalkDir};

use super::path_utils::path_key;
use super::{FileEntry, ScanError, WalkerConfig};

/// Directory walker for sequential file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Normalized keys of excluded directories
    excluded: Vec<String>,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - Root directory to scan
    /// * `config` - Walker configuration options
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        let excluded = config
            .exclude_dirs
            .iter()
            .map(|dir| dir_key(dir))
            .collect();
        Self {
            root: path.to_path_buf(),
            config,
            excluded,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops yielding entries.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Decide whether a directory entry should be entered / reported.
    fn should_enter(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }

        if !self.excluded.is_empty() && self.excluded.contains(&dir_key(entry.path())) {
            log::debug!("Skipping excluded directory: {}", entry.path().display());
            return false;
        }

        if self.config.date_dirs_only && !is_date_dir_name(&entry.file_name().to_string_lossy())
        {
            log::trace!("Skipping non-date directory: {}", entry.path().display());
            return false;
        }

        true
    }

    /// Walk the directory tree and yield file entries.
    ///
    /// Entries are yielded in file-name order, depth first. Errors are
    /// yielded in place so callers can record them and keep going.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let mut walk_dir = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name();
        if !self.config.recursive {
            walk_dir = walk_dir.max_depth(1);
        }

        walk_dir
            .into_iter()
            .filter_entry(move |entry| self.should_enter(entry))
            .filter_map(move |entry_result| {
                if self.is_shutdown_requested() {
                    log::debug!("Walker: Shutdown requested, stopping iteration");
                    return None;
                }

                match entry_result {
                    Ok(entry) => {
                        if !entry.file_type().is_file() {
                            return None;
                        }

                        let name = entry.file_name().to_string_lossy();
                        if self.config.exclude_names.iter().any(|n| *n == name) {
                            log::trace!("Skipping excluded file: {}", entry.path().display());
                            return None;
                        }

                        match entry.metadata() {
                            Ok(metadata) => Some(Ok(FileEntry::new(
                                entry.into_path(),
                                metadata.len(),
                                metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                            ))),
                            Err(e) => {
                                let path = entry.path().to_path_buf();
                                Some(Err(self.handle_walk_error(path, e)))
                            }
                        }
                    }
                    Err(e) => {
                        let path = e
                            .path()
                            .map_or_else(|| self.root.clone(), Path::to_path_buf);
                        Some(Err(self.handle_walk_error(path, e)))
                    }
                }
            })
    }

    /// Convert a walkdir error into a [`ScanError`].
    fn handle_walk_error(&self, path: PathBuf, error: walkdir::Error) -> ScanError {
        use std::io::ErrorKind;

        match error.io_error().map(std::io::Error::kind) {
            Some(ErrorKind::PermissionDenied) => {
                log::warn!("Skipping {}: permission denied", path.display());
                ScanError::PermissionDenied(path)
            }
            Some(ErrorKind::NotFound) => {
                log::debug!("{} vanished during the walk", path.display());
                ScanError::NotFound(path)
            }
            _ => {
                log::warn!("Cannot read {}: {error}", path.display());
                ScanError::Io {
                    path,
                    source: std::io::Error::other(error.to_string()),
                }
            }
        }
    }
}

/// Year (`2020`) or month (`03`) folder names.
pub fn is_date_dir_name(name: &str) -> bool {
    (2..=4).contains(&name.len()) && name.bytes().all(|b| b.is_ascii_digit())
}

/// Comparison key for a directory, canonicalized when it exists.
fn dir_key(path: &Path) -> String {
    let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let key = path_key(&resolved);
    if cfg!(windows) {
        key.to_lowercase()
    } else {
        key
    }
}
