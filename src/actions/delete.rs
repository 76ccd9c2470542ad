//! Removing files from the source or a scanned folder.
//!
//! Two callers remove files: an ingestion prunes the source files it
//! rejected, and `dupes --delete` removes every copy but the first of each
//! duplicate group. Files go to the system trash unless
//! [`Disposal::Permanent`] is chosen.
//!
//! A batch never stops on a failed file. It stops early only when the
//! shutdown flag is set, leaving the remaining files in place.
//!
//! ```no_run
//! use photosort::actions::{delete_batch, DeleteConfig};
//! use std::path::PathBuf;
//!
//! let rejects = vec![PathBuf::from("/inbox/IMG_20200101_000000 (1).jpg")];
//! let result = delete_batch(&rejects, &DeleteConfig::trash(), None);
//! println!("{}", result.summary());
//! ```

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytesize::ByteSize;
use thiserror::Error;

/// Where removed files go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Disposal {
    /// The platform recycle bin.
    #[default]
    Trash,
    /// Unlinked for good.
    Permanent,
}

impl fmt::Display for Disposal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trash => f.write_str("trash"),
            Self::Permanent => f.write_str("delete"),
        }
    }
}

/// Why a file could not be removed.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// The file is already gone.
    #[error("{0} no longer exists")]
    NotFound(PathBuf),

    /// The file's metadata cannot be read.
    #[error("cannot read {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The trash or unlink call failed.
    #[error("cannot {disposal} {path}: {message}")]
    Failed {
        path: PathBuf,
        disposal: Disposal,
        message: String,
    },

    /// Removing the selection would leave a duplicate group with no copy.
    #[error("refusing to remove every copy of a duplicate group")]
    NoCopyLeft,
}

impl DeleteError {
    /// The file the error is about, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(path) | Self::Unreadable { path, .. } | Self::Failed { path, .. } => {
                Some(path)
            }
            Self::NoCopyLeft => None,
        }
    }
}

/// A file that was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removed {
    pub path: PathBuf,
    pub size: u64,
    pub disposal: Disposal,
}

/// Outcome of removing a list of files.
#[derive(Debug, Clone, Default)]
pub struct BatchDeleteResult {
    /// Files removed, in order
    pub removed: Vec<Removed>,
    /// Files left in place, with the reason
    pub failures: Vec<(PathBuf, String)>,
    pub bytes_freed: u64,
    /// The shutdown flag stopped the batch
    pub interrupted: bool,
}

impl BatchDeleteResult {
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.removed.len()
    }

    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Add the outcome of another batch.
    pub fn merge(&mut self, other: BatchDeleteResult) {
        self.removed.extend(other.removed);
        self.failures.extend(other.failures);
        self.bytes_freed += other.bytes_freed;
        self.interrupted |= other.interrupted;
    }

    /// `Deleted N file(s), freed X[, F failed][ (interrupted)]`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut line = format!(
            "Deleted {} file(s), freed {}",
            self.success_count(),
            ByteSize::b(self.bytes_freed)
        );
        if !self.failures.is_empty() {
            line.push_str(&format!(", {} failed", self.failures.len()));
        }
        if self.interrupted {
            line.push_str(" (interrupted)");
        }
        line
    }
}

/// How a batch removes files.
#[derive(Debug, Clone, Default)]
pub struct DeleteConfig {
    pub disposal: Disposal,
    /// Checked before each file
    pub shutdown_flag: Option<Arc<AtomicBool>>,
}

impl DeleteConfig {
    /// Move files to the trash.
    #[must_use]
    pub fn trash() -> Self {
        Self::default()
    }

    /// Unlink files.
    #[must_use]
    pub fn permanent() -> Self {
        Self {
            disposal: Disposal::Permanent,
            shutdown_flag: None,
        }
    }

    /// Stop the batch once `flag` is set.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn stop_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

/// Observer of a batch, e.g. a progress bar.
pub trait DeleteProgressCallback: Send + Sync {
    /// File `index` of `total` (0-based) is about to be removed.
    fn on_before_delete(&self, path: &Path, index: usize, total: usize);

    fn on_delete_success(&self, path: &Path, size: u64);

    fn on_delete_failure(&self, path: &Path, error: &str);
}

/// Remove one file.
///
/// # Errors
///
/// - [`DeleteError::NotFound`] if the file is gone
/// - [`DeleteError::Unreadable`] if its size cannot be read
/// - [`DeleteError::Failed`] if the trash or unlink call fails
pub fn delete_file(path: &Path, disposal: Disposal) -> Result<Removed, DeleteError> {
    let size = match fs::metadata(path) {
        Ok(metadata) => metadata.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(DeleteError::NotFound(path.to_path_buf()))
        }
        Err(source) => {
            return Err(DeleteError::Unreadable {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let outcome = match disposal {
        Disposal::Trash => trash::delete(path).map_err(|e| e.to_string()),
        Disposal::Permanent => fs::remove_file(path).map_err(|e| e.to_string()),
    };
    outcome.map_err(|message| DeleteError::Failed {
        path: path.to_path_buf(),
        disposal,
        message,
    })?;

    log::debug!("Removed {} ({size} bytes, {disposal:?})", path.display());
    Ok(Removed {
        path: path.to_path_buf(),
        size,
        disposal,
    })
}

/// Remove `paths` in order, recording failures and carrying on.
pub fn delete_batch(
    paths: &[PathBuf],
    config: &DeleteConfig,
    callback: Option<&dyn DeleteProgressCallback>,
) -> BatchDeleteResult {
    let mut result = BatchDeleteResult::default();
    let total = paths.len();

    for (index, path) in paths.iter().enumerate() {
        if config.stop_requested() {
            log::info!("Deletion interrupted after {index} of {total} file(s)");
            result.interrupted = true;
            break;
        }
        if let Some(cb) = callback {
            cb.on_before_delete(path, index, total);
        }

        match delete_file(path, config.disposal) {
            Ok(removed) => {
                if let Some(cb) = callback {
                    cb.on_delete_success(path, removed.size);
                }
                result.bytes_freed += removed.size;
                result.removed.push(removed);
            }
            Err(e) => {
                let reason = e.to_string();
                log::warn!("{reason}");
                if let Some(cb) = callback {
                    cb.on_delete_failure(path, &reason);
                }
                result.failures.push((path.clone(), reason));
            }
        }
    }

    result
}

/// Check that removing `selected` leaves at least one file of `group`.
///
/// # Errors
///
/// Returns [`DeleteError::NoCopyLeft`] if every file of `group` is selected.
pub fn ensure_copy_remains(selected: &[PathBuf], group: &[PathBuf]) -> Result<(), DeleteError> {
    if group.iter().all(|path| selected.contains(path)) {
        return Err(DeleteError::NoCopyLeft);
    }
    Ok(())
}
