//! Moving files into the library.
//!
//! A move never overwrites: an existing target is reported as
//! [`MoveError::TargetExists`]. Missing parent folders are created. When a
//! plain rename fails (typically because source and target are on different
//! devices) the file is copied and the source removed; a failed copy leaves
//! no partial target behind.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error type for move operations.
#[derive(Debug, Error)]
pub enum MoveError {
    /// The target path is already taken.
    #[error("Exists: {0}")]
    TargetExists(PathBuf),

    /// The target folder could not be created.
    #[error("cannot create folder {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Rename and copy both failed.
    #[error("cannot move {from} to {to}: {source}")]
    Io {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl MoveError {
    /// Short reason suitable for a report line.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::TargetExists(_) => "Exists".to_string(),
            Self::CreateDir { source, .. } | Self::Io { source, .. } => {
                format!("Error {:?}: {}", source.kind(), source)
            }
        }
    }
}

/// Move `from` to `to`, creating `to`'s parent folders.
///
/// # Errors
///
/// - `TargetExists` if `to` already exists
/// - `CreateDir` if a parent folder cannot be created
/// - `Io` if neither rename nor copy succeeds
pub fn move_file(from: &Path, to: &Path) -> Result<(), MoveError> {
    if to.exists() {
        return Err(MoveError::TargetExists(to.to_path_buf()));
    }

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(|source| MoveError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            log::debug!(
                "Rename {} -> {} failed ({}), falling back to copy",
                from.display(),
                to.display(),
                rename_err
            );
            copy_then_remove(from, to)
        }
    }
}

fn copy_then_remove(from: &Path, to: &Path) -> Result<(), MoveError> {
    let io_err = |source| MoveError::Io {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if let Err(e) = fs::copy(from, to) {
        let _ = fs::remove_file(to);
        return Err(io_err(e));
    }
    if let Err(e) = fs::remove_file(from) {
        // Keep exactly one copy: the source is still there, drop the new one.
        let _ = fs::remove_file(to);
        return Err(io_err(e));
    }
    Ok(())
}
