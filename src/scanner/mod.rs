//! Finding files on disk.
//!
//! [`Walker`] lists the files under a folder in a stable, name-sorted
//! order. [`WalkerConfig`] decides which folders it enters: the whole tree
//! for a source folder, only `YYYY`/`MM` folders for a library, or just the
//! top level. [`MediaKind`] tells photos and videos apart from everything
//! else by extension.
//!
//! ```no_run
//! use photosort::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let library = Walker::new(Path::new("/photos"), WalkerConfig::date_tree());
//! let canonical = library
//!     .walk()
//!     .filter_map(Result::ok)
//!     .filter(|file| file.file_name().starts_with("20"))
//!     .count();
//! println!("{canonical} dated files");
//! ```

pub mod path_utils;
pub mod walker;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub use walker::Walker;

/// Photo extensions accepted by ingestion and the media-only duplicate scan.
pub const PHOTO_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "nef", "cr2", "arw", "dng", "heic", "heif", "tif", "tiff", "gif", "bmp",
    "webp",
];

/// Video extensions accepted by ingestion and the media-only duplicate scan.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "3gp", "m4v", "mts", "wmv"];

/// Kind of media a file holds, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Still image; capture time comes from EXIF when present.
    Photo,
    /// Video clip; capture time falls back to filesystem/name dates.
    Video,
    /// Anything else.
    Other,
}

impl MediaKind {
    /// Classify a path by its (case-insensitive) extension.
    #[must_use]
    pub fn of(path: &Path) -> Self {
        let ext = lowercase_extension(path);
        if PHOTO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Photo
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Video
        } else {
            Self::Other
        }
    }

    /// Whether this is a photo or a video.
    #[must_use]
    pub fn is_media(self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// Lower-cased extension of a path without the leading dot ("" if none).
#[must_use]
pub fn lowercase_extension(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// A file found by the walk.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Root-joined path
    pub path: PathBuf,
    pub size: u64,
    pub modified: SystemTime,
}

impl FileEntry {
    #[must_use]
    pub fn new(path: PathBuf, size: u64, modified: SystemTime) -> Self {
        Self {
            path,
            size,
            modified,
        }
    }

    /// Final path segment as a string.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Descend into subdirectories. When false only the root's own files are listed.
    pub recursive: bool,

    /// Only descend into subdirectories named with 2-4 digits (year/month folders).
    pub date_dirs_only: bool,

    /// Directories that are never entered (e.g. the destination nested in the source).
    pub exclude_dirs: Vec<PathBuf>,

    /// File names that are never reported (e.g. the mapping store).
    pub exclude_names: Vec<String>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            date_dirs_only: false,
            exclude_dirs: Vec::new(),
            exclude_names: Vec::new(),
        }
    }
}

impl WalkerConfig {
    /// Walk only the files directly under the root.
    #[must_use]
    pub fn flat() -> Self {
        Self {
            recursive: false,
            ..Self::default()
        }
    }

    /// Walk the root plus its year/month folders.
    #[must_use]
    pub fn date_tree() -> Self {
        Self {
            date_dirs_only: true,
            ..Self::default()
        }
    }

    /// Add a directory that must not be entered.
    #[must_use]
    pub fn excluding_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.exclude_dirs.push(dir.into());
        self
    }

    /// Add a file name that must not be reported.
    #[must_use]
    pub fn excluding_name(mut self, name: impl Into<String>) -> Self {
        self.exclude_names.push(name.into());
        self
    }
}

/// A folder or file the walk could not read.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error("{0}: permission denied")]
    PermissionDenied(PathBuf),

    #[error("{0} does not exist")]
    NotFound(PathBuf),

    #[error("{0} is not a folder")]
    NotADirectory(PathBuf),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// The path the error is about.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::PermissionDenied(path) | Self::NotFound(path) | Self::NotADirectory(path) => path,
            Self::Io { path, .. } => path,
        }
    }
}
