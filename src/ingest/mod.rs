//! Ingestion of new media into the library.
//!
//! # Overview
//!
//! One run of [`Ingestor::run`] goes through these steps:
//!
//! 1. Load the mapping store from the destination
//! 2. Index the destination: canonical names feed the suffix registry and
//!    the duplicate index; store entries feed the handled-name set
//! 3. Index the source: ignore/accept filters, then capture time from EXIF
//!    or the minimum date
//! 4. Decide: a candidate that matches the index is *rejected*; otherwise it
//!    is accepted and indexed
//! 5. Allocate canonical names in acceptance order
//! 6. Move accepted files to `dst/YYYY[/MM]/` (skipped on a dry run)
//! 7. Save the store with the new mappings
//! 8. Delete rejected source files (trash by default)
//! 9. Report
//!
//! # Example
//!
//! ```no_run
//! use photosort::compare::Comparer;
//! use photosort::ingest::{IngestOptions, Ingestor};
//!
//! let options = IngestOptions::new("/inbox", "/photos")
//!     .with_comparer(Comparer::Binary)
//!     .with_dry_run(true);
//! let report = Ingestor::new(options)?.run()?;
//! report.log_summary();
//! # Ok::<(), photosort::ingest::IngestError>(())
//! ```

pub mod pipeline;
pub mod report;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use pipeline::Ingestor;
pub use report::IngestReport;

use crate::actions::DeleteConfig;
use crate::compare::Comparer;
use crate::progress::ProgressCallback;
use crate::scanner::ScanError;
use crate::store::{StoreError, DEFAULT_STORE_NAME};

/// Accept preset expanding to both built-in name patterns.
pub const PRESET_DEFAULT: &str = "default";
/// Accept preset for phone/messenger style names.
pub const PRESET_PHONE: &str = "phone";
/// Alias of [`PRESET_PHONE`].
pub const PRESET_MOBILE: &str = "mobile";
/// Accept preset for camera counter names.
pub const PRESET_CAMERA: &str = "camera";

/// Settings for one ingestion run.
#[derive(Clone)]
pub struct IngestOptions {
    /// Folder new media is taken from
    pub src: PathBuf,
    /// Library folder
    pub dst: PathBuf,
    /// Strategy deciding whether a candidate is already in the library
    pub comparer: Comparer,
    /// File-name regexes to skip
    pub ignore: Vec<String>,
    /// File-name regexes (or presets) a candidate must match; empty accepts all
    pub accept: Vec<String>,
    /// Descend into source subfolders
    pub recursive: bool,
    /// Also index destination folders that are not year/month folders
    pub index_all_destination: bool,
    /// Plan only; change nothing on disk
    pub dry_run: bool,
    /// Lay the library out as `YYYY/MM/` instead of `YYYY/`
    pub by_month: bool,
    /// Mapping store file name inside the destination
    pub store_name: String,
    /// How rejected source files are removed
    pub delete: DeleteConfig,
    /// Optional shutdown flag for graceful termination
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for IngestOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestOptions")
            .field("src", &self.src)
            .field("dst", &self.dst)
            .field("comparer", &self.comparer)
            .field("ignore", &self.ignore)
            .field("accept", &self.accept)
            .field("recursive", &self.recursive)
            .field("index_all_destination", &self.index_all_destination)
            .field("dry_run", &self.dry_run)
            .field("by_month", &self.by_month)
            .field("store_name", &self.store_name)
            .field("delete", &self.delete)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl IngestOptions {
    /// Defaults for moving media from `src` into `dst`: binary comparison,
    /// recursive source walk, trash for rejects.
    #[must_use]
    pub fn new(src: impl Into<PathBuf>, dst: impl Into<PathBuf>) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
            comparer: Comparer::Binary,
            ignore: Vec::new(),
            accept: Vec::new(),
            recursive: true,
            index_all_destination: false,
            dry_run: false,
            by_month: false,
            store_name: DEFAULT_STORE_NAME.to_string(),
            delete: DeleteConfig::trash(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }

    /// Set the comparison strategy.
    #[must_use]
    pub fn with_comparer(mut self, comparer: Comparer) -> Self {
        self.comparer = comparer;
        self
    }

    /// Set the ignore regexes.
    #[must_use]
    pub fn with_ignore(mut self, patterns: Vec<String>) -> Self {
        self.ignore = patterns;
        self
    }

    /// Set the accept regexes / presets.
    #[must_use]
    pub fn with_accept(mut self, patterns: Vec<String>) -> Self {
        self.accept = patterns;
        self
    }

    /// Enable/disable recursive source walking.
    #[must_use]
    pub fn with_recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// Enable/disable indexing of non-date destination folders.
    #[must_use]
    pub fn with_index_all_destination(mut self, enabled: bool) -> Self {
        self.index_all_destination = enabled;
        self
    }

    /// Enable/disable dry run.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Enable/disable the by-month layout.
    #[must_use]
    pub fn with_by_month(mut self, by_month: bool) -> Self {
        self.by_month = by_month;
        self
    }

    /// Set the mapping store file name.
    #[must_use]
    pub fn with_store_name(mut self, name: impl Into<String>) -> Self {
        self.store_name = name.into();
        self
    }

    /// Set how rejected files are deleted.
    #[must_use]
    pub fn with_delete_config(mut self, config: DeleteConfig) -> Self {
        self.delete = config;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub(crate) fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Errors that stop an ingestion run.
#[derive(thiserror::Error, Debug)]
pub enum IngestError {
    /// An ignore/accept regex does not compile.
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Compile error
        #[source]
        source: regex::Error,
    },

    /// The source folder is missing or not a folder.
    #[error("Source folder: {0}")]
    Source(#[source] ScanError),

    /// Source and destination are the same folder.
    #[error("Source and destination are the same folder: {0}")]
    SameFolder(PathBuf),

    /// The destination exists but is not a folder, or cannot be created.
    #[error("Destination folder: {0}")]
    Destination(#[source] ScanError),

    /// The mapping store cannot be loaded or saved.
    #[error(transparent)]
    Store(#[from] StoreError),
}
