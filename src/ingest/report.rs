//! What an ingestion run did.

use std::path::PathBuf;

use bytesize::ByteSize;

/// Outcome of one ingestion run.
///
/// Every source file ends up in exactly one of `ignored`, `unmatched`,
/// `unsupported`, `rejected`, `failed` or `planned`. Planned files are then
/// either `moved` or `unmoved` (nothing is moved on a dry run).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Whether the run was a dry run
    pub dry_run: bool,
    /// Files found under the destination
    pub destination_files: usize,
    /// Destination files with a canonical name
    pub destination_matched: usize,
    /// Destination files without a canonical name
    pub destination_not_matched: Vec<PathBuf>,
    /// Mappings loaded from the store
    pub store_entries: usize,

    /// Files found under the source
    pub source_files: usize,
    /// Source files matching an ignore pattern
    pub ignored: Vec<PathBuf>,
    /// Source files matching no accept pattern
    pub unmatched: Vec<PathBuf>,
    /// Source files that are neither photos nor videos
    pub unsupported: Vec<PathBuf>,
    /// Accepted files named from their minimum date instead of EXIF
    pub named_from_min_date: Vec<PathBuf>,
    /// Source files already in the library, with the reason
    pub rejected: Vec<(PathBuf, String)>,
    /// Source files that could not be read, dated or named
    pub failed: Vec<(PathBuf, String)>,

    /// Accepted files and their target paths, in acceptance order
    pub planned: Vec<(PathBuf, PathBuf)>,
    /// Files moved into the library
    pub moved: Vec<(PathBuf, PathBuf)>,
    /// Planned files that were not moved, with the reason
    pub unmoved: Vec<(PathBuf, String)>,

    /// Rejected files removed from the source
    pub deleted: usize,
    /// Bytes freed by removing rejected files
    pub bytes_freed: u64,
    /// Rejected files that could not be removed, with the reason
    pub not_deleted: Vec<(PathBuf, String)>,

    /// Ctrl+C stopped the run between moves or deletions
    pub interrupted: bool,
}

impl IngestReport {
    /// Whether any file could not be processed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty() || !self.unmoved.is_empty() || !self.not_deleted.is_empty()
    }

    /// Whether the run changed nothing and found nothing to do.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.planned.is_empty() && self.rejected.is_empty()
    }

    /// Log the whole report at `info`, per-file lists at `debug`.
    pub fn log_summary(&self) {
        let prefix = if self.dry_run { "[DRY RUN] " } else { "" };

        log::info!(
            "{}Destination: {} file(s), {} canonical, {} not matched, {} store entries",
            prefix,
            self.destination_files,
            self.destination_matched,
            self.destination_not_matched.len(),
            self.store_entries
        );
        log_paths("Destination not matched", &self.destination_not_matched);

        log::info!(
            "{}Source: {} file(s), {} ignored, {} not matching, {} unsupported",
            prefix,
            self.source_files,
            self.ignored.len(),
            self.unmatched.len(),
            self.unsupported.len()
        );
        log_paths("Ignored", &self.ignored);
        log_paths("Not matching", &self.unmatched);
        log_paths("Unsupported", &self.unsupported);
        log_paths("Named from minimum date", &self.named_from_min_date);

        log::info!(
            "{}Accepted: {}, rejected: {}, failed: {}",
            prefix,
            self.planned.len(),
            self.rejected.len(),
            self.failed.len()
        );
        log_reasons("Rejected", &self.rejected);
        for (path, reason) in &self.failed {
            log::warn!("Failed {}: {}", path.display(), reason);
        }

        if self.dry_run {
            for (from, to) in &self.planned {
                log::info!("[DRY RUN] Would move {} -> {}", from.display(), to.display());
            }
            return;
        }

        log::info!(
            "Moved: {}, unmoved: {}",
            self.moved.len(),
            self.unmoved.len()
        );
        for (path, reason) in &self.unmoved {
            log::warn!("Unmoved {}: {}", path.display(), reason);
        }
        log::info!(
            "Deleted {} rejected file(s), freed {}, {} not deleted",
            self.deleted,
            ByteSize(self.bytes_freed),
            self.not_deleted.len()
        );
        for (path, reason) in &self.not_deleted {
            log::warn!("Not deleted {}: {}", path.display(), reason);
        }
        if self.interrupted {
            log::warn!("Run was interrupted; remaining files were left in place");
        }
    }
}

fn log_paths(label: &str, paths: &[PathBuf]) {
    for path in paths {
        log::debug!("{label}: {}", path.display());
    }
}

fn log_reasons(label: &str, entries: &[(PathBuf, String)]) {
    for (path, reason) in entries {
        log::debug!("{label}: {} ({})", path.display(), reason);
    }
}
