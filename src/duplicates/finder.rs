//! Batch duplicate detection.
//!
//! # Overview
//!
//! 1. **Phase 1 - Size grouping**: bucket files by size (see
//!    [`crate::duplicates::groups`])
//! 2. **Phase 2 - Content partition**: inside a bucket, compare each file
//!    byte-for-byte against the first member of every group formed so far;
//!    join the first group it equals, otherwise start a new group
//!
//! Byte equality is transitive, so comparing against one representative per
//! group is enough. Groups with a single member are dropped.
//!
//! # Example
//!
//! ```no_run
//! use photosort::duplicates::{scan_for_duplicates, ScanOptions};
//! use std::path::Path;
//!
//! let (groups, stats) = scan_for_duplicates(Path::new("/photos"), &ScanOptions::default())?;
//! println!("{} groups, {} wasted", groups.len(), stats.wasted_display());
//! # Ok::<(), photosort::duplicates::FinderError>(())
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytesize::ByteSize;

use super::groups::{group_by_size, DuplicateGroup, SizeGroup};
use crate::actions::{
    delete_batch, ensure_copy_remains, BatchDeleteResult, DeleteConfig, DeleteProgressCallback,
};
use crate::compare::files_identical;
use crate::progress::ProgressCallback;
use crate::scanner::{FileEntry, MediaKind, ScanError, Walker, WalkerConfig};

/// Statistics from a duplicate search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateStats {
    /// Total number of files considered
    pub total_files: usize,
    /// Total size of all considered files in bytes
    pub total_size: u64,
    /// Files ruled out by size alone
    pub eliminated_by_size: usize,
    /// Byte-for-byte comparisons performed
    pub comparisons: usize,
    /// Comparisons that failed with an I/O error
    pub compare_errors: usize,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Redundant files (group members beyond the first)
    pub duplicate_files: usize,
    /// Space used by redundant files
    pub wasted_space: u64,
    /// Files the walk could not read
    pub scan_errors: usize,
    /// Whether the search was interrupted
    pub interrupted: bool,
}

impl DuplicateStats {
    /// Wasted space as a human-readable string.
    #[must_use]
    pub fn wasted_display(&self) -> String {
        ByteSize::b(self.wasted_space).to_string()
    }

    fn record_groups(&mut self, groups: &[DuplicateGroup]) {
        self.duplicate_groups = groups.len();
        self.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        self.wasted_space = groups.iter().map(DuplicateGroup::wasted_space).sum();
    }
}

/// Options for a duplicate search over a folder.
#[derive(Clone, Default)]
pub struct ScanOptions {
    /// Only consider photo and video files.
    pub media_only: bool,
    /// File names to leave out (the mapping store, the report).
    pub exclude_names: Vec<String>,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for ScanOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanOptions")
            .field("media_only", &self.media_only)
            .field("exclude_names", &self.exclude_names)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl ScanOptions {
    /// Restrict the search to photo and video files.
    #[must_use]
    pub fn with_media_only(mut self, media_only: bool) -> Self {
        self.media_only = media_only;
        self
    }

    /// Leave a file name out of the search.
    #[must_use]
    pub fn excluding_name(mut self, name: impl Into<String>) -> Self {
        self.exclude_names.push(name.into());
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

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Errors that stop a duplicate search.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    #[error("{0} does not exist")]
    PathNotFound(PathBuf),

    #[error("{0} is not a folder")]
    NotADirectory(PathBuf),
}

/// Split one size bucket into groups of identical content (Phase 2).
///
/// A file that cannot be read is logged, counted in
/// `stats.compare_errors`, and treated as different from the group it was
/// compared with.
pub fn partition_by_content(bucket: SizeGroup, stats: &mut DuplicateStats) -> Vec<DuplicateGroup> {
    let mut groups: Vec<Vec<PathBuf>> = Vec::new();

    for file in bucket.files {
        let mut placed = false;
        for group in &mut groups {
            let representative = &group[0];
            stats.comparisons += 1;
            match files_identical(representative, &file.path) {
                Ok(true) => {
                    group.push(file.path.clone());
                    placed = true;
                    break;
                }
                Ok(false) => {}
                Err(e) => {
                    stats.compare_errors += 1;
                    log::warn!("{e}");
                }
            }
        }
        if !placed {
            groups.push(vec![file.path]);
        }
    }

    groups
        .into_iter()
        .filter(|files| files.len() > 1)
        .map(|files| DuplicateGroup::new(bucket.size, files))
        .collect()
}

/// Find groups of byte-identical files among `files`.
///
/// Groups come back in the order their size was first seen, each group in
/// traversal order.
#[must_use]
pub fn find_duplicate_groups(
    files: impl IntoIterator<Item = FileEntry>,
) -> (Vec<DuplicateGroup>, DuplicateStats) {
    find_groups(files, &ScanOptions::default())
}

fn find_groups(
    files: impl IntoIterator<Item = FileEntry>,
    options: &ScanOptions,
) -> (Vec<DuplicateGroup>, DuplicateStats) {
    let (buckets, grouping) = group_by_size(files);
    let mut stats = DuplicateStats {
        total_files: grouping.total_files,
        total_size: grouping.total_size,
        eliminated_by_size: grouping.singletons,
        ..DuplicateStats::default()
    };

    let progress = options.progress_callback.as_deref();
    if let Some(cb) = progress {
        cb.on_phase_start("compare", buckets.len());
    }

    let mut groups = Vec::new();
    for (index, bucket) in buckets.into_iter().enumerate() {
        if options.is_shutdown_requested() {
            log::info!("Duplicate search interrupted");
            stats.interrupted = true;
            break;
        }
        if let Some(cb) = progress {
            let label = bucket
                .files
                .first()
                .map(|f| f.path.display().to_string())
                .unwrap_or_default();
            cb.on_progress(index + 1, &label);
        }
        groups.extend(partition_by_content(bucket, &mut stats));
    }

    if let Some(cb) = progress {
        cb.on_phase_end("compare");
    }

    stats.record_groups(&groups);
    (groups, stats)
}

/// Walk `folder` (recursively) and find duplicate groups in it.
///
/// # Errors
///
/// Returns [`FinderError`] if `folder` is missing or not a directory.
/// Unreadable entries are logged and counted, not fatal.
pub fn scan_for_duplicates(
    folder: &Path,
    options: &ScanOptions,
) -> Result<(Vec<DuplicateGroup>, DuplicateStats), FinderError> {
    if !folder.exists() {
        return Err(FinderError::PathNotFound(folder.to_path_buf()));
    }
    if !folder.is_dir() {
        return Err(FinderError::NotADirectory(folder.to_path_buf()));
    }

    let mut config = WalkerConfig::default();
    for name in &options.exclude_names {
        config = config.excluding_name(name.clone());
    }
    let mut walker = Walker::new(folder, config);
    if let Some(flag) = &options.shutdown_flag {
        walker = walker.with_shutdown_flag(Arc::clone(flag));
    }

    let mut scan_errors = 0;
    let files: Vec<FileEntry> = walker
        .walk()
        .filter_map(|entry| match entry {
            Ok(file) => Some(file),
            Err(e) => {
                log::warn!("{e}");
                scan_errors += 1;
                None
            }
        })
        .filter(|file| !options.media_only || MediaKind::of(&file.path).is_media())
        .collect();
    log::debug!("Collected {} files under {}", files.len(), folder.display());

    let (groups, mut stats) = find_groups(files, options);
    stats.scan_errors = scan_errors;
    if options.is_shutdown_requested() {
        stats.interrupted = true;
    }
    Ok((groups, stats))
}

/// Delete every file but the first of each group.
///
/// Failures are recorded in the result; the remaining files are still
/// processed.
pub fn delete_duplicates(
    groups: &[DuplicateGroup],
    config: &DeleteConfig,
    callback: Option<&dyn DeleteProgressCallback>,
) -> BatchDeleteResult {
    let mut result = BatchDeleteResult::default();

    for group in groups {
        if result.interrupted {
            break;
        }
        let redundant = group.redundant();
        if let Err(e) = ensure_copy_remains(redundant, &group.files) {
            log::error!("Skipping group of {} bytes: {}", group.size, e);
            continue;
        }
        for path in redundant {
            log::info!(
                "Deleting duplicate {} (keeping {})",
                path.display(),
                group.files[0].display()
            );
        }
        result.merge(delete_batch(redundant, config, callback));
    }

    log::info!("{}", result.summary());
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn create(dir: &Path, rel: &str, content: &[u8]) -> FileEntry {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        FileEntry::new(path, content.len() as u64, SystemTime::now())
    }

    fn names(group: &DuplicateGroup) -> Vec<String> {
        group
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_partition_separates_same_size_different_content() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            create(dir.path(), "a", b"1111"),
            create(dir.path(), "b", b"2222"),
            create(dir.path(), "c", b"1111"),
            create(dir.path(), "d", b"2222"),
            create(dir.path(), "e", b"3333"),
        ];
        let bucket = SizeGroup { size: 4, files };
        let mut stats = DuplicateStats::default();

        let groups = partition_by_content(bucket, &mut stats);

        assert_eq!(groups.len(), 2);
        assert_eq!(names(&groups[0]), vec!["a", "c"]);
        assert_eq!(names(&groups[1]), vec!["b", "d"]);
        assert_eq!(stats.compare_errors, 0);
    }

    #[test]
    fn test_partition_unreadable_file_is_not_equal() {
        let dir = TempDir::new().unwrap();
        let a = create(dir.path(), "a", b"xx");
        let ghost = FileEntry::new(dir.path().join("ghost"), 2, SystemTime::now());
        let b = create(dir.path(), "b", b"xx");
        let mut stats = DuplicateStats::default();

        let groups = partition_by_content(
            SizeGroup {
                size: 2,
                files: vec![a, ghost, b],
            },
            &mut stats,
        );

        assert_eq!(groups.len(), 1);
        assert_eq!(names(&groups[0]), vec!["a", "b"]);
        assert!(stats.compare_errors >= 1);
    }

    #[test]
    fn test_find_duplicate_groups_stats() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            create(dir.path(), "a.jpg", b"0123456789"),
            create(dir.path(), "b.jpg", b"0123456789"),
            create(dir.path(), "c.jpg", b"0123456789ab"),
        ];

        let (groups, stats) = find_duplicate_groups(files);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].size, 10);
        assert_eq!(stats.duplicate_groups, 1);
        assert_eq!(stats.duplicate_files, 1);
        assert_eq!(stats.wasted_space, 10);
        assert_eq!(stats.eliminated_by_size, 1);
    }

    #[test]
    fn test_scan_for_duplicates_media_only() {
        let dir = TempDir::new().unwrap();
        create(dir.path(), "a.jpg", b"same");
        create(dir.path(), "sub/b.jpg", b"same");
        create(dir.path(), "notes.txt", b"same");
        create(dir.path(), "copy.txt", b"same");

        let options = ScanOptions::default().with_media_only(true);
        let (groups, _) = scan_for_duplicates(dir.path(), &options).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(names(&groups[0]), vec!["a.jpg", "b.jpg"]);

        let (all, _) = scan_for_duplicates(dir.path(), &ScanOptions::default()).unwrap();
        assert_eq!(all[0].len(), 4);
    }

    #[test]
    fn test_scan_for_duplicates_excludes_names() {
        let dir = TempDir::new().unwrap();
        create(dir.path(), "a.jpg", b"{}");
        create(dir.path(), "files.txt", b"{}");

        let options = ScanOptions::default().excluding_name("files.txt");
        let (groups, stats) = scan_for_duplicates(dir.path(), &options).unwrap();

        assert!(groups.is_empty());
        assert_eq!(stats.total_files, 1);
    }

    #[test]
    fn test_scan_for_duplicates_bad_paths() {
        let dir = TempDir::new().unwrap();
        let file = create(dir.path(), "f.jpg", b"x");

        assert!(matches!(
            scan_for_duplicates(&dir.path().join("missing"), &ScanOptions::default()),
            Err(FinderError::PathNotFound(_))
        ));
        assert!(matches!(
            scan_for_duplicates(&file.path, &ScanOptions::default()),
            Err(FinderError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_delete_duplicates_keeps_first() {
        let dir = TempDir::new().unwrap();
        let a = create(dir.path(), "a.jpg", b"dup");
        let b = create(dir.path(), "b.jpg", b"dup");
        let c = create(dir.path(), "c.jpg", b"dup");
        let group = DuplicateGroup::new(3, vec![a.path.clone(), b.path.clone(), c.path.clone()]);

        let result = delete_duplicates(&[group], &DeleteConfig::permanent(), None);

        assert_eq!(result.success_count(), 2);
        assert!(a.path.exists());
        assert!(!b.path.exists());
        assert!(!c.path.exists());
    }
}
