//! Size buckets and duplicate groups.
//!
//! Two files can only be identical if their sizes are equal, so files are
//! bucketed by exact size before any content is read. A bucket with a
//! single file is dropped on the spot.
//!
//! Buckets keep the order in which their size was first seen, and files
//! keep traversal order inside a bucket. The first file of every group is
//! therefore the one the walk met first, and that is the copy that is kept.
//!
//! ```
//! use photosort::duplicates::group_by_size;
//! use photosort::scanner::FileEntry;
//! use std::path::PathBuf;
//! use std::time::SystemTime;
//!
//! let files = vec![
//!     FileEntry::new(PathBuf::from("/lib/a.jpg"), 10, SystemTime::now()),
//!     FileEntry::new(PathBuf::from("/lib/b.jpg"), 10, SystemTime::now()),
//!     FileEntry::new(PathBuf::from("/lib/c.jpg"), 12, SystemTime::now()),
//! ];
//!
//! let (buckets, stats) = group_by_size(files);
//! assert_eq!(buckets.len(), 1);
//! assert_eq!(buckets[0].size, 10);
//! assert_eq!(stats.candidates, 2);
//! assert_eq!(stats.singletons, 1);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use crate::scanner::FileEntry;

/// Files sharing one exact size.
#[derive(Debug, Clone)]
pub struct SizeGroup {
    pub size: u64,
    /// In traversal order
    pub files: Vec<FileEntry>,
}

impl SizeGroup {
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Byte-identical files. The first one is kept, the rest are redundant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// Size of each file in bytes
    pub size: u64,
    /// Two or more paths in traversal order
    pub files: Vec<PathBuf>,
}

impl DuplicateGroup {
    #[must_use]
    pub fn new(size: u64, files: Vec<PathBuf>) -> Self {
        Self { size, files }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The copy that stays.
    #[must_use]
    pub fn keeper(&self) -> Option<&PathBuf> {
        self.files.first()
    }

    /// Every copy after the keeper.
    #[must_use]
    pub fn redundant(&self) -> &[PathBuf] {
        self.files.get(1..).unwrap_or_default()
    }

    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.redundant().len()
    }

    /// Bytes the redundant copies occupy.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * self.duplicate_count() as u64
    }
}

/// Counts from [`group_by_size`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Files seen
    pub total_files: usize,
    /// Their combined size
    pub total_size: u64,
    /// Files in buckets of two or more
    pub candidates: usize,
    /// Files alone in their bucket
    pub singletons: usize,
}

/// Bucket `files` by size, keeping only buckets of two or more.
///
/// No file is opened. Empty files form an ordinary size-0 bucket.
#[must_use]
pub fn group_by_size(
    files: impl IntoIterator<Item = FileEntry>,
) -> (Vec<SizeGroup>, GroupingStats) {
    let mut buckets: Vec<SizeGroup> = Vec::new();
    let mut slots: HashMap<u64, usize> = HashMap::new();
    let mut stats = GroupingStats::default();

    for file in files {
        stats.total_files += 1;
        stats.total_size += file.size;
        let slot = *slots.entry(file.size).or_insert_with(|| {
            buckets.push(SizeGroup {
                size: file.size,
                files: Vec::new(),
            });
            buckets.len() - 1
        });
        buckets[slot].files.push(file);
    }

    buckets.retain(|bucket| {
        if bucket.len() > 1 {
            stats.candidates += bucket.len();
            true
        } else {
            stats.singletons += bucket.len();
            false
        }
    });

    log::debug!(
        "{} file(s) in {} size bucket(s), {} with a unique size",
        stats.total_files,
        buckets.len(),
        stats.singletons
    );
    (buckets, stats)
}
