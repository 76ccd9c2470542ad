//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (Phase 1)
//! - Byte-for-byte partition of same-size files (Phase 2)
//! - Incremental lookups while ingesting ([`SizeIndex`])
//! - Removing redundant copies

pub mod finder;
pub mod groups;
pub mod index;

pub use finder::{
    delete_duplicates, find_duplicate_groups, partition_by_content, scan_for_duplicates,
    DuplicateStats, FinderError, ScanOptions,
};
pub use groups::{group_by_size, DuplicateGroup, GroupingStats, SizeGroup};
pub use index::{Match, SizeIndex};
