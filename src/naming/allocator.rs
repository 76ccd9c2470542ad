//! Suffix allocation for canonical names.
//!
//! Two registries are kept per run: `persisted` holds the suffixes already
//! present in the destination tree, `pending` the ones handed out during
//! this run. For a key seen in `pending` the next suffix continues from the
//! pending maximum; otherwise it continues from the persisted maximum; a
//! key seen nowhere starts at `000`.
//!
//! Allocation never touches the filesystem. Gaps in the persisted suffixes
//! are not reused.

use std::collections::HashMap;
use std::path::PathBuf;

use super::{CanonicalName, FileRecord, NameKey};

/// Largest suffix that fits the three-digit format.
pub const MAX_SUFFIX: u16 = 999;

/// Suffixes seen per key.
#[derive(Debug, Clone, Default)]
pub struct NameRegistry {
    suffixes: HashMap<NameKey, Vec<u16>>,
}

impl NameRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a suffix for a key, creating the key's list on first use.
    pub fn insert(&mut self, key: NameKey, suffix: u16) {
        self.suffixes.entry(key).or_default().push(suffix);
    }

    /// Highest suffix recorded for a key.
    #[must_use]
    pub fn max_suffix(&self, key: &NameKey) -> Option<u16> {
        self.suffixes
            .get(key)
            .and_then(|suffixes| suffixes.iter().copied().max())
    }

    /// All suffixes recorded for a key, in insertion order.
    #[must_use]
    pub fn suffixes(&self, key: &NameKey) -> &[u16] {
        self.suffixes.get(key).map_or(&[], Vec::as_slice)
    }

    /// Whether the key has any suffix recorded.
    #[must_use]
    pub fn contains(&self, key: &NameKey) -> bool {
        self.suffixes.contains_key(key)
    }

    /// Number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.suffixes.len()
    }

    /// Whether no key is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }
}

/// Failure to name a record.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// Every suffix up to [`MAX_SUFFIX`] is taken for this key.
    #[error("No suffix left for {key} (000-999 are all taken)")]
    SuffixOverflow {
        /// Exhausted key
        key: NameKey,
    },

    /// The record has no complete capture date.
    #[error("Incomplete capture date for {}", path.display())]
    IncompleteDate {
        /// Record that cannot be named
        path: PathBuf,
    },
}

/// Hands out canonical names that are unique per key within a run.
#[derive(Debug, Clone, Default)]
pub struct SuffixAllocator {
    persisted: NameRegistry,
    pending: NameRegistry,
}

impl SuffixAllocator {
    /// Start a run over the suffixes already in the destination.
    #[must_use]
    pub fn new(persisted: NameRegistry) -> Self {
        Self {
            persisted,
            pending: NameRegistry::new(),
        }
    }

    /// Suffixes handed out so far in this run.
    #[must_use]
    pub fn pending(&self) -> &NameRegistry {
        &self.pending
    }

    /// Suffixes found in the destination.
    #[must_use]
    pub fn persisted(&self) -> &NameRegistry {
        &self.persisted
    }

    /// Allocate the next name for `record` and record it on the record.
    ///
    /// # Errors
    ///
    /// - [`AllocationError::IncompleteDate`] if the record's date is unusable
    /// - [`AllocationError::SuffixOverflow`] if the key has no suffix left
    pub fn allocate(&mut self, record: &mut FileRecord) -> Result<CanonicalName, AllocationError> {
        let key = record
            .name_key()
            .ok_or_else(|| AllocationError::IncompleteDate {
                path: record.full_path.clone(),
            })?;

        let suffix = self.next_suffix(&key)?;
        self.pending.insert(key.clone(), suffix);

        let name = CanonicalName::new(key, suffix, &record.extension);
        record.suffix = Some(suffix);
        record.new_file_name = Some(name.to_string());
        Ok(name)
    }

    fn next_suffix(&self, key: &NameKey) -> Result<u16, AllocationError> {
        let last = self
            .pending
            .max_suffix(key)
            .or_else(|| self.persisted.max_suffix(key));

        match last {
            None => Ok(0),
            Some(max) if max < MAX_SUFFIX => Ok(max + 1),
            Some(_) => Err(AllocationError::SuffixOverflow { key: key.clone() }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::DateFields;
    use std::path::Path;

    fn fields() -> DateFields {
        DateFields::new(2020, 3, 15).with_time(14, 30, 22)
    }

    fn record(name: &str) -> FileRecord {
        FileRecord::new(&Path::new("/src").join(name), 1, fields())
    }

    fn key() -> NameKey {
        NameKey::from_fields(&fields()).unwrap()
    }

    #[test]
    fn test_fresh_key_starts_at_zero() {
        let mut allocator = SuffixAllocator::default();
        let mut r = record("a.jpg");

        let name = allocator.allocate(&mut r).unwrap();

        assert_eq!(name.to_string(), "20200315_143022_000.jpg");
        assert_eq!(r.suffix, Some(0));
        assert_eq!(r.new_file_name.as_deref(), Some("20200315_143022_000.jpg"));
    }

    #[test]
    fn test_same_second_batch_increments() {
        let mut allocator = SuffixAllocator::default();
        let suffixes: Vec<u16> = ["a.jpg", "b.jpg", "c.mp4"]
            .iter()
            .map(|n| allocator.allocate(&mut record(n)).unwrap().suffix)
            .collect();

        assert_eq!(suffixes, vec![0, 1, 2]);
        assert_eq!(allocator.pending().suffixes(&key()), &[0, 1, 2]);
    }

    #[test]
    fn test_continues_after_persisted_max() {
        let mut persisted = NameRegistry::new();
        persisted.insert(key(), 0);
        persisted.insert(key(), 4);
        persisted.insert(key(), 2);
        let mut allocator = SuffixAllocator::new(persisted);

        assert_eq!(allocator.allocate(&mut record("a.jpg")).unwrap().suffix, 5);
        assert_eq!(allocator.allocate(&mut record("b.jpg")).unwrap().suffix, 6);
        assert_eq!(allocator.persisted().suffixes(&key()), &[0, 4, 2]);
    }

    #[test]
    fn test_overflow() {
        let mut persisted = NameRegistry::new();
        persisted.insert(key(), MAX_SUFFIX);
        let mut allocator = SuffixAllocator::new(persisted);
        let mut r = record("a.jpg");

        let err = allocator.allocate(&mut r).unwrap_err();

        assert_eq!(err, AllocationError::SuffixOverflow { key: key() });
        assert!(r.suffix.is_none());
        assert!(allocator.pending().is_empty());
    }

    #[test]
    fn test_incomplete_date() {
        let mut allocator = SuffixAllocator::default();
        let mut r = FileRecord::new(Path::new("/src/x.jpg"), 1, DateFields::default());

        assert!(matches!(
            allocator.allocate(&mut r),
            Err(AllocationError::IncompleteDate { .. })
        ));
    }

    #[test]
    fn test_registry_basics() {
        let mut registry = NameRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.max_suffix(&key()), None);

        registry.insert(key(), 3);
        assert!(registry.contains(&key()));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.max_suffix(&key()), Some(3));
    }
}
