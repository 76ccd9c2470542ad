//! Reconcile the mapping store with the destination folder.
//!
//! Files are matched by *file name*: canonical names are unique within a
//! library, so a store value whose final segment no longer exists anywhere
//! under the destination is stale. Files on disk that the store does not
//! know about are only reported; they are never inserted, since their
//! source is unknown.
//!
//! A name absent from the walk is only pruned once its recorded path is
//! confirmed gone. Symlinks and files in folders the walk could not read
//! keep their mapping.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{file_name_of, MappingStore, StoreError};
use crate::scanner::{Walker, WalkerConfig};

/// Outcome of a reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Files found under the destination
    pub files_in_folder: usize,
    /// Mappings in the store before reconciling
    pub entries_in_store: usize,
    /// Destination names recorded in the store but absent on disk
    pub missing_in_folder: BTreeSet<String>,
    /// Names on disk that no store value points at
    pub missing_in_db: BTreeSet<String>,
    /// Source keys removed from the store (empty on a dry run)
    pub removed: Vec<String>,
    /// Source keys whose name was not listed but whose destination still
    /// exists or could not be checked
    pub kept: Vec<String>,
}

/// Reconcile the store in `dest` with the files under `dest`.
///
/// On a dry run nothing is changed. Otherwise every key whose destination
/// name is missing on disk, and whose recorded path is confirmed gone, is
/// removed and the store is saved.
///
/// # Errors
///
/// Returns [`StoreError`] if the store cannot be loaded or saved.
pub fn sync(dest: &Path, store_name: &str, dry_run: bool) -> Result<SyncReport, StoreError> {
    let mut store = MappingStore::load(MappingStore::in_folder(dest, store_name))?;
    let temp_name = file_name_of(&store.temp_location().to_string_lossy()).unwrap_or_default();

    let config = WalkerConfig::default()
        .excluding_name(store_name)
        .excluding_name(temp_name);
    let mut on_disk: BTreeMap<String, (u64, PathBuf)> = BTreeMap::new();
    for entry in Walker::new(dest, config).walk() {
        match entry {
            Ok(file) => {
                on_disk.insert(file.file_name(), (file.size, file.path));
            }
            Err(e) => log::warn!("{e}"),
        }
    }

    let mut by_destination: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (source, destination) in store.iter() {
        if let Some(name) = file_name_of(destination) {
            by_destination
                .entry(name)
                .or_default()
                .push(source.to_string());
        }
    }

    let mut report = SyncReport {
        files_in_folder: on_disk.len(),
        entries_in_store: store.len(),
        missing_in_folder: by_destination
            .keys()
            .filter(|name| !on_disk.contains_key(*name))
            .cloned()
            .collect(),
        missing_in_db: on_disk
            .keys()
            .filter(|name| !by_destination.contains_key(*name))
            .cloned()
            .collect(),
        removed: Vec::new(),
        kept: Vec::new(),
    };

    log::info!(
        "Files in folder: {}, entries in store: {}",
        report.files_in_folder,
        report.entries_in_store
    );
    log::info!("Missing in folder: {}", report.missing_in_folder.len());
    for name in &report.missing_in_folder {
        log::info!("  {name}");
    }
    log::info!("Missing in store: {}", report.missing_in_db.len());
    for name in &report.missing_in_db {
        log::debug!("  {name}");
    }

    if dry_run {
        return Ok(report);
    }

    for name in &report.missing_in_folder {
        for source in by_destination.get(name).into_iter().flatten() {
            let gone = store.get(source).is_some_and(confirmed_missing);
            if !gone {
                log::warn!("Keeping {source}: its destination still exists or cannot be checked");
                report.kept.push(source.clone());
            } else if store.remove(source).is_some() {
                report.removed.push(source.clone());
            }
        }
    }
    store.save()?;
    log::info!("Removed {} stale mapping(s)", report.removed.len());

    Ok(report)
}

/// Whether nothing at all, not even a dangling link, sits at `destination`.
fn confirmed_missing(destination: &str) -> bool {
    matches!(
        fs::symlink_metadata(destination),
        Err(e) if e.kind() == io::ErrorKind::NotFound
    )
}
