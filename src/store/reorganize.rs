//! Move loose canonical files into `YYYY/` or `YYYY/MM/` folders.
//!
//! Candidates are the files directly under the library root and, when
//! switching to a by-month layout, the files inside existing four-digit
//! year folders. Only canonical names are touched. Store values that point
//! at a moved file are rewritten; the store is saved only when something
//! moved.

use std::path::{Path, PathBuf};

use super::{MappingStore, StoreError};
use crate::actions::{move_file, MoveError};
use crate::naming::CanonicalName;
use crate::scanner::path_utils::stored_path_matches;
use crate::scanner::{ScanError, Walker, WalkerConfig};

/// Outcome of a reorganization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReorganizeReport {
    /// Files moved, or that would be moved on a dry run: (from, to)
    pub moved: Vec<(PathBuf, PathBuf)>,
    /// Files left alone because their target already exists
    pub skipped: Vec<PathBuf>,
    /// Files that failed to move, with the reason
    pub failed: Vec<(PathBuf, String)>,
    /// Store values rewritten
    pub store_updates: usize,
}

/// Errors that stop a reorganization before it starts.
#[derive(thiserror::Error, Debug)]
pub enum ReorganizeError {
    /// The library folder is missing or unreadable.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// The mapping store cannot be loaded or saved.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Reorganize the library at `dest`.
///
/// # Errors
///
/// Returns [`ReorganizeError`] if `dest` is not a folder or the store
/// cannot be loaded or saved. Per-file failures are reported, not fatal.
pub fn reorganize(
    dest: &Path,
    store_name: &str,
    by_month: bool,
    dry_run: bool,
) -> Result<ReorganizeReport, ReorganizeError> {
    if !dest.is_dir() {
        return Err(if dest.exists() {
            ScanError::NotADirectory(dest.to_path_buf())
        } else {
            ScanError::NotFound(dest.to_path_buf())
        }
        .into());
    }

    let mut store = MappingStore::load(MappingStore::in_folder(dest, store_name))?;
    let mut report = ReorganizeReport::default();

    for file in candidates(dest, store_name, by_month) {
        let Some(name) = file
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.parse::<CanonicalName>().ok())
        else {
            continue;
        };

        let target = name.target_path(dest, by_month);
        if target == file {
            continue;
        }

        if dry_run {
            log::info!("[DRY RUN] Moved {} -> {}", file.display(), target.display());
            report.moved.push((file, target));
            continue;
        }

        match move_file(&file, &target) {
            Ok(()) => {
                log::info!("Moved {} -> {}", file.display(), target.display());
                report.store_updates += rewrite_values(&mut store, &file, &target);
                report.moved.push((file, target));
            }
            Err(MoveError::TargetExists(_)) => {
                log::info!(
                    "Skipping {}, already exists in {}",
                    file.display(),
                    target.parent().unwrap_or(dest).display()
                );
                report.skipped.push(file);
            }
            Err(e) => {
                log::warn!("{e}");
                report.failed.push((file, e.reason()));
            }
        }
    }

    if !dry_run && !report.moved.is_empty() {
        store.save()?;
    }

    let mode = if by_month { "year/month" } else { "year" };
    log::info!(
        "Organize by {}: {} files {}moved, {} skipped",
        mode,
        report.moved.len(),
        if dry_run { "would be " } else { "" },
        report.skipped.len()
    );
    Ok(report)
}

/// Root files plus, with `by_month`, files inside year folders.
fn candidates(dest: &Path, store_name: &str, by_month: bool) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Walker::new(dest, WalkerConfig::flat().excluding_name(store_name))
        .walk()
        .filter_map(Result::ok)
        .map(|f| f.path)
        .collect();

    if by_month {
        let years = std::fs::read_dir(dest)
            .into_iter()
            .flatten()
            .filter_map(Result::ok)
            .map(|e| e.path())
            .filter(|p| p.is_dir() && is_year_dir(p));
        let mut years: Vec<PathBuf> = years.collect();
        years.sort();
        for year in years {
            files.extend(
                Walker::new(&year, WalkerConfig::flat())
                    .walk()
                    .filter_map(Result::ok)
                    .map(|f| f.path),
            );
        }
    }
    files
}

fn is_year_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.len() == 4 && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Point every store value equal to `from` at `to`.
fn rewrite_values(store: &mut MappingStore, from: &Path, to: &Path) -> usize {
    let sources: Vec<String> = store
        .iter()
        .filter(|(_, destination)| stored_path_matches(destination, from))
        .map(|(source, _)| source.to_string())
        .collect();
    let target = to.to_string_lossy().into_owned();
    for source in &sources {
        store.insert(source.clone(), target.clone());
    }
    sources.len()
}
