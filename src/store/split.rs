//! Move part of a library into another folder.
//!
//! Entries are picked by the file name of their *source* key, so a library
//! can be split by where files came from (for example everything that
//! arrived from a messenger). Picked files keep their canonical names and
//! land directly in the target folder. Their mappings move with them: they
//! leave the library's store and are merged into a store in the target
//! folder.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;

use super::{file_name_of, MappingStore, StoreError};
use crate::actions::{move_file, MoveError};
use crate::scanner::ScanError;

/// Pattern used when none is given: any name with a short extension.
pub const DEFAULT_SPLIT_PATTERN: &str = r".*\.\w{2,4}";

/// Outcome of a relocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelocateReport {
    /// Files moved, or that would be moved on a dry run: (from, to)
    pub moved: Vec<(PathBuf, PathBuf)>,
    /// Source keys now recorded in the target store
    pub entries_moved: usize,
    /// Files left alone because the target already has that name
    pub skipped: Vec<PathBuf>,
    /// Files that failed to move, with the reason
    pub failed: Vec<(PathBuf, String)>,
    /// Entries left in the library's store
    pub entries_remaining: usize,
    /// Store file in the target folder
    pub target_store: PathBuf,
}

impl RelocateReport {
    /// Whether any picked file stayed where it was.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.skipped.is_empty() || !self.failed.is_empty()
    }
}

/// Errors that stop a relocation before it starts.
#[derive(thiserror::Error, Debug)]
pub enum RelocateError {
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{0} is already the library folder")]
    SameFolder(PathBuf),

    #[error("cannot create folder {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Move every stored file whose source name matches `pattern` from the
/// library at `dest` into `target`.
///
/// A relative `target` is taken inside `dest`. The pattern must match from
/// the first character of the source file name. Existing files in `target`
/// are never overwritten. On a live run both stores are saved when
/// something moved; a dry run changes nothing.
///
/// # Errors
///
/// Returns [`RelocateError`] for an invalid pattern, a missing library, a
/// target equal to the library, or a store that cannot be loaded or saved.
/// Per-file failures are reported, not fatal.
pub fn relocate(
    dest: &Path,
    store_name: &str,
    target: &Path,
    pattern: &str,
    dry_run: bool,
) -> Result<RelocateReport, RelocateError> {
    let regex = Regex::new(&format!("^(?:{pattern})")).map_err(|source| {
        RelocateError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        }
    })?;
    if !dest.is_dir() {
        return Err(if dest.exists() {
            ScanError::NotADirectory(dest.to_path_buf())
        } else {
            ScanError::NotFound(dest.to_path_buf())
        }
        .into());
    }
    let target = if target.is_absolute() {
        target.to_path_buf()
    } else {
        dest.join(target)
    };
    if same_folder(dest, &target) {
        return Err(RelocateError::SameFolder(target));
    }

    let mut store = MappingStore::load(MappingStore::in_folder(dest, store_name))?;
    let mut target_store = MappingStore::load(MappingStore::in_folder(&target, store_name))?;
    let mut report = RelocateReport {
        target_store: target_store.location().to_path_buf(),
        ..RelocateReport::default()
    };

    let picked = pick(&store, &regex);
    if !dry_run && !picked.is_empty() && !target.is_dir() {
        fs::create_dir_all(&target).map_err(|source| RelocateError::CreateDir {
            path: target.clone(),
            source,
        })?;
    }

    for (current, sources) in picked {
        let Some(name) = file_name_of(&current) else {
            continue;
        };
        let from = PathBuf::from(&current);
        let to = target.join(name);

        if dry_run {
            log::info!("[DRY RUN] Moved {} -> {}", from.display(), to.display());
            report.entries_moved += sources.len();
            report.moved.push((from, to));
            continue;
        }

        match move_file(&from, &to) {
            Ok(()) => {
                log::info!("Moved {} -> {}", from.display(), to.display());
                let new_value = to.to_string_lossy().into_owned();
                for source in sources {
                    store.remove(&source);
                    target_store.insert(source, new_value.clone());
                    report.entries_moved += 1;
                }
                report.moved.push((from, to));
            }
            Err(MoveError::TargetExists(_)) => {
                log::info!("Skipping {}, already exists in {}", from.display(), target.display());
                report.skipped.push(from);
            }
            Err(e) => {
                log::warn!("{e}");
                report.failed.push((from, e.reason()));
            }
        }
    }

    if !dry_run && !report.moved.is_empty() {
        store.save()?;
        target_store.save()?;
    }
    report.entries_remaining = if dry_run {
        store.len().saturating_sub(report.entries_moved)
    } else {
        store.len()
    };

    log::info!(
        "Relocate to {}: {} file(s) {}moved, {} skipped, {} failed",
        target.display(),
        report.moved.len(),
        if dry_run { "would be " } else { "" },
        report.skipped.len(),
        report.failed.len()
    );
    Ok(report)
}

/// Current destination → source keys, for sources whose name matches.
fn pick(store: &MappingStore, regex: &Regex) -> BTreeMap<String, Vec<String>> {
    let mut picked: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (source, destination) in store.iter() {
        let matches = file_name_of(source).is_some_and(|name| regex.is_match(&name));
        if matches {
            picked
                .entry(destination.to_string())
                .or_default()
                .push(source.to_string());
        }
    }
    picked
}

fn same_folder(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
