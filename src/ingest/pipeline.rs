//! The ingestion pipeline.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;

use super::{
    IngestError, IngestOptions, IngestReport, PRESET_CAMERA, PRESET_DEFAULT, PRESET_MOBILE,
    PRESET_PHONE,
};
use crate::actions::{delete_batch, move_file};
use crate::duplicates::SizeIndex;
use crate::metadata::{min_date, CaptureTimeReader, ExifReader};
use crate::naming::{DateFields, FileRecord, FilenamePatterns, NameRegistry, SuffixAllocator};
use crate::scanner::walker::is_date_dir_name;
use crate::scanner::{FileEntry, MediaKind, ScanError, Walker, WalkerConfig};
use crate::store::MappingStore;

/// Expand accept presets and anchor user patterns at the start of the name.
///
/// `default` stands for the phone and camera patterns, `phone`/`mobile`
/// for the phone pattern and `camera` for the camera pattern. Anything else
/// is a regex that must match from the first character.
#[must_use]
pub fn expand_accept_patterns<S: AsRef<str>>(patterns: &[S]) -> Vec<String> {
    let mut expanded = Vec::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        match pattern.trim().to_ascii_lowercase().as_str() {
            PRESET_DEFAULT => {
                expanded.push(FilenamePatterns::phone_source());
                expanded.push(FilenamePatterns::camera_source());
            }
            PRESET_PHONE | PRESET_MOBILE => expanded.push(FilenamePatterns::phone_source()),
            PRESET_CAMERA => expanded.push(FilenamePatterns::camera_source()),
            _ => expanded.push(anchor(pattern)),
        }
    }
    expanded
}

/// Whether `path` sits in `root` itself or in its year/month folders.
fn in_date_tree(root: &Path, path: &Path) -> bool {
    path.strip_prefix(root)
        .ok()
        .and_then(Path::parent)
        .is_some_and(|folders| {
            folders
                .components()
                .all(|c| is_date_dir_name(&c.as_os_str().to_string_lossy()))
        })
}

fn anchor(pattern: &str) -> String {
    format!("^(?:{pattern})")
}

fn compile_all(sources: &[String]) -> Result<Vec<Regex>, IngestError> {
    sources
        .iter()
        .map(|source| {
            Regex::new(source).map_err(|e| IngestError::InvalidPattern {
                pattern: source.clone(),
                source: e,
            })
        })
        .collect()
}

/// Runs one ingestion from a source folder into a library folder.
pub struct Ingestor {
    options: IngestOptions,
    patterns: FilenamePatterns,
    ignore: Vec<Regex>,
    accept: Vec<Regex>,
    reader: Box<dyn CaptureTimeReader + Send + Sync>,
}

impl std::fmt::Debug for Ingestor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ingestor")
            .field("options", &self.options)
            .field("ignore", &self.ignore)
            .field("accept", &self.accept)
            .finish_non_exhaustive()
    }
}

impl Ingestor {
    /// Compile the patterns for a run.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::InvalidPattern`] if an ignore or accept
    /// pattern is not a valid regex.
    pub fn new(options: IngestOptions) -> Result<Self, IngestError> {
        let patterns = FilenamePatterns::new().map_err(|source| IngestError::InvalidPattern {
            pattern: FilenamePatterns::phone_source(),
            source,
        })?;
        let ignore_sources: Vec<String> = options.ignore.iter().map(|p| anchor(p)).collect();
        let ignore = compile_all(&ignore_sources)?;
        let accept = compile_all(&expand_accept_patterns(&options.accept))?;
        let reader = Box::new(ExifReader::new(patterns.clone()));

        Ok(Self {
            options,
            patterns,
            ignore,
            accept,
            reader,
        })
    }

    /// Replace the EXIF reader.
    #[must_use]
    pub fn with_reader(mut self, reader: impl CaptureTimeReader + Send + Sync + 'static) -> Self {
        self.reader = Box::new(reader);
        self
    }

    /// The options this run uses.
    #[must_use]
    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    /// Run the pipeline.
    ///
    /// Per-file problems are recorded in the report. Only a bad source or
    /// destination folder, or a store that cannot be loaded or saved, stops
    /// the run.
    ///
    /// # Errors
    ///
    /// - [`IngestError::Source`] if the source is missing, not a folder, or
    ///   the same folder as the destination
    /// - [`IngestError::Destination`] if the destination is not a folder or
    ///   cannot be created
    /// - [`IngestError::Store`] if the mapping store is corrupt or unwritable
    pub fn run(&self) -> Result<IngestReport, IngestError> {
        let opts = &self.options;
        check_source(&opts.src, &opts.dst)?;
        prepare_destination(&opts.dst, opts.dry_run)?;

        let mut store = MappingStore::load(MappingStore::in_folder(&opts.dst, &opts.store_name))?;
        let mut report = IngestReport {
            dry_run: opts.dry_run,
            store_entries: store.len(),
            ..IngestReport::default()
        };

        let mut index = SizeIndex::new();
        let registry = self.index_destination(&store, &mut index, &mut report);
        let accepted = self.index_source(&mut index, &mut report);
        self.allocate_names(registry, accepted, &mut report);

        if opts.dry_run {
            report.interrupted = opts.is_shutdown_requested();
            return Ok(report);
        }

        self.move_planned(&mut report);
        store.extend(
            report
                .moved
                .iter()
                .map(|(from, to)| (path_string(from), path_string(to))),
        );
        store.save()?;

        if report.interrupted || opts.is_shutdown_requested() {
            report.interrupted = true;
            log::info!("Interrupted, rejected files are kept");
        } else {
            self.prune_rejects(&mut report);
        }
        Ok(report)
    }

    fn walker(&self, root: &Path, config: WalkerConfig) -> Walker {
        let walker = Walker::new(root, config);
        match &self.options.shutdown_flag {
            Some(flag) => walker.with_shutdown_flag(Arc::clone(flag)),
            None => walker,
        }
    }

    /// Index canonical destination files and the store's handled names.
    ///
    /// Every canonical name in the library feeds the name registry, wherever
    /// it sits. Content and names used for matching come only from the root
    /// and its year/month folders, or from the whole library with
    /// `index_all_destination`.
    fn index_destination(
        &self,
        store: &MappingStore,
        index: &mut SizeIndex,
        report: &mut IngestReport,
    ) -> NameRegistry {
        let opts = &self.options;
        let mut registry = NameRegistry::new();

        for name in store.handled_names() {
            index.add_name(name);
        }
        if !opts.dst.is_dir() {
            return registry;
        }

        let config = WalkerConfig::default()
            .excluding_dir(opts.src.clone())
            .excluding_name(opts.store_name.clone())
            .excluding_name(format!("{}.tmp", opts.store_name));

        for entry in self.walker(&opts.dst, config).walk() {
            let file = match entry {
                Ok(file) => file,
                Err(e) => {
                    log::warn!("{e}");
                    continue;
                }
            };
            report.destination_files += 1;

            let file_name = file.file_name();
            let Some(name) = self.patterns.match_destination(&file_name) else {
                log::trace!("Not canonical: {}", file.path.display());
                report.destination_not_matched.push(file.path);
                continue;
            };
            registry.insert(name.key, name.suffix);
            report.destination_matched += 1;

            if opts.index_all_destination || in_date_tree(&opts.dst, &file.path) {
                index.insert(&file);
                index.add_name(file_name);
            } else {
                log::trace!("Name only: {}", file.path.display());
            }
        }

        log::info!(
            "Indexed destination: {} file(s), {} canonical",
            report.destination_files,
            report.destination_matched
        );
        registry
    }

    /// Filter, date and decide every source file. Returns the accepted
    /// files in acceptance order.
    fn index_source(&self, index: &mut SizeIndex, report: &mut IngestReport) -> Vec<FileRecord> {
        let opts = &self.options;
        let config = WalkerConfig {
            recursive: opts.recursive,
            ..WalkerConfig::default()
        }
        .excluding_dir(opts.dst.clone());

        let mut accepted = Vec::new();
        for entry in self.walker(&opts.src, config).walk() {
            let file = match entry {
                Ok(file) => file,
                Err(e) => {
                    log::warn!("{e}");
                    report.failed.push((e.path().to_path_buf(), e.to_string()));
                    continue;
                }
            };
            report.source_files += 1;

            let file_name = file.file_name();
            if self.ignore.iter().any(|re| re.is_match(&file_name)) {
                report.ignored.push(file.path);
                continue;
            }
            if !self.accept.is_empty() && !self.accept.iter().any(|re| re.is_match(&file_name)) {
                report.unmatched.push(file.path);
                continue;
            }
            let kind = MediaKind::of(&file.path);
            if !kind.is_media() {
                report.unsupported.push(file.path);
                continue;
            }

            let Some(fields) = self.capture_time(&file, kind, report) else {
                report
                    .failed
                    .push((file.path, "No capture date".to_string()));
                continue;
            };

            match index.find_match(&opts.comparer, &file) {
                Ok(Some(found)) => {
                    log::debug!("Rejected {}: {}", file.path.display(), found);
                    report.rejected.push((file.path, found.to_string()));
                }
                Ok(None) => {
                    index.insert(&file);
                    accepted.push(FileRecord::new(&file.path, file.size, fields));
                }
                Err(e) => {
                    log::warn!("{e}");
                    report.failed.push((file.path, e.to_string()));
                }
            }
        }

        log::info!(
            "Indexed source: {} file(s), {} accepted, {} rejected",
            report.source_files,
            accepted.len(),
            report.rejected.len()
        );
        accepted
    }

    /// EXIF capture time for photos, minimum date otherwise.
    fn capture_time(
        &self,
        file: &FileEntry,
        kind: MediaKind,
        report: &mut IngestReport,
    ) -> Option<DateFields> {
        if kind == MediaKind::Photo {
            if let Some(fields) = self.reader.capture_time(&file.path) {
                return Some(fields);
            }
        }

        let metadata = fs::metadata(&file.path)
            .map_err(|e| log::warn!("Cannot read metadata of {}: {}", file.path.display(), e))
            .ok()?;
        let fields = min_date(&file.file_name(), &metadata, &self.patterns)?;
        report.named_from_min_date.push(file.path.clone());
        Some(fields)
    }

    fn allocate_names(
        &self,
        registry: NameRegistry,
        accepted: Vec<FileRecord>,
        report: &mut IngestReport,
    ) {
        let mut allocator = SuffixAllocator::new(registry);
        for mut record in accepted {
            match allocator.allocate(&mut record) {
                Ok(name) => {
                    let target = name.target_path(&self.options.dst, self.options.by_month);
                    log::debug!(
                        "Ready {} -> {}",
                        record.full_path.display(),
                        target.display()
                    );
                    report.planned.push((record.full_path, target));
                }
                Err(e) => {
                    log::warn!("{e}");
                    report.failed.push((record.full_path, e.to_string()));
                }
            }
        }
    }

    fn move_planned(&self, report: &mut IngestReport) {
        let callback = self.options.progress_callback.as_ref();
        if let Some(cb) = callback {
            cb.on_phase_start("move", report.planned.len());
        }

        for (index, (from, to)) in report.planned.clone().into_iter().enumerate() {
            if self.options.is_shutdown_requested() {
                log::info!(
                    "Interrupted after moving {} of {} file(s)",
                    report.moved.len(),
                    report.planned.len()
                );
                report.interrupted = true;
                break;
            }
            if let Some(cb) = callback {
                cb.on_progress(index + 1, &from.to_string_lossy());
            }

            match move_file(&from, &to) {
                Ok(()) => {
                    log::info!("Moved {} -> {}", from.display(), to.display());
                    report.moved.push((from, to));
                }
                Err(e) => {
                    log::warn!("{e}");
                    report.unmoved.push((from, e.reason()));
                }
            }
        }

        if let Some(cb) = callback {
            cb.on_phase_end("move");
        }
    }

    fn prune_rejects(&self, report: &mut IngestReport) {
        if report.rejected.is_empty() {
            return;
        }
        let rejects: Vec<PathBuf> = report.rejected.iter().map(|(p, _)| p.clone()).collect();
        let mut config = self.options.delete.clone();
        if let Some(flag) = &self.options.shutdown_flag {
            config = config.with_shutdown_flag(Arc::clone(flag));
        }

        let result = delete_batch(&rejects, &config, None);
        log::info!("Rejected files: {}", result.summary());
        report.deleted = result.success_count();
        report.bytes_freed = result.bytes_freed;
        report.not_deleted = result.failures;
        report.interrupted |= result.interrupted;
    }
}

fn check_source(src: &Path, dst: &Path) -> Result<(), IngestError> {
    if !src.is_dir() {
        return Err(IngestError::Source(if src.exists() {
            ScanError::NotADirectory(src.to_path_buf())
        } else {
            ScanError::NotFound(src.to_path_buf())
        }));
    }
    if let (Ok(a), Ok(b)) = (src.canonicalize(), dst.canonicalize()) {
        if a == b {
            return Err(IngestError::SameFolder(a));
        }
    }
    Ok(())
}

fn prepare_destination(dst: &Path, dry_run: bool) -> Result<(), IngestError> {
    if dst.is_dir() {
        return Ok(());
    }
    if dst.exists() {
        return Err(IngestError::Destination(ScanError::NotADirectory(
            dst.to_path_buf(),
        )));
    }
    if dry_run {
        log::info!("[DRY RUN] Would create {}", dst.display());
        return Ok(());
    }

    fs::create_dir_all(dst).map_err(|source| {
        IngestError::Destination(ScanError::Io {
            path: dst.to_path_buf(),
            source,
        })
    })?;
    log::info!("Created destination folder {}", dst.display());
    Ok(())
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
