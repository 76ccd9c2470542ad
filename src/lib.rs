//! photosort - media ingestion, deduplication and library reconciliation.
//!
//! Moves photos and videos from a source folder into a library laid out as
//! `YYYY/[MM/]YYYYMMDD_HHMMSS_SSS.ext`, rejecting files the library already
//! holds, and keeps a JSON mapping of where every file came from.
//!
//! The command handlers live here so the integration tests can drive the
//! whole application through [`run_app`].

pub mod actions;
pub mod cli;
pub mod compare;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;
pub mod store;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::actions::DeleteConfig;
use crate::cli::{
    Cli, Commands, DupesArgs, IngestArgs, OrganizeArgs, RelocateArgs, ReportArgs, SyncArgs,
};
use crate::compare::{Comparer, ComparerRegistry};
use crate::config::Config;
use crate::duplicates::{delete_duplicates, scan_for_duplicates, DuplicateGroup, DuplicateStats, ScanOptions};
use crate::error::ExitCode;
use crate::ingest::{IngestOptions, Ingestor};
use crate::output::html::{group_heading, summary_line, HtmlReport};
use crate::progress::Progress;
use crate::signal::ShutdownHandler;

/// Run the parsed command line and return the process exit code.
///
/// # Errors
///
/// Returns an error for anything that stops a command before or while it
/// runs: unknown comparison strategies, invalid patterns, missing folders,
/// a corrupt mapping store.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    let config = Config::load();
    let handler = signal::install_handler().context("Cannot install Ctrl+C handler")?;

    match cli.command {
        Commands::Ingest(args) => run_ingest(args, &config, &handler, cli.quiet),
        Commands::Sync(args) => run_sync(args, &config),
        Commands::Organize(args) => run_organize(args, &config),
        Commands::Report(args) => run_report(args, &config, &handler, cli.quiet),
        Commands::Dupes(args) => run_dupes(args, &config, &handler, cli.quiet),
        Commands::Relocate(args) => run_relocate(args, &config),
    }
}

fn run_ingest(
    args: IngestArgs,
    config: &Config,
    handler: &ShutdownHandler,
    quiet: bool,
) -> Result<ExitCode> {
    let names = if args.compare.is_empty() {
        config.compare.clone()
    } else {
        args.compare
    };
    let comparer = ComparerRegistry::builtin()
        .resolve(&names)
        .context("Invalid comparison strategy")?;
    if comparer == Comparer::Size {
        log::warn!("Comparing by size alone rejects every file whose size is already in the library");
    }
    log::info!("Comparing by {comparer}");

    let delete = if args.permanent || config.permanent_delete {
        DeleteConfig::permanent()
    } else {
        DeleteConfig::trash()
    };
    let options = IngestOptions::new(args.src, args.dst)
        .with_comparer(comparer)
        .with_ignore(args.ignore)
        .with_accept(args.accept)
        .with_recursive(config.recursive && !args.not_recursive)
        .with_index_all_destination(args.index_all)
        .with_dry_run(args.dry_run)
        .with_by_month(args.by_month || config.by_month)
        .with_store_name(args.store_name.unwrap_or_else(|| config.store_name.clone()))
        .with_delete_config(delete)
        .with_shutdown_flag(handler.get_flag())
        .with_progress_callback(Arc::new(Progress::new(quiet)));

    let report = Ingestor::new(options)?
        .run()
        .context("Ingestion failed")?;
    if report.is_noop() && !report.has_failures() {
        log::info!("Nothing new to ingest");
    }
    report.log_summary();
    Ok(ExitCode::for_ingest(&report))
}

fn run_sync(args: SyncArgs, config: &Config) -> Result<ExitCode> {
    let store_name = args.store_name.unwrap_or_else(|| config.store_name.clone());
    store::sync(&args.dst, &store_name, args.dry_run)
        .with_context(|| format!("Cannot sync {}", args.dst.display()))?;
    Ok(ExitCode::Success)
}

fn run_organize(args: OrganizeArgs, config: &Config) -> Result<ExitCode> {
    let store_name = args.store_name.unwrap_or_else(|| config.store_name.clone());
    let report = store::reorganize(
        &args.dst,
        &store_name,
        args.by_month || config.by_month,
        args.dry_run,
    )
    .with_context(|| format!("Cannot organize {}", args.dst.display()))?;

    if report.failed.is_empty() {
        Ok(ExitCode::Success)
    } else {
        Ok(ExitCode::PartialSuccess)
    }
}

fn run_relocate(args: RelocateArgs, config: &Config) -> Result<ExitCode> {
    let store_name = args.store_name.unwrap_or_else(|| config.store_name.clone());
    let report = store::relocate(&args.dst, &store_name, &args.target, &args.pattern, !args.apply)
        .with_context(|| format!("Cannot relocate files from {}", args.dst.display()))?;

    if !args.apply && !report.moved.is_empty() {
        log::info!("Dry run; pass --apply to move the files");
    }
    if report.has_failures() {
        Ok(ExitCode::PartialSuccess)
    } else {
        Ok(ExitCode::Success)
    }
}

fn scan(
    folder: &Path,
    media_only: bool,
    extra_exclude: Option<String>,
    config: &Config,
    handler: &ShutdownHandler,
    quiet: bool,
) -> Result<(Vec<DuplicateGroup>, DuplicateStats)> {
    let mut options = ScanOptions::default()
        .with_media_only(media_only)
        .excluding_name(config.store_name.clone())
        .excluding_name(config.report_name.clone());
    if let Some(name) = extra_exclude {
        options = options.excluding_name(name);
    }
    let options = options
        .with_shutdown_flag(handler.get_flag())
        .with_progress_callback(Arc::new(Progress::new(quiet)));
    let (groups, stats) = scan_for_duplicates(folder, &options)
        .with_context(|| format!("Cannot scan {}", folder.display()))?;

    for (i, group) in groups.iter().enumerate() {
        log::info!("{}", group_heading(i + 1, group));
        for path in &group.files {
            log::info!("  {}", path.display());
        }
    }
    log::info!("{}", summary_line(&stats));
    Ok((groups, stats))
}

/// File name of `output` when it is written somewhere under `folder`.
fn name_inside(folder: &Path, output: &Path) -> Option<String> {
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let parent = parent.canonicalize().ok()?;
    let folder = folder.canonicalize().ok()?;
    if !parent.starts_with(&folder) {
        return None;
    }
    output.file_name().map(|n| n.to_string_lossy().into_owned())
}

fn scan_exit_code(groups: &[DuplicateGroup], stats: &DuplicateStats) -> ExitCode {
    if stats.interrupted {
        ExitCode::Interrupted
    } else if groups.is_empty() {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    }
}

fn run_report(
    args: ReportArgs,
    config: &Config,
    handler: &ShutdownHandler,
    quiet: bool,
) -> Result<ExitCode> {
    let output = args
        .output
        .unwrap_or_else(|| args.folder.join(&config.report_name));
    let own_name = name_inside(&args.folder, &output);
    let (groups, stats) = scan(&args.folder, args.media_only, own_name, config, handler, quiet)?;

    HtmlReport::new(&args.folder, &groups, &stats)
        .save(&output)
        .with_context(|| format!("Cannot write report {}", output.display()))?;
    log::info!("Report written to {}", output.display());
    Ok(scan_exit_code(&groups, &stats))
}

fn run_dupes(
    args: DupesArgs,
    config: &Config,
    handler: &ShutdownHandler,
    quiet: bool,
) -> Result<ExitCode> {
    let (groups, stats) = scan(&args.folder, args.media_only, None, config, handler, quiet)?;
    let code = scan_exit_code(&groups, &stats);
    if !args.delete || code != ExitCode::Success {
        if !args.delete && !groups.is_empty() {
            log::info!("Dry run; pass --delete to remove the redundant copies");
        }
        return Ok(code);
    }

    let delete = if args.permanent || config.permanent_delete {
        DeleteConfig::permanent()
    } else {
        DeleteConfig::trash()
    }
    .with_shutdown_flag(handler.get_flag());
    let progress = Progress::new(quiet);
    let result = delete_duplicates(&groups, &delete, Some(&progress));

    Ok(if result.interrupted {
        ExitCode::Interrupted
    } else if result.all_succeeded() {
        ExitCode::Success
    } else {
        ExitCode::PartialSuccess
    })
}
