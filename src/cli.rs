//! Command-line interface definitions.
//!
//! ```bash
//! # Plan an ingestion without touching anything
//! photosort ingest --src ~/Camera --dst ~/Photos --dry-run
//!
//! # Ingest phone and camera names only, compare by name then content
//! photosort -v ingest --src ~/Camera --dst ~/Photos -a default -c name -c binary
//!
//! # Drop store entries whose files were deleted from the library
//! photosort sync ~/Photos
//!
//! # Move loose files into YYYY/MM/ folders
//! photosort organize ~/Photos --by-month
//!
//! # HTML report of identical files
//! photosort report ~/Photos
//!
//! # Split messenger files, and their mappings, into their own folder
//! photosort relocate ~/Photos whatsapp -p '.*-WA\d+' --apply
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::store::DEFAULT_SPLIT_PATTERN;

/// Ingest photos and videos into a canonically named, deduplicated library.
#[derive(Debug, Parser)]
#[command(name = "photosort")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Move new media from a source folder into the library
    Ingest(IngestArgs),
    /// Reconcile the mapping store with the library folder
    Sync(SyncArgs),
    /// Move loose canonical files into year (or year/month) folders
    Organize(OrganizeArgs),
    /// Write an HTML report of identical files in a folder
    Report(ReportArgs),
    /// Find identical files in a folder and optionally remove the copies
    Dupes(DupesArgs),
    /// Move library files picked by source name, with their mappings, to another folder
    Relocate(RelocateArgs),
}

/// Arguments for `ingest`.
#[derive(Debug, Args)]
pub struct IngestArgs {
    /// Folder to take new media from
    #[arg(short, long, value_name = "DIR")]
    pub src: PathBuf,

    /// Library folder
    #[arg(short, long, value_name = "DIR")]
    pub dst: PathBuf,

    /// Comparison strategy: name, size or binary (repeatable; any match rejects)
    ///
    /// `size` alone treats every same-size file as a duplicate.
    #[arg(short, long = "compare", value_name = "STRATEGY")]
    pub compare: Vec<String>,

    /// File-name regex to skip (repeatable, matched from the start)
    #[arg(short, long = "ignore", value_name = "REGEX")]
    pub ignore: Vec<String>,

    /// File-name regex to accept, or a preset: default, phone, mobile, camera
    #[arg(short, long = "accept", value_name = "REGEX")]
    pub accept: Vec<String>,

    /// Only take files directly inside the source folder
    #[arg(long)]
    pub not_recursive: bool,

    /// Also index library folders that are not year/month folders
    #[arg(long)]
    pub index_all: bool,

    /// Show what would happen without moving or deleting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Use YYYY/MM/ folders instead of YYYY/
    #[arg(long)]
    pub by_month: bool,

    /// Delete rejected files permanently instead of moving them to the trash
    #[arg(long)]
    pub permanent: bool,

    /// Mapping store file name inside the library
    #[arg(long, value_name = "NAME")]
    pub store_name: Option<String>,
}

/// Arguments for `sync`.
#[derive(Debug, Args)]
pub struct SyncArgs {
    /// Library folder
    #[arg(value_name = "DST")]
    pub dst: PathBuf,

    /// Report only; leave the store unchanged
    #[arg(long)]
    pub dry_run: bool,

    /// Mapping store file name inside the library
    #[arg(long, value_name = "NAME")]
    pub store_name: Option<String>,
}

/// Arguments for `organize`.
#[derive(Debug, Args)]
pub struct OrganizeArgs {
    /// Library folder
    #[arg(value_name = "DST")]
    pub dst: PathBuf,

    /// Use YYYY/MM/ folders instead of YYYY/
    #[arg(long)]
    pub by_month: bool,

    /// Show what would move without moving
    #[arg(long)]
    pub dry_run: bool,

    /// Mapping store file name inside the library
    #[arg(long, value_name = "NAME")]
    pub store_name: Option<String>,
}

/// Arguments for `report`.
#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Folder to scan
    #[arg(value_name = "FOLDER")]
    pub folder: PathBuf,

    /// Report file (default: duplicate_report.html inside the folder)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Only consider photos and videos
    #[arg(long)]
    pub media_only: bool,
}

/// Arguments for `dupes`.
#[derive(Debug, Args)]
pub struct DupesArgs {
    /// Folder to scan
    #[arg(value_name = "FOLDER")]
    pub folder: PathBuf,

    /// Remove every copy but the first of each group
    #[arg(long)]
    pub delete: bool,

    /// Delete permanently instead of moving to the trash
    #[arg(long, requires = "delete")]
    pub permanent: bool,

    /// Only consider photos and videos
    #[arg(long)]
    pub media_only: bool,
}

/// Arguments for `relocate`.
#[derive(Debug, Args)]
pub struct RelocateArgs {
    /// Library folder
    #[arg(value_name = "DST")]
    pub dst: PathBuf,

    /// Folder to move the picked files to (relative paths are inside the library)
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Source file-name regex picking the files, matched from the start
    #[arg(short, long, value_name = "REGEX", default_value = DEFAULT_SPLIT_PATTERN)]
    pub pattern: String,

    /// Move the files; without this only the plan is shown
    #[arg(long)]
    pub apply: bool,

    /// Mapping store file name inside both folders
    #[arg(long, value_name = "NAME")]
    pub store_name: Option<String>,
}
