//! Exit codes and structured error output.

use serde::Serialize;

use crate::ingest::IngestReport;

/// Process exit codes.
///
/// - 0: Success
/// - 1: General error (bad arguments, unreadable folders, corrupt store)
/// - 2: No duplicates found (`report` / `dupes`)
/// - 3: Partial success (some files could not be moved or deleted)
/// - 130: Interrupted by Ctrl+C
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Completed normally.
    Success = 0,
    /// An unexpected error stopped the run.
    GeneralError = 1,
    /// A duplicate scan found nothing.
    NoDuplicates = 2,
    /// Completed, but some files failed.
    PartialSuccess = 3,
    /// Stopped by Ctrl+C.
    Interrupted = 130,
}

impl ExitCode {
    /// Numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "PHS000",
            Self::GeneralError => "PHS001",
            Self::NoDuplicates => "PHS002",
            Self::PartialSuccess => "PHS003",
            Self::Interrupted => "PHS130",
        }
    }

    /// Exit code for a finished ingestion.
    #[must_use]
    pub fn for_ingest(report: &IngestReport) -> Self {
        if report.interrupted {
            Self::Interrupted
        } else if report.has_failures() {
            Self::PartialSuccess
        } else {
            Self::Success
        }
    }
}

/// Error report printed with `--json-errors`.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// Code prefix, e.g. `PHS001`
    pub code: String,
    /// Numeric exit code
    pub exit_code: i32,
    /// Error message including its causes
    pub message: String,
    /// Whether Ctrl+C stopped the run
    pub interrupted: bool,
}

impl StructuredError {
    /// Build from an error and the exit code it maps to.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}
