//! Ctrl+C handling.
//!
//! Moving files is never cut short mid-file. Ctrl+C only sets a shared
//! flag; the ingest pipeline checks it between moves and between deletions,
//! the walkers check it between entries. The process then exits with
//! [`ExitCode::Interrupted`](crate::error::ExitCode::Interrupted).
//!
//! ```rust,no_run
//! use photosort::ingest::IngestOptions;
//! use photosort::signal::install_handler;
//!
//! let handler = install_handler()?;
//! let options = IngestOptions::new("/inbox", "/photos")
//!     .with_shutdown_flag(handler.get_flag());
//! # Ok::<(), photosort::signal::SignalError>(())
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Shared "stop at the next safe point" flag.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandler {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandler {
    /// A handler with no shutdown requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether Ctrl+C was pressed or [`request_shutdown`](Self::request_shutdown) called.
    #[must_use]
    pub fn is_shutdown_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Ask every holder of the flag to stop at its next safe point.
    pub fn request_shutdown(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// The flag, for options structs that poll it.
    #[must_use]
    pub fn get_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }

    /// Clear the flag.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Error installing the Ctrl+C hook.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// `ctrlc` refused the handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_HANDLER: OnceLock<ShutdownHandler> = OnceLock::new();

/// Install the process-wide Ctrl+C hook, once.
///
/// Later calls (the integration tests call `run_app` many times in one
/// process) get the same handler back with its flag cleared. If another
/// hook owns Ctrl+C already, an unhooked handler is returned so manual
/// shutdown requests still work.
///
/// # Errors
///
/// Never returns an error at present. A hook that cannot be installed is
/// logged at debug level and an unhooked handler is returned.
pub fn install_handler() -> Result<ShutdownHandler, SignalError> {
    if let Some(handler) = GLOBAL_HANDLER.get() {
        handler.reset();
        return Ok(handler.clone());
    }

    let handler = ShutdownHandler::new();
    let flag = handler.get_flag();
    let hooked = ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
        let _ = writeln!(
            std::io::stderr(),
            "\nInterrupted. Finishing the current file, then stopping..."
        );
        let _ = std::io::stderr().flush();
        log::info!("Shutdown signal received");
    });

    if let Err(e) = hooked {
        log::debug!("Ctrl+C hook not installed ({e}), using an unhooked handler");
    }
    let _ = GLOBAL_HANDLER.set(handler);
    let global = GLOBAL_HANDLER.get().cloned().unwrap_or_default();
    global.reset();
    Ok(global)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_and_reset() {
        let handler = ShutdownHandler::new();
        assert!(!handler.is_shutdown_requested());

        handler.request_shutdown();
        assert!(handler.is_shutdown_requested());

        handler.reset();
        assert!(!handler.is_shutdown_requested());
    }

    #[test]
    fn test_flag_and_clones_share_state() {
        let handler = ShutdownHandler::new();
        let flag = handler.get_flag();
        let cloned = handler.clone();

        flag.store(true, Ordering::SeqCst);
        assert!(handler.is_shutdown_requested());
        assert!(cloned.is_shutdown_requested());
    }

    #[test]
    fn test_install_twice_returns_cleared_handler() {
        let first = install_handler().unwrap();
        first.request_shutdown();

        let second = install_handler().unwrap();
        assert!(!second.is_shutdown_requested());
        assert!(!first.is_shutdown_requested());
    }
}
