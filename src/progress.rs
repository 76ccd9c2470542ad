//! Progress reporting with indicatif.
//!
//! Long phases report through [`ProgressCallback`]: `compare` (duplicate
//! search, one step per size bucket) and `move` (ingestion, one step per
//! planned file). Deletions report through
//! [`DeleteProgressCallback`]. [`Progress`] draws one bar per phase on
//! stderr and draws nothing in quiet mode.

use std::path::Path;
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};

use crate::actions::DeleteProgressCallback;

/// Progress callback for the phases of a run.
pub trait ProgressCallback: Send + Sync {
    /// A phase with `total` steps starts.
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Step `current` (1-based) is being processed.
    fn on_progress(&self, current: usize, path: &str);

    /// The phase is over.
    fn on_phase_end(&self, phase: &str);
}

/// Terminal progress bars.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a reporter; `quiet` disables all drawing.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            quiet,
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn start(&self, label: &str, total: usize) {
        if self.quiet {
            return;
        }
        let bar = ProgressBar::new(total as u64);
        bar.set_style(Self::style());
        bar.set_message(label.to_string());
        if let Ok(mut current) = self.bar.lock() {
            if let Some(previous) = current.replace(bar) {
                previous.finish_and_clear();
            }
        }
    }

    fn update(&self, position: usize, message: String) {
        if self.quiet {
            return;
        }
        if let Ok(current) = self.bar.lock() {
            if let Some(bar) = current.as_ref() {
                bar.set_position(position as u64);
                bar.set_message(message);
            }
        }
    }

    fn finish(&self, message: &str) {
        if let Ok(mut current) = self.bar.lock() {
            if let Some(bar) = current.take() {
                bar.finish_with_message(message.to_string());
            }
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        let label = match phase {
            "compare" => "Comparing",
            "move" => "Moving",
            other => other,
        };
        self.start(label, total);
    }

    fn on_progress(&self, current: usize, path: &str) {
        self.update(current, truncate_path(path, 40));
    }

    fn on_phase_end(&self, phase: &str) {
        self.finish(&format!("{phase} complete"));
    }
}

impl DeleteProgressCallback for Progress {
    fn on_before_delete(&self, path: &Path, index: usize, total: usize) {
        if index == 0 {
            self.start("Deleting", total);
        }
        self.update(index, truncate_path(&path.to_string_lossy(), 40));
        if index + 1 == total {
            self.finish("delete complete");
        }
    }

    fn on_delete_success(&self, path: &Path, size: u64) {
        log::debug!("Deleted {} ({} bytes)", path.display(), size);
    }

    fn on_delete_failure(&self, path: &Path, error: &str) {
        log::debug!("Could not delete {}: {}", path.display(), error);
    }
}

/// Shorten a path to its file name when it is too long for the bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }
    let file_name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let chars: Vec<char> = file_name.chars().collect();
    if chars.len() + 4 > max_len {
        let tail: String = chars[chars.len().saturating_sub(max_len.saturating_sub(3))..]
            .iter()
            .collect();
        return format!("...{tail}");
    }
    format!(".../{file_name}")
}
