//! HTML duplicate report.
//!
//! A self-contained page (CSS embedded, dark mode via media query) rendered
//! with `askama` from `templates/duplicate_report.html`. File paths are
//! HTML-escaped by the template engine.
//!
//! ```rust,no_run
//! use photosort::duplicates::{scan_for_duplicates, ScanOptions};
//! use photosort::output::html::HtmlReport;
//! use std::path::Path;
//!
//! let folder = Path::new("/photos");
//! let (groups, stats) = scan_for_duplicates(folder, &ScanOptions::default())?;
//! let html = HtmlReport::new(folder, &groups, &stats).to_html()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use askama::Template;
use bytesize::ByteSize;
use chrono::Local;

use crate::duplicates::{DuplicateGroup, DuplicateStats};

/// The rendered report.
#[derive(Template)]
#[template(path = "duplicate_report.html")]
pub struct HtmlReport {
    /// Generation time, local
    pub timestamp: String,
    /// photosort version
    pub version: String,
    /// Scanned folder
    pub folder: String,
    /// Files considered
    pub total_files: usize,
    /// Their total size, human-readable
    pub total_size: String,
    /// `N duplicate groups, R redundant files, W wasted`
    pub summary: String,
    /// Groups in scan order
    pub groups: Vec<HtmlGroup>,
}

/// One duplicate group as shown in the report.
pub struct HtmlGroup {
    /// `Group i (n files, size each)`
    pub heading: String,
    /// Paths, the kept file first
    pub files: Vec<String>,
}

impl HtmlReport {
    /// Build the report for groups found under `folder`.
    #[must_use]
    pub fn new(folder: &Path, groups: &[DuplicateGroup], stats: &DuplicateStats) -> Self {
        let groups = groups
            .iter()
            .enumerate()
            .map(|(i, group)| HtmlGroup {
                heading: group_heading(i + 1, group),
                files: group
                    .files
                    .iter()
                    .map(|p| p.to_string_lossy().into_owned())
                    .collect(),
            })
            .collect();

        Self {
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            folder: folder.to_string_lossy().into_owned(),
            total_files: stats.total_files,
            total_size: ByteSize::b(stats.total_size).to_string(),
            summary: summary_line(stats),
            groups,
        }
    }

    /// Render the page.
    ///
    /// # Errors
    ///
    /// Returns the template error if rendering fails.
    pub fn to_html(&self) -> Result<String, askama::Error> {
        self.render()
    }

    /// Render the page into `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), HtmlOutputError> {
        let html = self.to_html()?;
        writer.write_all(html.as_bytes())?;
        Ok(())
    }

    /// Render the page into a file at `path`, replacing it.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering fails or the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), HtmlOutputError> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// `Group i (n files, size each)`.
#[must_use]
pub fn group_heading(index: usize, group: &DuplicateGroup) -> String {
    format!(
        "Group {} ({} files, {} each)",
        index,
        group.len(),
        ByteSize::b(group.size)
    )
}

/// `N duplicate groups, R redundant files, W wasted`.
#[must_use]
pub fn summary_line(stats: &DuplicateStats) -> String {
    format!(
        "{} duplicate groups, {} redundant files, {} wasted",
        stats.duplicate_groups,
        stats.duplicate_files,
        stats.wasted_display()
    )
}

/// Errors writing the HTML report.
#[derive(thiserror::Error, Debug)]
pub enum HtmlOutputError {
    /// Template rendering error
    #[error("HTML template error: {0}")]
    Template(#[from] askama::Error),

    /// I/O error while writing
    #[error("I/O error writing HTML report: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn stats(groups: &[DuplicateGroup]) -> DuplicateStats {
        DuplicateStats {
            total_files: 3,
            total_size: 32,
            duplicate_groups: groups.len(),
            duplicate_files: groups.iter().map(DuplicateGroup::duplicate_count).sum(),
            wasted_space: groups.iter().map(DuplicateGroup::wasted_space).sum(),
            ..DuplicateStats::default()
        }
    }

    #[test]
    fn test_heading_and_summary() {
        let group = DuplicateGroup::new(10, vec![PathBuf::from("/a"), PathBuf::from("/b")]);
        let stats = stats(std::slice::from_ref(&group));

        assert_eq!(group_heading(1, &group), format!("Group 1 (2 files, {} each)", ByteSize::b(10)));
        assert_eq!(
            summary_line(&stats),
            format!("1 duplicate groups, 1 redundant files, {} wasted", ByteSize::b(10))
        );
    }

    #[test]
    fn test_render_lists_groups() {
        let groups = vec![DuplicateGroup::new(
            10,
            vec![PathBuf::from("/lib/a.jpg"), PathBuf::from("/lib/b.jpg")],
        )];
        let report = HtmlReport::new(Path::new("/lib"), &groups, &stats(&groups));
        let html = report.to_html().unwrap();

        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("Group 1 (2 files,"));
        assert!(html.contains("1 duplicate groups, 1 redundant files"));
        assert!(html.contains("/lib/b.jpg"));
        assert_eq!(html.matches("class=\"badge-keep\"").count(), 1);
    }

    #[test]
    fn test_paths_are_escaped() {
        let tricky = PathBuf::from("/lib/<script>alert('x')</script> & \"q\".jpg");
        let groups = vec![DuplicateGroup::new(1, vec![tricky, PathBuf::from("/lib/ok.jpg")])];
        let html = HtmlReport::new(Path::new("/lib"), &groups, &stats(&groups))
            .to_html()
            .unwrap();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&amp;"));
        assert!(html.contains("&quot;q&quot;"));
    }

    #[test]
    fn test_empty_report() {
        let html = HtmlReport::new(Path::new("/lib"), &[], &DuplicateStats::default())
            .to_html()
            .unwrap();

        assert!(html.contains("0 duplicate groups, 0 redundant files"));
        assert!(!html.contains("class=\"group-card\""));
    }

    #[test]
    fn test_save_writes_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("report.html");

        HtmlReport::new(dir.path(), &[], &DuplicateStats::default())
            .save(&path)
            .unwrap();

        assert!(std::fs::read_to_string(&path).unwrap().contains("Duplicate Report"));
    }
}
