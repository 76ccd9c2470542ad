//! Capture-time lookup for media files.
//!
//! Photos carry their capture time in EXIF (`DateTimeOriginal`, falling back
//! to `DateTime`). When that is missing, or for videos, the capture time is
//! estimated as the *minimum date*: the earliest of the file's accessed,
//! modified and created times, and the date embedded in a phone-style file
//! name when there is one. Filesystem times are read as local time.

use std::fs::{File, Metadata};
use std::io::BufReader;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Local, NaiveDateTime};

use crate::naming::{DateFields, FilenamePatterns};

/// Source of a capture timestamp for a file.
pub trait CaptureTimeReader {
    /// The capture time stored in the file, if any.
    fn capture_time(&self, path: &Path) -> Option<DateFields>;
}

/// Reads capture times from EXIF with `kamadak-exif`.
#[derive(Debug, Clone)]
pub struct ExifReader {
    patterns: FilenamePatterns,
}

impl ExifReader {
    /// Create a reader that parses EXIF date strings with `patterns`.
    #[must_use]
    pub fn new(patterns: FilenamePatterns) -> Self {
        Self { patterns }
    }

    fn read_tag(&self, exif: &exif::Exif, tag: exif::Tag) -> Option<DateFields> {
        let field = exif.get_field(tag, exif::In::PRIMARY)?;
        match field.value {
            exif::Value::Ascii(ref values) => {
                let raw = values.first()?;
                let text = std::str::from_utf8(raw).ok()?;
                self.patterns.parse_exif_date(text)
            }
            _ => None,
        }
    }
}

impl CaptureTimeReader for ExifReader {
    fn capture_time(&self, path: &Path) -> Option<DateFields> {
        let file = File::open(path)
            .map_err(|e| log::debug!("Cannot open {} for EXIF: {}", path.display(), e))
            .ok()?;
        let mut reader = BufReader::new(file);
        let exif = exif::Reader::new()
            .read_from_container(&mut reader)
            .map_err(|e| log::trace!("No EXIF in {}: {}", path.display(), e))
            .ok()?;

        self.read_tag(&exif, exif::Tag::DateTimeOriginal)
            .or_else(|| self.read_tag(&exif, exif::Tag::DateTime))
    }
}

/// Earliest plausible capture time for a file.
///
/// Returns `None` only when no filesystem time can be read and the name
/// carries no date.
#[must_use]
pub fn min_date(
    file_name: &str,
    metadata: &Metadata,
    patterns: &FilenamePatterns,
) -> Option<DateFields> {
    let fs_times = [metadata.accessed(), metadata.modified(), metadata.created()];
    let from_fs = fs_times
        .into_iter()
        .filter_map(Result::ok)
        .map(local_time)
        .min();
    let from_name = patterns
        .match_phone(file_name)
        .and_then(|fields| fields.to_datetime());

    let earliest = match (from_fs, from_name) {
        (Some(a), Some(b)) => a.min(b),
        (a, b) => a.or(b)?,
    };
    Some(DateFields::from_datetime(&earliest))
}

fn local_time(time: SystemTime) -> NaiveDateTime {
    DateTime::<Local>::from(time).naive_local()
}
