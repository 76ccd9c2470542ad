//! Canonical naming for ingested media.
//!
//! # Overview
//!
//! Every file that enters the library is renamed to
//! `YYYYMMDD_HHMMSS_SSS.ext`: its capture time (the [`NameKey`]) followed by
//! a three-digit suffix that keeps files taken in the same second apart.
//!
//! - [`DateFields`] - the date/time parts extracted from EXIF, a file name or
//!   filesystem timestamps
//! - [`NameKey`] - the `YYYYMMDD_HHMMSS` part of a name
//! - [`CanonicalName`] - key + suffix + extension
//! - [`FileRecord`] - one candidate file, as it flows through ingestion
//! - [`allocator`] - hands out suffixes that are unique per key
//! - [`patterns`] - filename regexes (phone/camera presets, EXIF dates)
//!
//! # Example
//!
//! ```
//! use photosort::naming::{CanonicalName, DateFields, NameKey};
//!
//! let fields = DateFields::new(2020, 3, 15).with_time(14, 30, 22);
//! let key = NameKey::from_fields(&fields).unwrap();
//! let name = CanonicalName::new(key, 7, "JPG");
//! assert_eq!(name.to_string(), "20200315_143022_007.jpg");
//!
//! let parsed: CanonicalName = "20200315_143022_007.jpg".parse().unwrap();
//! assert_eq!(parsed, name);
//! ```

pub mod allocator;
pub mod patterns;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

pub use allocator::{AllocationError, NameRegistry, SuffixAllocator, MAX_SUFFIX};
pub use patterns::FilenamePatterns;

use crate::scanner::lowercase_extension;

/// Date/time parts of a capture timestamp. Time parts may be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateFields {
    /// Four-digit year
    pub year: Option<u32>,
    /// Month, 1-12
    pub month: Option<u32>,
    /// Day of month, 1-31
    pub day: Option<u32>,
    /// Hour, 0-23
    pub hour: Option<u32>,
    /// Minute, 0-59
    pub minute: Option<u32>,
    /// Second, 0-59
    pub second: Option<u32>,
}

impl DateFields {
    /// Fields with a known date and an unknown time of day.
    #[must_use]
    pub fn new(year: u32, month: u32, day: u32) -> Self {
        Self {
            year: Some(year),
            month: Some(month),
            day: Some(day),
            ..Self::default()
        }
    }

    /// Set the time of day.
    #[must_use]
    pub fn with_time(mut self, hour: u32, minute: u32, second: u32) -> Self {
        self.hour = Some(hour);
        self.minute = Some(minute);
        self.second = Some(second);
        self
    }

    /// All fields from a full timestamp.
    #[must_use]
    pub fn from_datetime(dt: &NaiveDateTime) -> Self {
        // Year is clamped into the four-digit range that NameKey can render.
        let year = u32::try_from(dt.year().clamp(0, 9999)).unwrap_or_default();
        Self::new(year, dt.month(), dt.day()).with_time(dt.hour(), dt.minute(), dt.second())
    }

    /// Whether year, month and day are all known.
    #[must_use]
    pub fn has_date(&self) -> bool {
        self.year.is_some() && self.month.is_some() && self.day.is_some()
    }

    /// Convert to a timestamp, treating unknown time parts as zero.
    ///
    /// Returns `None` if the date is incomplete or not a real calendar date.
    #[must_use]
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        let date = NaiveDate::from_ymd_opt(
            i32::try_from(self.year?).ok()?,
            self.month?,
            self.day?,
        )?;
        let time = NaiveTime::from_hms_opt(
            self.hour.unwrap_or(0),
            self.minute.unwrap_or(0),
            self.second.unwrap_or(0),
        )?;
        Some(date.and_time(time))
    }
}

/// The `YYYYMMDD_HHMMSS` part of a canonical name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameKey(String);

impl NameKey {
    /// Render the key for a set of date fields.
    ///
    /// Year, month and day are required and must form a valid date; missing
    /// time parts render as `00`.
    #[must_use]
    pub fn from_fields(fields: &DateFields) -> Option<Self> {
        let dt = fields.to_datetime()?;
        if dt.year() > 9999 {
            return None;
        }
        Some(Self(dt.format("%Y%m%d_%H%M%S").to_string()))
    }

    /// The rendered key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `YYYY` part of the key.
    #[must_use]
    pub fn year(&self) -> &str {
        &self.0[..4]
    }

    /// The `MM` part of the key.
    #[must_use]
    pub fn month(&self) -> &str {
        &self.0[4..6]
    }
}

impl fmt::Display for NameKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A full canonical file name: `{key}_{suffix:03}.{extension}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalName {
    /// Capture-time key
    pub key: NameKey,
    /// Disambiguating suffix, unique per key
    pub suffix: u16,
    /// Lower-cased extension without the dot
    pub extension: String,
}

impl CanonicalName {
    /// Build a name; the extension is lower-cased.
    #[must_use]
    pub fn new(key: NameKey, suffix: u16, extension: &str) -> Self {
        Self {
            key,
            suffix,
            extension: extension.to_lowercase(),
        }
    }

    /// Folder this name lives in under `root`: `root/YYYY` or `root/YYYY/MM`.
    #[must_use]
    pub fn target_folder(&self, root: &Path, by_month: bool) -> PathBuf {
        let year = root.join(self.key.year());
        if by_month {
            year.join(self.key.month())
        } else {
            year
        }
    }

    /// Full destination path under `root`.
    #[must_use]
    pub fn target_path(&self, root: &Path, by_month: bool) -> PathBuf {
        self.target_folder(root, by_month).join(self.to_string())
    }
}

impl fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{:03}", self.key, self.suffix)?;
        if !self.extension.is_empty() {
            write!(f, ".{}", self.extension)?;
        }
        Ok(())
    }
}

/// A file name that is not in canonical form.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("Not a canonical name: {0}")]
pub struct NotCanonical(pub String);

impl FromStr for CanonicalName {
    type Err = NotCanonical;

    /// Parse `YYYYMMDD_HHMMSS_SSS.ext`. Suffixes of three or four digits are
    /// accepted so that older trees can be indexed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let reject = || NotCanonical(s.to_string());
        let (stem, extension) = s.rsplit_once('.').ok_or_else(reject)?;
        if extension.is_empty() || !extension.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(reject());
        }

        let mut parts = stem.split('_');
        let (Some(date), Some(time), Some(suffix), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(reject());
        };
        let all_digits = |part: &str, lens: &[usize]| {
            lens.contains(&part.len()) && part.bytes().all(|b| b.is_ascii_digit())
        };
        if !all_digits(date, &[8]) || !all_digits(time, &[6]) || !all_digits(suffix, &[3, 4]) {
            return Err(reject());
        }

        let num = |part: &str| part.parse::<u32>().ok();
        let fields = DateFields::new(
            num(&date[..4]).ok_or_else(reject)?,
            num(&date[4..6]).ok_or_else(reject)?,
            num(&date[6..]).ok_or_else(reject)?,
        )
        .with_time(
            num(&time[..2]).ok_or_else(reject)?,
            num(&time[2..4]).ok_or_else(reject)?,
            num(&time[4..]).ok_or_else(reject)?,
        );
        let key = NameKey::from_fields(&fields).ok_or_else(reject)?;
        let suffix = suffix.parse::<u16>().map_err(|_| reject())?;

        Ok(Self::new(key, suffix, extension))
    }
}

/// One candidate file on its way into the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Where the file is now
    pub full_path: PathBuf,
    /// Containing folder
    pub folder: PathBuf,
    /// Final path segment
    pub file_name: String,
    /// Lower-cased extension without the dot
    pub extension: String,
    /// Size in bytes
    pub size: u64,
    /// Capture date/time
    pub fields: DateFields,
    /// Allocated suffix; set once by the allocator
    pub suffix: Option<u16>,
    /// Allocated canonical name; set once by the allocator
    pub new_file_name: Option<String>,
}

impl FileRecord {
    /// Describe a file found at `path`.
    #[must_use]
    pub fn new(path: &Path, size: u64, fields: DateFields) -> Self {
        Self {
            full_path: path.to_path_buf(),
            folder: path.parent().map(Path::to_path_buf).unwrap_or_default(),
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            extension: lowercase_extension(path),
            size,
            fields,
            suffix: None,
            new_file_name: None,
        }
    }

    /// The record's key, if its date is complete.
    #[must_use]
    pub fn name_key(&self) -> Option<NameKey> {
        NameKey::from_fields(&self.fields)
    }
}
