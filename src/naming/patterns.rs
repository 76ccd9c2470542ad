//! Filename patterns used during ingestion.
//!
//! - `phone`: names written by phones and messengers, with the capture date
//!   (and usually time) embedded, e.g. `IMG_20200315_143022.jpg`,
//!   `VID-20191231-WA0004.mp4`, `20200101_101010_HDR.jpg`
//! - `camera`: plain camera counters, e.g. `DSC_0042.NEF`, `MVI_1234.MOV`;
//!   only its source is exposed, for the `camera` accept preset
//! - EXIF date strings, `YYYY:MM:DD HH:MM:SS`
//!
//! Canonical destination names are parsed by
//! [`CanonicalName`](super::CanonicalName)'s `FromStr`, which
//! [`FilenamePatterns::match_destination`] wraps for the destination index.

use regex::Regex;

use super::{CanonicalName, DateFields};

const DELIMITER: &str = r"[-_ .~]?";
const PREFIX: &str = r"(?P<prefix>IMG|VID|Screenshot|C360|MPC|DSC|RKP|MVI)";
const SUFFIX: &str = r"(?P<suffix>\d{1,4}|\(\d\)|HDR|Burst\d{2}|WA\d{4})";
const EXTENSION: &str = r"\.(?P<extension>(?i:jpg|jpeg|png|heic|nef|mp4|mov))";
const DATE: &str = r"(?P<year>\d{4})D(?P<month>[0-1]\d)D(?P<day>[0-3]\d)";
const TIME: &str = r"(?:(?P<hour>[0-2]\d)D(?P<minute>\d{2})D(?P<second>\d{2})D(?P<millisecond>\d{3})?)?";

/// Compiled filename regexes.
#[derive(Debug, Clone)]
pub struct FilenamePatterns {
    phone: Regex,
    exif_date: Regex,
}

impl FilenamePatterns {
    /// Compile the built-in patterns.
    ///
    /// # Errors
    ///
    /// Returns the regex error if a pattern fails to compile.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            phone: Regex::new(&Self::phone_source())?,
            exif_date: Regex::new(
                r"^(?P<year>\d{4}):(?P<month>[0-1]\d):(?P<day>[0-3]\d) (?P<hour>[0-2]\d):(?P<minute>\d{2}):(?P<second>\d{2})",
            )?,
        })
    }

    /// Source of the `phone` acceptance preset.
    #[must_use]
    pub fn phone_source() -> String {
        let date = DATE.replace('D', DELIMITER);
        let time = TIME.replace('D', DELIMITER);
        format!("^{PREFIX}?{DELIMITER}{date}{DELIMITER}{time}{DELIMITER}{SUFFIX}?{EXTENSION}$")
    }

    /// Source of the `camera` acceptance preset.
    #[must_use]
    pub fn camera_source() -> String {
        format!("^{PREFIX}{DELIMITER}{SUFFIX}{EXTENSION}$")
    }

    /// Date (and time, when present) embedded in a phone-style name.
    #[must_use]
    pub fn match_phone(&self, name: &str) -> Option<DateFields> {
        let caps = self.phone.captures(name)?;
        let field = |group: &str| caps.name(group).and_then(|m| m.as_str().parse::<u32>().ok());
        let fields = DateFields {
            year: field("year"),
            month: field("month"),
            day: field("day"),
            hour: field("hour"),
            minute: field("minute"),
            second: field("second"),
        };
        fields.to_datetime().map(|_| fields)
    }

    /// Parse an EXIF `YYYY:MM:DD HH:MM:SS` timestamp.
    #[must_use]
    pub fn parse_exif_date(&self, value: &str) -> Option<DateFields> {
        let caps = self.exif_date.captures(value.trim())?;
        let field = |group: &str| caps.name(group)?.as_str().parse::<u32>().ok();
        let fields = DateFields::new(field("year")?, field("month")?, field("day")?).with_time(
            field("hour")?,
            field("minute")?,
            field("second")?,
        );
        fields.to_datetime().map(|_| fields)
    }

    /// Parse a canonical destination name.
    #[must_use]
    pub fn match_destination(&self, name: &str) -> Option<CanonicalName> {
        name.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns() -> FilenamePatterns {
        FilenamePatterns::new().unwrap()
    }

    #[test]
    fn test_phone_names_with_time() {
        let p = patterns();

        for name in [
            "IMG_20200315_143022.jpg",
            "IMG-20200315-143022-123.jpg",
            "20200315_143022.mp4",
            "20200315_143022_HDR.jpg",
            "VID_20200315_143022.MOV",
        ] {
            let fields = p.match_phone(name).unwrap_or_else(|| panic!("{name}"));
            assert_eq!(fields, DateFields::new(2020, 3, 15).with_time(14, 30, 22), "{name}");
        }
    }

    #[test]
    fn test_phone_names_date_only() {
        let p = patterns();

        let fields = p.match_phone("IMG-20191231-WA0004.jpg").unwrap();
        assert_eq!(fields, DateFields::new(2019, 12, 31));
        assert!(fields.hour.is_none());
    }

    #[test]
    fn test_phone_rejects() {
        let p = patterns();

        assert!(p.match_phone("DSC_0042.NEF").is_none());
        assert!(p.match_phone("holiday.jpg").is_none());
        assert!(p.match_phone("IMG_20201345_101010.jpg").is_none());
        assert!(p.match_phone("IMG_20200315_143022.txt").is_none());
    }

    #[test]
    fn test_camera_names() {
        let camera = Regex::new(&FilenamePatterns::camera_source()).unwrap();

        assert!(camera.is_match("DSC_0042.NEF"));
        assert!(camera.is_match("MVI1234.mov"));
        assert!(camera.is_match("IMG_0001.JPG"));
        assert!(!camera.is_match("holiday.jpg"));
        assert!(!camera.is_match("DSC_0042.txt"));
    }

    #[test]
    fn test_exif_date() {
        let p = patterns();

        assert_eq!(
            p.parse_exif_date("2018:07:04 09:08:07"),
            Some(DateFields::new(2018, 7, 4).with_time(9, 8, 7))
        );
        assert!(p.parse_exif_date("0000:00:00 00:00:00").is_none());
        assert!(p.parse_exif_date("2018-07-04 09:08:07").is_none());
    }

    #[test]
    fn test_match_destination() {
        let p = patterns();

        let name = p.match_destination("20200315_143022_001.jpg").unwrap();
        assert_eq!(name.suffix, 1);
        assert!(p.match_destination("IMG_20200315_143022.jpg").is_none());
    }
}
