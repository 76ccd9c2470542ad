//! Unicode path normalization utilities.
//!
//! The mapping store holds paths as plain strings, and a library may have
//! been written from macOS (NFD file names) and later read on Linux or
//! Windows (NFC). Store values are therefore compared to on-disk paths in
//! NFC form.
//!
//! # Example
//!
//! ```
//! use photosort::scanner::path_utils::{normalize_path_str, paths_equal};
//!
//! let nfc = "café.jpg";          // é is U+00E9
//! let nfd = "cafe\u{0301}.jpg";  // e + combining accent
//!
//! assert_eq!(normalize_path_str(nfc), normalize_path_str(nfd));
//! assert!(paths_equal(nfc, nfd));
//! ```

use std::path::Path;
use unicode_normalization::UnicodeNormalization;

/// Normalize a path string to NFC (Composed) form.
#[must_use]
pub fn normalize_path_str(s: &str) -> String {
    s.nfc().collect()
}

/// Compare two path strings for equality after NFC normalization.
#[must_use]
pub fn paths_equal(a: &str, b: &str) -> bool {
    a == b || normalize_path_str(a) == normalize_path_str(b)
}

/// Compare a stored path string with a filesystem path.
#[must_use]
pub fn stored_path_matches(stored: &str, path: &Path) -> bool {
    paths_equal(stored, &path.to_string_lossy())
}

/// Create a normalized string key for use in hash maps and sets.
#[must_use]
pub fn path_key(path: &Path) -> String {
    normalize_path_str(&path.to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_normalize_path_str_nfd_to_nfc() {
        let nfd = "cafe\u{0301}.jpg";
        assert_eq!(normalize_path_str(nfd), "café.jpg");
    }

    #[test]
    fn test_normalize_path_str_ascii_unchanged() {
        let ascii = "/dst/2020/20200315_143022_000.jpg";
        assert_eq!(normalize_path_str(ascii), ascii);
    }

    #[test]
    fn test_paths_equal() {
        assert!(paths_equal("/a/café.jpg", "/a/cafe\u{0301}.jpg"));
        assert!(!paths_equal("/a/b.jpg", "/a/c.jpg"));
    }

    #[test]
    fn test_stored_path_matches() {
        assert!(stored_path_matches(
            "/dst/Ångström.jpg",
            Path::new("/dst/A\u{030A}ngstro\u{0308}m.jpg")
        ));
    }

    #[test]
    fn test_path_key() {
        let mut seen = HashSet::new();
        seen.insert(path_key(Path::new("café.jpg")));
        assert!(seen.contains(&path_key(Path::new("cafe\u{0301}.jpg"))));
    }
}
