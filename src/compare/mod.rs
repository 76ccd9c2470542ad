//! Comparison strategies for deciding whether two files are the same item.
//!
//! # Overview
//!
//! A [`Comparer`] answers one question about a pair of files: are they
//! *distinct*? The ingestion pipeline accepts a source file only when it is
//! distinct from every file already known in the destination.
//!
//! - [`Comparer::Name`] - final path segments differ
//! - [`Comparer::Size`] - byte sizes differ
//! - [`Comparer::Binary`] - contents differ (streamed, see [`binary`])
//! - [`Comparer::Composite`] - distinct only if *every* child says distinct,
//!   so any single child reporting "same" makes the pair a match
//!
//! Strategies are looked up by name through a [`ComparerRegistry`], which is
//! built once at startup and handed to the pipeline.
//!
//! # Example
//!
//! ```
//! use photosort::compare::{Comparer, ComparerRegistry};
//!
//! let registry = ComparerRegistry::builtin();
//! let comparer = registry.resolve(&["name", "binary"]).unwrap();
//! assert_eq!(
//!     comparer,
//!     Comparer::Composite(vec![Comparer::Name, Comparer::Binary])
//! );
//! ```

pub mod binary;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

pub use binary::files_identical;

/// A strategy deciding whether two files are distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Comparer {
    /// Distinct when the file names differ.
    Name,
    /// Distinct when the byte sizes differ.
    ///
    /// Used on its own this treats *every* same-size file as a duplicate of
    /// an existing one, which for fixed-size formats means rejecting (and
    /// pruning) files that merely share a size. Combine it with other
    /// strategies only if that is really what you want.
    Size,
    /// Distinct when the contents differ.
    Binary,
    /// Distinct only when every child comparer reports distinct.
    ///
    /// An empty composite is vacuously distinct and never matches anything.
    Composite(Vec<Comparer>),
}

impl Comparer {
    /// Decide whether `a` and `b` are distinct under this strategy.
    ///
    /// # Errors
    ///
    /// Returns [`CompareError`] if a file needed for the decision cannot be
    /// read.
    pub fn is_distinct(&self, a: &Path, b: &Path) -> Result<bool, CompareError> {
        match self {
            Self::Name => Ok(a.file_name() != b.file_name()),
            Self::Size => {
                let size_a = file_size(a)?;
                let size_b = file_size(b)?;
                Ok(size_a != size_b)
            }
            Self::Binary => Ok(!files_identical(a, b)?),
            Self::Composite(children) => {
                for child in children {
                    if !child.is_distinct(a, b)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    /// The leaf strategies of this comparer, flattened in declaration order.
    #[must_use]
    pub fn leaves(&self) -> Vec<&Comparer> {
        match self {
            Self::Composite(children) => children.iter().flat_map(Comparer::leaves).collect(),
            leaf => vec![leaf],
        }
    }
}

impl fmt::Display for Comparer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Size => write!(f, "size"),
            Self::Binary => write!(f, "binary"),
            Self::Composite(children) => {
                let names: Vec<String> = children.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", names.join(", "))
            }
        }
    }
}

fn file_size(path: &Path) -> Result<u64, CompareError> {
    std::fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| CompareError::io(path, e))
}

/// Errors raised while comparing two files.
#[derive(thiserror::Error, Debug)]
pub enum CompareError {
    /// A file could not be read.
    #[error("Cannot compare {path}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl CompareError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// The file that caused the error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } => path,
        }
    }
}

/// Invalid strategy selection.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A strategy name that the registry does not know.
    #[error("Unknown compare strategy '{name}' (available: {})", available.join(", "))]
    UnknownStrategy {
        /// The requested name
        name: String,
        /// Names the registry does know
        available: Vec<String>,
    },
}

type Constructor = fn() -> Comparer;

/// Name → constructor table for comparison strategies.
#[derive(Debug, Clone)]
pub struct ComparerRegistry {
    constructors: BTreeMap<&'static str, Constructor>,
}

impl ComparerRegistry {
    /// The built-in strategies: `name`, `size` and `binary`.
    #[must_use]
    pub fn builtin() -> Self {
        let mut constructors: BTreeMap<&'static str, Constructor> = BTreeMap::new();
        constructors.insert("name", || Comparer::Name);
        constructors.insert("size", || Comparer::Size);
        constructors.insert("binary", || Comparer::Binary);
        Self { constructors }
    }

    /// Registered strategy names, sorted.
    #[must_use]
    pub fn available(&self) -> Vec<String> {
        self.constructors.keys().map(|k| (*k).to_string()).collect()
    }

    /// Look up a single strategy by name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownStrategy`] for names not in the registry.
    pub fn get(&self, name: &str) -> Result<Comparer, ConfigError> {
        self.constructors
            .get(name.trim().to_lowercase().as_str())
            .map(|construct| construct())
            .ok_or_else(|| ConfigError::UnknownStrategy {
                name: name.to_string(),
                available: self.available(),
            })
    }

    /// Build the comparer for a list of strategy names.
    ///
    /// One name gives that strategy, several give a [`Comparer::Composite`]
    /// in the given order, none gives an empty composite.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownStrategy`] for the first unknown name.
    pub fn resolve<S: AsRef<str>>(&self, names: &[S]) -> Result<Comparer, ConfigError> {
        let mut comparers = names
            .iter()
            .map(|name| self.get(name.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        if comparers.len() == 1 {
            Ok(comparers.remove(0))
        } else {
            Ok(Comparer::Composite(comparers))
        }
    }
}
