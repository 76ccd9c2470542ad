//! Moving files into the library and removing files from the source.
//!
//! - [`move_file`]: never overwrites; rename first, copy and remove across
//!   devices
//! - [`delete_file`] / [`delete_batch`]: trash by default, unlink on request
//!
//! ```no_run
//! use photosort::actions::{delete_file, move_file, Disposal};
//! use std::path::Path;
//!
//! move_file(Path::new("/inbox/IMG_1.jpg"), Path::new("/lib/2020/20200101_000000_000.jpg"))?;
//! delete_file(Path::new("/inbox/IMG_1 (1).jpg"), Disposal::Trash)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod delete;
pub mod relocate;

pub use delete::{
    delete_batch, delete_file, ensure_copy_remains, BatchDeleteResult, DeleteConfig, DeleteError,
    DeleteProgressCallback, Disposal, Removed,
};
pub use relocate::{move_file, MoveError};
