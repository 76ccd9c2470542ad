//! Report output.
//!
//! - [`html`]: self-contained HTML page listing duplicate groups, written by
//!   `photosort report`

pub mod html;

pub use html::{HtmlOutputError, HtmlReport};
