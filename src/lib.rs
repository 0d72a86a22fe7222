//! Weekly call-center report extraction.
//!
//! Reads loosely structured statistics and ticket workbooks, locates labeled
//! anchors inside them and produces an [`report::ExtractionResult`] that a
//! renderer can turn into charts and tables without further computation.

pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod extract;
pub mod grid;
pub mod locate;
pub mod matchers;
pub mod parallel;
pub mod pick;
pub mod report;

pub use error::{Anchor, ConfigError, ExportError, ExtractError};
