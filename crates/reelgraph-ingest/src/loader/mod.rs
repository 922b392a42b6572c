//! Fan-out loaders
//!
//! A [`Loader`] consumes one source file and turns each record into the
//! primary row plus association rows it implies. All rows derived from one
//! record reach the sink contiguously, before the next line is read.
//!
//! - [`TsvLoader`]: the tab-separated dumps, decoded through the schema
//! - [`MovieLoader`]: the quoted comma-separated movie dataset

pub mod fan_out;
pub mod movies;
pub mod tsv;

use std::io::BufRead;

use indicatif::ProgressBar;

use crate::error::Result;
use crate::sink::RowSink;

pub use movies::{MovieLoader, MovieRecord};
pub use tsv::{TsvLoader, TsvSource};

/// Counters reported after a file has been loaded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Data lines decoded
    pub records: u64,
    /// Sink writes (inserts and updates)
    pub rows: u64,
}

/// Streams one source file into a [`RowSink`]
///
/// Implementations stop at the first failing line and return the error with
/// its line number attached. They never open or close commit units; the
/// job runner owns those.
pub trait Loader {
    /// Short name for logs and progress messages
    fn name(&self) -> &str;

    fn load(
        &self,
        input: &mut dyn BufRead,
        sink: &mut dyn RowSink,
        progress: &ProgressBar,
    ) -> Result<LoadStats>;
}
