//! Reelgraph Ingest Library
//!
//! Loads the IMDb-style tab-separated dumps, and optionally a quoted
//! comma-separated movie dataset, into a relational store.
//!
//! # Pipeline
//!
//! - [`reader::RecordReader`] reads a header line and builds a
//!   [`decoder::RowDecoder`] from the [`schema::Schema`]
//! - each data line becomes a [`decoder::TypedRecord`] of
//!   [`value::TypedValue`]s
//! - a [`loader::Loader`] fans every record out into [`sink::Row`]s
//! - a [`sink::RowSink`] persists them; [`job::JobRunner`] commits one
//!   unit per source file and halts at the first failing file
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use reelgraph_ingest::job::{standard_jobs, JobRunner};
//! use reelgraph_ingest::schema::Schema;
//! use reelgraph_ingest::sink::SqliteSink;
//!
//! fn main() -> reelgraph_ingest::Result<()> {
//!     let jobs = standard_jobs(Path::new("./data"), Arc::new(Schema::imdb()), None);
//!     let mut sink = SqliteSink::open("imdb.db")?;
//!     let summary = JobRunner::new().run(&jobs, &mut sink)?;
//!     println!("{} records imported", summary.records());
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod decoder;
pub mod error;
pub mod job;
pub mod loader;
pub mod progress;
pub mod reader;
pub mod schema;
pub mod sink;
pub mod tokenize;
pub mod value;

pub use config::ImportConfig;
pub use error::{IngestError, Result};
pub use job::{standard_jobs, Job, JobRunner, RunSummary};
pub use schema::{ColumnType, Schema};
pub use sink::{MemorySink, RowSink, SqliteSink};
