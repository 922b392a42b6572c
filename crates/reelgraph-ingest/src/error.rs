//! Error types for the import pipeline
//!
//! Every failure is local to one record or one file. Context wrappers
//! (`Column`, `Line`, `Job`) add location without hiding the underlying kind;
//! use [`IngestError::root`] to match on it.
//!
//! Each variant's message covers only its own level. The cause is reachable
//! through `source()`, so [`IngestError::report`] or anyhow's `{:#}` renders
//! the full chain with every message once.

use std::path::PathBuf;

use thiserror::Error;

use crate::schema::ColumnType;

/// Result type alias for import operations
pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Error, Debug)]
pub enum IngestError {
    /// Quoting or escaping is broken in a quoted comma-separated field
    #[error("Malformed field: {reason} in {field:?}")]
    MalformedField { field: String, reason: String },

    /// A token cannot be converted to its declared column type
    #[error("Type mismatch: {value:?} is not a valid {expected}")]
    TypeMismatch { expected: ColumnType, value: String },

    /// A composite key token is too short or has a non-numeric suffix
    #[error("Malformed key: {0:?}")]
    MalformedKey(String),

    /// A header or lookup names a column the schema never declared
    #[error("Unknown column '{0}'. Declare it in the schema before importing files that use it.")]
    UnknownColumn(String),

    /// A data line has a different number of tokens than its header
    #[error("Row shape mismatch: expected {expected} fields, got {actual}")]
    RowShapeMismatch { expected: usize, actual: usize },

    /// The source file has no header line
    #[error("Missing header line")]
    MissingHeader,

    #[error("File operation failed")]
    Io(#[from] std::io::Error),

    #[error("Database error")]
    Database(#[from] rusqlite::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("column '{column}'")]
    Column {
        column: String,
        #[source]
        source: Box<IngestError>,
    },

    #[error("line {line}")]
    Line {
        line: u64,
        #[source]
        source: Box<IngestError>,
    },

    #[error("{}", file.display())]
    Job {
        file: PathBuf,
        #[source]
        source: Box<IngestError>,
    },
}

impl IngestError {
    pub fn malformed_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn type_mismatch(expected: ColumnType, value: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected,
            value: value.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn in_column(self, column: impl Into<String>) -> Self {
        Self::Column {
            column: column.into(),
            source: Box::new(self),
        }
    }

    pub fn at_line(self, line: u64) -> Self {
        Self::Line {
            line,
            source: Box::new(self),
        }
    }

    pub fn in_file(self, file: impl Into<PathBuf>) -> Self {
        Self::Job {
            file: file.into(),
            source: Box::new(self),
        }
    }

    /// The underlying error with all location context stripped
    pub fn root(&self) -> &IngestError {
        match self {
            Self::Column { source, .. } | Self::Line { source, .. } | Self::Job { source, .. } => {
                source.root()
            }
            other => other,
        }
    }

    /// Line number carried by the context chain, if any
    pub fn line(&self) -> Option<u64> {
        match self {
            Self::Line { line, .. } => Some(*line),
            Self::Column { source, .. } | Self::Job { source, .. } => source.line(),
            _ => None,
        }
    }

    /// Every message in the cause chain, outermost first, joined by `: `
    pub fn report(&self) -> String {
        let mut message = self.to_string();
        let mut cause = std::error::Error::source(self);
        while let Some(err) = cause {
            message.push_str(": ");
            message.push_str(&err.to_string());
            cause = err.source();
        }
        message
    }

    /// Short stable name of the root error, for log fields
    pub fn kind(&self) -> &'static str {
        match self.root() {
            Self::MalformedField { .. } => "malformed_field",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::MalformedKey(_) => "malformed_key",
            Self::UnknownColumn(_) => "unknown_column",
            Self::RowShapeMismatch { .. } => "row_shape_mismatch",
            Self::MissingHeader => "missing_header",
            Self::Io(_) => "io",
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::Column { .. } | Self::Line { .. } | Self::Job { .. } => "context",
        }
    }
}
