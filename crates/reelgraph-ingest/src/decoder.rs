//! Header-driven row decoding for the tab-separated dumps
//!
//! A [`RowDecoder`] is built from one file's header and the shared
//! [`Schema`]. Column types are resolved up front, so an undeclared header
//! name fails before any data line is read.

use std::collections::HashMap;

use crate::error::{IngestError, Result};
use crate::schema::{ColumnType, Schema};
use crate::value::{convert, TypedValue};

/// Field delimiter of the tab-separated dumps
pub const FIELD_DELIMITER: char = '\t';

static ABSENT: TypedValue = TypedValue::Null;

/// One decoded data line, keyed by header column name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypedRecord {
    fields: HashMap<String, TypedValue>,
}

impl TypedRecord {
    /// Value of `column`, or null when the file has no such column
    pub fn get(&self, column: &str) -> &TypedValue {
        self.fields.get(column).unwrap_or(&ABSENT)
    }

    pub fn key(&self, column: &str) -> Option<i64> {
        self.get(column).as_key()
    }

    pub fn list(&self, column: &str) -> Option<&[String]> {
        self.get(column).as_list()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, TypedValue)> for TypedRecord {
    fn from_iter<I: IntoIterator<Item = (String, TypedValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Turns tab-separated lines into [`TypedRecord`]s for one header
#[derive(Debug, Clone)]
pub struct RowDecoder {
    columns: Vec<(String, ColumnType)>,
}

impl RowDecoder {
    /// Resolve every header name against `schema`
    ///
    /// # Errors
    /// [`IngestError::UnknownColumn`] for the first undeclared name.
    pub fn new<S: AsRef<str>>(header: &[S], schema: &Schema) -> Result<Self> {
        let columns = header
            .iter()
            .map(|name| {
                let name = name.as_ref();
                schema.lookup(name).map(|ty| (name.to_string(), ty))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { columns })
    }

    /// Build a decoder from a raw header line
    pub fn from_header_line(line: &str, schema: &Schema) -> Result<Self> {
        let header: Vec<&str> = trim_line_ending(line).split(FIELD_DELIMITER).collect();
        Self::new(&header, schema)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Decode one data line; tokens are matched to columns by position
    ///
    /// # Errors
    /// [`IngestError::RowShapeMismatch`] when the token count differs from the
    /// header, or the conversion error of the first bad token wrapped in
    /// [`IngestError::Column`].
    pub fn decode(&self, line: &str) -> Result<TypedRecord> {
        let tokens: Vec<&str> = trim_line_ending(line).split(FIELD_DELIMITER).collect();
        if tokens.len() != self.columns.len() {
            return Err(IngestError::RowShapeMismatch {
                expected: self.columns.len(),
                actual: tokens.len(),
            });
        }

        self.columns
            .iter()
            .zip(tokens)
            .map(|((name, ty), raw)| {
                convert(raw, *ty)
                    .map(|value| (name.clone(), value))
                    .map_err(|e| e.in_column(name.as_str()))
            })
            .collect()
    }
}

fn trim_line_ending(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}
