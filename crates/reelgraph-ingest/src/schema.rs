//! Column types and the column-name schema
//!
//! A [`Schema`] is built once at startup and shared read-only (behind an
//! `Arc`) by every decoder. Looking up a name it does not declare is a
//! configuration error, never a null value.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

/// Declared type of a column; drives conversion only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Integer,
    Text,
    Boolean,
    /// A closed tag set in principle; stored as unvalidated text
    Enumeration,
    /// Two-character alphabetic prefix followed by a numeric identifier
    CompositeKey,
    /// Comma-separated list of strings
    StringList,
    Real,
}

impl ColumnType {
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::Integer => "integer",
            ColumnType::Text => "text",
            ColumnType::Boolean => "boolean",
            ColumnType::Enumeration => "enumeration",
            ColumnType::CompositeKey => "composite key",
            ColumnType::StringList => "string list",
            ColumnType::Real => "real",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable mapping from column name to declared type
#[derive(Debug, Clone, Default)]
pub struct Schema {
    columns: HashMap<String, ColumnType>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Every column that appears in the tab-separated title and name dumps
    pub fn imdb() -> Self {
        use ColumnType::*;

        Self::builder()
            // title.basics
            .column("tconst", CompositeKey)
            .column("titleType", Enumeration)
            .column("primaryTitle", Text)
            .column("originalTitle", Text)
            .column("isAdult", Boolean)
            .column("startYear", Text)
            .column("endYear", Text)
            .column("runtimeMinutes", Integer)
            .column("genres", StringList)
            // name.basics
            .column("nconst", CompositeKey)
            .column("primaryName", Text)
            .column("birthYear", Text)
            .column("deathYear", Text)
            .column("primaryProfession", StringList)
            .column("knownForTitles", StringList)
            // title.crew
            .column("directors", StringList)
            .column("writers", StringList)
            // title.episode
            .column("parentTconst", CompositeKey)
            .column("seasonNumber", Integer)
            .column("episodeNumber", Integer)
            // title.akas
            .column("titleId", CompositeKey)
            .column("ordering", Integer)
            .column("title", Text)
            .column("region", Text)
            .column("language", Text)
            .column("types", StringList)
            .column("attributes", StringList)
            .column("isOriginalTitle", Boolean)
            // title.principals
            .column("category", Text)
            .column("job", Text)
            .column("characters", Text)
            // title.ratings
            .column("averageRating", Real)
            .column("numVotes", Integer)
            .build()
    }

    /// Declared type of `column`
    ///
    /// # Errors
    /// [`IngestError::UnknownColumn`] if the name was never declared.
    pub fn lookup(&self, column: &str) -> Result<ColumnType> {
        self.columns
            .get(column)
            .copied()
            .ok_or_else(|| IngestError::UnknownColumn(column.to_string()))
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Collects declarations; the only way to populate a [`Schema`]
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    columns: HashMap<String, ColumnType>,
}

impl SchemaBuilder {
    /// Declare a column. A later declaration of the same name replaces the earlier one.
    pub fn column(mut self, name: impl Into<String>, column_type: ColumnType) -> Self {
        self.columns.insert(name.into(), column_type);
        self
    }

    pub fn build(self) -> Schema {
        Schema {
            columns: self.columns,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_imdb_schema_declares_dump_columns() {
        let schema = Schema::imdb();
        assert_eq!(schema.len(), 33);
        assert_eq!(schema.lookup("tconst").unwrap(), ColumnType::CompositeKey);
        assert_eq!(schema.lookup("genres").unwrap(), ColumnType::StringList);
        assert_eq!(schema.lookup("averageRating").unwrap(), ColumnType::Real);
        assert_eq!(schema.lookup("isOriginalTitle").unwrap(), ColumnType::Boolean);
    }

    #[test]
    fn test_unknown_column_is_an_error() {
        let err = Schema::imdb().lookup("favouriteColour").unwrap_err();
        assert!(matches!(err, IngestError::UnknownColumn(name) if name == "favouriteColour"));
    }

    #[test]
    fn test_builder_last_declaration_wins() {
        let schema = Schema::builder()
            .column("year", ColumnType::Integer)
            .column("year", ColumnType::Text)
            .build();
        assert_eq!(schema.lookup("year").unwrap(), ColumnType::Text);
        assert!(schema.contains("year"));
        assert!(!Schema::default().contains("year"));
    }
}
