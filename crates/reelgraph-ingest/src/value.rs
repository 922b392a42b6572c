//! Typed field values and the scalar converter

use crate::error::{IngestError, Result};
use crate::schema::ColumnType;
use crate::tokenize::split_plain;

/// The dumps' universal null marker, valid for every column type
pub const NULL_TOKEN: &str = "\\N";

/// Width of the alphabetic prefix on composite keys (`tt`, `nm`, ...)
pub const KEY_PREFIX_LEN: usize = 2;

/// One decoded field
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Null,
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Text(String),
    /// Numeric identifier extracted from a composite key
    Key(i64),
    List(Vec<String>),
}

impl TypedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, TypedValue::Null)
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            TypedValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_key(&self) -> Option<i64> {
        match self {
            TypedValue::Key(key) => Some(*key),
            _ => None,
        }
    }
}

/// Convert one raw token to the declared type
///
/// `\N` is null for every type. Booleans are true only for exactly `"1"`;
/// every other token, `"0"` and `""` included, is false.
pub fn convert(raw: &str, column_type: ColumnType) -> Result<TypedValue> {
    if raw == NULL_TOKEN {
        return Ok(TypedValue::Null);
    }

    let value = match column_type {
        ColumnType::Integer => TypedValue::Integer(
            raw.parse()
                .map_err(|_| IngestError::type_mismatch(column_type, raw))?,
        ),
        ColumnType::Real => TypedValue::Real(
            raw.parse()
                .map_err(|_| IngestError::type_mismatch(column_type, raw))?,
        ),
        ColumnType::Boolean => TypedValue::Boolean(raw == "1"),
        ColumnType::Text | ColumnType::Enumeration => TypedValue::Text(raw.to_string()),
        ColumnType::StringList => TypedValue::List(split_plain(raw)),
        ColumnType::CompositeKey => TypedValue::Key(decode_key(raw)?),
    };
    Ok(value)
}

/// Numeric suffix of a composite key token such as `tt0000123`
pub fn decode_key(token: &str) -> Result<i64> {
    let digits = token
        .char_indices()
        .nth(KEY_PREFIX_LEN)
        .map(|(offset, _)| &token[offset..])
        .ok_or_else(|| IngestError::MalformedKey(token.to_string()))?;

    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IngestError::MalformedKey(token.to_string()));
    }
    digits
        .parse()
        .map_err(|_| IngestError::MalformedKey(token.to_string()))
}
