//! List tokenizers for the two input dialects
//!
//! The tab-separated dumps store list fields as a bare comma split, while
//! the quoted comma-separated dataset wraps values in double quotes and
//! escapes with `\`. They are kept as separate functions so a list column
//! can never be decoded with the other dialect's rules by accident.

use std::str::Chars;

use crate::error::{IngestError, Result};

/// Split a tab-separated dump's list field on every `,`
///
/// No quoting or escaping is recognised. An empty field yields one empty
/// element.
pub fn split_plain(field: &str) -> Vec<String> {
    field.split(',').map(str::to_string).collect()
}

/// Split a comma-separated field that may contain double-quoted values
///
/// Outside quotes `,` ends an element and `"` discards whatever was
/// accumulated and opens a quoted value. Inside quotes `\` makes the next
/// character literal and `"` closes the value; anything between the closing
/// quote and the next `,` is dropped. An empty field yields one empty element.
///
/// # Errors
/// [`IngestError::MalformedField`] when a quote is never closed or the field
/// ends on a bare escape.
pub fn split_quoted(field: &str) -> Result<Vec<String>> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut chars = field.chars();

    while let Some(c) = chars.next() {
        match c {
            ',' => items.push(std::mem::take(&mut current)),
            '"' => {
                current.clear();
                read_quoted(&mut chars, &mut current, field)?;
                if skip_past_delimiter(&mut chars) {
                    items.push(std::mem::take(&mut current));
                }
            }
            other => current.push(other),
        }
    }

    items.push(current);
    Ok(items)
}

fn read_quoted(chars: &mut Chars<'_>, out: &mut String, field: &str) -> Result<()> {
    loop {
        match chars.next() {
            Some('\\') => match chars.next() {
                Some(escaped) => out.push(escaped),
                None => return Err(IngestError::malformed_field(field, "escape at end of input")),
            },
            Some('"') => return Ok(()),
            Some(c) => out.push(c),
            None => return Err(IngestError::malformed_field(field, "unterminated quote")),
        }
    }
}

/// Returns true if a delimiter was consumed, false at end of input
fn skip_past_delimiter(chars: &mut Chars<'_>) -> bool {
    chars.any(|c| c == ',')
}
