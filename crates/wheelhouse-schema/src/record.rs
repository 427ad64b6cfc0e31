//! RECORD manifest entries and the CSV dialect they are stored in.
//!
//! Each row is `path,hash,size`. Hash and size are empty for the RECORD
//! file itself, which cannot hash its own contents.

use crate::hash::RecordHash;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading RECORD rows.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// A row parsed as CSV but its fields are not a valid entry.
    #[error("Invalid RECORD entry '{path}': {reason}")]
    InvalidEntry {
        /// Path column of the offending row (may be empty).
        path: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The CSV itself is malformed.
    #[error("Malformed RECORD at row {row}: {reason}")]
    Malformed {
        /// 1-based row number.
        row: usize,
        /// What was wrong with it.
        reason: String,
    },
}

/// One line of a RECORD file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordEntry {
    /// Forward-slash path, relative to the scheme the file was installed in.
    pub path: String,
    /// Content hash, absent for RECORD itself.
    pub hash: Option<RecordHash>,
    /// Size in bytes, absent for RECORD itself.
    pub size: Option<u64>,
}

impl RecordEntry {
    /// Create an entry from already-typed parts.
    pub fn new(path: impl Into<String>, hash: Option<RecordHash>, size: Option<u64>) -> Self {
        Self {
            path: path.into(),
            hash,
            size,
        }
    }

    /// Build an entry from the three raw CSV columns.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::InvalidEntry`] if the path is empty, the hash
    /// has no `=` separator, or the size is not a non-negative integer.
    pub fn from_elements(path: &str, hash: &str, size: &str) -> Result<Self, RecordError> {
        let invalid = |reason: String| RecordError::InvalidEntry {
            path: path.to_string(),
            reason,
        };

        if path.is_empty() {
            return Err(invalid("path must not be empty".to_string()));
        }

        let hash = if hash.is_empty() {
            None
        } else {
            Some(RecordHash::parse(hash).map_err(invalid)?)
        };

        let size = if size.is_empty() {
            None
        } else {
            Some(
                size.parse::<u64>()
                    .map_err(|_| invalid(format!("size '{size}' is not an integer")))?,
            )
        };

        Ok(Self::new(path, hash, size))
    }

    /// The three CSV columns for this entry, with `prefix` joined in front
    /// of the path when given.
    pub fn to_row(&self, prefix: Option<&str>) -> [String; 3] {
        let path = match prefix {
            Some(prefix) if !prefix.is_empty() => {
                format!("{}/{}", prefix.trim_end_matches('/'), self.path)
            }
            _ => self.path.clone(),
        };
        [
            path,
            self.hash.as_ref().map(ToString::to_string).unwrap_or_default(),
            self.size.map(|s| s.to_string()).unwrap_or_default(),
        ]
    }

    /// Check `data` against the recorded size and hash.
    ///
    /// Missing fields are not checked; an entry with neither always passes.
    pub fn validate(&self, data: &[u8]) -> bool {
        if self.size.is_some_and(|size| size != data.len() as u64) {
            return false;
        }
        self.hash.as_ref().is_none_or(|hash| hash.validate(data))
    }
}

/// Parse the contents of a RECORD file.
///
/// # Errors
///
/// Returns [`RecordError::Malformed`] for unbalanced quoting or rows that do
/// not have exactly three columns, and [`RecordError::InvalidEntry`] for rows
/// whose columns do not form a valid entry.
pub fn parse_record_file(text: &str) -> Result<Vec<RecordEntry>, RecordError> {
    split_csv(text)?
        .into_iter()
        .enumerate()
        .map(|(index, fields)| match fields.as_slice() {
            [path, hash, size] => RecordEntry::from_elements(path, hash, size),
            _ => Err(RecordError::Malformed {
                row: index + 1,
                reason: format!("expected 3 columns, found {}", fields.len()),
            }),
        })
        .collect()
}

/// Serialize rows as RECORD CSV with `\n` line endings.
pub fn write_record_file<I>(rows: I) -> String
where
    I: IntoIterator<Item = [String; 3]>,
{
    let mut out = String::new();
    for row in rows {
        let fields: Vec<String> = row.iter().map(|f| quote_field(f)).collect();
        out.push_str(&fields.join(","));
        out.push('\n');
    }
    out
}

fn quote_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Split CSV text into rows of fields. Blank lines are skipped.
fn split_csv(text: &str) -> Result<Vec<Vec<String>>, RecordError> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut row_has_content = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                row_has_content = true;
            }
            ',' => {
                row.push(std::mem::take(&mut field));
                row_has_content = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                if row_has_content || !field.is_empty() {
                    row.push(std::mem::take(&mut field));
                    rows.push(std::mem::take(&mut row));
                }
                row_has_content = false;
            }
            _ => {
                field.push(c);
                row_has_content = true;
            }
        }
    }

    if in_quotes {
        return Err(RecordError::Malformed {
            row: rows.len() + 1,
            reason: "unterminated quoted field".to_string(),
        });
    }
    if row_has_content || !field.is_empty() {
        row.push(field);
        rows.push(row);
    }

    Ok(rows)
}
