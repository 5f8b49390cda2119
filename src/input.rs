#![forbid(unsafe_code)]

//! Declaration input
//!
//! Declarations arrive as JSON Lines, one [`DeclarationRecord`] per line.
//! Blank lines are skipped and every signature is whitespace-normalized.

use crate::error::InputError;
use crate::record::DeclarationRecord;
use std::io::{BufRead, ErrorKind};

/// Read every declaration from `reader`
///
/// # Errors
///
/// Returns `InputError::Malformed` with the 1-indexed line number of the
/// first line that is not a valid record, including lines that are not
/// valid UTF-8. Other read failures surface as `InputError::Io`.
pub fn read_records(reader: impl BufRead) -> Result<Vec<DeclarationRecord>, InputError> {
    let mut records = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| match e.kind() {
            ErrorKind::InvalidData => InputError::Malformed {
                line: index + 1,
                message: e.to_string(),
            },
            _ => InputError::Io(e),
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let mut record: DeclarationRecord =
            serde_json::from_str(&line).map_err(|e| InputError::Malformed {
                line: index + 1,
                message: e.to_string(),
            })?;
        record.normalize();
        records.push(record);
    }

    tracing::debug!(declarations = records.len(), "read declaration input");
    Ok(records)
}
