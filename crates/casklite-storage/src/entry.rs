// Record format and encoding/decoding
//
// One record per line, plain text:
// key,value\n
//
// The format performs no escaping, so keys and values must not contain
// the field delimiter or a newline. That constraint is enforced when an
// entry is constructed, before anything reaches the log.

use casklite_core::{Error, Result};

/// Separates the key from the value within a record.
pub const FIELD_DELIMITER: char = ',';

/// Terminates every record.
pub const RECORD_TERMINATOR: char = '\n';

/// A single key-value record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
}

impl Entry {
    /// Create an entry, rejecting keys or values the format cannot
    /// represent.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let value = value.into();
        validate_field("key", &key)?;
        validate_field("value", &value)?;
        Ok(Self { key, value })
    }

    /// Build an entry from fields already validated by a prior write.
    pub(crate) fn from_parts(key: String, value: String) -> Self {
        Self { key, value }
    }

    /// Serialize to the on-disk line form.
    pub fn encode(&self) -> String {
        format!(
            "{}{}{}{}",
            self.key, FIELD_DELIMITER, self.value, RECORD_TERMINATOR
        )
    }

    /// Number of bytes `encode` produces.
    pub fn encoded_len(&self) -> u64 {
        (self.key.len() + self.value.len() + 2) as u64
    }

    /// Parse one newline-terminated line back into an entry.
    ///
    /// A line that does not split into exactly a key and a value is a
    /// malformed record, which is fatal: it means the log is corrupt.
    pub fn decode(line: &str) -> Result<Self> {
        let body = line.strip_suffix(RECORD_TERMINATOR).ok_or_else(|| {
            Error::MalformedRecord(format!("record not newline-terminated: {:?}", line))
        })?;

        let fields: Vec<&str> = body.split(FIELD_DELIMITER).collect();
        if fields.len() != 2 {
            return Err(Error::MalformedRecord(format!(
                "expected 2 fields, found {}: {:?}",
                fields.len(),
                body
            )));
        }

        Ok(Self::from_parts(fields[0].to_string(), fields[1].to_string()))
    }
}

fn validate_field(name: &str, field: &str) -> Result<()> {
    if field.contains(FIELD_DELIMITER) || field.contains(RECORD_TERMINATOR) {
        return Err(Error::InvalidEntry(format!(
            "{} must not contain {:?} or a newline: {:?}",
            name, FIELD_DELIMITER, field
        )));
    }
    Ok(())
}
