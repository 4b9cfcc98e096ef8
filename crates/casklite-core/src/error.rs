//! Error types for casklite.

use std::fmt;

/// The main error type for casklite operations.
#[derive(Debug)]
pub enum Error {
    /// I/O error from the underlying storage
    Io(std::io::Error),

    /// Key absent from the index after a full scan
    KeyNotFound,

    /// A stored record failed to parse; indicates log corruption
    MalformedRecord(String),

    /// A key or value was rejected before it reached the log
    InvalidEntry(String),

    /// Storage engine error
    Storage(String),

    /// A lock was poisoned (internal error)
    LockPoisoned,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::KeyNotFound => write!(f, "Key not found"),
            Error::MalformedRecord(msg) => write!(f, "Malformed record: {}", msg),
            Error::InvalidEntry(msg) => write!(f, "Invalid entry: {}", msg),
            Error::Storage(msg) => write!(f, "Storage error: {}", msg),
            Error::LockPoisoned => write!(f, "Lock poisoned"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

/// A specialized `Result` type for casklite operations.
pub type Result<T> = std::result::Result<T, Error>;
