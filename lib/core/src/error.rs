//! Error handling foundation for recur.
//!
//! Most operations in the scheduler surface expected outcomes as booleans or
//! options (duplicate names, unknown tags, never-fired state). The only
//! genuinely fallible paths are file-backed persistence and declarative
//! config loading, which return `Report`-wrapped domain errors and add
//! context via rootcause as they propagate.

use rootcause::Report;
use std::fmt;

/// A Result type alias using rootcause's Report for error handling.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

/// Errors from the file-backed state store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    Io { path: String, details: String },
    /// The backing file held data that could not be decoded.
    Corrupt { path: String, details: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, details } => {
                write!(f, "state store I/O failed for '{path}': {details}")
            }
            Self::Corrupt { path, details } => {
                write!(f, "state store file '{path}' is corrupt: {details}")
            }
        }
    }
}

impl std::error::Error for StoreError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = StoreError::Io {
            path: "/tmp/state.json".to_string(),
            details: "permission denied".to_string(),
        };
        assert!(err.to_string().contains("/tmp/state.json"));
        assert!(err.to_string().contains("permission denied"));
    }

    #[test]
    fn corrupt_error_display() {
        let err = StoreError::Corrupt {
            path: "state.json".to_string(),
            details: "expected value at line 1".to_string(),
        };
        assert!(err.to_string().contains("corrupt"));
    }
}
