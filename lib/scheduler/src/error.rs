//! Error types for the scheduler crate.
//!
//! Duplicate names, unknown tags, and never-fired state are expected
//! outcomes and stay boolean/optional at the call sites. Only declarative
//! config loading can genuinely fail.

use std::fmt;

/// Errors from loading declarative descriptor configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderError {
    /// Reading the config file failed.
    Io { path: String, details: String },
    /// The config content could not be decoded.
    Parse { reason: String },
}

impl fmt::Display for LoaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, details } => {
                write!(f, "failed to read config '{path}': {details}")
            }
            Self::Parse { reason } => {
                write!(f, "failed to parse notification config: {reason}")
            }
        }
    }
}

impl std::error::Error for LoaderError {}
