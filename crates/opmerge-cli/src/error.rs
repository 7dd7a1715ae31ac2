//! Error types for loading rulebooks and operation logs.

use std::path::PathBuf;

/// Errors raised while reading CLI inputs.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    /// A file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rulebook is not valid TOML or does not match the schema.
    #[error("invalid rulebook: {0}")]
    Parse(#[from] toml::de::Error),

    /// A rule that produces an entry does not say which op to emit.
    #[error("rule ({leading}, {trailing}) uses strategy '{strategy}' but has no `emit` op")]
    MissingEmit {
        leading: String,
        trailing: String,
        strategy: String,
    },

    /// Two rules share the same `(leading, trailing)` slot.
    #[error("rule ({leading}, {trailing}) is defined more than once")]
    DuplicateRule { leading: String, trailing: String },

    /// An operation id or log line that cannot be queued.
    #[error("invalid operation at {location}: {reason}")]
    InvalidOperation { location: String, reason: String },
}

impl InputError {
    /// Create an invalid-operation error.
    pub fn invalid(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOperation {
            location: location.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias for input loading.
pub type InputResult<T> = Result<T, InputError>;
