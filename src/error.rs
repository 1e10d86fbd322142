//! Error types for the Pinpoint bootstrap.
//!
//! Uses thiserror for derive macros. None of these errors ever reach the host
//! application: [`Starter::start`](crate::starter::Starter::start) collapses
//! them into a `false` return after logging each at its own level.

use std::path::PathBuf;
use thiserror::Error;
use tracing::Level;

/// Main error type for bootstrap operations.
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// An expected property was absent or blank.
    #[error("property -D{0} is not set")]
    MissingProperty(String),

    /// A value was rejected by the identifier policy.
    #[error(
        "invalid id {key}={value:?} ({reason}): only [a-zA-Z0-9], '.', '-', '_' are allowed, max length {max_length}"
    )]
    InvalidId {
        key: String,
        value: String,
        reason: crate::id_format::IdRejection,
        max_length: usize,
    },

    /// No configuration file could be located.
    #[error("{} file not found", crate::product::CONFIG_FILE_NAME)]
    MissingConfig,

    /// The local host name could not be resolved.
    #[error("host name lookup failed: {0}")]
    HostLookupFailed(String),

    /// A filesystem operation failed.
    #[error("failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file could not be parsed.
    #[error("failed to parse config '{}' line {line}: {message}", path.display())]
    ConfigParse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Any uncategorized failure raised by a collaborator.
    #[error("{context}: {source:#}")]
    Unexpected {
        context: String,
        #[source]
        source: anyhow::Error,
    },
}

impl BootstrapError {
    /// Wraps a collaborator failure with a short description of the step.
    pub fn unexpected(context: impl Into<String>, source: anyhow::Error) -> Self {
        BootstrapError::Unexpected {
            context: context.into(),
            source,
        }
    }

    /// Returns the level this error is logged at when bootstrap gives up.
    pub fn level(&self) -> Level {
        match self {
            BootstrapError::MissingConfig => Level::INFO,
            BootstrapError::HostLookupFailed(_) => Level::DEBUG,
            BootstrapError::Io { .. } => Level::WARN,
            BootstrapError::MissingProperty(_) => Level::WARN,
            BootstrapError::InvalidId { .. } => Level::WARN,
            BootstrapError::ConfigParse { .. } => Level::WARN,
            BootstrapError::Unexpected { .. } => Level::WARN,
        }
    }
}

/// Result type alias for bootstrap operations.
pub type Result<T> = std::result::Result<T, BootstrapError>;
