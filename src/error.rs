//! Error types for linecmd
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using LineCmdError
pub type Result<T> = std::result::Result<T, LineCmdError>;

/// Unified error type for linecmd operations
#[derive(Debug, Error)]
pub enum LineCmdError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Journal Errors
    // -------------------------------------------------------------------------
    #[error("Journal corruption detected: {0}")]
    JournalCorruption(String),

    #[error("Journal write failed: {0}")]
    JournalWrite(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Catalog Errors
    // -------------------------------------------------------------------------
    #[error("database '{0}' already exists")]
    DatabaseExists(String),

    #[error("unknown database '{0}'")]
    DatabaseNotFound(String),

    #[error("unknown table '{0}'")]
    TableNotFound(String),

    #[error("text too long: {len} characters (max {max})")]
    RecordTooLong { len: usize, max: usize },

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Registry Errors
    // -------------------------------------------------------------------------
    #[error("Command already registered: {0}")]
    DuplicateCommand(String),
}

impl From<bincode::Error> for LineCmdError {
    fn from(e: bincode::Error) -> Self {
        LineCmdError::Serialization(e.to_string())
    }
}
