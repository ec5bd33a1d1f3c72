//! Error types for sf-core

use thiserror::Error;

/// Core error type for Schemaflow
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Invalid or incomplete configuration
    #[error("[E001] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E002: A template variable override is not `KEY=VALUE`
    #[error("[E002] Invalid variable '{raw}': expected KEY=VALUE")]
    InvalidVariable { raw: String },

    /// E003: A directory that the command requires does not exist
    #[error("[E003] Directory not found: {path}")]
    DirectoryNotFound { path: String },

    /// E004: A configured directory path points at something else
    #[error("[E004] Not a directory: {path}")]
    NotADirectory { path: String },

    /// E005: Script bytes are not valid UTF-8 and cannot be rendered
    #[error("[E005] Script '{name}' is not valid UTF-8: {details}")]
    ScriptEncoding { name: String, details: String },

    /// E006: An applied script was modified after it was recorded
    #[error(
        "[E006] Checksum mismatch for applied migration '{script}': recorded {recorded}, \
         found {current}. Migration files must not be modified after being applied"
    )]
    ChecksumMismatch {
        script: String,
        recorded: String,
        current: String,
    },

    /// E007: IO error
    #[error("[E007] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E008: IO error with file path context
    #[error("[E008] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
