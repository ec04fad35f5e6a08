//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while parsing a job log
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("not enough columns in {kind} record: expected at least {expected}, found {found}")]
    TooFewColumns {
        kind: &'static str,
        expected: usize,
        found: usize,
    },

    #[error(
        "record for module \"{name}\" of type \"{module_type}\" does not match \
         existing entry \"{existing_name}\" of type \"{existing_type}\""
    )]
    ModuleIdentityMismatch {
        name: String,
        module_type: String,
        existing_name: String,
        existing_type: String,
    },

    #[error("invalid numeric value for {field}: \"{value}\"")]
    InvalidNumber { field: &'static str, value: String },

    #[error("failed to read input line: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors that can occur while writing CSV tables
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}

/// Errors that can occur while saving or loading a model archive
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to serialize archive: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Unsupported archive version: found {found}, expected {expected}")]
    VersionMismatch { found: String, expected: String },
}
