//! Error types for Kiln
//!
//! Uses `thiserror` for library errors. A build run surfaces either
//! `Compile` (the compiler rejected the input) or `Output` (the artifact
//! could not be persisted); everything else is ambient I/O and settings
//! handling.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Kiln operations
pub type KilnResult<T> = Result<T, KilnError>;

/// Main error type for Kiln operations
#[derive(Error, Debug)]
pub enum KilnError {
    /// The stylesheet compiler rejected the input. Carries the compiler's
    /// rendered diagnostics, including file and position.
    #[error("sass compilation failed: {message}")]
    Compile { message: String },

    /// The compiled artifact could not be written
    #[error("failed to write {path}: {source}")]
    Output { path: PathBuf, source: io::Error },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Invalid or unreadable settings file
    #[error("invalid settings in {file}: {message}")]
    InvalidSettings { file: PathBuf, message: String },
}

impl KilnError {
    /// True for errors raised by the compiler itself, as opposed to the
    /// machinery around it.
    pub fn is_compile_error(&self) -> bool {
        matches!(self, KilnError::Compile { .. })
    }
}
