#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use derive_more::{Display, From};
use goinject_core::AppError;
use std::path::PathBuf;

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// IO Error wrapper.
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),

    /// A file could not be rewritten.
    #[from(ignore)]
    #[display("{}: {error}", path.display())]
    Rewrite {
        /// The offending file.
        path: PathBuf,
        /// What went wrong.
        error: AppError,
    },

    /// Directory traversal failure.
    #[display("Walk Error: {}", _0)]
    Walk(walkdir::Error),

    /// Report serialization failure.
    #[display("Report Error: {}", _0)]
    Report(serde_json::Error),

    /// General failure message.
    #[display("Operation failed: {}", _0)]
    General(String),
}

/// Manual implementation of the standard Error trait.
///
/// `General(String)` holds a plain `String`, so `source()` is left at its default.
impl std::error::Error for CliError {}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;
