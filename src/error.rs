//! Error types for rust-sqlrewriter

use std::path::PathBuf;
use thiserror::Error;

use crate::templating::TemplateError;

/// Errors that stop a rewrite.
///
/// Malformed input scripts are *not* reported through this type: top-level
/// parse errors come back as formatted strings in
/// [`RewriteResult::errors`](crate::rewriter::RewriteResult). The variants
/// below are the hard failures.
#[derive(Error, Debug)]
pub enum RewriteError {
    #[error("Found errors in conditional comment '{comment}': {message}")]
    ConditionalCommentDelimiters { comment: String, message: String },

    #[error("Failed to expand conditional comment '{comment}'")]
    Template {
        comment: String,
        #[source]
        source: TemplateError,
    },

    #[error("Failed to read SQL file: {path}")]
    ScriptRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid template environment: {message}")]
    InvalidEnvironment { message: String },

    #[error("Unknown compatibility level: {value} (expected one of Sql100 .. Sql160)")]
    InvalidCompatibilityLevel { value: String },
}
