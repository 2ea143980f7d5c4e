//! Error types for the pbxplist library.
//!
//! Everything the library surface can fail with is a recoverable value; the
//! process is never terminated from here. The CLI turns these into messages
//! and exit codes.

use std::path::PathBuf;
use thiserror::Error;

/// A structured parse failure with enough context to render the
/// line/column/caret report produced by [`crate::output::report_parse_status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based line of the offending token.
    pub line: usize,
    /// 1-based column of the offending token.
    pub column: usize,
    /// Length of the offending token in characters (caret marker width).
    pub width: usize,
    /// What was found, e.g. `token ';'` or `end of input`.
    pub found: String,
    /// The set of tokens that would have been accepted here.
    pub expected: Vec<&'static str>,
    /// Short description of the failing stage, e.g. `parsing Xcode plist failed`.
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "line {}, column {}: {} (found {})",
            self.line, self.column, self.message, self.found
        )?;
        if !self.expected.is_empty() {
            write!(f, ", expected {}", self.expected.join(" or "))?;
        }
        Ok(())
    }
}

/// Unified error type for all pbxplist operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Input is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("Lex error: {0}")]
    Lex(Diagnostic),

    #[error("Parse error: {0}")]
    Parse(Diagnostic),

    #[error("Unsupported conversion format: {0}")]
    UnsupportedFormat(String),

    #[error("A project name is required but was neither supplied nor inferable from the path")]
    MissingProjectName,

    #[error("Not a valid 24-character global id: {0:?}")]
    InvalidGid(String),

    #[error("gid field {field} out of range: {value} (maximum {max})")]
    GidField {
        field: &'static str,
        value: i64,
        max: i64,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The diagnostic payload, for lex and parse failures.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Error::Lex(d) | Error::Parse(d) => Some(d),
            _ => None,
        }
    }
}
