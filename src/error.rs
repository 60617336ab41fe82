//! Error types for the batch renamer.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the batch renamer.
#[derive(Error, Debug)]
pub enum Error {
    // Planning errors
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    // Conversion errors
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    // Undo errors
    #[error("Nothing to undo")]
    EmptyUndoStack,

    #[error("Undo target no longer exists: {0}")]
    UndoEntryMissing(String),

    // File system errors
    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    // Plan errors
    #[error("Invalid plan file: {0}")]
    InvalidPlanFile(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // JSON errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Settings errors
    #[error("Settings parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Settings write error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    // Generic errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a generic error from a string.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }
}

/// Errors raised while parsing a naming template.
///
/// All of these are detected before any file is touched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template is empty")]
    Empty,

    #[error("unknown placeholder '{{{0}}}'")]
    UnknownKey(String),

    #[error("unmatched '{brace}' at byte {position}")]
    UnbalancedBrace { brace: char, position: usize },

    #[error("invalid format spec '{spec}' for '{{{key}}}'")]
    InvalidSpec { key: String, spec: String },

    #[error("'{{{key}}}' is text and cannot use the numeric 'd' format")]
    NumericSpecOnText { key: String },

    #[error("template must produce a bare file name, found '{0}'")]
    PathSeparator(char),

    #[error("template expands to an unusable name for {0}")]
    EmptyName(String),
}

/// Category of image conversion failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionErrorKind {
    DecodeFailure,
    EncodeFailure,
    UnsupportedFormat,
}

impl std::fmt::Display for ConversionErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ConversionErrorKind::DecodeFailure => "decode failed",
            ConversionErrorKind::EncodeFailure => "encode failed",
            ConversionErrorKind::UnsupportedFormat => "unsupported format",
        };
        f.write_str(label)
    }
}

/// A single file's conversion failure. Never fatal to the batch.
#[derive(Error, Debug)]
#[error("{kind} for {}: {message}", path.display())]
pub struct ConversionError {
    pub kind: ConversionErrorKind,
    pub path: PathBuf,
    pub message: String,
}

impl ConversionError {
    pub fn new(kind: ConversionErrorKind, path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.to_string(),
        }
    }
}
