use std::path::PathBuf;
use thiserror::Error;

/// All errors produced while building an activity report.
///
/// Every message starts with the pipeline stage that failed (parsing,
/// rendering or writing) so the invoker can tell where the run stopped.
#[derive(Error, Debug)]
pub enum ActivityError {
    /// The chat export does not exist.
    #[error("Parsing failed: input file {0} not found")]
    InputNotFound(PathBuf),

    /// The chat export exists but could not be opened or decoded.
    #[error("Parsing failed: could not read {path}: {source}")]
    InputRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The export was read but not a single line looked like a chat message.
    #[error("Parsing failed: no chat messages found in {0} (empty file or unsupported export format)")]
    NoMatchingMessages(PathBuf),

    /// A chart could not be drawn.
    #[error("Rendering failed on page '{page}': {message}")]
    Render { page: &'static str, message: String },

    /// The PDF object tree could not be serialized.
    #[error("Writing failed: could not serialize PDF: {0}")]
    Pdf(String),

    /// The destination could not be created, written or moved into place.
    #[error("Writing failed: could not write {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The JSON summary could not be serialized.
    #[error("Writing failed: could not serialize summary: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ActivityError {
    /// Classify an I/O failure while opening the chat export.
    pub fn from_input_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            ActivityError::InputNotFound(path)
        } else {
            ActivityError::InputRead { path, source }
        }
    }
}

/// Convenience alias used throughout the activity crates.
pub type Result<T> = std::result::Result<T, ActivityError>;
