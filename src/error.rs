//! Error types for document comparison.
//!
//! Every variant names the stage of the run it came from so a failed batch can
//! be attributed to the step that failed.

use std::path::PathBuf;

/// Result type alias for comparison operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure raised by a [`DocumentLoader`](crate::document::DocumentLoader).
#[derive(Debug, thiserror::Error)]
pub enum DocumentLoadError {
    #[error("cannot read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse document: {0}")]
    Parse(#[from] serde_json::Error),

    /// Document parsed but its content is unusable
    #[error("invalid document: {0}")]
    Invalid(String),
}

/// Errors that can end a comparison run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A document could not be loaded
    #[error("failed to load {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: DocumentLoadError,
    },

    /// A page carries tokens the aligner cannot work with.
    /// Raised per page; the pipeline skips the page and keeps going.
    #[error("malformed input on page {page}: {reason}")]
    MalformedInput { page: usize, reason: String },

    #[error("annotation failed: {0}")]
    Annotate(String),

    #[error("rendering failed: {0}")]
    Render(String),

    #[error("composition failed: {0}")]
    Compose(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    /// The output directory or a file in it could not be written
    #[error("cannot write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Name of the stage that produced this error.
    pub fn stage(&self) -> &'static str {
        match self {
            Error::Load { .. } => "load",
            Error::MalformedInput { .. } => "align",
            Error::Annotate(_) => "annotate",
            Error::Render(_) => "render",
            Error::Compose(_) | Error::Json(_) => "compose",
            Error::Output { .. } => "output",
            Error::Config(_) => "config",
        }
    }
}
