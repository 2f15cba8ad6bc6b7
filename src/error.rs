//! Error types for the sempdf library.

use std::io;
use thiserror::Error;

/// Result type alias for sempdf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during extraction.
///
/// Only `Parse`, `Io` and `Cancelled` abort a run. Recoverable
/// conditions (empty input, degenerate geometry, a failed semantic
/// module) are reported as diagnostics to the pipeline observer and
/// never surface here.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The producer cannot decode the PDF.
    #[error("PDF parsing error: {reason}")]
    Parse {
        /// Description of what could not be decoded.
        reason: String,
    },

    /// The document uses a feature the producer does not support.
    #[error("Unsupported feature: {what}")]
    UnsupportedFeature {
        /// The unsupported feature (e.g. "encrypted document").
        what: String,
    },

    /// The run was cancelled via the cancellation token.
    #[error("Extraction was cancelled")]
    Cancelled,

    /// Error while serializing the document.
    #[error("Serialization error: {0}")]
    Serialize(String),
}

impl Error {
    /// Create a parse error with the given reason.
    pub fn parse(reason: impl Into<String>) -> Self {
        Error::Parse {
            reason: reason.into(),
        }
    }

    /// Create an unsupported-feature error.
    pub fn unsupported(what: impl Into<String>) -> Self {
        Error::UnsupportedFeature { what: what.into() }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::UnsupportedFeature {
                what: "encrypted document".to_string(),
            },
            _ => Error::Parse {
                reason: err.to_string(),
            },
        }
    }
}
