//! Crate error type.
//!
//! Missing or malformed Tekton data is never an error here: extraction yields
//! empty lists and the overlay yields `Unknown`. Errors are reserved for bad
//! host calls (positions outside the text, inconsistent parse trees) and for
//! failures of the external CLI collaborator.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("position {line}:{column} is outside the document text")]
    PositionOutOfRange { line: usize, column: usize },

    #[error("offset {offset} is outside the document text")]
    OffsetOutOfRange { offset: usize },

    #[error("malformed parse tree: {message}")]
    MalformedTree { message: String },

    #[error("failed to fetch {resource}: {message}")]
    Fetch { resource: String, message: String },
}

impl Error {
    /// Stable short code forwarded to the host alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            Error::PositionOutOfRange { .. } => "E001",
            Error::OffsetOutOfRange { .. } => "E002",
            Error::MalformedTree { .. } => "E003",
            Error::Fetch { .. } => "E004",
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedTree {
            message: message.into(),
        }
    }

    pub fn fetch(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Fetch {
            resource: resource.into(),
            message: message.into(),
        }
    }
}
