//! Application error types.
//!
//! Provides unified error handling with actionable context for debugging.
//! `DocumentRead`, `Classification`, `PlaylistCreationFailed` and `Aborted`
//! stop a run. Errors raised while resolving or attaching a single item are
//! captured into the outcome log instead.

use std::path::PathBuf;
use thiserror::Error;

/// Application result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types with specific context for actionable debugging
#[derive(Debug, Error)]
pub enum Error {
    /// Network error (connection, timeout, DNS)
    #[error("Network error: {0}")]
    Network(String),

    /// The planning document could not be opened or parsed
    #[error("Could not read document {path:?}: {message}")]
    DocumentRead {
        /// Document path, if the failure is tied to a file.
        path: Option<PathBuf>,
        /// Description of the read failure.
        message: String,
    },

    /// Song extraction produced no usable answer
    #[error("Classification failed: {0}")]
    Classification(String),

    /// Scripture text could not be fetched for a reference
    #[error("Could not fetch {reference}: {message}")]
    FetchFailed {
        /// Reference that was requested (e.g. "Psalm 23").
        reference: String,
        /// Description of the failure.
        message: String,
    },

    /// `ProPresenter` API error with status context
    #[error("ProPresenter API error: {message}")]
    ProPresenter {
        /// Human-readable error description.
        message: String,
        /// HTTP status code, if from an HTTP response.
        status: Option<u16>,
        /// Actionable suggestion for resolving the error.
        hint: Option<&'static str>,
    },

    /// The target playlist could not be created, so nothing was added
    #[error("Playlist creation failed: {0}")]
    PlaylistCreationFailed(String),

    /// Configuration error with guidance
    #[error("Configuration error: {message}. {hint}")]
    Config {
        /// Description of the configuration problem.
        message: String,
        /// Actionable guidance for fixing the issue.
        hint: &'static str,
    },

    /// Response or file parsing error
    #[error("Parse error in {file:?}: {message}")]
    Parse {
        /// File that failed to parse, if known.
        file: Option<PathBuf>,
        /// Description of the parse failure.
        message: String,
    },

    /// The run was cancelled while waiting for the operator
    #[error("Run aborted before playlist assembly")]
    Aborted,
}

impl Error {
    /// Create a document read error
    pub fn document(message: impl Into<String>, path: impl Into<Option<PathBuf>>) -> Self {
        Self::DocumentRead { path: path.into(), message: message.into() }
    }

    /// Create a classification error
    pub fn classification(message: impl Into<String>) -> Self {
        Self::Classification(message.into())
    }

    /// Create a scripture fetch error
    pub fn fetch(reference: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FetchFailed { reference: reference.into(), message: message.into() }
    }

    /// Create a `ProPresenter` error without status
    pub fn propresenter(message: impl Into<String>) -> Self {
        Self::ProPresenter {
            message: message.into(),
            status: None,
            hint: None,
        }
    }

    /// Create a `ProPresenter` error with HTTP status
    pub fn api_status(message: impl Into<String>, status: u16) -> Self {
        let hint = match status {
            401 | 403 => Some("Check that the ProPresenter network API allows control access"),
            404 => Some("The endpoint was not found - check PROPRESENTER_URL and the ProPresenter version"),
            409 => Some("A resource with this name may already exist"),
            500..=599 => Some("ProPresenter reported an internal error - check the application log"),
            _ => None,
        };
        Self::ProPresenter {
            message: message.into(),
            status: Some(status),
            hint,
        }
    }

    /// Create a config error with actionable hint
    pub fn config(message: impl Into<String>, hint: &'static str) -> Self {
        Self::Config { message: message.into(), hint }
    }

    /// Create a parse error with file context
    pub fn parse(message: impl Into<String>, file: impl Into<Option<PathBuf>>) -> Self {
        Self::Parse { file: file.into(), message: message.into() }
    }

    /// One-line diagnostic for the outcome log, including any hint.
    pub fn diagnostic(&self) -> String {
        match self {
            Self::ProPresenter { hint: Some(hint), .. } => format!("{self} ({hint})"),
            _ => self.to_string(),
        }
    }
}
