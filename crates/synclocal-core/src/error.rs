//! Error types for synclocal-core

use crate::diagnostics::Diagnostic;

/// Result type for synclocal-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Summary attached to the warning emitted when an error response body
/// cannot be read.
pub const BODY_READ_WARNING: &str = "could not read response body";

/// Details of a non-success HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpFailure {
    /// Numeric status code
    pub status: u16,
    /// Status code and reason phrase, e.g. `404 Not Found`
    pub status_line: String,
    /// Response body, captured only for textual content types
    pub detail: Option<String>,
    /// Why the response body could not be read, if it could not
    pub body_warning: Option<String>,
}

/// Errors that can occur in synclocal-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The configured URL or headers cannot form an HTTP request
    #[error("Invalid request to {url:?}: {message}")]
    InvalidRequest { url: String, message: String },

    /// The HTTP client could not be constructed
    #[error("Could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request failed before a response was received
    #[error("error making request to {url:?}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// 401 Unauthorized
    #[error(
        "this url requires authorization (not authorized). You may need to add an Authorization header to this resource"
    )]
    AuthRequired(HttpFailure),

    /// 403 Forbidden
    #[error(
        "the server rejected your auth credentials (forbidden). They may be expired or you may not be allowed to download this anymore"
    )]
    AuthRejected(HttpFailure),

    /// Any other status the engine does not handle
    #[error("the server returned an unexpected response code: {}", .0.status_line)]
    UnexpectedResponse(HttpFailure),

    /// Error in state file operations
    #[error("State error: {message}")]
    State { message: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from synclocal-fs
    #[error(transparent)]
    Fs(#[from] synclocal_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error means a file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Fs(e) if e.is_not_found())
    }

    /// The HTTP response details, for errors caused by a response status.
    pub fn http_failure(&self) -> Option<&HttpFailure> {
        match self {
            Self::AuthRequired(f) | Self::AuthRejected(f) | Self::UnexpectedResponse(f) => Some(f),
            _ => None,
        }
    }

    /// Convert into diagnostics for the caller.
    ///
    /// A failed body read contributes a warning ahead of the error; it never
    /// replaces it.
    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        let mut diags = Vec::new();
        let mut detail = None;
        if let Some(failure) = self.http_failure() {
            if let Some(warning) = &failure.body_warning {
                diags.push(Diagnostic::warning(BODY_READ_WARNING).with_detail(warning.clone()));
            }
            detail = failure.detail.clone();
        }
        let mut error = Diagnostic::error(self.to_string());
        if let Some(detail) = detail {
            error = error.with_detail(detail);
        }
        diags.push(error);
        diags
    }
}
