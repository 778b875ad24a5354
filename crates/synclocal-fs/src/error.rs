//! Error types for synclocal-fs

use std::path::PathBuf;

/// Result type for synclocal-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in synclocal-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error copying into {path}: {source}")]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file_mode is not a valid octal number: {value:?}")]
    InvalidMode { value: String, message: String },

    #[error("Could not resolve {path} to an absolute path: {message}")]
    PathResolution { path: PathBuf, message: String },

    #[error("Invalid id format {id:?}: {message}")]
    InvalidId { id: String, message: String },

    #[error("Invalid id scheme {scheme:?}, should be 'file'")]
    InvalidScheme { scheme: String },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Failed to serialize {format} config for {path}: {message}")]
    ConfigSerialize {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    /// Wrap an I/O error with the path it occurred at.
    ///
    /// `NotFound` I/O errors are promoted to [`Error::NotFound`] so callers
    /// can treat missing files separately from other failures.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return Self::NotFound { path };
        }
        Self::Io { path, source }
    }

    /// Whether this error means the file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
