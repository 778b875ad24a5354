//! Error types for synclocal-cli

use std::path::PathBuf;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] synclocal_core::Error),

    #[error(transparent)]
    Fs(#[from] synclocal_fs::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The manifest parsed but declares resources that cannot be synced
    #[error("Invalid manifest {}: {message}", path.display())]
    InvalidManifest { path: PathBuf, message: String },

    /// One or more resources failed; each was already reported on stderr
    #[error("{count} {} failed", resource_noun(.count))]
    ResourcesFailed { count: usize },
}

impl CliError {
    pub fn invalid_manifest(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidManifest {
            path: path.into(),
            message: message.into(),
        }
    }
}

fn resource_noun(count: &usize) -> &'static str {
    if *count == 1 { "resource" } else { "resources" }
}
