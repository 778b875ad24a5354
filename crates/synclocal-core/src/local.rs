//! Local Copy Engine
//!
//! Keeps a destination file identical to a local source file. Content is
//! compared by fingerprint so an unchanged pair costs two hashes and no
//! copy; permission bits are reconciled separately.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::PathBuf;
use tracing::{debug, info};

use synclocal_fs::{FileMode, compute_file_checksum, io};

use crate::Result;

/// Configuration of a local file resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileTarget {
    /// File to copy from
    pub source: PathBuf,
    /// File to copy to
    pub destination: PathBuf,
    /// Octal permission string; the source's mode is mirrored when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_mode: Option<String>,
}

impl FileTarget {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            file_mode: None,
        }
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.file_mode = Some(mode.into());
        self
    }
}

/// What [`LocalCopyEngine::ensure_copy`] did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOutcome {
    /// Fingerprint of the destination after the operation
    pub content_sha256: String,
    /// Whether bytes were copied
    pub copied: bool,
    /// Whether permission bits were changed without copying
    pub mode_changed: bool,
}

/// Synchronizes a destination file from a local source file.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalCopyEngine;

impl LocalCopyEngine {
    pub fn new() -> Self {
        Self
    }

    /// Make the destination a copy of the source.
    ///
    /// When the fingerprints already match only the permission bits are
    /// reconciled. Otherwise the source is streamed into a created or
    /// truncated destination; a failed copy leaves no destination behind.
    ///
    /// # Errors
    ///
    /// - `InvalidMode` if `file_mode` is set and not octal, before any I/O
    /// - `NotFound` if the source does not exist
    /// - `Io`/`Copy` if reading, writing or changing permissions fails
    pub fn ensure_copy(&self, target: &FileTarget) -> Result<CopyOutcome> {
        let mode = FileMode::parse_optional(target.file_mode.as_deref())?;

        let source_sha = compute_file_checksum(&target.source)?;
        let dest_sha = match compute_file_checksum(&target.destination) {
            Ok(sha) => Some(sha),
            Err(e) => {
                debug!(path = %target.destination.display(), error = %e, "Destination not hashable, copying");
                None
            }
        };

        if dest_sha.as_deref() == Some(source_sha.as_str()) {
            debug!(path = %target.destination.display(), "Content matches, skipping copy");
            let mode_changed = self.reconcile_mode(target, mode)?;
            return Ok(CopyOutcome {
                content_sha256: source_sha,
                copied: false,
                mode_changed,
            });
        }

        let mut source =
            File::open(&target.source).map_err(|e| synclocal_fs::Error::io(&target.source, e))?;
        let mode = match mode {
            Some(mode) => mode,
            None => FileMode::of(&target.source)?,
        };
        let bytes = io::write_stream(&target.destination, &mut source, mode)?;

        info!(
            source = %target.source.display(),
            destination = %target.destination.display(),
            bytes,
            mode = %mode,
            "Copied file"
        );
        Ok(CopyOutcome {
            content_sha256: source_sha,
            copied: true,
            mode_changed: false,
        })
    }

    /// Bring the destination's permission bits in line with the desired mode.
    ///
    /// Returns `true` if the mode was changed.
    pub fn ensure_mode(&self, target: &FileTarget) -> Result<bool> {
        let mode = FileMode::parse_optional(target.file_mode.as_deref())?;
        self.reconcile_mode(target, mode)
    }

    fn reconcile_mode(&self, target: &FileTarget, mode: Option<FileMode>) -> Result<bool> {
        let current = FileMode::of(&target.destination)?;
        let desired = match mode {
            Some(mode) => mode,
            None => FileMode::of(&target.source)?,
        };
        if current == desired {
            return Ok(false);
        }
        desired.apply(&target.destination)?;
        info!(path = %target.destination.display(), from = %current, to = %desired, "Changed file mode");
        Ok(true)
    }

    /// Drift check: whether the destination differs from the source.
    ///
    /// A missing destination counts as drift.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the source does not exist.
    pub fn needs_copy(&self, target: &FileTarget) -> Result<bool> {
        let source_sha = compute_file_checksum(&target.source)?;
        match compute_file_checksum(&target.destination) {
            Ok(dest_sha) => Ok(dest_sha != source_sha),
            Err(e) if e.is_not_found() => Ok(true),
            Err(e) => Err(e.into()),
        }
    }
}
