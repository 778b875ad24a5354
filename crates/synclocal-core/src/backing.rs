//! Operations on the file behind a resource identity
//!
//! Both resource kinds store their destination path as a [`ResourceId`];
//! reading and deleting go through here.

use std::fs;
use tracing::info;

use synclocal_fs::{ResourceId, compute_file_checksum, io};

use crate::Result;

/// Fingerprint the backing file, or `None` if it no longer exists.
///
/// # Errors
///
/// Returns an error if the identity cannot be decoded or the file exists but
/// cannot be read.
pub fn fingerprint(id: &ResourceId) -> Result<Option<String>> {
    let path = id.to_file()?;
    match compute_file_checksum(&path.to_native()) {
        Ok(sha) => Ok(Some(sha)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Whether the backing file exists.
///
/// # Errors
///
/// Returns an error if the identity cannot be decoded or the file cannot be
/// stat'ed for a reason other than being absent.
pub fn exists(id: &ResourceId) -> Result<bool> {
    let path = id.to_file()?.to_native();
    match fs::metadata(&path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(synclocal_fs::Error::io(&path, e).into()),
    }
}

/// Remove the backing file. A file that is already gone counts as deleted.
pub fn delete(id: &ResourceId) -> Result<()> {
    let path = id.to_file()?.to_native();
    if io::remove_file_if_exists(&path)? {
        info!(path = %path.display(), "Removed file");
    }
    Ok(())
}
