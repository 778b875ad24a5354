//! Safe write operations
//!
//! Destination files are written in place (create or truncate) through a
//! guard that removes the file again if anything fails before the write is
//! complete. State files are written atomically with an advisory lock.

use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::{debug, warn};

use crate::{Error, FileMode, NormalizedPath, Result};

/// A destination file that is deleted on drop unless [`finish`] succeeds.
///
/// [`finish`]: PartialFile::finish
struct PartialFile<'a> {
    path: &'a Path,
    file: Option<File>,
    committed: bool,
}

impl<'a> PartialFile<'a> {
    fn create(path: &'a Path, mode: FileMode) -> Result<Self> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(mode.bits());
        }
        #[cfg(not(unix))]
        let _ = mode;

        let file = options.open(path).map_err(|e| Error::io(path, e))?;
        Ok(Self {
            path,
            file: Some(file),
            committed: false,
        })
    }

    fn file(&mut self) -> io::Result<&mut File> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("destination already closed"))
    }

    /// Flush to disk and close, keeping the file.
    fn finish(mut self) -> Result<()> {
        if let Some(file) = self.file.take() {
            file.sync_all().map_err(|e| Error::Io {
                path: self.path.to_path_buf(),
                source: e,
            })?;
        }
        self.committed = true;
        Ok(())
    }
}

impl Drop for PartialFile<'_> {
    fn drop(&mut self) {
        drop(self.file.take());
        if self.committed {
            return;
        }
        if let Err(e) = fs::remove_file(self.path) {
            warn!(path = %self.path.display(), error = %e, "Failed to remove partial file");
        } else {
            debug!(path = %self.path.display(), "Removed partial file");
        }
    }
}

/// Stream `reader` into `path`, creating or truncating it with `mode`.
///
/// The mode is also applied explicitly once the content is written, since the
/// creation mode only affects new files and is filtered by the umask.
/// On any failure after the destination was opened, the destination is
/// removed before the error is returned.
///
/// Returns the number of bytes written.
///
/// # Errors
///
/// - [`Error::NotFound`]/[`Error::Io`] if the destination cannot be created
/// - [`Error::Copy`] if reading from `reader` or writing fails
pub fn write_stream<R: Read + ?Sized>(path: &Path, reader: &mut R, mode: FileMode) -> Result<u64> {
    let mut dest = PartialFile::create(path, mode)?;

    let written = dest
        .file()
        .and_then(|file| io::copy(reader, file))
        .map_err(|e| Error::Copy {
            path: path.to_path_buf(),
            source: e,
        })?;

    mode.apply(path)?;
    dest.finish()?;
    Ok(written)
}

/// Remove a file, treating an already-missing file as success.
///
/// Returns `true` if a file was removed.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be stat'ed (for any reason other
/// than not existing) or removed.
pub fn remove_file_if_exists(path: &Path) -> Result<bool> {
    match fs::metadata(path) {
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => {
            return Err(Error::Io {
                path: path.to_path_buf(),
                source: e,
            });
        }
    }
    fs::remove_file(path).map_err(|e| Error::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(true)
}

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename strategy to prevent partial writes.
/// Acquires an advisory lock to prevent concurrent access.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
    }

    // Temp file in the same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file
        .lock_exclusive()
        .map_err(|_| Error::LockFailed {
            path: native_path.clone(),
        })?;

    let written = temp_file
        .write_all(content)
        .and_then(|()| temp_file.sync_all());
    if let Err(e) = written {
        drop(temp_file);
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(&temp_path, e));
    }

    FileExt::unlock(&temp_file).map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;
    drop(temp_file);

    fs::rename(&temp_path, &native_path).map_err(|e| Error::io(&native_path, e))?;

    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}
