//! File permission modes
//!
//! Modes are configured as octal strings (`"0644"`, `"755"`) and applied to
//! destination files. On platforms without Unix permission bits only the
//! read-only flag is honoured.

use std::fs;
use std::path::Path;

use crate::{Error, Result};

/// Permission bits that may be set through a mode string.
const PERMISSION_MASK: u32 = 0o7777;

/// A file permission mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileMode(u32);

impl FileMode {
    /// Mode given to downloaded files when none is configured.
    pub const DOWNLOAD_DEFAULT: FileMode = FileMode(0o664);

    pub const fn new(bits: u32) -> Self {
        Self(bits & PERMISSION_MASK)
    }

    /// Parse an octal mode string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMode`] if the string is not an unsigned octal
    /// number that fits in 32 bits.
    pub fn parse(value: &str) -> Result<Self> {
        if value.starts_with('+') {
            return Err(Error::InvalidMode {
                value: value.to_string(),
                message: "sign not allowed".into(),
            });
        }
        u32::from_str_radix(value, 8)
            .map(Self::new)
            .map_err(|e| Error::InvalidMode {
                value: value.to_string(),
                message: e.to_string(),
            })
    }

    /// Parse an optional mode string, passing `None` through.
    ///
    /// A mode of zero counts as unset, so callers fall back to their default
    /// instead of writing an unreadable file.
    pub fn parse_optional(value: Option<&str>) -> Result<Option<Self>> {
        Ok(value
            .map(Self::parse)
            .transpose()?
            .filter(|mode| mode.0 != 0))
    }

    /// Read the current mode of a file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] or [`Error::Io`] if the file cannot be
    /// stat'ed.
    pub fn of(path: &Path) -> Result<Self> {
        let meta = fs::metadata(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::from_permissions(&meta.permissions()))
    }

    /// Set this mode on an existing file.
    pub fn apply(self, path: &Path) -> Result<()> {
        let mut perms = fs::metadata(path)
            .map_err(|e| Error::io(path, e))?
            .permissions();
        self.write_to(&mut perms);
        fs::set_permissions(path, perms).map_err(|e| Error::io(path, e))
    }

    /// The raw permission bits.
    pub fn bits(self) -> u32 {
        self.0
    }

    #[cfg(unix)]
    fn from_permissions(perms: &fs::Permissions) -> Self {
        use std::os::unix::fs::PermissionsExt;
        Self::new(perms.mode())
    }

    #[cfg(not(unix))]
    fn from_permissions(perms: &fs::Permissions) -> Self {
        if perms.readonly() {
            Self(0o444)
        } else {
            Self(0o666)
        }
    }

    #[cfg(unix)]
    fn write_to(self, perms: &mut fs::Permissions) {
        use std::os::unix::fs::PermissionsExt;
        perms.set_mode(self.0);
    }

    #[cfg(not(unix))]
    fn write_to(self, perms: &mut fs::Permissions) {
        perms.set_readonly(self.0 & 0o222 == 0);
    }
}

impl std::fmt::Display for FileMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04o}", self.0)
    }
}
