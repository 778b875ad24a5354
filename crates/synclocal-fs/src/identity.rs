//! Resource identities
//!
//! A resource is identified by the absolute path of the file it manages,
//! serialized as a `file://` URI. The identity is opaque to callers; the
//! only supported operations are encoding a path and decoding it back.

use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

use crate::{Error, NormalizedPath, Result};

/// Opaque identity of a synchronized file (`file:///abs/path`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(String);

impl ResourceId {
    /// Encode a path as a resource identity.
    ///
    /// The path is resolved to its absolute, slash-normalized form first, so
    /// `./dest.txt` and `/cwd/dest.txt` produce the same identity.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PathResolution`] if the path cannot be made absolute.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let abs = NormalizedPath::absolute(path.as_ref())?;
        let url = Url::from_file_path(abs.to_native()).map_err(|()| Error::PathResolution {
            path: abs.to_native(),
            message: "path cannot be expressed as a file URI".into(),
        })?;
        Ok(Self(url.into()))
    }

    /// Decode the identity back into the absolute path it was created from.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidId`] if the identity is not a URI or does not name a
    ///   local file
    /// - [`Error::InvalidScheme`] if the URI scheme is not `file`
    pub fn to_file(&self) -> Result<NormalizedPath> {
        let url = Url::parse(&self.0).map_err(|e| Error::InvalidId {
            id: self.0.clone(),
            message: e.to_string(),
        })?;
        if url.scheme() != "file" {
            return Err(Error::InvalidScheme {
                scheme: url.scheme().to_string(),
            });
        }
        let path = url.to_file_path().map_err(|()| Error::InvalidId {
            id: self.0.clone(),
            message: "URI does not name a local file".into(),
        })?;
        NormalizedPath::absolute(path)
    }

    /// The identity as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ResourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ResourceId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
