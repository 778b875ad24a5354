//! Remote Fetch Engine
//!
//! Downloads a URL to a destination file. Requests are conditional on the
//! entity tag or last-modified time from the previous download, so an
//! unchanged resource costs one round trip and no body transfer.
//!
//! The client is blocking and has no request timeout or retry policy.

pub mod media;
mod request;

use reqwest::Method;
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use reqwest::header::{CONTENT_TYPE, ETAG, HeaderMap, HeaderName, LAST_MODIFIED};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use synclocal_fs::{FileMode, HashingReader, io};

use crate::error::HttpFailure;
use crate::{Error, Result};

/// Configuration of a URL resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlTarget {
    /// HTTP(S) URL to download
    pub url: String,
    /// Extra request headers, one value per name
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    /// Destination file
    pub filename: PathBuf,
    /// Octal permission string; `0664` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_mode: Option<String>,
}

impl UrlTarget {
    pub fn new(url: impl Into<String>, filename: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
            filename: filename.into(),
            file_mode: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_mode(mut self, mode: impl Into<String>) -> Self {
        self.file_mode = Some(mode.into());
        self
    }

    /// The mode downloads are written with.
    pub fn resolved_mode(&self) -> Result<FileMode> {
        Ok(FileMode::parse_optional(self.file_mode.as_deref())?.unwrap_or(FileMode::DOWNLOAD_DEFAULT))
    }
}

/// Validators from the last successful download.
///
/// Empty values are stored as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedMetadata {
    etag: Option<String>,
    last_modified: Option<String>,
}

impl CachedMetadata {
    pub fn new(etag: Option<String>, last_modified: Option<String>) -> Self {
        Self {
            etag: etag.filter(|s| !s.is_empty()),
            last_modified: last_modified.filter(|s| !s.is_empty()),
        }
    }

    fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Self::new(get(ETAG), get(LAST_MODIFIED))
    }

    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref()
    }

    pub fn last_modified(&self) -> Option<&str> {
        self.last_modified.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.etag.is_none() && self.last_modified.is_none()
    }
}

/// Result of a conditional download
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// 304: the destination and metadata are left as they were
    NotModified,
    /// 200: the body was written to the destination
    Downloaded {
        metadata: CachedMetadata,
        content_sha256: String,
        bytes: u64,
    },
}

/// Result of a HEAD probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// 304: a download would not change anything
    Unchanged,
    /// 200: the server has a representation that differs from the cached one
    Changed { metadata: CachedMetadata },
}

/// Synchronizes a destination file from an HTTP(S) URL.
#[derive(Debug, Clone)]
pub struct RemoteFetchEngine {
    client: Client,
}

impl RemoteFetchEngine {
    /// Create an engine with a default blocking client.
    pub fn new() -> Result<Self> {
        let client = Client::builder().build().map_err(Error::Client)?;
        Ok(Self { client })
    }

    /// Create an engine around an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Download the target if it changed since `cached` was recorded.
    ///
    /// The body is streamed to the destination and fingerprinted in the same
    /// pass. Nothing is written unless the server answers 200.
    ///
    /// # Errors
    ///
    /// - `InvalidMode` for a bad `file_mode`, before any request
    /// - `InvalidRequest` for a malformed URL or header
    /// - `Transport` if no response arrives
    /// - `AuthRequired`, `AuthRejected` or `UnexpectedResponse` for any
    ///   status other than 200 and 304
    /// - `Copy`/`Io` if the body cannot be written; the destination is
    ///   removed
    pub fn fetch(&self, target: &UrlTarget, cached: &CachedMetadata) -> Result<FetchOutcome> {
        let mode = target.resolved_mode()?;
        let response = self.send(Method::GET, target, cached)?;

        match response.status() {
            StatusCode::NOT_MODIFIED => {
                debug!(url = %target.url, "Not modified, skipping download");
                Ok(FetchOutcome::NotModified)
            }
            StatusCode::OK => {
                let metadata = CachedMetadata::from_headers(response.headers());
                let mut body = HashingReader::new(response);
                let bytes = io::write_stream(&target.filename, &mut body, mode)?;
                let content_sha256 = body.finalize();

                info!(
                    url = %target.url,
                    destination = %target.filename.display(),
                    bytes,
                    "Downloaded file"
                );
                Ok(FetchOutcome::Downloaded {
                    metadata,
                    content_sha256,
                    bytes,
                })
            }
            _ => Err(classify_failure(response)),
        }
    }

    /// Ask the server whether the target changed, without a body.
    ///
    /// Sends HEAD with the same headers a [`fetch`](Self::fetch) would send.
    pub fn probe(&self, target: &UrlTarget, cached: &CachedMetadata) -> Result<ProbeOutcome> {
        let response = self.send(Method::HEAD, target, cached)?;
        match response.status() {
            StatusCode::NOT_MODIFIED => Ok(ProbeOutcome::Unchanged),
            StatusCode::OK => Ok(ProbeOutcome::Changed {
                metadata: CachedMetadata::from_headers(response.headers()),
            }),
            _ => Err(classify_failure(response)),
        }
    }

    fn send(&self, method: Method, target: &UrlTarget, cached: &CachedMetadata) -> Result<Response> {
        let request = request::build(&self.client, method, target, cached)?;
        debug!(url = %target.url, etag = ?cached.etag(), last_modified = ?cached.last_modified(), "Sending request");
        request.send().map_err(|source| Error::Transport {
            url: target.url.clone(),
            source,
        })
    }
}

/// Turn a non-success response into an error.
///
/// The body is kept as detail only for textual content types. A body that
/// cannot be read is recorded as a warning on the returned error.
fn classify_failure(response: Response) -> Error {
    let status = response.status();
    let textual = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(media::is_textual);

    let mut failure = HttpFailure {
        status: status.as_u16(),
        status_line: status.to_string(),
        detail: None,
        body_warning: None,
    };
    if textual {
        match response.text() {
            Ok(text) => failure.detail = Some(text).filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(status = %status, error = %e, "Could not read response body");
                failure.body_warning = Some(e.to_string());
            }
        }
    }

    match status {
        StatusCode::UNAUTHORIZED => Error::AuthRequired(failure),
        StatusCode::FORBIDDEN => Error::AuthRejected(failure),
        _ => Error::UnexpectedResponse(failure),
    }
}
