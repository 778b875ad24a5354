//! Request construction
//!
//! Builds the GET/HEAD request for a URL target: custom headers first, then
//! one conditional header derived from the cached metadata.

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, IF_MODIFIED_SINCE, IF_NONE_MATCH};
use reqwest::Method;
use url::Url;

use super::{CachedMetadata, UrlTarget};
use crate::{Error, Result};

/// Parse and validate the target URL.
pub(crate) fn parse_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw).map_err(|e| Error::InvalidRequest {
        url: raw.to_string(),
        message: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::InvalidRequest {
            url: raw.to_string(),
            message: format!("unsupported scheme {other:?}"),
        }),
    }
}

/// The headers to send: configured headers plus the conditional header.
///
/// `If-None-Match` is used when an entity tag is cached, otherwise
/// `If-Modified-Since` when a last-modified time is cached.
pub(crate) fn request_headers(target: &UrlTarget, cached: &CachedMetadata) -> Result<HeaderMap> {
    let invalid = |message: String| Error::InvalidRequest {
        url: target.url.clone(),
        message,
    };

    let mut headers = HeaderMap::new();
    for (key, value) in &target.headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| invalid(format!("invalid header name {key:?}: {e}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| invalid(format!("invalid value for header {key:?}: {e}")))?;
        headers.insert(name, value);
    }

    let conditional = match (cached.etag(), cached.last_modified()) {
        (Some(etag), _) => Some((IF_NONE_MATCH, etag)),
        (None, Some(modified)) => Some((IF_MODIFIED_SINCE, modified)),
        (None, None) => None,
    };
    if let Some((name, value)) = conditional {
        let value = HeaderValue::from_str(value)
            .map_err(|e| invalid(format!("invalid cached {name} {value:?}: {e}")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// Build a request without sending it.
pub(crate) fn build(
    client: &Client,
    method: Method,
    target: &UrlTarget,
    cached: &CachedMetadata,
) -> Result<RequestBuilder> {
    let url = parse_url(&target.url)?;
    let headers = request_headers(target, cached)?;
    Ok(client.request(method, url).headers(headers))
}
