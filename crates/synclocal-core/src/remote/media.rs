//! Media type helpers for deciding whether a response body is readable text

/// Characters allowed in a media type token (RFC 2045).
fn is_token_char(c: char) -> bool {
    c.is_ascii() && !c.is_ascii_control() && !" ()<>@,;:\\\"/[]?=".contains(c)
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_token_char)
}

/// Normalize a `Content-Type` value to `type/subtype`.
///
/// Parameters are dropped, the result is lowercased and structured syntax
/// suffixes replace the subtype (`application/ld+json` becomes
/// `application/json`). Returns `None` for malformed values.
pub fn normalize_media_type(content_type: &str) -> Option<String> {
    let essence = content_type.split(';').next().unwrap_or_default();
    let mt = essence.trim().to_ascii_lowercase();

    let (kind, subtype) = mt.split_once('/')?;
    if !is_token(kind) || !is_token(subtype) {
        return None;
    }
    match subtype.rfind('+') {
        Some(plus) if plus == subtype.len() - 1 => None,
        Some(plus) => Some(format!("{kind}/{}", &subtype[plus + 1..])),
        None => Some(mt),
    }
}

/// Whether a body with this `Content-Type` should be shown to a user.
pub fn is_textual(content_type: &str) -> bool {
    let Some(mt) = normalize_media_type(content_type) else {
        return false;
    };
    mt.starts_with("text/")
        || matches!(
            mt.as_str(),
            "application/json" | "application/xml" | "application/yaml" | "application/x-yaml"
        )
}
