//! URL canonicalization for bookmark de-duplication.
//!
//! Two URLs that differ only in host case, a default port, trailing path
//! slashes or a fragment canonicalize to the same string. The query string
//! is kept as parsed.

use url::Url;

use crate::types::errors::UrlError;

/// Computes the canonical form of `raw`.
///
/// # Errors
/// `UrlError::InvalidInput` for empty input, `UrlError::Malformed` when the
/// URL cannot be parsed or lacks a scheme or host.
pub fn canonicalize_url(raw: &str) -> Result<String, UrlError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::InvalidInput("url is required".to_string()));
    }

    let parsed = Url::parse(trimmed)
        .map_err(|e| UrlError::Malformed(format!("{}: {}", trimmed, e)))?;

    let host = match parsed.host_str() {
        Some(h) if !h.is_empty() => h.to_lowercase(),
        _ => {
            return Err(UrlError::Malformed(format!(
                "{}: url must include scheme and host",
                trimmed
            )))
        }
    };

    let scheme = parsed.scheme();
    let mut canonical = String::with_capacity(trimmed.len());
    canonical.push_str(scheme);
    canonical.push_str("://");

    if !parsed.username().is_empty() {
        canonical.push_str(parsed.username());
        if let Some(password) = parsed.password() {
            canonical.push(':');
            canonical.push_str(password);
        }
        canonical.push('@');
    }

    canonical.push_str(&host);
    if let Some(port) = parsed.port() {
        if !is_default_port(scheme, port) {
            canonical.push(':');
            canonical.push_str(&port.to_string());
        }
    }

    canonical.push_str(parsed.path().trim_end_matches('/'));

    if let Some(query) = parsed.query() {
        canonical.push('?');
        canonical.push_str(query);
    }

    Ok(canonical)
}

fn is_default_port(scheme: &str, port: u16) -> bool {
    matches!((scheme, port), ("http", 80) | ("https", 443))
}
