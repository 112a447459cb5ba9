use crate::error::ScanError;
use url::Url;

/// Validate the raw user input and normalize it into a scannable URL.
///
/// Scheme-less input gets `http://` prefixed before parsing, so plain
/// `example.com` is accepted. Anything that still lacks a host, or uses a
/// scheme other than http/https, is rejected without issuing a request.
pub fn validate_and_normalize(raw: &str) -> Result<Url, ScanError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ScanError::InvalidUrl("URL is required".into()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    let url = Url::parse(&candidate).map_err(|e| ScanError::InvalidUrl(e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ScanError::InvalidUrl(format!(
            "unsupported scheme: {}",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(ScanError::InvalidUrl("missing host".into()));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_domain_gets_http_scheme() {
        let url = validate_and_normalize("example.com").unwrap();
        assert_eq!(url.as_str(), "http://example.com/");
    }

    #[test]
    fn explicit_https_is_preserved() {
        let url = validate_and_normalize("https://example.com/login?next=1").unwrap();
        assert_eq!(url.scheme(), "https");
        assert_eq!(url.path(), "/login");
    }

    #[test]
    fn whitespace_is_trimmed() {
        let url = validate_and_normalize("  example.com  ").unwrap();
        assert_eq!(url.host_str(), Some("example.com"));
    }

    #[test]
    fn empty_and_hostless_inputs_rejected() {
        assert!(validate_and_normalize("").is_err());
        assert!(validate_and_normalize("   ").is_err());
        assert!(validate_and_normalize("http://").is_err());
    }

    #[test]
    fn non_http_schemes_rejected() {
        let err = validate_and_normalize("ftp://example.com").unwrap_err();
        assert!(matches!(err, ScanError::InvalidUrl(_)));
    }

    #[test]
    fn garbage_rejected() {
        assert!(validate_and_normalize("http://exa mple.com").is_err());
    }
}
