//! Company URL normalization.
//!
//! Users type company URLs the way they appear in a browser bar, often
//! without a scheme. Normalization trims the input, defaults the scheme to
//! `https://` and checks that the result parses with a host.

use thiserror::Error;
use url::Url;

/// Errors that can occur while normalizing a company URL
#[derive(Debug, Error, PartialEq)]
pub enum UrlValidationError {
    #[error("company_url is required.")]
    Empty,

    #[error("Invalid company_url: {0}")]
    InvalidFormat(#[from] url::ParseError),

    #[error("company_url must use http or https, got: {0}")]
    UnsupportedScheme(String),

    #[error("company_url must have a host")]
    MissingHost,
}

/// Trim `raw` and prefix `https://` when no http(s) scheme is present.
///
/// Returns an empty string for blank input.
pub fn with_default_scheme(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// Normalize and validate a required company URL.
pub fn normalize_company_url(raw: &str) -> Result<String, UrlValidationError> {
    let normalized = with_default_scheme(raw);
    if normalized.is_empty() {
        return Err(UrlValidationError::Empty);
    }

    let parsed = Url::parse(&normalized)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(UrlValidationError::UnsupportedScheme(parsed.scheme().to_string()));
    }
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adds_https_scheme() {
        assert_eq!(normalize_company_url("  acme.com ").unwrap(), "https://acme.com");
    }

    #[test]
    fn test_keeps_existing_scheme() {
        assert_eq!(
            normalize_company_url("http://acme.com/about").unwrap(),
            "http://acme.com/about"
        );
        assert_eq!(
            normalize_company_url("HTTPS://Acme.com").unwrap(),
            "HTTPS://Acme.com"
        );
    }

    #[test]
    fn test_blank_is_rejected() {
        assert_eq!(normalize_company_url("   "), Err(UrlValidationError::Empty));
        assert_eq!(
            UrlValidationError::Empty.to_string(),
            "company_url is required."
        );
    }

    #[test]
    fn test_unparseable_is_rejected() {
        assert!(matches!(
            normalize_company_url("acme dot com"),
            Err(UrlValidationError::InvalidFormat(_))
        ));
    }
}
