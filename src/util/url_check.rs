use thiserror::Error;
use url::Url;

/// Errors from feed URL validation.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL has no host component.
    #[error("URL has no host")]
    MissingHost,
}

/// Validates a URL string before it is stored as a feed source.
///
/// Rejects non-HTTP(S) schemes (e.g. `file://`) and host-less URLs; anything
/// the synchronizer would poll forever without a chance of success.
pub fn validate_feed_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlValidationError::MissingHost);
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_http_and_https() {
        assert!(validate_feed_url("https://example.com/feed.xml").is_ok());
        assert!(validate_feed_url("http://example.com/rss").is_ok());
    }

    #[test]
    fn rejects_other_schemes() {
        let err = validate_feed_url("file:///etc/passwd").unwrap_err();
        assert!(matches!(err, UrlValidationError::UnsupportedScheme(_)));
        assert!(validate_feed_url("ftp://example.com/feed").is_err());
    }

    #[test]
    fn rejects_unparseable_and_hostless() {
        assert!(matches!(
            validate_feed_url("not a url"),
            Err(UrlValidationError::InvalidUrl(_))
        ));
    }
}
