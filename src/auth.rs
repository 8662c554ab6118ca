//! Credentials and the authentication headers each API family expects.

use crate::error::{Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};

/// Header carrying the token on every API family.
pub const TOKEN_HEADER: &str = "token";
/// Header carrying the public key next to the public token.
pub const KEY_HEADER: &str = "key";

/// Credentials for the scraping and public APIs.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Authorizes SERP, Universal and task creation calls.
    pub scraper_token: String,
    /// Authorizes task status/result and location calls, together with `public_key`.
    pub public_token: Option<String>,
    /// See `public_token`.
    pub public_key: Option<String>,
}

impl Credentials {
    /// Credentials holding only a scraper token.
    pub fn new(scraper_token: impl Into<String>) -> Self {
        Self {
            scraper_token: scraper_token.into(),
            public_token: None,
            public_key: None,
        }
    }

    /// Add the public token/key pair.
    pub fn with_public(mut self, token: impl Into<String>, key: impl Into<String>) -> Self {
        self.public_token = Some(token.into());
        self.public_key = Some(key.into());
        self
    }

    /// The public token/key pair, or a configuration error if either half is missing.
    pub fn public_pair(&self) -> Result<(&str, &str)> {
        match (non_empty(&self.public_token), non_empty(&self.public_key)) {
            (Some(token), Some(key)) => Ok((token, key)),
            _ => Err(Error::config(
                "public_token and public_key are required for this call",
            )),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("scraper_token", &"***")
            .field("public_token", &self.public_token.as_ref().map(|_| "***"))
            .field("public_key", &self.public_key.as_ref().map(|_| "***"))
            .finish()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|_| Error::config("credential contains characters not allowed in a header"))
}

fn bearer(token: &str) -> Result<HeaderValue> {
    header_value(&format!("Bearer {token}"))
}

/// Headers for the SERP and Universal APIs.
///
/// The token goes out twice, as `token` and as a bearer `Authorization`,
/// since the provider documents both conventions.
pub fn scraper_headers(scraper_token: &str) -> Result<HeaderMap> {
    if scraper_token.is_empty() {
        return Err(Error::config("scraper_token is required"));
    }

    let mut headers = HeaderMap::new();
    headers.insert(HeaderName::from_static(TOKEN_HEADER), header_value(scraper_token)?);
    headers.insert(AUTHORIZATION, bearer(scraper_token)?);
    Ok(headers)
}

/// Headers for the public (task status, download, locations) APIs.
pub fn public_headers(public_token: &str, public_key: &str) -> Result<HeaderMap> {
    if public_token.is_empty() || public_key.is_empty() {
        return Err(Error::config("public_token and public_key are required"));
    }

    let mut headers = HeaderMap::new();
    headers.insert(HeaderName::from_static(TOKEN_HEADER), header_value(public_token)?);
    headers.insert(HeaderName::from_static(KEY_HEADER), header_value(public_key)?);
    Ok(headers)
}

/// Headers for the Web Scraper builder endpoint.
///
/// Always bearer-authenticated; the public pair is added only when both
/// halves are present, since the builder also accepts bearer-only calls.
pub fn builder_headers(
    scraper_token: &str,
    public_token: Option<&str>,
    public_key: Option<&str>,
) -> Result<HeaderMap> {
    if scraper_token.is_empty() {
        return Err(Error::config("scraper_token is required"));
    }

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, bearer(scraper_token)?);

    let token = public_token.filter(|t| !t.is_empty());
    let key = public_key.filter(|k| !k.is_empty());
    if let (Some(token), Some(key)) = (token, key) {
        headers.insert(HeaderName::from_static(TOKEN_HEADER), header_value(token)?);
        headers.insert(HeaderName::from_static(KEY_HEADER), header_value(key)?);
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn scraper_headers_carry_token_twice() {
        let headers = scraper_headers("abc").unwrap();
        assert_eq!(headers["token"], "abc");
        assert_eq!(headers[AUTHORIZATION], "Bearer abc");
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn empty_scraper_token_is_config_error() {
        let err = scraper_headers("").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn public_headers_need_both_halves() {
        assert_eq!(public_headers("t", "").unwrap_err().kind(), ErrorKind::Config);
        assert_eq!(public_headers("", "k").unwrap_err().kind(), ErrorKind::Config);

        let headers = public_headers("t", "k").unwrap();
        assert_eq!(headers["token"], "t");
        assert_eq!(headers["key"], "k");
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn builder_headers_degrade_to_bearer_only() {
        let partial = builder_headers("s", Some("t"), None).unwrap();
        assert_eq!(partial.len(), 1);
        assert_eq!(partial[AUTHORIZATION], "Bearer s");

        let full = builder_headers("s", Some("t"), Some("k")).unwrap();
        assert_eq!(full.len(), 3);
        assert_eq!(full["token"], "t");
        assert_eq!(full["key"], "k");
    }

    #[test]
    fn public_pair_fails_fast() {
        let creds = Credentials::new("s");
        assert_eq!(creds.public_pair().unwrap_err().kind(), ErrorKind::Config);

        let creds = creds.with_public("t", "k");
        assert_eq!(creds.public_pair().unwrap(), ("t", "k"));
    }

    #[test]
    fn debug_hides_secrets() {
        let creds = Credentials::new("secret-token").with_public("pt", "pk");
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(!rendered.contains("pk"));
    }
}
