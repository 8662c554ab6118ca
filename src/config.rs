//! Client configuration, and the one place that reads the process environment.

use crate::auth::Credentials;
use crate::error::{Error, Result};
use crate::proxy::{ProxyCredentials, ProxyProduct, ProxyScheme, ProxyTarget, StaticTarget};
use crate::retry::RetryPolicy;
use std::time::Duration;

/// Default SERP and builder API root.
pub const DEFAULT_SCRAPER_API: &str = "https://scraperapi.thordata.com";
/// Default Universal scraping API root.
pub const DEFAULT_UNIVERSAL_API: &str = "https://universalapi.thordata.com";
/// Default Web Scraper public API root.
pub const DEFAULT_WEB_SCRAPER_API: &str = "https://openapi.thordata.com/api/web-scraper-api";
/// Default locations API root.
pub const DEFAULT_LOCATIONS_API: &str = "https://openapi.thordata.com/api/locations";

/// Roots of the API families.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrls {
    /// SERP `/request` and task `/builder`.
    pub scraper_api: String,
    /// Universal `/request`.
    pub universal_api: String,
    /// Task `/tasks-status` and `/tasks-download`.
    pub web_scraper_api: String,
    /// `/countries`, `/states`, `/cities`, `/asn`.
    pub locations: String,
}

impl BaseUrls {
    /// Point every API family at one root, as a mock server would serve them.
    pub fn all(root: &str) -> Self {
        Self {
            scraper_api: root.to_string(),
            universal_api: root.to_string(),
            web_scraper_api: root.to_string(),
            locations: root.to_string(),
        }
        .normalized()
    }

    fn normalized(self) -> Self {
        Self {
            scraper_api: trim_slashes(&self.scraper_api),
            universal_api: trim_slashes(&self.universal_api),
            web_scraper_api: trim_slashes(&self.web_scraper_api),
            locations: trim_slashes(&self.locations),
        }
    }
}

impl Default for BaseUrls {
    fn default() -> Self {
        Self {
            scraper_api: DEFAULT_SCRAPER_API.to_string(),
            universal_api: DEFAULT_UNIVERSAL_API.to_string(),
            web_scraper_api: DEFAULT_WEB_SCRAPER_API.to_string(),
            locations: DEFAULT_LOCATIONS_API.to_string(),
        }
    }
}

fn trim_slashes(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Default user agent sent with every API call.
pub fn default_user_agent() -> String {
    format!(
        "thordata-rust-sdk/{} ({}/{})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Configuration of a [`Client`](crate::Client), fixed for the client's lifetime.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API credentials.
    pub credentials: Credentials,
    /// Roots of the API families.
    pub base_urls: BaseUrls,
    /// Timeout of a single HTTP request.
    pub timeout: Duration,
    /// Retry behaviour for transient failures.
    pub retry: RetryPolicy,
    /// Verify TLS certificates.
    pub verify_tls: bool,
    /// User-Agent header.
    pub user_agent: String,
    /// Local forwarding proxy the transport goes through first.
    pub upstream_proxy: Option<String>,
}

impl ClientConfig {
    /// Create a new configuration builder.
    pub fn builder(scraper_token: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder::new(scraper_token)
    }

    /// Load the configuration from `THORDATA_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let token = var("THORDATA_SCRAPER_TOKEN").ok_or_else(|| {
            Error::config("THORDATA_SCRAPER_TOKEN is not set; pass a token or set the variable")
        })?;

        let mut builder = ClientConfigBuilder::new(token);
        if let (Some(public_token), Some(public_key)) =
            (var("THORDATA_PUBLIC_TOKEN"), var("THORDATA_PUBLIC_KEY"))
        {
            builder = builder.public_credentials(public_token, public_key);
        }

        let defaults = BaseUrls::default();
        builder = builder.base_urls(BaseUrls {
            scraper_api: var("THORDATA_SCRAPERAPI_BASE_URL").unwrap_or(defaults.scraper_api),
            universal_api: var("THORDATA_UNIVERSALAPI_BASE_URL").unwrap_or(defaults.universal_api),
            web_scraper_api: var("THORDATA_WEB_SCRAPER_API_BASE_URL")
                .unwrap_or(defaults.web_scraper_api),
            locations: var("THORDATA_LOCATIONS_BASE_URL").unwrap_or(defaults.locations),
        });

        if let Some(upstream) = var("THORDATA_UPSTREAM_PROXY") {
            builder = builder.upstream_proxy(upstream);
        }

        builder.build()
    }
}

/// Builder for `ClientConfig`.
pub struct ClientConfigBuilder {
    credentials: Credentials,
    base_urls: Option<BaseUrls>,
    timeout: Option<Duration>,
    retry: Option<RetryPolicy>,
    max_retries: Option<u32>,
    verify_tls: Option<bool>,
    user_agent: Option<String>,
    upstream_proxy: Option<String>,
}

impl ClientConfigBuilder {
    /// Create a new builder with default values.
    pub fn new(scraper_token: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::new(scraper_token),
            base_urls: None,
            timeout: None,
            retry: None,
            max_retries: None,
            verify_tls: None,
            user_agent: None,
            upstream_proxy: None,
        }
    }

    /// Set the public token/key pair used by task status, results and locations.
    pub fn public_credentials(mut self, token: impl Into<String>, key: impl Into<String>) -> Self {
        self.credentials = self.credentials.with_public(token, key);
        self
    }

    /// Override the API roots.
    pub fn base_urls(mut self, urls: BaseUrls) -> Self {
        self.base_urls = Some(urls);
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the number of retries for transient failures.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Replace the whole retry policy.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Enable or disable TLS certificate verification.
    pub fn verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = Some(verify);
        self
    }

    /// Set a custom User-Agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Route API traffic through a local forwarding proxy.
    pub fn upstream_proxy(mut self, url: impl Into<String>) -> Self {
        self.upstream_proxy = Some(url.into());
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<ClientConfig> {
        if self.credentials.scraper_token.is_empty() {
            return Err(Error::config("scraper_token is required"));
        }

        let mut retry = self.retry.unwrap_or_default();
        if let Some(max_retries) = self.max_retries {
            retry.max_retries = max_retries;
        }

        if let Some(upstream) = &self.upstream_proxy {
            url::Url::parse(upstream)
                .map_err(|e| Error::config(format!("invalid upstream proxy {upstream:?}: {e}")))?;
        }

        Ok(ClientConfig {
            credentials: self.credentials,
            base_urls: self.base_urls.unwrap_or_default().normalized(),
            timeout: self.timeout.unwrap_or(Duration::from_secs(30)),
            retry,
            verify_tls: self.verify_tls.unwrap_or(true),
            user_agent: self.user_agent.unwrap_or_else(default_user_agent),
            upstream_proxy: self.upstream_proxy,
        })
    }
}

/// Proxy account for `product` from `THORDATA_<PRODUCT>_USERNAME` / `_PASSWORD`.
pub fn proxy_credentials_from_env(product: ProxyProduct) -> Result<ProxyCredentials> {
    proxy_credentials_from_lookup(product, |name| std::env::var(name).ok())
}

fn proxy_credentials_from_lookup(
    product: ProxyProduct,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ProxyCredentials> {
    let prefix = format!("THORDATA_{}", product.as_str().to_uppercase());
    let user_var = format!("{prefix}_USERNAME");
    let pass_var = format!("{prefix}_PASSWORD");

    match (lookup(&user_var), lookup(&pass_var)) {
        (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => {
            Ok(ProxyCredentials::new(user, pass))
        }
        _ => Err(Error::config(format!("{user_var} and {pass_var} are required"))),
    }
}

/// Static ISP target from `THORDATA_ISP_HOST`, `_USERNAME` and `_PASSWORD`.
pub fn static_proxy_from_env() -> Result<StaticTarget> {
    static_proxy_from_lookup(|name| std::env::var(name).ok())
}

fn static_proxy_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<StaticTarget> {
    let host = lookup("THORDATA_ISP_HOST").filter(|h| !h.is_empty()).ok_or_else(|| {
        Error::config("THORDATA_ISP_HOST, THORDATA_ISP_USERNAME and THORDATA_ISP_PASSWORD are required")
    })?;
    let credentials = proxy_credentials_from_lookup(ProxyProduct::Isp, lookup)?;
    Ok(ProxyTarget::isp(host, credentials))
}

/// Gateway scheme from `THORDATA_PROXY_PROTOCOL`, defaulting to plain HTTP.
pub fn proxy_scheme_from_env() -> Result<ProxyScheme> {
    proxy_scheme_from_lookup(|name| std::env::var(name).ok())
}

fn proxy_scheme_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<ProxyScheme> {
    match lookup("THORDATA_PROXY_PROTOCOL") {
        Some(value) if !value.trim().is_empty() => value.parse(),
        _ => Ok(ProxyScheme::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn proxy_scheme_defaults_to_http() {
        assert_eq!(proxy_scheme_from_lookup(lookup(&[])).unwrap(), ProxyScheme::Http);
        let blank = lookup(&[("THORDATA_PROXY_PROTOCOL", "  ")]);
        assert_eq!(proxy_scheme_from_lookup(blank).unwrap(), ProxyScheme::Http);
    }

    #[test]
    fn proxy_scheme_is_read_from_protocol_var() {
        let vars = lookup(&[("THORDATA_PROXY_PROTOCOL", "SOCKS5h")]);
        assert_eq!(proxy_scheme_from_lookup(vars).unwrap(), ProxyScheme::Socks5h);

        let vars = lookup(&[("THORDATA_PROXY_PROTOCOL", "ftp")]);
        let err = proxy_scheme_from_lookup(vars).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn builder_defaults() {
        let config = ClientConfig::builder("tok").build().unwrap();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retry.max_retries, 0);
        assert!(config.verify_tls);
        assert!(config.user_agent.starts_with("thordata-rust-sdk/"));
        assert_eq!(config.base_urls, BaseUrls::default());
        assert!(config.upstream_proxy.is_none());
    }

    #[test]
    fn empty_token_is_rejected() {
        let err = ClientConfig::builder("").build().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn base_urls_lose_trailing_slashes() {
        let config = ClientConfig::builder("tok")
            .base_urls(BaseUrls::all("http://127.0.0.1:8080///"))
            .build()
            .unwrap();
        assert_eq!(config.base_urls.scraper_api, "http://127.0.0.1:8080");
        assert_eq!(config.base_urls.locations, "http://127.0.0.1:8080");
    }

    #[test]
    fn max_retries_overrides_policy() {
        let config = ClientConfig::builder("tok")
            .retry_policy(RetryPolicy::new(1).with_base_delay(Duration::from_millis(5)))
            .max_retries(4)
            .build()
            .unwrap();
        assert_eq!(config.retry.max_retries, 4);
        assert_eq!(config.retry.base_delay, Duration::from_millis(5));
    }

    #[test]
    fn invalid_upstream_proxy_is_rejected() {
        let err = ClientConfig::builder("tok")
            .upstream_proxy("not a url")
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn env_requires_scraper_token() {
        let err = ClientConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn env_populates_config() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("THORDATA_SCRAPER_TOKEN", "s"),
            ("THORDATA_PUBLIC_TOKEN", "pt"),
            ("THORDATA_PUBLIC_KEY", "pk"),
            ("THORDATA_UNIVERSALAPI_BASE_URL", "http://localhost:1/"),
            ("THORDATA_UPSTREAM_PROXY", "http://127.0.0.1:7890"),
        ]))
        .unwrap();

        assert_eq!(config.credentials.scraper_token, "s");
        assert_eq!(config.credentials.public_pair().unwrap(), ("pt", "pk"));
        assert_eq!(config.base_urls.universal_api, "http://localhost:1");
        assert_eq!(config.base_urls.scraper_api, DEFAULT_SCRAPER_API);
        assert_eq!(config.upstream_proxy.as_deref(), Some("http://127.0.0.1:7890"));
    }

    #[test]
    fn proxy_credentials_per_product() {
        let vars = lookup(&[
            ("THORDATA_RESIDENTIAL_USERNAME", "ru"),
            ("THORDATA_RESIDENTIAL_PASSWORD", "rp"),
        ]);
        let creds = proxy_credentials_from_lookup(ProxyProduct::Residential, &vars).unwrap();
        assert_eq!(creds, ProxyCredentials::new("ru", "rp"));

        let err = proxy_credentials_from_lookup(ProxyProduct::Mobile, &vars).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.message().contains("THORDATA_MOBILE_USERNAME"));
    }

    #[test]
    fn static_proxy_needs_host() {
        let err = static_proxy_from_lookup(lookup(&[
            ("THORDATA_ISP_USERNAME", "u"),
            ("THORDATA_ISP_PASSWORD", "p"),
        ]))
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        let target = static_proxy_from_lookup(lookup(&[
            ("THORDATA_ISP_HOST", "198.51.100.2"),
            ("THORDATA_ISP_USERNAME", "u"),
            ("THORDATA_ISP_PASSWORD", "p"),
        ]))
        .unwrap();
        let endpoint = ProxyTarget::from(target).endpoint().unwrap();
        assert_eq!(endpoint.host, "198.51.100.2");
        assert_eq!(endpoint.port, 6666);
    }
}
