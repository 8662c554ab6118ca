//! Proxy gateway targets and the credential strings the gateway expects.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;
use url::Url;

/// Prefix of every dynamically encoded proxy username.
pub const USERNAME_PREFIX: &str = "td-customer";

/// Range of sticky session durations the gateway accepts, in minutes.
pub const STICKY_MINUTES: std::ops::RangeInclusive<u32> = 1..=90;

/// Proxy network products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyProduct {
    Residential,
    Datacenter,
    Mobile,
    /// Static ISP addresses, reached directly on a provisioned host.
    Isp,
}

impl ProxyProduct {
    /// Default gateway host; static ISP targets always carry their own.
    pub fn default_host(self) -> Option<&'static str> {
        match self {
            ProxyProduct::Residential => Some("t.pr.thordata.net"),
            ProxyProduct::Datacenter => Some("dc.pr.thordata.net"),
            ProxyProduct::Mobile => Some("m.pr.thordata.net"),
            ProxyProduct::Isp => None,
        }
    }

    /// Gateway port of the product.
    pub fn default_port(self) -> u16 {
        match self {
            ProxyProduct::Residential => 9999,
            ProxyProduct::Datacenter => 7777,
            ProxyProduct::Mobile => 5555,
            ProxyProduct::Isp => 6666,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProxyProduct::Residential => "residential",
            ProxyProduct::Datacenter => "datacenter",
            ProxyProduct::Mobile => "mobile",
            ProxyProduct::Isp => "isp",
        }
    }
}

impl fmt::Display for ProxyProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire scheme used to talk to the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProxyScheme {
    /// Plain HTTP proxying (CONNECT tunnels for https targets).
    #[default]
    Http,
    /// TLS to the gateway itself.
    Https,
    /// SOCKS5 with local DNS resolution.
    Socks5,
    /// SOCKS5 with DNS resolved by the gateway.
    Socks5h,
}

impl ProxyScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            ProxyScheme::Http => "http",
            ProxyScheme::Https => "https",
            ProxyScheme::Socks5 => "socks5",
            ProxyScheme::Socks5h => "socks5h",
        }
    }

    /// Whether connections use the SOCKS adapter rather than HTTP tunneling.
    pub fn is_socks(self) -> bool {
        matches!(self, ProxyScheme::Socks5 | ProxyScheme::Socks5h)
    }
}

impl FromStr for ProxyScheme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(ProxyScheme::Http),
            "https" => Ok(ProxyScheme::Https),
            "socks5" => Ok(ProxyScheme::Socks5),
            "socks5h" => Ok(ProxyScheme::Socks5h),
            other => Err(Error::config(format!("unsupported proxy protocol {other:?}"))),
        }
    }
}

/// Account credentials for the proxy network.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyCredentials {
    pub username: String,
    pub password: String,
}

impl ProxyCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for ProxyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyCredentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Geo targeting of a dynamic proxy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Geo {
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub asn: Option<String>,
}

/// Session pinning of a dynamic proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub sticky_minutes: Option<u32>,
}

/// A gateway target whose exit node is chosen per session and geo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicTarget {
    product: ProxyProduct,
    credentials: ProxyCredentials,
    geo: Geo,
    session: Option<Session>,
    host: Option<String>,
    scheme: ProxyScheme,
}

impl DynamicTarget {
    fn new(product: ProxyProduct, credentials: ProxyCredentials) -> Self {
        Self {
            product,
            credentials,
            geo: Geo::default(),
            session: None,
            host: None,
            scheme: ProxyScheme::default(),
        }
    }

    /// Exit country, as an ISO code.
    pub fn country(mut self, code: &str) -> Self {
        self.geo.country = Some(code.trim().to_lowercase());
        self
    }

    /// Exit region or state.
    pub fn region(mut self, region: &str) -> Self {
        self.geo.region = Some(slug(region));
        self
    }

    /// Exit city; lowercased with whitespace runs turned into underscores.
    pub fn city(mut self, name: &str) -> Self {
        self.geo.city = Some(slug(name));
        self
    }

    /// Exit autonomous system, e.g. `AS7922`.
    pub fn asn(mut self, asn: &str) -> Self {
        self.geo.asn = Some(asn.trim().to_string());
        self
    }

    /// Pin requests to one exit node under `id`.
    pub fn session(mut self, id: impl Into<String>) -> Self {
        self.session = Some(Session {
            id: id.into(),
            sticky_minutes: None,
        });
        self
    }

    /// Keep the session's exit node for `minutes`; needs a session first.
    pub fn sticky(mut self, minutes: u32) -> Result<Self> {
        if !STICKY_MINUTES.contains(&minutes) {
            return Err(Error::config(format!(
                "sticky minutes must be between {} and {}, got {minutes}",
                STICKY_MINUTES.start(),
                STICKY_MINUTES.end()
            )));
        }
        match self.session.as_mut() {
            Some(session) => session.sticky_minutes = Some(minutes),
            None => return Err(Error::config("session() must be set before sticky()")),
        }
        Ok(self)
    }

    /// Use a gateway host other than the product default.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn scheme(mut self, scheme: ProxyScheme) -> Self {
        self.scheme = scheme;
        self
    }

    pub fn product(&self) -> ProxyProduct {
        self.product
    }

    pub fn geo(&self) -> &Geo {
        &self.geo
    }

    pub fn session_info(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The composite username carrying geo and session segments.
    pub fn username(&self) -> String {
        let mut parts = vec![USERNAME_PREFIX.to_string(), self.credentials.username.clone()];

        if let Some(country) = &self.geo.country {
            parts.push(format!("country-{country}"));
        }
        if let Some(region) = &self.geo.region {
            parts.push(format!("state-{region}"));
        }
        if let Some(city) = &self.geo.city {
            parts.push(format!("city-{city}"));
        }
        if let Some(asn) = &self.geo.asn {
            parts.push(format!("asn-{asn}"));
        }
        if let Some(session) = &self.session {
            parts.push(format!("sessid-{}", session.id));
            if let Some(minutes) = session.sticky_minutes {
                parts.push(format!("sesstime-{minutes}"));
            }
        }

        parts.join("-")
    }
}

/// A fixed, pre-provisioned ISP address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticTarget {
    host: String,
    port: u16,
    credentials: ProxyCredentials,
    scheme: ProxyScheme,
}

impl StaticTarget {
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn scheme(mut self, scheme: ProxyScheme) -> Self {
        self.scheme = scheme;
        self
    }
}

/// Where and how to reach the proxy network.
///
/// Geo and session targeting exist only on [`DynamicTarget`]; a static ISP
/// address authenticates its provisioned account unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyTarget {
    Dynamic(DynamicTarget),
    Static(StaticTarget),
}

impl ProxyTarget {
    pub fn residential(credentials: ProxyCredentials) -> DynamicTarget {
        DynamicTarget::new(ProxyProduct::Residential, credentials)
    }

    pub fn datacenter(credentials: ProxyCredentials) -> DynamicTarget {
        DynamicTarget::new(ProxyProduct::Datacenter, credentials)
    }

    pub fn mobile(credentials: ProxyCredentials) -> DynamicTarget {
        DynamicTarget::new(ProxyProduct::Mobile, credentials)
    }

    /// A static ISP address on `host`.
    pub fn isp(host: impl Into<String>, credentials: ProxyCredentials) -> StaticTarget {
        StaticTarget {
            host: host.into(),
            port: ProxyProduct::Isp.default_port(),
            credentials,
            scheme: ProxyScheme::default(),
        }
    }

    pub fn product(&self) -> ProxyProduct {
        match self {
            ProxyTarget::Dynamic(target) => target.product,
            ProxyTarget::Static(_) => ProxyProduct::Isp,
        }
    }

    /// The username sent to the gateway.
    pub fn username(&self) -> String {
        match self {
            ProxyTarget::Dynamic(target) => target.username(),
            ProxyTarget::Static(target) => target.credentials.username.clone(),
        }
    }

    /// Resolve scheme, host, port and credentials.
    pub fn endpoint(&self) -> Result<ProxyEndpoint> {
        let endpoint = match self {
            ProxyTarget::Dynamic(target) => {
                let host = match (&target.host, target.product.default_host()) {
                    (Some(host), _) => host.clone(),
                    (None, Some(host)) => host.to_string(),
                    (None, None) => {
                        return Err(Error::config(format!(
                            "no default gateway host for {} proxies",
                            target.product
                        )))
                    }
                };
                ProxyEndpoint {
                    scheme: target.scheme,
                    host,
                    port: target.product.default_port(),
                    username: target.username(),
                    password: target.credentials.password.clone(),
                }
            }
            ProxyTarget::Static(target) => ProxyEndpoint {
                scheme: target.scheme,
                host: target.host.clone(),
                port: target.port,
                username: target.credentials.username.clone(),
                password: target.credentials.password.clone(),
            },
        };

        if endpoint.host.trim().is_empty() {
            return Err(Error::config("proxy host must not be empty"));
        }
        let account = match self {
            ProxyTarget::Dynamic(target) => &target.credentials,
            ProxyTarget::Static(target) => &target.credentials,
        };
        if account.username.trim().is_empty() || account.password.is_empty() {
            return Err(Error::config("proxy username and password are required"));
        }
        Ok(endpoint)
    }
}

impl From<DynamicTarget> for ProxyTarget {
    fn from(target: DynamicTarget) -> Self {
        ProxyTarget::Dynamic(target)
    }
}

impl From<StaticTarget> for ProxyTarget {
    fn from(target: StaticTarget) -> Self {
        ProxyTarget::Static(target)
    }
}

impl fmt::Display for ProxyTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyTarget::Dynamic(target) => write!(
                f,
                "[Proxy {} {}]",
                target.product,
                target.geo.country.as_deref().unwrap_or("random")
            ),
            ProxyTarget::Static(target) => {
                write!(f, "[Proxy isp static {}:{}]", target.host, target.port)
            }
        }
    }
}

/// Everything the transport needs to connect through the gateway.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyEndpoint {
    pub scheme: ProxyScheme,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

impl ProxyEndpoint {
    /// Proxy URL with credentials embedded (percent-encoded).
    pub fn url(&self) -> Result<Url> {
        let mut url = Url::parse(&format!("{}://{}:{}", self.scheme.as_str(), self.host, self.port))
            .map_err(|e| Error::config(format!("invalid proxy address {}: {e}", self.host)))?;
        url.set_username(&self.username)
            .and_then(|_| url.set_password(Some(&self.password)))
            .map_err(|_| Error::config("proxy URL cannot carry credentials"))?;
        Ok(url)
    }

    /// Build the reqwest proxy routing every request through this endpoint.
    pub fn to_reqwest_proxy(&self) -> Result<reqwest::Proxy> {
        Ok(reqwest::Proxy::all(self.url()?.as_str())?)
    }
}

impl fmt::Display for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}:***@{}:{}",
            self.scheme.as_str(),
            self.username,
            self.host,
            self.port
        )
    }
}

impl fmt::Debug for ProxyEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

fn slug(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase()
}
