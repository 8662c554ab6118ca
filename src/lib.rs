//! # thordata
//!
//! An async client for the Thordata data-collection APIs.
//!
//! This library wraps the SERP, Universal scraping, Web Scraper task and
//! locations APIs behind one [`Client`], classifies every failure into a
//! closed [`ErrorKind`] taxonomy with bounded, jittered retries, and encodes
//! geo/session targeting into proxy gateway credentials.

pub mod auth;
pub mod client;
pub mod config;
pub mod engines;
pub mod error;
pub mod locations;
pub mod middleware;
pub mod payload;
pub mod proxy;
pub mod response;
pub mod retry;
pub mod serp;
pub mod task;
pub mod unlock;

pub use auth::Credentials;
pub use client::{Client, ProxyRequestOptions, TaskRun};
pub use config::{
    proxy_credentials_from_env, proxy_scheme_from_env, static_proxy_from_env, BaseUrls,
    ClientConfig, ClientConfigBuilder,
};
pub use error::{Error, ErrorKind, Result};
pub use locations::{AsnInfo, CityInfo, CountryInfo, LocationProxyType, StateInfo};
pub use middleware::RequestLogMiddleware;
pub use proxy::{
    DynamicTarget, ProxyCredentials, ProxyEndpoint, ProxyProduct, ProxyScheme, ProxyTarget,
    StaticTarget,
};
pub use response::Body;
pub use retry::{with_retry, RetryPolicy};
pub use serp::{Engine, SerpFormat, SerpRequest};
pub use task::{ResultFormat, RunOptions, TaskSpec, TaskStatus, WaitOptions};
pub use unlock::{NameValue, UnlockFormat, UnlockOutput, UnlockRequest};
