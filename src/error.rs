//! Error types for the thordata crate.

use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Boxed error kept as the cause of transport failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Closed set of failure kinds a caller can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or invalid input, detected before any network call.
    Config,
    /// Provider code 400 or 422.
    Validation,
    /// Provider code 401 or 403.
    Auth,
    /// Provider code 300: the request was understood but no data exists yet.
    NotCollected,
    /// Provider code 402 or 429.
    RateLimit,
    /// Provider code 500 and above.
    Server,
    /// Connection failure, no response received.
    Network,
    /// Transport timeout, or a task that did not finish in time.
    Timeout,
    /// Any other non-success code or status.
    Api,
}

impl ErrorKind {
    /// Whether a failure of this kind may succeed when attempted again.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::RateLimit | ErrorKind::Server | ErrorKind::Network | ErrorKind::Timeout
        )
    }

    /// Classify a provider code (or HTTP status when no code was sent).
    pub fn from_code(code: i64) -> Self {
        match code {
            300 => ErrorKind::NotCollected,
            400 | 422 => ErrorKind::Validation,
            401 | 403 => ErrorKind::Auth,
            402 | 429 => ErrorKind::RateLimit,
            c if c >= 500 => ErrorKind::Server,
            _ => ErrorKind::Api,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Config => "configuration error",
            ErrorKind::Validation => "validation error",
            ErrorKind::Auth => "authentication error",
            ErrorKind::NotCollected => "data not collected",
            ErrorKind::RateLimit => "rate limited",
            ErrorKind::Server => "server error",
            ErrorKind::Network => "network error",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Api => "API error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by every fallible operation in this crate.
///
/// Once constructed an `Error` travels unchanged to the caller; later stages
/// (retry, task polling) hand it on rather than wrapping it.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    code: Option<i64>,
    status: Option<u16>,
    payload: Option<Value>,
    retry_after: Option<Duration>,
    task_timeout: bool,
    #[source]
    source: Option<BoxError>,
}

impl Error {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            status: None,
            payload: None,
            retry_after: None,
            task_timeout: false,
            source: None,
        }
    }

    /// Missing or invalid input.
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// Connection-level failure with its underlying cause.
    pub fn network(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        let mut err = Self::new(ErrorKind::Network, message);
        err.source = Some(source.into());
        err
    }

    /// Transport timeout with its underlying cause.
    pub fn timeout(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        let mut err = Self::new(ErrorKind::Timeout, message);
        err.source = Some(source.into());
        err
    }

    /// A scrape task that never reached a terminal status within its budget.
    pub fn task_timeout(message: impl Into<String>) -> Self {
        let mut err = Self::new(ErrorKind::Timeout, message);
        err.task_timeout = true;
        err
    }

    /// A provider-level failure classified from a response code.
    pub fn api(
        kind: ErrorKind,
        message: impl Into<String>,
        code: Option<i64>,
        status: Option<u16>,
        payload: Option<Value>,
    ) -> Self {
        let mut err = Self::new(kind, message);
        err.code = code;
        err.status = status;
        err.payload = payload;
        err
    }

    /// Attach a server-provided retry hint.
    pub fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
        self.retry_after = retry_after;
        self
    }

    /// The kind of failure.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human readable message, taken from the provider when it sent one.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Provider numeric code from the response body, if any.
    pub fn code(&self) -> Option<i64> {
        self.code
    }

    /// HTTP status of the response, if one was received.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// Raw response payload, if one was received.
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// How long the provider asked us to wait before trying again.
    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }

    /// Whether the retry executor should attempt the operation again.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// True for the polling timeout of a scrape task, false for transport timeouts.
    pub fn is_task_timeout(&self) -> bool {
        self.task_timeout
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::timeout(format!("request timed out: {err}"), err)
        } else if err.is_builder() {
            let mut config = Error::config(format!("invalid request: {err}"));
            config.source = Some(Box::new(err));
            config
        } else {
            Error::network(format!("request failed: {err}"), err)
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(e) => e.into(),
            reqwest_middleware::Error::Middleware(e) => {
                Error::network(format!("request failed: {e}"), e)
            }
        }
    }
}
