//! Error types for RestV1 calls.
//!
//! Every failure a call can produce is classified into one [`Error`] variant.
//! Variants derived from an HTTP response keep the status code so callers can
//! special-case rate limiting and conflicts; transport, encoding and
//! configuration failures do not carry one.

use crate::retry::Disposition;
use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// The main error type for RestV1 calls.
///
/// # Examples
///
/// ```no_run
/// use restv1::{Client, Error};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::new("https://restv1.example.com/api", Duration::from_secs(30), 3)?;
///
/// match client.quick::<_, serde_json::Value>(&serde_json::json!({"server": "db-01"})).await {
///     Ok(response) => println!("Quick: {:?}", response.data),
///     Err(Error::RateLimited { retry_after, .. }) => {
///         eprintln!("Rate limited, come back in {:?}", retry_after);
///     }
///     Err(Error::Conflict { .. }) => eprintln!("A store for this server is still running"),
///     Err(e) => eprintln!("Call failed: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A network-level error occurred (connection refused, DNS lookup failed, etc.).
    ///
    /// Retried after waiting one timeout duration.
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The attempt did not complete within the configured timeout.
    ///
    /// Retried immediately; the timeout itself already served as the wait.
    #[error("Request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// The HTTP request could not be built (unsupported scheme, missing
    /// host, etc.). Nothing was sent and retrying will not help.
    #[error("Failed to build request: {0}")]
    Request(#[source] reqwest::Error),

    /// The server answered `429 Too Many Requests`.
    ///
    /// Not retried by the client. `retry_after` is taken from the
    /// `Retry-After` header when present and defaults to 60 seconds.
    #[error("rate limited, retry after {} seconds", .retry_after.as_secs())]
    RateLimited {
        /// How long the server asked the caller to back off
        retry_after: Duration,
        /// The response headers
        headers: HeaderMap,
    },

    /// The server answered `409 Conflict`: an earlier store for the same
    /// server has not finished yet. Not retried.
    #[error("previous store for this server is still in progress")]
    Conflict {
        /// The raw response body
        raw_response: String,
    },

    /// The server returned any other non-2xx status code.
    ///
    /// 5xx statuses are retried after waiting one timeout duration; everything
    /// else is terminal.
    #[error("server returned HTTP error code {}", .status.as_u16())]
    HttpError {
        /// The HTTP status code
        status: StatusCode,
        /// The raw response body
        raw_response: String,
        /// The response headers
        headers: HeaderMap,
    },

    /// The server answered with a 2xx status but sent no body.
    #[error("empty body received")]
    EmptyBody {
        /// The HTTP status code
        status: StatusCode,
    },

    /// The response body could not be read to the end.
    #[error("Failed to read response body: {0}")]
    BodyRead(#[source] reqwest::Error),

    /// Failed to deserialize the response body into the expected type.
    ///
    /// The raw body is kept so malformed payloads can be inspected.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// Failed to encode the request body.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// Invalid configuration was provided to the builder.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An invalid URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Classifies a transport failure reported by `reqwest`.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Error::Request(err)
        } else if err.is_timeout() {
            Error::Timeout(err)
        } else {
            Error::Network(err)
        }
    }

    /// Returns what the retry loop should do after this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use restv1::{Error, retry::Disposition};
    /// use http::{HeaderMap, StatusCode};
    ///
    /// let err = Error::HttpError {
    ///     status: StatusCode::SERVICE_UNAVAILABLE,
    ///     raw_response: String::new(),
    ///     headers: HeaderMap::new(),
    /// };
    /// assert_eq!(err.disposition(), Disposition::Retry { wait: true });
    ///
    /// let err = Error::HttpError {
    ///     status: StatusCode::NOT_FOUND,
    ///     raw_response: String::new(),
    ///     headers: HeaderMap::new(),
    /// };
    /// assert_eq!(err.disposition(), Disposition::Fail);
    /// ```
    pub fn disposition(&self) -> Disposition {
        match self {
            Error::Network(_) => Disposition::Retry { wait: true },
            Error::Timeout(_) => Disposition::Retry { wait: false },
            Error::HttpError { status, .. } if status.is_server_error() => {
                Disposition::Retry { wait: true }
            }
            Error::HttpError { .. }
            | Error::Request(_)
            | Error::RateLimited { .. }
            | Error::Conflict { .. }
            | Error::EmptyBody { .. }
            | Error::BodyRead(_)
            | Error::DeserializationFailed { .. }
            | Error::SerializationFailed(_)
            | Error::ConfigurationError(_)
            | Error::InvalidUrl(_) => Disposition::Fail,
        }
    }

    /// Returns `true` if the client retries this error on its own.
    ///
    /// Transport failures, timeouts and 5xx responses are retryable. Rate
    /// limiting is not: the caller decides when to come back.
    pub fn is_retryable(&self) -> bool {
        self.disposition().is_retry()
    }

    /// Returns the HTTP status code if this error was derived from a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::RateLimited { .. } => Some(StatusCode::TOO_MANY_REQUESTS),
            Error::Conflict { .. } => Some(StatusCode::CONFLICT),
            Error::HttpError { status, .. } => Some(*status),
            Error::EmptyBody { status } => Some(*status),
            Error::DeserializationFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::Conflict { raw_response } => Some(raw_response),
            Error::HttpError { raw_response, .. } => Some(raw_response),
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Returns the back-off the server advised on a 429.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::RateLimited { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }

    /// Returns `true` for a 429 response.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited { .. })
    }

    /// Returns `true` for a 409 response.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict { .. })
    }
}

/// A specialized `Result` type for RestV1 calls.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    fn http_error(code: u16) -> Error {
        Error::HttpError {
            status: StatusCode::from_u16(code).unwrap(),
            raw_response: String::new(),
            headers: HeaderMap::new(),
        }
    }

    #[test]
    fn test_server_errors_retry_with_wait() {
        for code in [500, 502, 503, 504, 599] {
            assert_eq!(
                http_error(code).disposition(),
                Disposition::Retry { wait: true },
                "status {}",
                code
            );
        }
    }

    #[test]
    fn test_client_errors_are_terminal() {
        for code in [400, 401, 404, 418, 302] {
            assert_eq!(http_error(code).disposition(), Disposition::Fail, "status {}", code);
        }
    }

    #[test]
    fn test_rate_limit_and_conflict_are_terminal() {
        let rate_limited = Error::RateLimited {
            retry_after: Duration::from_secs(60),
            headers: HeaderMap::new(),
        };
        assert!(!rate_limited.is_retryable());
        assert!(rate_limited.is_rate_limited());
        assert_eq!(rate_limited.status(), Some(StatusCode::TOO_MANY_REQUESTS));
        assert_eq!(rate_limited.retry_after(), Some(Duration::from_secs(60)));

        let conflict = Error::Conflict {
            raw_response: "busy".to_string(),
        };
        assert!(!conflict.is_retryable());
        assert!(conflict.is_conflict());
        assert_eq!(conflict.status(), Some(StatusCode::CONFLICT));
        assert_eq!(conflict.raw_response(), Some("busy"));
    }

    #[test]
    fn test_unbuildable_request_is_terminal() {
        // A URL without a host is refused by reqwest before anything is sent
        let err = reqwest::Client::new()
            .post("v2:quick")
            .build()
            .unwrap_err();
        assert!(err.is_builder());

        let err = Error::from_transport(err);
        assert!(matches!(err, Error::Request(_)), "got {:?}", err);
        assert_eq!(err.disposition(), Disposition::Fail);
        assert!(err.status().is_none());
    }

    #[test]
    fn test_messages() {
        let rate_limited = Error::RateLimited {
            retry_after: Duration::from_secs(60),
            headers: HeaderMap::new(),
        };
        assert_eq!(rate_limited.to_string(), "rate limited, retry after 60 seconds");
        assert_eq!(
            Error::Conflict {
                raw_response: String::new()
            }
            .to_string(),
            "previous store for this server is still in progress"
        );
        assert_eq!(
            http_error(503).to_string(),
            "server returned HTTP error code 503"
        );
        assert_eq!(
            Error::EmptyBody {
                status: StatusCode::OK
            }
            .to_string(),
            "empty body received"
        );
    }

    #[test]
    fn test_decode_and_encode_failures_are_terminal() {
        let decode = Error::DeserializationFailed {
            raw_response: "nope".to_string(),
            serde_error: "expected value".to_string(),
            status: StatusCode::OK,
        };
        assert_eq!(decode.disposition(), Disposition::Fail);
        assert_eq!(decode.status(), Some(StatusCode::OK));
        assert_eq!(
            Error::SerializationFailed("bad".to_string()).disposition(),
            Disposition::Fail
        );
    }
}
