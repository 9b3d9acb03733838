//! Successful call results.

use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// A decoded RestV1 response together with details of the exchange that
/// produced it.
///
/// # Examples
///
/// ```no_run
/// use restv1::Client;
/// use serde::{Deserialize, Serialize};
/// use std::time::Duration;
///
/// #[derive(Serialize)]
/// struct ReqReport {
///     server: String,
/// }
///
/// #[derive(Deserialize)]
/// struct RespReport {
///     accepted: bool,
/// }
///
/// # async fn example() -> Result<(), restv1::Error> {
/// let client = Client::new("https://restv1.example.com/api", Duration::from_secs(10), 3)?;
///
/// let response = client
///     .report::<_, RespReport>(&ReqReport { server: "db-01".to_string() })
///     .await?;
///
/// println!("Accepted: {}", response.accepted);
/// println!("Took {:?} over {} attempt(s)", response.latency, response.attempts);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response<T> {
    /// The decoded response body.
    pub data: T,

    /// The response body exactly as received.
    pub raw_body: String,

    /// The HTTP status code of the successful attempt.
    pub status: StatusCode,

    /// The headers of the successful attempt.
    pub headers: HeaderMap,

    /// Time from the start of the first attempt until the body was decoded,
    /// including any sleeps between attempts.
    pub latency: Duration,

    /// Number of attempts made, `1` when the first attempt succeeded.
    pub attempts: usize,
}

impl<T> Response<T> {
    /// Creates a new `Response`.
    pub fn new(
        data: T,
        raw_body: String,
        status: StatusCode,
        headers: HeaderMap,
        latency: Duration,
        attempts: usize,
    ) -> Self {
        Self {
            data,
            raw_body,
            status,
            headers,
            latency,
            attempts,
        }
    }

    /// Discards the exchange details and returns the decoded body.
    pub fn into_data(self) -> T {
        self.data
    }

    /// Returns `true` if the call needed more than one attempt.
    ///
    /// # Examples
    ///
    /// ```
    /// # use restv1::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let response = Response::new(
    ///     (),
    ///     "{}".to_string(),
    ///     StatusCode::OK,
    ///     HeaderMap::new(),
    ///     Duration::from_millis(40),
    ///     2,
    /// );
    ///
    /// assert!(response.was_retried());
    /// ```
    pub fn was_retried(&self) -> bool {
        self.attempts > 1
    }

    /// Returns a header value by name, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

impl<T> AsRef<T> for Response<T> {
    fn as_ref(&self) -> &T {
        &self.data
    }
}

impl<T> std::ops::Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}
