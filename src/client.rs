//! RestV1 client with retry logic and status classification.
//!
//! The [`Client`] type is the main entry point. Build one with [`Client::new`]
//! or configure it through [`ClientBuilder`].

use crate::{codec, rate_limit, retry::RetryPolicy, Error, Response, Result};
use http::header::{CONTENT_ENCODING, CONTENT_TYPE};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Path of the `RestV1.Quick` endpoint.
pub const QUICK_PATH: &str = "quick";

/// Path of the `RestV1.Report` endpoint.
pub const REPORT_PATH: &str = "report";

/// Per-attempt timeout used when the builder is not given one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Attempts per call used when the builder is not given a count.
pub const DEFAULT_RETRIES: usize = 1;

/// A client for RestV1 servers.
///
/// Every call POSTs a gzip-compressed JSON body to `<base>/<path>` and retries
/// transport failures and 5xx responses up to the configured number of
/// attempts. The per-attempt timeout is also the pause between attempts.
///
/// The client is cheap to clone and safe to share between tasks; clones reuse
/// the same connection pool and configuration.
///
/// # Examples
///
/// ```no_run
/// use restv1::Client;
/// use serde::{Deserialize, Serialize};
/// use std::time::Duration;
///
/// #[derive(Serialize)]
/// struct ReqQuick {
///     server: String,
/// }
///
/// #[derive(Deserialize)]
/// struct RespQuick {
///     ok: bool,
/// }
///
/// # async fn example() -> Result<(), restv1::Error> {
/// let client = Client::new("https://restv1.example.com/api", Duration::from_secs(10), 3)?;
///
/// let response = client
///     .quick::<_, RespQuick>(&ReqQuick { server: "db-01".to_string() })
///     .await?;
/// println!("ok = {}", response.ok);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    retry_policy: RetryPolicy,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.inner.base_url.as_str())
            .field("timeout", &self.inner.timeout)
            .field("retries", &self.inner.retry_policy.attempts())
            .finish()
    }
}

impl Client {
    /// Creates a client for the server at `base_url`.
    ///
    /// `timeout` bounds every attempt and is also the pause before retrying a
    /// failure that asks to wait. `retries` is the maximum number of attempts
    /// per call and must be at least 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, `retries` is zero or
    /// `timeout` is zero.
    pub fn new(base_url: impl AsRef<str>, timeout: Duration, retries: usize) -> Result<Self> {
        Self::builder()
            .base_url(base_url)?
            .timeout(timeout)
            .retries(retries)
            .build()
    }

    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The base URL, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The per-attempt timeout, also used as the pause between attempts.
    pub fn timeout(&self) -> Duration {
        self.inner.timeout
    }

    /// Maximum number of attempts per call.
    pub fn retries(&self) -> usize {
        self.inner.retry_policy.attempts()
    }

    /// Calls `RestV1.Quick`.
    pub async fn quick<Req, Res>(&self, request: &Req) -> Result<Response<Res>>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        self.call(QUICK_PATH, request).await
    }

    /// Calls `RestV1.Report`.
    pub async fn report<Req, Res>(&self, request: &Req) -> Result<Response<Res>>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        self.call(REPORT_PATH, request).await
    }

    /// Calls the endpoint at `path` relative to the base URL.
    ///
    /// The request is encoded once and sent up to [`Client::retries`] times.
    /// The call stops at the first success or terminal error; once the budget
    /// is spent, the last error is returned as is.
    ///
    /// # Type Parameters
    ///
    /// * `Req` - The request body type (must implement `Serialize`)
    /// * `Res` - The response body type (must implement `DeserializeOwned`)
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use restv1::Client;
    /// use std::time::Duration;
    ///
    /// # async fn example() -> Result<(), restv1::Error> {
    /// let client = Client::new("https://restv1.example.com/api/", Duration::from_secs(10), 2)?;
    ///
    /// let request = serde_json::json!({"server": "db-01"});
    /// let response = client.call::<_, serde_json::Value>("quick", &request).await?;
    /// println!("{}", response.raw_body);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn call<Req, Res>(&self, path: &str, request: &Req) -> Result<Response<Res>>
    where
        Req: Serialize + ?Sized,
        Res: DeserializeOwned,
    {
        let url = self.endpoint_url(path)?;
        let body = codec::encode_body(request)?;
        let retry_policy = &self.inner.retry_policy;

        let start_time = Instant::now();
        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match self.call_once(&url, &body, start_time, attempt).await {
                Ok(response) => return Ok(response),
                Err(e) => e,
            };

            tracing::warn!(
                error = %error,
                attempt = attempt,
                path = %path,
                "RestV1 call failed"
            );

            let Some(delay) = retry_policy.delay_after(attempt, error.disposition()) else {
                return Err(error);
            };

            if delay.is_zero() {
                tracing::debug!(attempt = attempt, "Retrying call immediately");
            } else {
                tracing::info!(
                    delay_ms = delay.as_millis(),
                    attempt = attempt,
                    "Retrying call after delay"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }

    /// Appends `path` to the base URL, segment by segment.
    ///
    /// The path is never interpreted as a URL reference, so it cannot escape
    /// the base path or switch scheme.
    fn endpoint_url(&self, path: &str) -> Result<Url> {
        let relative = path.strip_prefix('/').unwrap_or(path);
        if relative.is_empty() {
            return Err(Error::ConfigurationError(
                "Endpoint path must not be empty".to_string(),
            ));
        }

        let base_url = &self.inner.base_url;
        let mut url = base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                Error::ConfigurationError(format!(
                    "Base URL cannot be used as a base: {}",
                    base_url
                ))
            })?
            .pop_if_empty()
            .extend(relative.split('/'));
        Ok(url)
    }

    /// Performs a single attempt and classifies its outcome.
    async fn call_once<Res>(
        &self,
        url: &Url,
        body: &[u8],
        start_time: Instant,
        attempt: usize,
    ) -> Result<Response<Res>>
    where
        Res: DeserializeOwned,
    {
        tracing::debug!(url = %url, attempt = attempt, "Executing RestV1 call");

        let response = self
            .inner
            .http_client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(CONTENT_ENCODING, "gzip")
            .body(body.to_vec())
            .send()
            .await
            .map_err(Error::from_transport)?;

        let status = response.status();
        let headers = response.headers().clone();

        tracing::info!(
            status = status.as_u16(),
            latency_ms = start_time.elapsed().as_millis(),
            attempt = attempt,
            "Received RestV1 response"
        );

        if !status.is_success() {
            return Err(error_for_status(status, headers, response).await);
        }

        let raw_body = response.bytes().await.map_err(Error::BodyRead)?;
        if raw_body.is_empty() {
            return Err(Error::EmptyBody { status });
        }

        match serde_json::from_slice::<Res>(&raw_body) {
            Ok(data) => Ok(Response::new(
                data,
                String::from_utf8_lossy(&raw_body).into_owned(),
                status,
                headers,
                start_time.elapsed(),
                attempt,
            )),
            Err(e) => {
                let raw_response = String::from_utf8_lossy(&raw_body).into_owned();
                tracing::error!(
                    error = %e,
                    raw_response = %raw_response,
                    "Failed to deserialize response"
                );

                Err(Error::DeserializationFailed {
                    raw_response,
                    serde_error: e.to_string(),
                    status,
                })
            }
        }
    }
}

/// Maps a non-2xx response onto the error taxonomy.
async fn error_for_status(
    status: StatusCode,
    headers: HeaderMap,
    response: reqwest::Response,
) -> Error {
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after = rate_limit::retry_after(&headers);
        tracing::warn!(
            retry_after_secs = retry_after.as_secs(),
            "Rate limited by server"
        );
        return Error::RateLimited {
            retry_after,
            headers,
        };
    }

    let raw_response = response.text().await.unwrap_or_default();

    if status == StatusCode::CONFLICT {
        tracing::warn!(response = %raw_response, "Previous store still in progress");
        return Error::Conflict { raw_response };
    }

    if status.is_server_error() {
        tracing::warn!(
            status = status.as_u16(),
            response = %raw_response,
            "Server error (5xx)"
        );
    } else {
        tracing::error!(
            status = status.as_u16(),
            response = %raw_response,
            "Unexpected HTTP status"
        );
    }

    Error::HttpError {
        status,
        raw_response,
        headers,
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use restv1::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), restv1::Error> {
/// let client = ClientBuilder::new()
///     .base_url("https://restv1.example.com/api")?
///     .timeout(Duration::from_secs(15))
///     .retries(3)
///     .default_header("User-Agent", "restv1-agent/1.0")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    base_url: Option<Url>,
    default_headers: HeaderMap,
    timeout: Duration,
    retries: usize,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            base_url: None,
            default_headers: HeaderMap::new(),
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
        }
    }

    /// Sets the base URL for all calls. A trailing `/` is added if missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Adds a header sent with every call.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the per-attempt timeout, which is also the pause between attempts.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the maximum number of attempts per call.
    pub fn retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if no base URL was provided, the URL cannot serve as
    /// a base, `retries` is zero, `timeout` is zero, or the HTTP client cannot
    /// be created.
    pub fn build(self) -> Result<Client> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::ConfigurationError("Base URL is required".to_string()))?;
        let base_url = normalize_base_url(base_url)?;

        if self.retries == 0 {
            return Err(Error::ConfigurationError(
                "Retries must be at least 1".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(Error::ConfigurationError(
                "Timeout must be greater than zero".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(self.timeout)
            .default_headers(self.default_headers)
            .build()
            .map_err(|e| {
                Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Client {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                timeout: self.timeout,
                retry_policy: RetryPolicy::new(self.retries, self.timeout),
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Ensures the base URL path ends with exactly one `/`.
fn normalize_base_url(mut url: Url) -> Result<Url> {
    if url.cannot_be_a_base() {
        return Err(Error::ConfigurationError(format!(
            "Base URL cannot be used as a base: {}",
            url
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
