//! Back-off advice for rate-limited responses.

use http::HeaderMap;
use std::time::{Duration, SystemTime};

/// Back-off assumed when a 429 response does not say how long to wait.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Returns how long the server asked the caller to wait.
///
/// Reads `Retry-After` as delay-seconds or an HTTP date, falling back to
/// [`DEFAULT_RETRY_AFTER`].
///
/// # Examples
///
/// ```
/// use restv1::rate_limit::{retry_after, DEFAULT_RETRY_AFTER};
/// use http::HeaderMap;
/// use std::time::Duration;
///
/// let mut headers = HeaderMap::new();
/// assert_eq!(retry_after(&headers), DEFAULT_RETRY_AFTER);
///
/// headers.insert("retry-after", "120".parse().unwrap());
/// assert_eq!(retry_after(&headers), Duration::from_secs(120));
/// ```
pub fn retry_after(headers: &HeaderMap) -> Duration {
    parse_retry_after(headers).unwrap_or(DEFAULT_RETRY_AFTER)
}

/// Parses the Retry-After header.
///
/// Supports both delay-seconds (integer) and HTTP-date formats.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let header = headers.get(http::header::RETRY_AFTER)?.to_str().ok()?;

    if let Ok(seconds) = header.trim().parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    // A date in the past means "now"
    let date_time = httpdate::parse_http_date(header).ok()?;
    Some(
        date_time
            .duration_since(SystemTime::now())
            .unwrap_or(Duration::ZERO),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_parse_retry_after_seconds() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("30"));

        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_parse_retry_after_http_date() {
        let mut headers = HeaderMap::new();
        let at = SystemTime::now() + Duration::from_secs(90);
        headers.insert(
            "retry-after",
            HeaderValue::from_str(&httpdate::fmt_http_date(at)).unwrap(),
        );

        let delay = parse_retry_after(&headers).unwrap();
        // HTTP dates have whole-second precision
        assert!(
            delay >= Duration::from_secs(88) && delay <= Duration::from_secs(90),
            "Delay should be about 90 seconds, got {:?}",
            delay
        );
    }

    #[test]
    fn test_past_http_date_means_now() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "retry-after",
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );

        assert_eq!(parse_retry_after(&headers), Some(Duration::ZERO));
    }

    #[test]
    fn test_garbage_falls_back_to_default() {
        let mut headers = HeaderMap::new();
        headers.insert("retry-after", HeaderValue::from_static("soon"));

        assert_eq!(retry_after(&headers), DEFAULT_RETRY_AFTER);
    }
}
