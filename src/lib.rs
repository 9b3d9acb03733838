//! # restv1 - client for RestV1 servers
//!
//! RestV1 is a request/response protocol over HTTP POST. Each endpoint takes a
//! gzip-compressed JSON request and answers with a plain JSON response. This
//! crate encodes requests, sends them, maps status codes onto a small error
//! taxonomy and retries transient failures with a bounded policy.
//!
//! ## Quick Start
//!
//! ```no_run
//! use restv1::Client;
//! use serde::{Deserialize, Serialize};
//! use std::time::Duration;
//!
//! #[derive(Serialize)]
//! struct ReqQuick {
//!     server: String,
//! }
//!
//! #[derive(Deserialize)]
//! struct RespQuick {
//!     ok: bool,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), restv1::Error> {
//!     // Up to 3 attempts, 10 seconds each, 10 seconds apart
//!     let client = Client::new("https://restv1.example.com/api", Duration::from_secs(10), 3)?;
//!
//!     let response = client
//!         .quick::<_, RespQuick>(&ReqQuick { server: "db-01".to_string() })
//!         .await?;
//!     println!("ok = {} after {} attempt(s)", response.ok, response.attempts);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Status codes
//!
//! | Status | Error | Retried? | Wait before retry? |
//! |---|---|---|---|
//! | 2xx, empty body | [`Error::EmptyBody`] | no | - |
//! | 2xx, bad JSON | [`Error::DeserializationFailed`] | no | - |
//! | 409 | [`Error::Conflict`] | no | - |
//! | 429 | [`Error::RateLimited`] | no | - |
//! | 5xx | [`Error::HttpError`] | yes | one timeout |
//! | other | [`Error::HttpError`] | no | - |
//! | connection failure | [`Error::Network`] | yes | one timeout |
//! | timeout | [`Error::Timeout`] | yes | no |
//! | request cannot be built | [`Error::Request`] | no | - |
//!
//! Rate limiting is left to the caller:
//!
//! ```no_run
//! use restv1::{Client, Error};
//! use std::time::Duration;
//!
//! # async fn example(client: Client) -> Result<(), Error> {
//! let request = serde_json::json!({"server": "db-01"});
//! loop {
//!     match client.report::<_, serde_json::Value>(&request).await {
//!         Err(e) if e.is_rate_limited() => {
//!             tokio::time::sleep(e.retry_after().unwrap_or(Duration::from_secs(60))).await;
//!         }
//!         other => {
//!             other?;
//!             return Ok(());
//!         }
//!     }
//! }
//! # }
//! ```

mod client;
pub mod codec;
mod error;
pub mod rate_limit;
mod response;
pub mod retry;

pub use client::{
    Client, ClientBuilder, DEFAULT_RETRIES, DEFAULT_TIMEOUT, QUICK_PATH, REPORT_PATH,
};
pub use error::{Error, Result};
pub use response::Response;
pub use retry::{Disposition, RetryPolicy};
