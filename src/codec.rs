//! Request body encoding.
//!
//! RestV1 servers expect every request body as gzip-compressed JSON. Responses
//! come back as plain JSON and are decoded directly by the client.

use crate::{Error, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;

/// Serializes `value` to JSON and gzip-compresses the result.
///
/// # Errors
///
/// Returns [`Error::SerializationFailed`] if the value cannot be serialized
/// or the compressor fails. Neither is worth retrying.
pub fn encode_body<T>(value: &T) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    serde_json::to_writer(&mut encoder, value)
        .map_err(|e| Error::SerializationFailed(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| Error::SerializationFailed(format!("gzip: {}", e)))
}
