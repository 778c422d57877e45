//! Versioned JSON envelope
//!
//! Every blob is stored as `{"version": N, "payload": ...}` so the payload
//! layout can change without misreading old data.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::PersistenceError;

/// Current envelope version
pub const ENVELOPE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    payload: T,
}

/// Wrap a payload in the current envelope
pub fn encode<T: Serialize>(payload: &T) -> Result<String, PersistenceError> {
    let envelope = Envelope {
        version: ENVELOPE_VERSION,
        payload,
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Unwrap a blob written by `encode`
pub fn decode<T: DeserializeOwned>(blob: &str) -> Result<T, PersistenceError> {
    let envelope: Envelope<serde_json::Value> = serde_json::from_str(blob)?;
    if envelope.version != ENVELOPE_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            found: envelope.version,
            expected: ENVELOPE_VERSION,
        });
    }
    Ok(serde_json::from_value(envelope.payload)?)
}
