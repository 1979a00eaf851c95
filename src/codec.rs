//! Value blob encoding
//!
//! Session values are persisted as a single text blob. The default codec
//! writes a JSON object; an empty value map is written as the empty string
//! rather than `{}`.

use serde_json::{Map, Value};

use crate::error::SessionError;

/// Key/value mapping held by a session instance
pub type SessionValues = Map<String, Value>;

/// Strategy for turning a value map into a stored blob and back
pub trait ValueCodec: Send + Sync + 'static {
    /// Encode the values; an empty map must encode to `""`
    fn encode(&self, values: &SessionValues) -> Result<String, SessionError>;

    /// Decode a blob; `""` must decode to an empty map
    fn decode(&self, blob: &str) -> Result<SessionValues, SessionError>;
}

/// JSON object codec backed by serde_json
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl ValueCodec for JsonCodec {
    fn encode(&self, values: &SessionValues) -> Result<String, SessionError> {
        if values.is_empty() {
            return Ok(String::new());
        }
        Ok(serde_json::to_string(values)?)
    }

    fn decode(&self, blob: &str) -> Result<SessionValues, SessionError> {
        if blob.is_empty() {
            return Ok(SessionValues::new());
        }
        Ok(serde_json::from_str(blob)?)
    }
}
