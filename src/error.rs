//! Session error types

use std::fmt;

/// Errors that can occur during session operations
#[derive(Debug)]
pub enum SessionError {
    /// Error from the backing collection
    StoreError(String),
    /// Error during serialization/deserialization of the value blob
    SerializationError(String),
    /// Invalid session ID (empty)
    InvalidSessionId(String),
    /// The collection has been closed
    Closed,
    /// MongoDB driver error (when mongo-store feature is enabled)
    #[cfg(feature = "mongo-store")]
    MongoError(mongodb::error::Error),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::StoreError(msg) => write!(f, "Session store error: {}", msg),
            SessionError::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            SessionError::InvalidSessionId(msg) => write!(f, "Invalid session ID: {}", msg),
            SessionError::Closed => write!(f, "Session store is closed"),
            #[cfg(feature = "mongo-store")]
            SessionError::MongoError(e) => write!(f, "MongoDB error: {}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "mongo-store")]
            SessionError::MongoError(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(feature = "mongo-store")]
impl From<mongodb::error::Error> for SessionError {
    fn from(err: mongodb::error::Error) -> Self {
        SessionError::MongoError(err)
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::SerializationError(err.to_string())
    }
}

/// Reject empty session IDs before they reach the collection
pub(crate) fn validate_sid(sid: &str) -> Result<(), SessionError> {
    if sid.is_empty() {
        return Err(SessionError::InvalidSessionId(
            "session ID must not be empty".to_string(),
        ));
    }
    Ok(())
}
