//! Persisted session record

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One stored session: its identifier, encoded value blob and absolute expiry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session identifier (primary key)
    pub id: String,

    /// Encoded values; empty means the session holds no data
    pub value: String,

    /// Absolute expiration time
    pub expired_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Build a record expiring `ttl_secs` seconds from now
    pub fn new<S: Into<String>>(id: S, value: String, ttl_secs: i64) -> Self {
        Self {
            id: id.into(),
            value,
            expired_at: expiry_from_now(ttl_secs),
        }
    }

    /// Whether the record's expiry has already passed
    pub fn is_expired(&self) -> bool {
        self.expired_at < Utc::now()
    }

    /// The stored blob, or `None` when the record is logically absent
    /// (expired or holding no data)
    pub fn live_value(self) -> Option<String> {
        if self.is_expired() || self.value.is_empty() {
            None
        } else {
            Some(self.value)
        }
    }
}

/// Absolute expiry `ttl_secs` seconds from now, saturating at the bounds
/// of `DateTime<Utc>`
pub fn expiry_from_now(ttl_secs: i64) -> DateTime<Utc> {
    let saturated = if ttl_secs < 0 {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    };
    Duration::try_seconds(ttl_secs)
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .unwrap_or(saturated)
}
