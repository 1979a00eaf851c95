//! Session store contract and database boundary

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::time::Duration;

use crate::context::Context;
use crate::error::SessionError;
use crate::record::SessionRecord;

/// A live, mutable view of one session's values
///
/// Reads and writes happen in memory; only [`flush`](SessionStore::flush)
/// and [`save`](SessionStore::save) reach the database.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The context the instance was created with
    fn context(&self) -> &Context;

    /// The session identifier this instance is bound to
    fn session_id(&self) -> &str;

    /// Set/overwrite a value
    fn set(&self, key: &str, value: Value);

    /// Get a value, `None` if unset
    fn get(&self, key: &str) -> Option<Value>;

    /// Remove a value, returning what was there
    fn delete(&self, key: &str) -> Option<Value>;

    /// Remove every value and persist the empty session
    async fn flush(&self) -> Result<(), SessionError>;

    /// Persist the current values with a refreshed expiry
    async fn save(&self) -> Result<(), SessionError>;
}

/// Maps session lifecycle operations onto stored records
#[async_trait]
pub trait ManagerStore: Send + Sync + 'static {
    /// Instance type handed out by the manager
    type Store: SessionStore;

    /// Whether a live, non-empty record exists for `sid`
    async fn check(&self, ctx: &Context, sid: &str) -> Result<bool, SessionError>;

    /// A fresh, empty instance; touches no storage
    async fn create(&self, ctx: &Context, sid: &str, ttl_secs: i64)
        -> Result<Self::Store, SessionError>;

    /// Load `sid` and extend its expiry, or start empty if it is gone
    async fn update(&self, ctx: &Context, sid: &str, ttl_secs: i64)
        -> Result<Self::Store, SessionError>;

    /// Remove the record for `sid`; missing records are not an error
    async fn delete(&self, ctx: &Context, sid: &str) -> Result<(), SessionError>;

    /// Move the values stored under `old_sid` to `sid`
    ///
    /// When `old_sid == sid` the record is kept and only its expiry moves.
    async fn refresh(
        &self,
        ctx: &Context,
        old_sid: &str,
        sid: &str,
        ttl_secs: i64,
    ) -> Result<Self::Store, SessionError>;

    /// Release the underlying connection
    async fn close(&self) -> Result<(), SessionError>;
}

/// Storage for session records
///
/// Implementations are cheap handles: every call works on a short-lived
/// clone of the underlying connection and releases it before returning.
/// No expiry filtering happens here; callers apply it.
#[async_trait]
pub trait RecordCollection: Clone + Send + Sync + 'static {
    /// Fetch the record physically stored under `id`
    async fn find(&self, id: &str) -> Result<Option<SessionRecord>, SessionError>;

    /// Set a new expiry on an existing record; returns whether one matched
    async fn touch(&self, id: &str, expired_at: DateTime<Utc>) -> Result<bool, SessionError>;

    /// Insert or replace the record keyed by `record.id`
    async fn upsert(&self, record: &SessionRecord) -> Result<(), SessionError>;

    /// Remove the record; returns whether one existed
    async fn remove(&self, id: &str) -> Result<bool, SessionError>;

    /// Make sure records are physically evicted `grace` after they expire
    async fn ensure_expiry_index(&self, grace: Duration) -> Result<(), SessionError>;

    /// Release the connection
    async fn close(&self) -> Result<(), SessionError>;
}
