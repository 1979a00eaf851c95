//! Pooled session instance

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::codec::{SessionValues, ValueCodec};
use crate::context::Context;
use crate::error::SessionError;
use crate::pool::{InstancePool, InstanceState};
use crate::record::SessionRecord;
use crate::store::{RecordCollection, SessionStore};

/// In-memory values of one session plus the means to persist them
///
/// Handed out by [`StoreManager`](crate::StoreManager). The instance goes
/// back to the manager's pool when dropped, so hold it only for the
/// request that needs it. Methods take `&self`; wrap the instance in an
/// `Arc` to share it between tasks.
pub struct SessionInstance<C: RecordCollection> {
    state: InstanceState,
    collection: C,
    codec: Arc<dyn ValueCodec>,
    pool: Arc<InstancePool>,
}

impl<C: RecordCollection> SessionInstance<C> {
    pub(crate) fn new(
        state: InstanceState,
        collection: C,
        codec: Arc<dyn ValueCodec>,
        pool: Arc<InstancePool>,
    ) -> Self {
        Self {
            state,
            collection,
            codec,
            pool,
        }
    }

    /// Requested time-to-live in seconds
    pub fn ttl_secs(&self) -> i64 {
        self.state.ttl_secs
    }

    /// Copy of the current values
    pub fn values(&self) -> SessionValues {
        self.state.values.read().clone()
    }

    /// Whether no values are set
    pub fn is_empty(&self) -> bool {
        self.state.values.read().is_empty()
    }
}

#[async_trait]
impl<C: RecordCollection> SessionStore for SessionInstance<C> {
    fn context(&self) -> &Context {
        &self.state.ctx
    }

    fn session_id(&self) -> &str {
        &self.state.sid
    }

    fn set(&self, key: &str, value: Value) {
        self.state.values.write().insert(key.to_string(), value);
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.state.values.read().get(key).cloned()
    }

    fn delete(&self, key: &str) -> Option<Value> {
        // Misses only need the read lock. A set landing between the two
        // phases survives this delete.
        let present = self.state.values.read().contains_key(key);
        if !present {
            return None;
        }
        self.state.values.write().remove(key)
    }

    async fn flush(&self) -> Result<(), SessionError> {
        *self.state.values.write() = SessionValues::new();
        self.save().await
    }

    async fn save(&self) -> Result<(), SessionError> {
        let encoded = {
            let values = self.state.values.read();
            self.codec.encode(&values)
        };
        let value = encoded?;

        let record = SessionRecord::new(self.state.sid.as_str(), value, self.state.ttl_secs);
        tracing::debug!(sid = %record.id, empty = record.value.is_empty(), "saving session");
        self.collection.upsert(&record).await
    }
}

impl<C: RecordCollection> Drop for SessionInstance<C> {
    fn drop(&mut self) {
        let state = std::mem::take(&mut self.state);
        self.pool.release(state);
    }
}

impl<C: RecordCollection> std::fmt::Debug for SessionInstance<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionInstance")
            .field("sid", &self.state.sid)
            .field("ttl_secs", &self.state.ttl_secs)
            .field("values", &*self.state.values.read())
            .finish()
    }
}
