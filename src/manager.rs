//! Manager store: session lifecycle on top of a record collection

use async_trait::async_trait;
use std::sync::Arc;

use crate::codec::{JsonCodec, SessionValues, ValueCodec};
use crate::config::StoreConfig;
use crate::context::Context;
use crate::error::{validate_sid, SessionError};
use crate::pool::InstancePool;
use crate::record::{expiry_from_now, SessionRecord};
use crate::session::SessionInstance;
use crate::store::{ManagerStore, RecordCollection};

#[cfg(feature = "mongo-store")]
use crate::store::MongoCollection;

/// Manager store backed by MongoDB
#[cfg(feature = "mongo-store")]
pub type MongoStore = StoreManager<MongoCollection>;

/// Translates session lifecycle calls into record reads and writes
///
/// Owns the collection handle and a pool of reusable session instances.
/// A record whose `expired_at` has passed is treated as absent even if the
/// collection has not evicted it yet.
pub struct StoreManager<C: RecordCollection> {
    collection: C,
    codec: Arc<dyn ValueCodec>,
    pool: Arc<InstancePool>,
}

impl<C: RecordCollection> StoreManager<C> {
    /// Create a manager over `collection`, making sure the expiry index exists
    pub async fn new(collection: C, config: &StoreConfig) -> Result<Self, SessionError> {
        collection.ensure_expiry_index(config.expire_after).await?;
        Ok(Self {
            collection,
            codec: Arc::new(JsonCodec),
            pool: Arc::new(InstancePool::new(config.max_idle)),
        })
    }

    /// Replace the value codec (default: JSON)
    pub fn with_codec<V: ValueCodec>(mut self, codec: V) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    /// The underlying record collection
    pub fn collection(&self) -> &C {
        &self.collection
    }

    /// Number of idle instances waiting in the pool
    pub fn idle_instances(&self) -> usize {
        self.pool.idle_len()
    }

    /// Stored blob for `sid`, `None` if missing, empty or expired
    async fn live_value(&self, sid: &str) -> Result<Option<String>, SessionError> {
        let record = self.collection.find(sid).await?;
        Ok(record.and_then(SessionRecord::live_value))
    }

    fn instance(
        &self,
        ctx: &Context,
        sid: &str,
        ttl_secs: i64,
        values: Option<SessionValues>,
    ) -> SessionInstance<C> {
        let state = self.pool.acquire(ctx, sid, ttl_secs, values);
        SessionInstance::new(
            state,
            self.collection.clone(),
            Arc::clone(&self.codec),
            Arc::clone(&self.pool),
        )
    }
}

#[cfg(feature = "mongo-store")]
impl StoreManager<MongoCollection> {
    /// Connect to the server in `config` and prepare the sessions collection
    ///
    /// Fails if the server is unreachable or the TTL index cannot be created.
    pub async fn connect(config: &StoreConfig) -> Result<Self, SessionError> {
        let collection = MongoCollection::connect(config).await?;
        Self::new(collection, config).await
    }

    /// Use an existing driver client
    pub async fn with_client(
        client: mongodb::Client,
        config: &StoreConfig,
    ) -> Result<Self, SessionError> {
        let collection = MongoCollection::new(client, &config.database, &config.collection);
        Self::new(collection, config).await
    }
}

#[async_trait]
impl<C: RecordCollection> ManagerStore for StoreManager<C> {
    type Store = SessionInstance<C>;

    async fn check(&self, _ctx: &Context, sid: &str) -> Result<bool, SessionError> {
        validate_sid(sid)?;
        Ok(self.live_value(sid).await?.is_some())
    }

    async fn create(
        &self,
        ctx: &Context,
        sid: &str,
        ttl_secs: i64,
    ) -> Result<Self::Store, SessionError> {
        validate_sid(sid)?;
        tracing::debug!(sid, ttl_secs, "creating session");
        Ok(self.instance(ctx, sid, ttl_secs, None))
    }

    async fn update(
        &self,
        ctx: &Context,
        sid: &str,
        ttl_secs: i64,
    ) -> Result<Self::Store, SessionError> {
        validate_sid(sid)?;
        let Some(value) = self.live_value(sid).await? else {
            tracing::debug!(sid, "session missing or expired, starting empty");
            return Ok(self.instance(ctx, sid, ttl_secs, None));
        };

        let matched = self.collection.touch(sid, expiry_from_now(ttl_secs)).await?;
        if !matched {
            tracing::debug!(sid, "session evicted before its expiry could be extended");
        }

        let values = self.codec.decode(&value)?;
        tracing::debug!(sid, keys = values.len(), "updated session");
        Ok(self.instance(ctx, sid, ttl_secs, Some(values)))
    }

    async fn delete(&self, _ctx: &Context, sid: &str) -> Result<(), SessionError> {
        validate_sid(sid)?;
        let removed = self.collection.remove(sid).await?;
        tracing::debug!(sid, removed, "deleted session");
        Ok(())
    }

    async fn refresh(
        &self,
        ctx: &Context,
        old_sid: &str,
        sid: &str,
        ttl_secs: i64,
    ) -> Result<Self::Store, SessionError> {
        validate_sid(old_sid)?;
        validate_sid(sid)?;
        let Some(value) = self.live_value(old_sid).await? else {
            tracing::debug!(old_sid, sid, "nothing to refresh, starting empty");
            return Ok(self.instance(ctx, sid, ttl_secs, None));
        };

        // Two separate writes: a failure after the upsert leaves both
        // records in place until they expire.
        let record = SessionRecord::new(sid, value, ttl_secs);
        self.collection.upsert(&record).await?;
        if old_sid != sid {
            if let Err(e) = self.collection.remove(old_sid).await {
                tracing::warn!(
                    old_sid,
                    sid,
                    "failed to remove old session after refresh: {}",
                    e
                );
                return Err(e);
            }
        }

        let values = self.codec.decode(&record.value)?;
        tracing::debug!(old_sid, sid, keys = values.len(), "refreshed session");
        Ok(self.instance(ctx, sid, ttl_secs, Some(values)))
    }

    async fn close(&self) -> Result<(), SessionError> {
        self.collection.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryCollection, SessionStore};
    use serde_json::json;

    async fn manager() -> StoreManager<MemoryCollection> {
        StoreManager::new(MemoryCollection::new(), &StoreConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_does_not_touch_collection() {
        let manager = manager().await;
        let store = manager.create(&Context::background(), "s1", 10).await.unwrap();
        assert_eq!(store.session_id(), "s1");
        assert_eq!(store.ttl_secs(), 10);
        assert!(store.is_empty());
        assert!(manager.collection().is_empty());
    }

    #[tokio::test]
    async fn test_check_ignores_expired_and_empty_records() {
        let manager = manager().await;
        let ctx = Context::background();
        let collection = manager.collection();

        collection
            .upsert(&SessionRecord::new("expired", "{\"a\":1}".to_string(), -10))
            .await
            .unwrap();
        collection
            .upsert(&SessionRecord::new("empty", String::new(), 10))
            .await
            .unwrap();
        collection
            .upsert(&SessionRecord::new("live", "{\"a\":1}".to_string(), 10))
            .await
            .unwrap();

        assert!(!manager.check(&ctx, "expired").await.unwrap());
        assert!(!manager.check(&ctx, "empty").await.unwrap());
        assert!(!manager.check(&ctx, "missing").await.unwrap());
        assert!(manager.check(&ctx, "live").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_expired_starts_empty() {
        let manager = manager().await;
        manager
            .collection()
            .upsert(&SessionRecord::new("s1", "{\"a\":1}".to_string(), -10))
            .await
            .unwrap();

        let store = manager.update(&Context::background(), "s1", 10).await.unwrap();
        assert_eq!(store.session_id(), "s1");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_update_extends_expiry() {
        let manager = manager().await;
        manager
            .collection()
            .upsert(&SessionRecord::new("s1", "{\"a\":1}".to_string(), 5))
            .await
            .unwrap();

        let store = manager.update(&Context::background(), "s1", 3600).await.unwrap();
        assert_eq!(store.get("a"), Some(json!(1)));

        let record = manager.collection().find("s1").await.unwrap().unwrap();
        assert!(record.expired_at > expiry_from_now(3000));
    }

    #[tokio::test]
    async fn test_update_malformed_blob_fails() {
        let manager = manager().await;
        manager
            .collection()
            .upsert(&SessionRecord::new("s1", "{\"a\":".to_string(), 10))
            .await
            .unwrap();

        let result = manager.update(&Context::background(), "s1", 10).await;
        assert!(matches!(result, Err(SessionError::SerializationError(_))));
    }

    #[tokio::test]
    async fn test_refresh_malformed_blob_fails() {
        let manager = manager().await;
        manager
            .collection()
            .upsert(&SessionRecord::new("old", "{\"a\":".to_string(), 10))
            .await
            .unwrap();

        let result = manager.refresh(&Context::background(), "old", "new", 10).await;
        assert!(matches!(result, Err(SessionError::SerializationError(_))));
    }

    #[tokio::test]
    async fn test_refresh_same_id_keeps_record() {
        let manager = manager().await;
        let ctx = Context::background();
        let store = manager.create(&ctx, "s1", 10).await.unwrap();
        store.set("foo", json!("bar"));
        store.save().await.unwrap();

        let store = manager.refresh(&ctx, "s1", "s1", 60).await.unwrap();
        assert_eq!(store.get("foo"), Some(json!("bar")));
        assert!(manager.check(&ctx, "s1").await.unwrap());
    }

    /// Memory collection whose removals always fail
    #[derive(Clone, Default)]
    struct BrokenRemove(MemoryCollection);

    #[async_trait]
    impl RecordCollection for BrokenRemove {
        async fn find(&self, id: &str) -> Result<Option<SessionRecord>, SessionError> {
            self.0.find(id).await
        }

        async fn touch(
            &self,
            id: &str,
            expired_at: chrono::DateTime<chrono::Utc>,
        ) -> Result<bool, SessionError> {
            self.0.touch(id, expired_at).await
        }

        async fn upsert(&self, record: &SessionRecord) -> Result<(), SessionError> {
            self.0.upsert(record).await
        }

        async fn remove(&self, _id: &str) -> Result<bool, SessionError> {
            Err(SessionError::StoreError("remove unavailable".to_string()))
        }

        async fn ensure_expiry_index(
            &self,
            grace: std::time::Duration,
        ) -> Result<(), SessionError> {
            self.0.ensure_expiry_index(grace).await
        }

        async fn close(&self) -> Result<(), SessionError> {
            self.0.close().await
        }
    }

    #[tokio::test]
    async fn test_refresh_remove_failure_leaves_both_records() {
        let manager = StoreManager::new(BrokenRemove::default(), &StoreConfig::default())
            .await
            .unwrap();
        let ctx = Context::background();
        let store = manager.create(&ctx, "old", 10).await.unwrap();
        store.set("foo", json!("bar"));
        store.save().await.unwrap();

        let result = manager.refresh(&ctx, "old", "new", 10).await;
        assert!(matches!(result, Err(SessionError::StoreError(_))));

        let new = manager.collection().find("new").await.unwrap().unwrap();
        assert_eq!(new.value, r#"{"foo":"bar"}"#);
        assert!(manager.check(&ctx, "old").await.unwrap());
        assert!(manager.check(&ctx, "new").await.unwrap());
    }

    #[tokio::test]
    async fn test_huge_ttl_does_not_panic() {
        let manager = manager().await;
        let ctx = Context::background();

        let store = manager.create(&ctx, "forever", i64::MAX).await.unwrap();
        store.set("foo", json!("bar"));
        store.save().await.unwrap();
        assert!(manager.check(&ctx, "forever").await.unwrap());

        let store = manager.update(&ctx, "forever", 10_000_000_000_000).await.unwrap();
        assert_eq!(store.get("foo"), Some(json!("bar")));

        let store = manager
            .refresh(&ctx, "forever", "rotated", i64::MAX)
            .await
            .unwrap();
        assert_eq!(store.get("foo"), Some(json!("bar")));

        let store = manager.create(&ctx, "gone", i64::MIN).await.unwrap();
        store.set("foo", json!("bar"));
        store.save().await.unwrap();
        assert!(!manager.check(&ctx, "gone").await.unwrap());
    }

    #[tokio::test]
    async fn test_refresh_missing_binds_new_id() {
        let manager = manager().await;
        let ctx = Context::background();
        let store = manager.refresh(&ctx, "old", "new", 10).await.unwrap();
        assert_eq!(store.session_id(), "new");
        assert!(store.is_empty());
        assert!(manager.collection().is_empty());
    }

    #[tokio::test]
    async fn test_empty_sid_rejected() {
        let manager = manager().await;
        let ctx = Context::background();
        assert!(matches!(
            manager.create(&ctx, "", 10).await,
            Err(SessionError::InvalidSessionId(_))
        ));
        assert!(manager.refresh(&ctx, "s1", "", 10).await.is_err());
        assert!(manager.check(&ctx, "").await.is_err());
    }

    #[tokio::test]
    async fn test_context_passes_through() {
        let manager = manager().await;
        let ctx = Context::with_value("request-7".to_string());
        let store = manager.create(&ctx, "s1", 10).await.unwrap();
        assert!(store.context().same_as(&ctx));
    }

    #[tokio::test]
    async fn test_pooled_instance_is_reset() {
        let manager = manager().await;
        let ctx = Context::background();

        let store = manager.create(&ctx, "s1", 10).await.unwrap();
        store.set("secret", json!("leak"));
        drop(store);
        assert_eq!(manager.idle_instances(), 1);

        let store = manager.create(&ctx, "s2", 20).await.unwrap();
        assert_eq!(manager.idle_instances(), 0);
        assert_eq!(store.session_id(), "s2");
        assert_eq!(store.ttl_secs(), 20);
        assert_eq!(store.get("secret"), None);
        assert!(store.is_empty());
    }

    struct UpperCodec;

    impl ValueCodec for UpperCodec {
        fn encode(&self, values: &SessionValues) -> Result<String, SessionError> {
            Ok(JsonCodec.encode(values)?.to_uppercase())
        }

        fn decode(&self, blob: &str) -> Result<SessionValues, SessionError> {
            JsonCodec.decode(&blob.to_lowercase())
        }
    }

    #[tokio::test]
    async fn test_custom_codec() {
        let manager = manager().await.with_codec(UpperCodec);
        let ctx = Context::background();

        let store = manager.create(&ctx, "s1", 10).await.unwrap();
        store.set("foo", json!("bar"));
        store.save().await.unwrap();
        drop(store);

        let record = manager.collection().find("s1").await.unwrap().unwrap();
        assert_eq!(record.value, r#"{"FOO":"BAR"}"#);

        let store = manager.update(&ctx, "s1", 10).await.unwrap();
        assert_eq!(store.get("foo"), Some(json!("bar")));
    }
}
