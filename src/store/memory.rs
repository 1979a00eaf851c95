//! In-memory record collection
//!
//! This is primarily for development and testing.
//! For production, use MongoCollection.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::RecordCollection;
use crate::error::SessionError;
use crate::record::SessionRecord;

/// In-memory record collection
///
/// Clones share the same records. Expired records stay in place until
/// [`purge_expired`](MemoryCollection::purge_expired) runs, the same way a
/// database TTL monitor lags behind the logical expiry.
///
/// Warning: This collection is not suitable for production use because:
/// - Sessions are lost on server restart
/// - Sessions are not shared across multiple server instances
#[derive(Clone, Default)]
pub struct MemoryCollection {
    records: Arc<RwLock<HashMap<String, SessionRecord>>>,
    grace: Arc<RwLock<Option<Duration>>>,
    closed: Arc<AtomicBool>,
}

impl MemoryCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records physically present, expired ones included
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether no records are present
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Physically remove records whose expiry is more than the index grace
    /// period in the past (no grace if no index was created)
    pub fn purge_expired(&self) -> usize {
        let grace = (*self.grace.read()).unwrap_or_default();
        let grace = chrono::Duration::from_std(grace).unwrap_or_else(|_| chrono::Duration::zero());
        let cutoff = Utc::now() - grace;
        let mut records = self.records.write();
        let before = records.len();
        records.retain(|_, record| record.expired_at > cutoff);
        before - records.len()
    }

    /// Run [`purge_expired`](MemoryCollection::purge_expired) every `interval`
    /// until the collection is closed
    pub fn spawn_reaper(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let collection = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if collection.closed.load(Ordering::SeqCst) {
                    break;
                }
                let purged = collection.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, "purged expired sessions");
                }
            }
        })
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SessionError::Closed);
        }
        Ok(())
    }
}

#[async_trait]
impl RecordCollection for MemoryCollection {
    async fn find(&self, id: &str) -> Result<Option<SessionRecord>, SessionError> {
        self.ensure_open()?;
        Ok(self.records.read().get(id).cloned())
    }

    async fn touch(&self, id: &str, expired_at: DateTime<Utc>) -> Result<bool, SessionError> {
        self.ensure_open()?;
        let mut records = self.records.write();
        match records.get_mut(id) {
            Some(record) => {
                record.expired_at = expired_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn upsert(&self, record: &SessionRecord) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.records
            .write()
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<bool, SessionError> {
        self.ensure_open()?;
        Ok(self.records.write().remove(id).is_some())
    }

    async fn ensure_expiry_index(&self, grace: Duration) -> Result<(), SessionError> {
        self.ensure_open()?;
        *self.grace.write() = Some(grace);
        Ok(())
    }

    async fn close(&self) -> Result<(), SessionError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
