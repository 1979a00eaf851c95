//! MongoDB record collection
//!
//! Records are stored one document per session:
//! - `_id`: session ID
//! - `value`: encoded session values (empty string when there are none)
//! - `expired_at`: BSON date, covered by a TTL index so the server evicts
//!   records shortly after they expire

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::{doc, DateTime as BsonDateTime};
use mongodb::options::{IndexOptions, ReplaceOptions};
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::RecordCollection;
use crate::config::StoreConfig;
use crate::error::SessionError;
use crate::record::SessionRecord;

/// Document shape in the sessions collection
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MongoRecord {
    #[serde(rename = "_id")]
    id: String,
    value: String,
    expired_at: BsonDateTime,
}

impl From<&SessionRecord> for MongoRecord {
    fn from(record: &SessionRecord) -> Self {
        Self {
            id: record.id.clone(),
            value: record.value.clone(),
            expired_at: to_bson_date(record.expired_at),
        }
    }
}

impl TryFrom<MongoRecord> for SessionRecord {
    type Error = SessionError;

    fn try_from(doc: MongoRecord) -> Result<Self, Self::Error> {
        let millis = doc.expired_at.timestamp_millis();
        let expired_at = DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
            SessionError::StoreError(format!("expired_at out of range for {}", doc.id))
        })?;
        Ok(Self {
            id: doc.id,
            value: doc.value,
            expired_at,
        })
    }
}

fn to_bson_date(at: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(at.timestamp_millis())
}

/// MongoDB-backed record collection
///
/// Cloning is cheap: the driver client is reference counted and every
/// operation checks a connection out of the driver's pool only for the
/// duration of that call.
///
/// # Example
///
/// ```rust,ignore
/// use mongo_session_store::{MongoCollection, StoreConfig};
///
/// let collection = MongoCollection::connect(&StoreConfig::default()).await?;
/// ```
#[derive(Clone)]
pub struct MongoCollection {
    client: Client,
    collection: Collection<MongoRecord>,
}

impl MongoCollection {
    /// Dial the server named in `config` and open its collection
    pub async fn connect(config: &StoreConfig) -> Result<Self, SessionError> {
        let client = Client::with_uri_str(&config.url).await?;
        tracing::info!(url = %config.url, "connected to MongoDB");
        Ok(Self::new(client, &config.database, &config.collection))
    }

    /// Use a client the caller already manages
    pub fn new(client: Client, database: &str, collection: &str) -> Self {
        let collection = client.database(database).collection(collection);
        Self { client, collection }
    }

    /// The underlying driver client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl RecordCollection for MongoCollection {
    async fn find(&self, id: &str) -> Result<Option<SessionRecord>, SessionError> {
        let found = self.collection.find_one(doc! { "_id": id }, None).await?;
        found.map(SessionRecord::try_from).transpose()
    }

    async fn touch(&self, id: &str, expired_at: DateTime<Utc>) -> Result<bool, SessionError> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "expired_at": to_bson_date(expired_at) } },
                None,
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn upsert(&self, record: &SessionRecord) -> Result<(), SessionError> {
        let options = ReplaceOptions::builder().upsert(true).build();
        self.collection
            .replace_one(doc! { "_id": record.id.as_str() }, MongoRecord::from(record), options)
            .await?;
        Ok(())
    }

    async fn remove(&self, id: &str) -> Result<bool, SessionError> {
        let result = self.collection.delete_one(doc! { "_id": id }, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn ensure_expiry_index(&self, grace: Duration) -> Result<(), SessionError> {
        let index = IndexModel::builder()
            .keys(doc! { "expired_at": 1 })
            .options(IndexOptions::builder().expire_after(grace).build())
            .build();
        self.collection.create_index(index, None).await?;
        Ok(())
    }

    async fn close(&self) -> Result<(), SessionError> {
        self.client.clone().shutdown().await;
        tracing::info!("MongoDB client shut down");
        Ok(())
    }
}
