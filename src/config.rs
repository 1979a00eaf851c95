//! Store configuration

use std::time::Duration;

/// Configuration for a MongoDB-backed manager store
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Connection string (default: "mongodb://127.0.0.1:27017")
    pub url: String,

    /// Database name (default: "session")
    pub database: String,

    /// Collection name (default: "session")
    pub collection: String,

    /// Grace period the server keeps a record after `expired_at` before
    /// its TTL monitor removes it (default: 1 second)
    pub expire_after: Duration,

    /// Maximum number of idle session instances kept for reuse (default: 1024)
    pub max_idle: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "mongodb://127.0.0.1:27017".to_string(),
            database: "session".to_string(),
            collection: "session".to_string(),
            expire_after: Duration::from_secs(1),
            max_idle: 1024,
        }
    }
}

impl StoreConfig {
    /// Create a new configuration for the given connection string
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the database name
    pub fn with_database<S: Into<String>>(mut self, database: S) -> Self {
        self.database = database.into();
        self
    }

    /// Set the collection name
    pub fn with_collection<S: Into<String>>(mut self, collection: S) -> Self {
        self.collection = collection.into();
        self
    }

    /// Set the TTL index grace period
    pub fn with_expire_after(mut self, grace: Duration) -> Self {
        self.expire_after = grace;
        self
    }

    /// Set the idle pool capacity
    pub fn with_max_idle(mut self, max_idle: usize) -> Self {
        self.max_idle = max_idle;
        self
    }
}
