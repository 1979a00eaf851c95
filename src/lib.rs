//! # mongo-session-store
//!
//! Session persistence backend for HTTP session managers, storing session
//! values in MongoDB.
//!
//! A [`StoreManager`] implements the [`ManagerStore`] contract (check, create,
//! update, refresh, delete, close) and hands out [`SessionInstance`]s that
//! implement [`SessionStore`] (get, set, delete, flush, save). Instances are
//! recycled through a pool and go back to it when dropped.
//!
//! ## Features
//!
//! - **Document per session**: `{ _id, value, expired_at }` with the values
//!   encoded as a JSON object (empty string when there are none)
//! - **Lazy expiry**: records past `expired_at` are treated as absent until
//!   the server's TTL index removes them
//! - **Pluggable storage**: any [`RecordCollection`]; MongoDB and in-memory
//!   collections are provided
//! - **Pluggable encoding**: swap the [`ValueCodec`] on the manager
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mongo_session_store::{Context, ManagerStore, MongoStore, SessionStore, StoreConfig};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StoreConfig::new("mongodb://127.0.0.1:27017")
//!         .with_database("app")
//!         .with_collection("session");
//!     let manager = MongoStore::connect(&config).await?;
//!
//!     let ctx = Context::background();
//!     let store = manager.create(&ctx, "s1", 3600).await?;
//!     store.set("user", json!("alice"));
//!     store.save().await?;
//!
//!     let store = manager.update(&ctx, "s1", 3600).await?;
//!     assert_eq!(store.get("user"), Some(json!("alice")));
//!
//!     manager.close().await?;
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod config;
pub mod context;
pub mod error;
pub mod manager;
mod pool;
pub mod record;
pub mod session;
pub mod store;

pub use codec::{JsonCodec, SessionValues, ValueCodec};
pub use config::StoreConfig;
pub use context::Context;
pub use error::SessionError;
pub use manager::StoreManager;
pub use record::SessionRecord;
pub use session::SessionInstance;
pub use store::{ManagerStore, MemoryCollection, RecordCollection, SessionStore};

#[cfg(feature = "mongo-store")]
pub use manager::MongoStore;

#[cfg(feature = "mongo-store")]
pub use store::MongoCollection;
