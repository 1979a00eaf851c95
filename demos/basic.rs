//! Basic session lifecycle on the in-memory collection
//!
//! Walks through create/save, update, refresh and delete the way an HTTP
//! session manager would drive the store across requests.

use std::time::Duration;

use mongo_session_store::{
    Context, ManagerStore, MemoryCollection, SessionError, SessionStore, StoreConfig,
    StoreManager,
};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), SessionError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let collection = MemoryCollection::new();
    let reaper = collection.spawn_reaper(Duration::from_secs(1));
    let manager = StoreManager::new(collection, &StoreConfig::default()).await?;
    let ctx = Context::with_value("request-1".to_string());

    // First request: new session
    let store = manager.create(&ctx, "sid-1", 60).await?;
    store.set("user", json!("alice"));
    store.set("views", json!(1));
    store.save().await?;
    drop(store);

    // Second request: load, bump a counter, save
    let store = manager.update(&ctx, "sid-1", 60).await?;
    let views = store.get("views").and_then(|v| v.as_i64()).unwrap_or(0);
    store.set("views", json!(views + 1));
    store.save().await?;
    println!("views after second request: {}", views + 1);
    drop(store);

    // Login: rotate the session ID
    let store = manager.refresh(&ctx, "sid-1", "sid-2", 60).await?;
    println!("rotated to {} with {:?}", store.session_id(), store.values());
    println!("old session exists: {}", manager.check(&ctx, "sid-1").await?);
    drop(store);

    // Logout
    manager.delete(&ctx, "sid-2").await?;
    println!("new session exists: {}", manager.check(&ctx, "sid-2").await?);

    manager.close().await?;
    reaper.await.ok();
    Ok(())
}
