//! MongoDB session store example
//!
//! Requires a MongoDB server. Set MONGO_URL to override the default
//! `mongodb://127.0.0.1:27017`.

use mongo_session_store::{Context, ManagerStore, MongoStore, SessionStore, StoreConfig};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let url = std::env::var("MONGO_URL")
        .unwrap_or_else(|_| "mongodb://127.0.0.1:27017".to_string());
    let config = StoreConfig::new(url)
        .with_database("demo")
        .with_collection("session");

    // A connection failure at startup is fatal for the demo
    let manager = MongoStore::connect(&config).await?;
    let ctx = Context::background();

    let store = manager.create(&ctx, "demo-sid", 120).await?;
    store.set("cart", json!([{ "sku": "A-1", "qty": 2 }]));
    store.save().await?;
    drop(store);

    let store = manager.update(&ctx, "demo-sid", 120).await?;
    println!("cart: {:?}", store.get("cart"));
    drop(store);

    manager.delete(&ctx, "demo-sid").await?;
    println!("exists after delete: {}", manager.check(&ctx, "demo-sid").await?);

    manager.close().await?;
    Ok(())
}
