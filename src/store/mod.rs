//! Session store contract and record collections

mod memory;
mod traits;

pub use memory::MemoryCollection;
pub use traits::{ManagerStore, RecordCollection, SessionStore};

#[cfg(feature = "mongo-store")]
mod mongo_store;

#[cfg(feature = "mongo-store")]
pub use mongo_store::MongoCollection;
