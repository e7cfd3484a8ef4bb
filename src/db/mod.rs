//! Database layer (Firestore, or in-memory for tests and local runs).

pub mod firestore;
pub mod memory;
pub mod store;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;
pub use store::{AccountStore, CollectionStore, Store, TokenStore};

/// Collection names as constants.
pub mod collections {
    pub const ACCOUNTS: &str = "users";
    pub const COLLECTIONS: &str = "collections";
    pub const TOKENS: &str = "tokens";
}
