//! Document store adapters: the hosted REST database and an in-memory tree.

mod http_store;
mod memory_store;

pub use http_store::{HttpDocumentStore, HttpDocumentStoreConfig};
pub use memory_store::InMemoryDocumentStore;
