//! Storage collaborator: the narrow record-store interface the catalog
//! consumes, plus an in-memory implementation for tests/dev.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::InMemoryCatalogStorage;
pub use r#trait::{CatalogStorage, StorageError};
