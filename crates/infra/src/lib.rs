//! Infrastructure layer: storage collaborator, catalog facade, queries, config.

pub mod catalog_store;
pub mod config;
pub mod query;
pub mod storage;


pub use catalog_store::{CatalogSnapshot, CatalogStore, CatalogStoreError};
pub use config::{CatalogConfig, LogConfig};
pub use query::{
    CategoryGroup, DateWindow, GroupKey, OfferingFilter, OfferingListItem, UNCATEGORIZED,
};
pub use storage::{CatalogStorage, InMemoryCatalogStorage, StorageError};
