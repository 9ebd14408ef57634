use std::sync::Arc;

use thiserror::Error;

use dailyround_catalog::{Category, Offering};
use dailyround_core::{OfferingGid, OwnerId};

/// Storage collaborator failure.
///
/// These are **infrastructure errors**: the record store could not complete
/// a write. They are recoverable from the caller's point of view; the catalog
/// mirror is never updated when one is raised.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("record serialization failed: {0}")]
    Serialization(String),

    #[error("write rejected by storage: {0}")]
    Rejected(String),
}

/// Record store keyed by offering gid.
///
/// The catalog never touches a persistence medium except through this trait.
///
/// ## Write semantics
///
/// - `save` is an upsert of the whole offering, children included
///   (variants, price entries, sources).
/// - `delete` removes the offering and all of its children, or nothing.
///
/// ## Read semantics
///
/// - Reads never fail; records that cannot be decoded are skipped (and logged).
/// - `fetch_all` is scoped to one owner and may pre-filter by exact category
///   key and by a case-insensitive name substring.
pub trait CatalogStorage: Send + Sync {
    fn fetch_by_id(&self, gid: &OfferingGid) -> Option<Offering>;

    fn fetch_all(
        &self,
        owner_id: OwnerId,
        category_filter: Option<&str>,
        search_text: Option<&str>,
    ) -> Vec<Offering>;

    fn fetch_categories(&self) -> Vec<Category>;

    fn save(&self, offering: &Offering) -> Result<(), StorageError>;

    fn delete(&self, offering: &Offering) -> Result<(), StorageError>;

    /// Distinct non-blank values of `category` (or of
    /// `supplier_defined_category` when `supplier_defined` is set), sorted.
    fn distinct_category_values(&self, owner_id: OwnerId, supplier_defined: bool) -> Vec<String>;
}

impl<S> CatalogStorage for Arc<S>
where
    S: CatalogStorage + ?Sized,
{
    fn fetch_by_id(&self, gid: &OfferingGid) -> Option<Offering> {
        (**self).fetch_by_id(gid)
    }

    fn fetch_all(
        &self,
        owner_id: OwnerId,
        category_filter: Option<&str>,
        search_text: Option<&str>,
    ) -> Vec<Offering> {
        (**self).fetch_all(owner_id, category_filter, search_text)
    }

    fn fetch_categories(&self) -> Vec<Category> {
        (**self).fetch_categories()
    }

    fn save(&self, offering: &Offering) -> Result<(), StorageError> {
        (**self).save(offering)
    }

    fn delete(&self, offering: &Offering) -> Result<(), StorageError> {
        (**self).delete(offering)
    }

    fn distinct_category_values(&self, owner_id: OwnerId, supplier_defined: bool) -> Vec<String> {
        (**self).distinct_category_values(owner_id, supplier_defined)
    }
}
