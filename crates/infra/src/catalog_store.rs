//! Catalog store facade: validated create/update/delete over the storage
//! collaborator, with an in-memory mirror for querying.
//!
//! ## Concurrency
//!
//! - **Single writer**: every mutation holds one catalog-wide write lock from
//!   validation to mirror update, so mutations are serialized even when they
//!   touch different offerings.
//! - **Snapshot reads**: the mirror is an immutable [`CatalogSnapshot`] behind
//!   an `Arc`. A write builds a new snapshot and swaps it in as its last step,
//!   so readers see the state before or after a write, never in between.
//! - **Failure leaves state alone**: validation and storage failures return
//!   before the swap, so the mirror keeps its pre-operation contents.

use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use thiserror::Error;

use dailyround_catalog::{
    Category, Offering, PriceDraft, PriceEntry, ValidationError, validate_offering, validate_with,
};
use dailyround_core::{CalendarDate, Entity, OfferingGid, OwnerId, VariantId};

use crate::config::CatalogConfig;
use crate::query::{self, CategoryGroup, OfferingFilter, OfferingListItem};
use crate::storage::{CatalogStorage, StorageError};

/// Outcome taxonomy of catalog mutations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CatalogStoreError {
    /// Caller-correctable input problems; nothing was written.
    #[error("validation failed: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    /// No offering with this gid exists for the store's owner.
    #[error("offering {gid} not found")]
    NotFound { gid: OfferingGid },

    /// `create` was called with a gid that already exists.
    #[error("offering {gid} already exists")]
    Conflict { gid: OfferingGid },

    /// The offering belongs to a different owner than this store.
    #[error("offering {gid} belongs to another owner")]
    OwnerMismatch { gid: OfferingGid },

    /// The storage collaborator failed; the mirror is unchanged.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Point-in-time view of an owner's catalog.
///
/// Offerings are shared between successive snapshots; a write allocates only
/// the offering it touches.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    offerings: Vec<Arc<Offering>>,
    categories: Arc<Vec<Category>>,
}

impl CatalogSnapshot {
    fn new(offerings: Vec<Arc<Offering>>, categories: Arc<Vec<Category>>) -> Self {
        Self {
            offerings,
            categories,
        }
    }

    /// Offerings in mirror order (load order, then creation order).
    pub fn offerings(&self) -> &[Arc<Offering>] {
        &self.offerings
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Every offering grouped by category.
    pub fn groups(&self) -> Vec<CategoryGroup> {
        query::group_by_category(self.iter())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Offering> {
        self.offerings.iter().map(Arc::as_ref)
    }

    pub fn get(&self, gid: &OfferingGid) -> Option<&Offering> {
        self.iter().find(|o| o.gid() == gid)
    }

    fn position(&self, offering: &Offering) -> Option<usize> {
        self.offerings.iter().position(|o| o.same_identity(offering))
    }

    pub fn len(&self) -> usize {
        self.offerings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offerings.is_empty()
    }
}

/// Catalog facade for one owner.
#[derive(Debug)]
pub struct CatalogStore<S>
where
    S: CatalogStorage,
{
    storage: S,
    owner_id: OwnerId,
    config: CatalogConfig,
    write_lock: Mutex<()>,
    state: RwLock<Arc<CatalogSnapshot>>,
}

impl<S> CatalogStore<S>
where
    S: CatalogStorage,
{
    pub fn new(storage: S, owner_id: OwnerId) -> Self {
        Self::with_config(storage, owner_id, CatalogConfig::default())
    }

    pub fn with_config(storage: S, owner_id: OwnerId, config: CatalogConfig) -> Self {
        Self {
            storage,
            owner_id,
            config,
            write_lock: Mutex::new(()),
            state: RwLock::new(Arc::new(CatalogSnapshot::default())),
        }
    }

    pub fn owner_id(&self) -> OwnerId {
        self.owner_id
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>, CatalogStoreError> {
        self.write_lock
            .lock()
            .map_err(|_| StorageError::Unavailable("catalog write lock poisoned".to_string()).into())
    }

    fn publish(&self, snapshot: CatalogSnapshot) -> Result<(), CatalogStoreError> {
        let mut state = self
            .state
            .write()
            .map_err(|_| StorageError::Unavailable("catalog mirror lock poisoned".to_string()))?;
        *state = Arc::new(snapshot);
        Ok(())
    }

    /// Current point-in-time view of the mirror.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        match self.state.read() {
            Ok(state) => Arc::clone(&*state),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    /// Replace the mirror with the owner's records and the category list.
    pub fn load(&self) -> Result<usize, CatalogStoreError> {
        let _guard = self.lock_writes()?;
        let offerings = self.storage.fetch_all(self.owner_id, None, None);
        let categories = self.storage.fetch_categories();
        let count = offerings.len();
        let offerings = offerings.into_iter().map(Arc::new).collect();
        self.publish(CatalogSnapshot::new(offerings, categories.into()))?;
        tracing::info!("Loaded {} offerings for owner {}", count, self.owner_id);
        Ok(count)
    }

    /// Validate the offering and every entry of its price schedule.
    pub fn validate(&self, offering: &Offering) -> Vec<ValidationError> {
        validate_offering(offering, &self.config.validation_rules())
    }

    pub fn validate_draft(&self, offering: &Offering, draft: &PriceDraft) -> Vec<ValidationError> {
        validate_with(offering, draft, &self.config.validation_rules())
    }

    fn ensure_valid(&self, offering: &Offering) -> Result<(), CatalogStoreError> {
        let errors = self.validate(offering);
        if errors.is_empty() {
            return Ok(());
        }
        tracing::warn!(
            "Rejected write of offering {}: {}",
            offering.gid(),
            join_messages(&errors)
        );
        Err(CatalogStoreError::Validation(errors))
    }

    fn fetch_owned(&self, gid: &OfferingGid) -> Result<Offering, CatalogStoreError> {
        self.storage
            .fetch_by_id(gid)
            .filter(|o| o.owner_id == self.owner_id)
            .ok_or_else(|| CatalogStoreError::NotFound { gid: gid.clone() })
    }

    fn persist(&self, offering: &Offering) -> Result<(), CatalogStoreError> {
        self.storage.save(offering).map_err(|e| {
            tracing::warn!("Failed to save offering {}: {}", offering.gid(), e);
            CatalogStoreError::from(e)
        })
    }

    pub fn create(&self, offering: Offering) -> Result<(), CatalogStoreError> {
        let _guard = self.lock_writes()?;
        let gid = offering.gid().clone();

        if offering.owner_id != self.owner_id {
            return Err(CatalogStoreError::OwnerMismatch { gid });
        }
        self.ensure_valid(&offering)?;

        let current = self.snapshot();
        if current.get(&gid).is_some() || self.storage.fetch_by_id(&gid).is_some() {
            return Err(CatalogStoreError::Conflict { gid });
        }

        self.persist(&offering)?;

        let mut offerings = current.offerings.clone();
        offerings.push(Arc::new(offering));
        self.publish(CatalogSnapshot::new(offerings, Arc::clone(&current.categories)))?;
        tracing::info!("Created offering {}", gid);
        Ok(())
    }

    /// Merge `edited` into the stored record with the same gid and persist it.
    /// Returns the merged offering.
    pub fn update(&self, edited: Offering) -> Result<Offering, CatalogStoreError> {
        let _guard = self.lock_writes()?;
        let gid = edited.gid().clone();

        let mut merged = self.fetch_owned(&gid)?;
        merged.merge_from(&edited);
        self.ensure_valid(&merged)?;
        self.persist(&merged)?;

        let current = self.snapshot();
        let mut offerings = current.offerings.clone();
        let shared = Arc::new(merged.clone());
        match current.position(&merged) {
            Some(idx) => offerings[idx] = shared,
            None => offerings.push(shared),
        }
        self.publish(CatalogSnapshot::new(offerings, Arc::clone(&current.categories)))?;
        tracing::info!("Updated offering {}", gid);
        Ok(merged)
    }

    /// Remove an offering with all of its variants and prices. Returns the
    /// removed record.
    pub fn delete(&self, gid: &OfferingGid) -> Result<Offering, CatalogStoreError> {
        let _guard = self.lock_writes()?;

        let existing = self.fetch_owned(gid)?;
        self.storage.delete(&existing).map_err(|e| {
            tracing::warn!("Failed to delete offering {}: {}", gid, e);
            CatalogStoreError::from(e)
        })?;

        let current = self.snapshot();
        let offerings = current
            .offerings
            .iter()
            .filter(|o| o.gid() != gid)
            .cloned()
            .collect();
        self.publish(CatalogSnapshot::new(offerings, Arc::clone(&current.categories)))?;
        tracing::info!("Deleted offering {}", gid);
        Ok(existing)
    }

    pub fn get(&self, gid: &OfferingGid) -> Option<Offering> {
        self.snapshot().get(gid).cloned()
    }

    /// Effective price entry of a mirrored offering on `as_of`.
    pub fn resolve_price(
        &self,
        gid: &OfferingGid,
        as_of: CalendarDate,
        variant_id: Option<&VariantId>,
    ) -> Option<PriceEntry> {
        self.snapshot()
            .get(gid)
            .and_then(|o| o.resolve_price(as_of, variant_id))
            .cloned()
    }

    /// Filtered, searched and grouped listing for display.
    pub fn list_offerings(&self, filter: &OfferingFilter, search_text: &str) -> Vec<OfferingListItem> {
        let snapshot = self.snapshot();
        query::list_offerings(
            snapshot.iter(),
            filter,
            search_text,
            &self.config.uncategorized_label,
        )
    }

    pub fn categories(&self) -> Vec<Category> {
        self.snapshot().categories().to_vec()
    }

    pub fn distinct_category_values(&self, supplier_defined: bool) -> Vec<String> {
        self.storage
            .distinct_category_values(self.owner_id, supplier_defined)
    }
}
